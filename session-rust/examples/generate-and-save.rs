use dotenvy::dotenv;
use lesson_gen::{
    ContentKind, GenerationRequest, HttpTransport, PersistenceGateway, ReadCache, ThreadId,
};
use lesson_session::{SessionController, SessionParams};
use std::sync::Arc;

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let options = common::backend_options();
    let cache = Arc::new(ReadCache::new(options.clone()));
    let gateway = PersistenceGateway::new(options.clone(), cache.clone());

    let previous = cache.fetch(ContentKind::Game, "1", "2").await.unwrap();
    println!("previously saved game: {previous:#?}");

    let (controller, mut events) =
        SessionController::new(SessionParams::new(Arc::new(HttpTransport::new(options))));

    let mut request = GenerationRequest::new(
        ContentKind::Game,
        "1",
        "2",
        "class-1",
        ThreadId::generate().to_string(),
    )
    .with_teacher_requirements("Something the children can play outdoors");
    if let Some(previous) = previous {
        request = request.with_previous_artifact(previous);
    }

    let attempt = controller.start(request).unwrap().attempt();
    let received = events.collect_attempt(attempt).await;
    println!("{received:#?}");

    if let Some(artifact) = controller.completed_artifact() {
        gateway
            .save(ContentKind::Game, "1", "2", &artifact)
            .await
            .unwrap();
        println!("saved");
    }
}
