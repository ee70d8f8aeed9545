use dotenvy::dotenv;
use lesson_gen::{ContentKind, GenerationRequest, HttpTransport, ThreadId};
use lesson_session::{SessionController, SessionEvent, SessionParams};
use std::{sync::Arc, time::Duration};

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let transport = HttpTransport::new(common::backend_options());
    let (controller, mut events) = SessionController::new(
        SessionParams::new(Arc::new(transport)).budget(Duration::from_secs(120)),
    );

    let request = GenerationRequest::new(
        ContentKind::Story,
        "1",
        "1",
        "class-1",
        ThreadId::generate().to_string(),
    )
    .with_teacher_requirements("A short story about the water cycle for 7 year olds");

    controller.start(request).unwrap();

    while let Some(update) = events.recv().await {
        match &update.event {
            SessionEvent::Progress { message } => println!("[{}] {message}", update.attempt),
            SessionEvent::Idea { idea } => println!("[{}] idea: {idea}", update.attempt),
            SessionEvent::Completed { artifact } => println!("{artifact:#?}"),
            SessionEvent::Errored { kind, message } => eprintln!("{kind:?}: {message}"),
            SessionEvent::Cancelled => eprintln!("cancelled"),
        }
        if update.event.is_terminal() {
            break;
        }
    }
}
