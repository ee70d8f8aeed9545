#[path = "../../client-rust/tests/common/mod.rs"]
mod common;

use common::{event, TestBackend};
use lesson_gen::{
    Artifact, BackendOptions, ContentKind, FailureKind, GenerationRequest, HttpTransport,
    PersistenceGateway, ReadCache, StoryArtifact,
};
use lesson_session::{SessionController, SessionEvent, SessionParams, SessionState};
use std::{sync::Arc, time::Duration};

async fn serve(backend: TestBackend) -> BackendOptions {
    BackendOptions {
        base_url: Some(backend.serve().await),
        ..BackendOptions::default()
    }
}

#[tokio::test]
async fn generated_story_can_be_saved_and_read_back() {
    let options = serve(TestBackend::default().with_script(vec![
        event("progress", "Thinking..."),
        event("idea", "A droplet's journey"),
        event("data", "\"The sun warmed the puddle...\""),
    ]))
    .await;

    let (controller, mut events) =
        SessionController::new(SessionParams::new(Arc::new(HttpTransport::new(options.clone()))));
    let request = GenerationRequest::new(ContentKind::Story, "1", "1", "class-9", "thread-1")
        .with_teacher_requirements("focus on evaporation");

    let attempt = controller.start(request).unwrap().attempt();
    let received = tokio::time::timeout(Duration::from_secs(5), events.collect_attempt(attempt))
        .await
        .expect("story should finish");

    assert_eq!(received.len(), 3);
    assert_eq!(controller.state(), SessionState::Completed);

    let artifact = controller
        .completed_artifact()
        .expect("completed session exposes its artifact");
    assert_eq!(
        artifact,
        Artifact::Story(StoryArtifact::new("The sun warmed the puddle..."))
    );

    let cache = Arc::new(ReadCache::new(options.clone()));
    let gateway = PersistenceGateway::new(options, cache.clone());
    assert_eq!(cache.fetch(ContentKind::Story, "1", "1").await.unwrap(), None);

    controller.reset();
    gateway
        .save(ContentKind::Story, "1", "1", &artifact)
        .await
        .expect("artifact value stays saveable after reset");

    assert_eq!(
        cache.fetch(ContentKind::Story, "1", "1").await.unwrap(),
        Some(artifact)
    );
}

#[tokio::test]
async fn stream_ending_early_is_reported_as_disconnected() {
    let options =
        serve(TestBackend::default().with_script(vec![event("progress", "Sketching...")])).await;

    let (controller, mut events) =
        SessionController::new(SessionParams::new(Arc::new(HttpTransport::new(options))));

    let request = GenerationRequest::new(ContentKind::Drawing, "1", "1", "class-9", "thread-1");
    let attempt = controller.start(request).unwrap().attempt();
    let received = tokio::time::timeout(Duration::from_secs(5), events.collect_attempt(attempt))
        .await
        .expect("drawing should finish");

    assert!(matches!(
        received.last(),
        Some(SessionEvent::Errored {
            kind: FailureKind::Disconnected,
            ..
        })
    ));
    assert_eq!(controller.snapshot().progress_message, "Sketching...");
}
