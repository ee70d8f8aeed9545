mod common;

use common::{event, ScriptStep, TestBackend};
use futures::StreamExt;
use lesson_gen::{
    interpret_stream, Artifact, BackendOptions, CancellationToken, ContentKind, EndpointLayout,
    Frame, GameArtifact, GenerationError, GenerationMessage, GenerationRequest,
    GenerationTransport, HttpTransport, StoryArtifact,
};
use serde_json::json;
use std::time::Duration;

fn transport(base_url: String, layout: EndpointLayout) -> HttpTransport {
    HttpTransport::new(BackendOptions {
        base_url: Some(base_url),
        layout,
        ..BackendOptions::default()
    })
}

fn story_request() -> GenerationRequest {
    GenerationRequest::new(ContentKind::Story, "1", "1", "class-9", "thread-1")
        .with_teacher_requirements("focus on evaporation")
}

#[tokio::test]
async fn streams_frames_in_arrival_order() {
    let backend = TestBackend::default().with_script(vec![
        event("progress", "Thinking..."),
        event("idea", "A droplet's journey"),
        event("data", "\"The sun warmed the puddle...\""),
    ]);
    let base_url = backend.serve().await;

    let frames: Vec<Frame> = transport(base_url, EndpointLayout::Uniform)
        .open(story_request(), CancellationToken::new())
        .await
        .expect("stream should open")
        .map(|frame| frame.expect("frame should be readable"))
        .collect()
        .await;

    assert_eq!(
        frames,
        vec![
            Frame::new("progress", "Thinking..."),
            Frame::new("idea", "A droplet's journey"),
            Frame::new("data", "\"The sun warmed the puddle...\""),
        ]
    );

    let requests = backend.generation_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "/api/topics/1/days/1/story");
    assert_eq!(
        requests[0].1,
        json!({
            "classroom_id": "class-9",
            "teacher_requirements": "focus on evaporation",
            "thread_id": "thread-1"
        })
    );
}

#[tokio::test]
async fn legacy_layout_posts_story_to_day_route() {
    let backend = TestBackend::default().with_script(vec![event("data", "\"x\"")]);
    let base_url = backend.serve().await;

    let stream = transport(base_url, EndpointLayout::Legacy)
        .open(story_request(), CancellationToken::new())
        .await
        .expect("stream should open");
    let _: Vec<_> = stream.collect().await;

    let requests = backend.generation_requests.lock().unwrap().clone();
    assert_eq!(requests[0].0, "/api/day/1/topic/1/class-materials/story");
}

#[tokio::test]
async fn game_refinement_sends_previous_game() {
    let backend = TestBackend::default().with_script(vec![]);
    let base_url = backend.serve().await;

    let previous = GameArtifact {
        name: "Relay".to_string(),
        description: "Pass the cup".to_string(),
        materials: vec!["cups".to_string()],
        rules: vec![],
        play: "Race".to_string(),
        purpose: "Recall".to_string(),
    };
    let request = GenerationRequest::new(ContentKind::Game, "4", "2", "class-9", "thread-7")
        .with_previous_artifact(Artifact::Game(previous.clone()));

    let stream = transport(base_url, EndpointLayout::Uniform)
        .open(request, CancellationToken::new())
        .await
        .expect("stream should open");
    let _: Vec<_> = stream.collect().await;

    let requests = backend.generation_requests.lock().unwrap().clone();
    assert_eq!(requests[0].0, "/api/topics/4/days/2/game");
    assert_eq!(
        requests[0].1["previous_game"],
        serde_json::to_value(previous).unwrap()
    );
}

#[tokio::test]
async fn non_ok_status_fails_to_open() {
    let backend = TestBackend::default();
    *backend.generation_status.lock().unwrap() = Some(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let base_url = backend.serve().await;

    let result = transport(base_url, EndpointLayout::Uniform)
        .open(story_request(), CancellationToken::new())
        .await;

    match result {
        Err(GenerationError::StatusCode(status, body)) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "generation unavailable");
        }
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("stream should not open"),
    }
}

#[tokio::test]
async fn invalid_request_is_rejected_before_sending() {
    let backend = TestBackend::default();
    let base_url = backend.serve().await;

    let request = GenerationRequest::new(ContentKind::Drawing, "", "1", "class-9", "thread-1");
    let result = transport(base_url, EndpointLayout::Uniform)
        .open(request, CancellationToken::new())
        .await;

    assert!(matches!(result, Err(GenerationError::InvalidInput(_))));
    assert!(backend.generation_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cancellation_stops_delivery_immediately() {
    let backend = TestBackend::default().with_script(vec![
        event("progress", "Sketching..."),
        ScriptStep::Sleep(Duration::from_millis(500)),
        event("data", "\"https://cdn.test/board.png\""),
    ]);
    let base_url = backend.serve().await;

    let token = CancellationToken::new();
    let mut stream = transport(base_url, EndpointLayout::Uniform)
        .open(
            GenerationRequest::new(ContentKind::Drawing, "1", "1", "class-9", "thread-1"),
            token.clone(),
        )
        .await
        .expect("stream should open");

    let first = stream.next().await.expect("first frame").unwrap();
    assert_eq!(first, Frame::new("progress", "Sketching..."));

    token.cancel();

    let next = tokio::time::timeout(Duration::from_millis(100), stream.next())
        .await
        .expect("stream should end without waiting for the server");
    assert!(next.is_none());
}

#[tokio::test]
async fn interpreted_story_stream_yields_typed_messages() {
    let backend = TestBackend::default().with_script(vec![
        event("progress", "Thinking..."),
        event("heartbeat", "ignored"),
        event("data", "\"The sun warmed the puddle...\""),
    ]);
    let base_url = backend.serve().await;

    let frames = transport(base_url, EndpointLayout::Uniform)
        .open(story_request(), CancellationToken::new())
        .await
        .expect("stream should open");
    let messages: Vec<GenerationMessage> = interpret_stream(ContentKind::Story, frames)
        .map(|message| message.expect("message should decode"))
        .collect()
        .await;

    assert_eq!(
        messages,
        vec![
            GenerationMessage::Progress("Thinking...".to_string()),
            GenerationMessage::Data(Artifact::Story(StoryArtifact::new(
                "The sun warmed the puddle..."
            ))),
        ]
    );
}
