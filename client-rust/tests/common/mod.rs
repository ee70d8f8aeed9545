#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

#[derive(Clone, Debug)]
pub enum ScriptStep {
    Event(&'static str, String),
    Sleep(Duration),
}

pub fn event(name: &'static str, data: impl Into<String>) -> ScriptStep {
    ScriptStep::Event(name, data.into())
}

/// In-process lesson backend: scripted generation streams plus an in-memory
/// class-materials store.
#[derive(Clone, Default)]
pub struct TestBackend {
    pub materials: Arc<Mutex<HashMap<(String, String, String), Value>>>,
    pub material_reads: Arc<AtomicUsize>,
    pub fail_saves: Arc<AtomicBool>,
    pub fail_reads: Arc<AtomicBool>,
    pub read_delay: Arc<Mutex<Option<Duration>>>,
    pub script: Arc<Mutex<Vec<ScriptStep>>>,
    pub generation_status: Arc<Mutex<Option<StatusCode>>>,
    pub generation_requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl TestBackend {
    pub fn with_script(self, steps: Vec<ScriptStep>) -> Self {
        *self.script.lock().unwrap() = steps;
        self
    }

    pub fn with_read_delay(self, delay: Duration) -> Self {
        *self.read_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn reads(&self) -> usize {
        self.material_reads.load(Ordering::SeqCst)
    }

    pub async fn serve(&self) -> String {
        let router = Router::new()
            .route("/api/topics/{topic_id}/days/{day_id}/{kind}", post(generate))
            .route(
                "/api/day/{day_id}/topic/{topic_id}/class-materials/story",
                post(generate),
            )
            .route(
                "/api/topics/{topic_id}/days/{day_id}/class-materials/{kind}",
                post(save_material).get(read_material),
            )
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn generate(
    State(backend): State<TestBackend>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    backend
        .generation_requests
        .lock()
        .unwrap()
        .push((uri.path().to_string(), body));

    if let Some(status) = *backend.generation_status.lock().unwrap() {
        return (status, "generation unavailable").into_response();
    }

    let steps = backend.script.lock().unwrap().clone();
    let stream = async_stream::stream! {
        for step in steps {
            match step {
                ScriptStep::Sleep(duration) => tokio::time::sleep(duration).await,
                ScriptStep::Event(name, data) => {
                    yield Ok::<_, Infallible>(Event::default().event(name).data(data));
                }
            }
        }
    };

    Sse::new(stream).into_response()
}

async fn save_material(
    State(backend): State<TestBackend>,
    Path((topic_id, day_id, kind)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> StatusCode {
    if backend.fail_saves.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    backend
        .materials
        .lock()
        .unwrap()
        .insert((topic_id, day_id, kind), body);
    StatusCode::CREATED
}

async fn read_material(
    State(backend): State<TestBackend>,
    Path((topic_id, day_id, kind)): Path<(String, String, String)>,
) -> Result<Json<Value>, StatusCode> {
    backend.material_reads.fetch_add(1, Ordering::SeqCst);
    let delay = *backend.read_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if backend.fail_reads.load(Ordering::SeqCst) {
        return Err(StatusCode::BAD_GATEWAY);
    }
    backend
        .materials
        .lock()
        .unwrap()
        .get(&(topic_id, day_id, kind))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
