use crate::{GenerationError, PersistenceError};
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;

/// Post a JSON body to an endpoint that answers with an event stream.
/// Throws error on non OK status code.
/// The returned stream ends as soon as `token` is cancelled; the response
/// body is dropped with it, closing the connection.
pub async fn send_sse<T: Serialize>(
    client: &Client,
    url: &str,
    data: &T,
    mut headers: HeaderMap,
    token: CancellationToken,
) -> Result<impl Stream<Item = Result<Event, GenerationError>> + Send, GenerationError> {
    headers.insert(header::ACCEPT, HeaderValue::from_static("text/event-stream"));

    let request = client.post(url).headers(headers).json(data).send();
    let response = token
        .run_until_cancelled(request)
        .await
        .ok_or(GenerationError::Cancelled)??;

    let status = response.status();
    if !status.is_success() {
        return Err(GenerationError::StatusCode(
            status,
            response.text().await.unwrap_or_default(),
        ));
    }

    let events = response
        .bytes_stream()
        .eventsource()
        .take_until(token.cancelled_owned())
        .map(|event| event.map_err(map_event_stream_error));

    Ok(events)
}

fn map_event_stream_error(error: EventStreamError<reqwest::Error>) -> GenerationError {
    match error {
        EventStreamError::Utf8(_) => GenerationError::EventStream(
            "Receive invalid UTF-8 sequence for stream data".to_string(),
        ),
        EventStreamError::Parser(error) => {
            GenerationError::EventStream(format!("Receive invalid EventStream data: {error}"))
        }
        EventStreamError::Transport(e) => GenerationError::Transport(e),
    }
}

/// Post a JSON body and require `201 Created`.
pub async fn post_json_created<T: Serialize>(
    client: &Client,
    url: &str,
    data: &T,
    headers: HeaderMap,
) -> Result<(), PersistenceError> {
    let response = client.post(url).headers(headers).json(data).send().await?;
    let status = response.status();
    if status == StatusCode::CREATED {
        Ok(())
    } else {
        Err(PersistenceError::StatusCode(
            status,
            response.text().await.unwrap_or_default(),
        ))
    }
}

/// Get a JSON resource. `404 Not Found` resolves to `None`; any other
/// non OK status code is an error.
pub async fn get_json_optional<R: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: HeaderMap,
) -> Result<Option<R>, PersistenceError> {
    let response = client.get(url).headers(headers).send().await?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(PersistenceError::StatusCode(
            status,
            response.text().await.unwrap_or_default(),
        ));
    }
    Ok(Some(response.json::<R>().await?))
}
