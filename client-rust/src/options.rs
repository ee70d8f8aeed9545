use crate::{endpoints::EndpointLayout, Endpoints};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::collections::HashMap;

/// Connection settings shared by the transport, the persistence gateway and
/// the read cache.
/// # Default Values
/// - `base_url`: `http://localhost:8000`
/// - `headers`: none
/// - `client`: a fresh `reqwest::Client`
/// - `layout`: `EndpointLayout::Uniform`
#[derive(Clone, Default)]
pub struct BackendOptions {
    pub base_url: Option<String>,
    /// Extra headers sent with every request, e.g. an authorization token.
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
    pub layout: EndpointLayout,
}

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Resolved form of [`BackendOptions`].
#[derive(Clone)]
pub(crate) struct Backend {
    pub client: Client,
    pub endpoints: Endpoints,
    pub headers: HashMap<String, String>,
}

impl Backend {
    pub fn new(options: BackendOptions) -> Self {
        let BackendOptions {
            base_url,
            headers,
            client,
            layout,
        } = options;

        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            client: client.unwrap_or_else(Client::new),
            endpoints: Endpoints::new(base_url, layout),
            headers: headers.unwrap_or_default(),
        }
    }

    /// Build the configured headers, rejecting names or values that are not
    /// valid HTTP.
    pub fn request_headers(&self) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|error| format!("Invalid header name '{key}': {error}"))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|error| format!("Invalid header value for '{key}': {error}"))?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_header_names() {
        let backend = Backend::new(BackendOptions {
            headers: Some(HashMap::from([("bad header".to_string(), "x".to_string())])),
            ..BackendOptions::default()
        });
        let err = backend.request_headers().unwrap_err();
        assert!(err.contains("bad header"));
    }

    #[test]
    fn builds_configured_headers() {
        let backend = Backend::new(BackendOptions {
            headers: Some(HashMap::from([(
                "authorization".to_string(),
                "Bearer abc".to_string(),
            )])),
            ..BackendOptions::default()
        });
        let headers = backend.request_headers().unwrap();
        assert_eq!(headers["authorization"], "Bearer abc");
    }
}
