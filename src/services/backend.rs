//! Upstream backend client
//!
//! Forwards requests to the CMS backend and hands back the status and the
//! decoded JSON body. No retries: one inbound request, one outbound fetch.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Backend client errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned malformed JSON (status {status}): {source}")]
    InvalidJson {
        status: StatusCode,
        source: serde_json::Error,
    },

    #[error("Backend responded {status}: {message}")]
    Status { status: StatusCode, message: String },
}

/// Request to relay to the backend
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path below the backend base URL, starting with `/`
    pub path: String,
    /// Raw query string, forwarded verbatim
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ForwardRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            authorization: None,
            content_type: None,
            body: Bytes::new(),
        }
    }

    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(str::to_string);
        self
    }

    /// Copy the headers the backend cares about from an inbound request
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        self.authorization = header_string(headers, header::AUTHORIZATION);
        self.content_type = header_string(headers, header::CONTENT_TYPE);
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Status and decoded body of a backend response
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: StatusCode,
    /// `None` when the backend sent no body
    pub body: Option<Value>,
}

/// HTTP client bound to one backend base URL
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute backend URL for a path and optional query string
    pub fn url_for(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Send `request` and decode the response body as JSON
    pub async fn forward(&self, request: ForwardRequest) -> Result<BackendResponse, BackendError> {
        let url = self.url_for(&request.path, request.query.as_deref());
        tracing::debug!(method = %request.method, %url, "Forwarding to backend");

        let mut builder = self.http.request(request.method.clone(), &url);
        if let Some(auth) = &request.authorization {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        if !request.body.is_empty() {
            let content_type = request.content_type.as_deref().unwrap_or("application/json");
            builder = builder
                .header(header::CONTENT_TYPE, content_type)
                .body(request.body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice(&bytes)
                    .map_err(|source| BackendError::InvalidJson { status, source })?,
            )
        };

        Ok(BackendResponse { status, body })
    }

    /// GET a path and return the body of a 2xx response
    pub async fn get_json(&self, path: &str, query: Option<&str>) -> Result<Value, BackendError> {
        let response = self
            .forward(ForwardRequest::new(Method::GET, path).with_query(query))
            .await?;

        if !response.status.is_success() {
            return Err(BackendError::Status {
                status: response.status,
                message: error_message(response.status, response.body.as_ref()),
            });
        }
        Ok(response.body.unwrap_or(Value::Null))
    }
}

/// Message to show for a failed backend response.
///
/// Uses the body's `error` or `message` string when present, else the
/// status reason phrase.
pub fn error_message(status: StatusCode, body: Option<&Value>) -> String {
    body.and_then(|b| {
        ["error", "message"]
            .iter()
            .find_map(|key| b.get(*key).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
    .unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    })
}

/// Pull the document list out of the response shapes the backend uses:
/// a bare array, `{data: [...]}`, `{data: {docs: [...]}}`, `{docs: [...]}`,
/// or a named collection such as `{articles: [...]}`.
pub fn extract_documents(body: &Value, collection: &str) -> Vec<Value> {
    fn find(value: &Value, collection: &str) -> Option<Vec<Value>> {
        match value {
            Value::Array(items) => Some(items.clone()),
            Value::Object(map) => ["data", "docs", collection]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(|inner| find(inner, collection)),
            _ => None,
        }
    }
    find(body, collection).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> BackendClient {
        BackendClient::new("http://backend.local/api/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_for_joins_path_and_query() {
        let client = client();
        assert_eq!(client.base_url(), "http://backend.local/api");
        assert_eq!(client.url_for("/articles", None), "http://backend.local/api/articles");
        assert_eq!(
            client.url_for("articles/x", Some("page=2&limit=5")),
            "http://backend.local/api/articles/x?page=2&limit=5"
        );
        assert_eq!(client.url_for("/articles", Some("")), "http://backend.local/api/articles");
    }

    #[test]
    fn test_forward_request_copies_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        headers.insert(header::COOKIE, "session=1".parse().unwrap());

        let request = ForwardRequest::new(Method::POST, "/comments")
            .with_headers(&headers)
            .with_query(Some(""));
        assert_eq!(request.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
        assert!(request.query.is_none());
    }

    #[test]
    fn test_error_message_prefers_body() {
        let body = json!({"success": false, "error": "Article not found"});
        assert_eq!(error_message(StatusCode::NOT_FOUND, Some(&body)), "Article not found");

        let body = json!({"message": "Invalid credentials"});
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, Some(&body)), "Invalid credentials");
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, None), "Bad Gateway");
        let body = json!({"error": {"code": 1}});
        assert_eq!(error_message(StatusCode::FORBIDDEN, Some(&body)), "Forbidden");
    }

    #[test]
    fn test_extract_documents_shapes() {
        let doc = json!({"slug": "a"});
        assert_eq!(extract_documents(&json!([doc.clone()]), "articles"), vec![doc.clone()]);
        assert_eq!(extract_documents(&json!({"success": true, "data": [doc.clone()]}), "articles"), vec![doc.clone()]);
        assert_eq!(extract_documents(&json!({"data": {"docs": [doc.clone()], "totalDocs": 1}}), "articles"), vec![doc.clone()]);
        assert_eq!(extract_documents(&json!({"data": {"articles": [doc.clone()]}}), "articles"), vec![doc.clone()]);
        assert!(extract_documents(&json!({"data": null}), "articles").is_empty());
        assert!(extract_documents(&json!("nope"), "articles").is_empty());
    }
}
