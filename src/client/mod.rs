//! Admin client for the gateway
//!
//! Plays the part of the back-office front end: signs in through
//! `/api/admin/login`, keeps the token in an [`AuthStore`], and attaches it as
//! a bearer credential on later calls. A 401 answer means the session ended
//! server-side, so the stored auth data is cleared.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::{AdminUser, NewsArticle, PaginateOptions, PaginationResult};
use crate::services::{error_message, paginate, MemoryQuery};
use crate::session::{AuthStore, StorageError};

/// Admin client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    #[error("Auth storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Not signed in")]
    NotAuthenticated,
}

/// Payload of a successful login
#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
    #[serde(alias = "user")]
    admin: AdminUser,
}

/// `data` of a list response: already paginated by the backend, or a bare list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListData {
    Paged(PaginationResult<Value>),
    List(Vec<Value>),
}

/// Gateway client carrying the admin session
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthStore,
}

impl AdminClient {
    pub fn new(base_url: &str, auth: AuthStore) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sign in and store the token and admin snapshot
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, ClientError> {
        let data = self
            .send(
                Method::POST,
                "/api/admin/login",
                Some(&json!({ "email": email, "password": password })),
            )
            .await?;

        let login: LoginData = serde_json::from_value(data)
            .map_err(|e| ClientError::InvalidResponse(format!("login payload: {}", e)))?;
        self.auth.set_auth_data(&login.token, &login.admin)?;
        tracing::info!(admin = %login.admin.email, "Signed in");
        Ok(login.admin)
    }

    /// Forget the local session
    pub fn logout(&self) -> Result<(), ClientError> {
        self.auth.clear_auth_data()?;
        Ok(())
    }

    /// Locally cached admin snapshot
    pub fn current_admin(&self) -> Result<Option<AdminUser>, ClientError> {
        Ok(self.auth.get_admin_data()?)
    }

    /// Fetch the signed-in admin from the backend and refresh the snapshot
    pub async fn refresh_profile(&self) -> Result<AdminUser, ClientError> {
        if !self.auth.is_authenticated()? {
            return Err(ClientError::NotAuthenticated);
        }
        let data = self.send(Method::GET, "/api/admin/me", None).await?;
        let data = data.get("admin").or_else(|| data.get("user")).cloned().unwrap_or(data);
        let admin: AdminUser = serde_json::from_value(data)
            .map_err(|e| ClientError::InvalidResponse(format!("profile payload: {}", e)))?;
        self.auth.update_admin_data(&admin)?;
        Ok(admin)
    }

    /// One page of articles from the back office listing
    pub async fn list_articles(&self, page: u64, limit: u64) -> Result<PaginationResult<NewsArticle>, ClientError> {
        let options = PaginateOptions::new(page, limit);
        let path = format!("/api/admin/articles?page={}&limit={}", options.page, options.limit);
        let data = self.send(Method::GET, &path, None).await?;

        let list: ListData = serde_json::from_value(data)
            .map_err(|e| ClientError::InvalidResponse(format!("article list: {}", e)))?;
        let page = match list {
            ListData::Paged(page) => page,
            ListData::List(docs) => list_page(docs, &options).await?,
        };

        page.try_map(serde_json::from_value::<NewsArticle>)
            .map_err(|e| ClientError::InvalidResponse(format!("article document: {}", e)))
    }

    /// Send a request through the gateway and return the envelope's `data`
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ClientError> {
        let mut request = self.http.request(method, self.url(path));
        let bearer = self.auth.bearer()?;
        if let Some(bearer) = &bearer {
            request = request.header(reqwest::header::AUTHORIZATION, bearer);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let envelope: Option<Value> = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };

        if status == StatusCode::UNAUTHORIZED && bearer.is_some() {
            tracing::warn!("Session rejected by the server, clearing stored credentials");
            self.auth.clear_auth_data()?;
        }

        if !status.is_success() {
            return Err(ClientError::Api {
                status,
                message: error_message(status, envelope.as_ref()),
            });
        }

        let envelope = envelope.ok_or_else(|| ClientError::InvalidResponse("expected a JSON body".to_string()))?;
        if envelope.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(ClientError::Api {
                status,
                message: error_message(status, Some(&envelope)),
            });
        }

        Ok(envelope.get("data").cloned().unwrap_or(Value::Null))
    }
}

/// Page for a bare list answer.
///
/// A list no longer than `limit` is the window the backend already applied. A
/// longer one means the backend ignored `page`/`limit`, so it is cut here.
async fn list_page(docs: Vec<Value>, options: &PaginateOptions) -> Result<PaginationResult<Value>, ClientError> {
    if docs.len() as u64 <= options.limit {
        return Ok(PaginationResult::from_window(docs, options.page, options.limit));
    }
    paginate(&MemoryQuery::new(docs), options)
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
