//! `reqwest` implementation of the gateway traits.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{ACCEPT, COOKIE, SET_COOKIE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{validate_credentials, validate_registration, NoteGateway, NotePayload, SessionGateway};
use crate::config::ClientConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{Note, NoteId, Session};
use crate::util::compact_text;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE_NAME: &str = "jwt";

/// HTTP client for the notes API.
///
/// The session cookie is managed here rather than by a cookie jar so that it
/// can be exported and restored by front-ends, and so it is also sent over
/// plain `http://` to a local backend. Clones share the same cookie.
#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    client: Client,
    session_cookie: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field(
                "session_cookie",
                &self.session_cookie().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> GatewayResult<Self> {
        let base_url = config
            .base_url()
            .map_err(|error| GatewayError::Configuration(error.to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|error| GatewayError::Configuration(error.to_string()))?;

        Ok(Self {
            base_url,
            client,
            session_cookie: Arc::new(RwLock::new(None)),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current session token, if signed in.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.session_cookie
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }

    /// Restore (or drop) a previously exported session token.
    pub fn set_session_cookie(&self, value: Option<String>) {
        if let Ok(mut guard) = self.session_cookie.write() {
            *guard = value.filter(|token| !token.trim().is_empty());
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, self.url(path))
            .header(ACCEPT, "application/json");
        match self.session_cookie() {
            Some(token) => request.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}")),
            None => request,
        }
    }

    /// Send a request and turn any non-2xx status into a `GatewayError`.
    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> GatewayResult<Response> {
        tracing::debug!(%method, path, "Sending API request");
        let response = request.send().await.map_err(|error| {
            tracing::warn!(%method, path, "API request failed: {}", error);
            GatewayError::Network(error.to_string())
        })?;

        self.capture_session_cookie(&response);

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.set_session_cookie(None);
        }
        let body = response.text().await.unwrap_or_default();
        let message = parse_api_error(status, &body);
        tracing::warn!(%method, path, status = status.as_u16(), "API error: {}", message);
        Err(GatewayError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> GatewayResult<T> {
        let response = self.send(method, path, request).await?;
        let body = read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn capture_session_cookie(&self, response: &Response) {
        for header in response.headers().get_all(SET_COOKIE) {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            if let Some(update) = parse_set_cookie(raw, SESSION_COOKIE_NAME) {
                self.set_session_cookie(update);
            }
        }
    }
}

impl NoteGateway for HttpGateway {
    async fn list_notes(&self) -> GatewayResult<Vec<Note>> {
        let path = "/notes";
        self.send_json(Method::GET, path, self.request(Method::GET, path))
            .await
    }

    async fn create_note(&self, payload: &NotePayload) -> GatewayResult<Note> {
        let path = "/notes";
        self.send_json(
            Method::POST,
            path,
            self.request(Method::POST, path).json(payload),
        )
        .await
    }

    async fn update_note(&self, id: NoteId, payload: &NotePayload) -> GatewayResult<Note> {
        let path = format!("/notes/{id}");
        self.send_json(
            Method::PUT,
            &path,
            self.request(Method::PUT, &path).json(payload),
        )
        .await
    }

    async fn delete_note(&self, id: NoteId) -> GatewayResult<()> {
        let path = format!("/notes/{id}");
        self.send(Method::DELETE, &path, self.request(Method::DELETE, &path))
            .await?;
        Ok(())
    }
}

impl SessionGateway for HttpGateway {
    async fn who_am_i(&self) -> GatewayResult<Option<Session>> {
        let path = "/auth/me";
        match self
            .send_json(Method::GET, path, self.request(Method::GET, path))
            .await
        {
            Ok(session) => Ok(Some(session)),
            Err(GatewayError::Auth(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn login(&self, email: &str, password: &str) -> GatewayResult<Session> {
        validate_credentials(email, password)?;

        let path = "/auth/login";
        let payload = LoginRequest {
            email: email.trim(),
            password,
        };
        let request = self.request(Method::POST, path).json(&payload);
        let response = self.send(Method::POST, path, request).await?;
        let body = read_body(response).await?;

        // The backend may answer with the identity or with a plain acknowledgement.
        if let Ok(session) = serde_json::from_str::<Session>(&body) {
            tracing::info!(user_id = session.id, "Signed in");
            return Ok(session);
        }
        let session = self.who_am_i().await?.ok_or_else(|| {
            GatewayError::Auth(format!(
                "Login did not establish a session: {}",
                compact_text(&body)
            ))
        })?;
        tracing::info!(user_id = session.id, "Signed in");
        Ok(session)
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> GatewayResult<()> {
        validate_registration(name, email, password)?;

        let path = "/auth/register";
        let payload = RegisterRequest {
            name: name.trim(),
            email: email.trim(),
            password,
        };
        self.send(
            Method::POST,
            path,
            self.request(Method::POST, path).json(&payload),
        )
        .await?;
        tracing::info!("Registered new account");
        Ok(())
    }

    async fn logout(&self) -> GatewayResult<()> {
        let path = "/auth/logout";
        let result = self
            .send(Method::POST, path, self.request(Method::POST, path))
            .await;
        self.set_session_cookie(None);
        result.map(|_| ())
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

async fn read_body(response: Response) -> GatewayResult<String> {
    response
        .text()
        .await
        .map_err(|error| GatewayError::Network(error.to_string()))
}

/// Extract the user-facing message from an error body.
fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return message;
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}

/// Parse one `Set-Cookie` header.
///
/// Returns `None` when the header is for another cookie, `Some(None)` when it
/// clears `name`, and `Some(Some(value))` when it sets it.
fn parse_set_cookie(header: &str, name: &str) -> Option<Option<String>> {
    let pair = header.split(';').next()?;
    let (cookie_name, value) = pair.split_once('=')?;
    if cookie_name.trim() != name {
        return None;
    }
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        Some(None)
    } else {
        Some(Some(value.to_string()))
    }
}
