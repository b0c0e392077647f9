//! API client for the AdVision REST backend.
//!
//! `ApiClient::send` is the single request primitive every call group goes
//! through. It attaches the bearer token from the injected `SessionStore`,
//! returns successful bodies untouched, and on a 401 removes the stored token
//! and emits a `SessionInvalidated` event before reporting the error.
//!
//! Requests are plain futures. Several may be in flight at once with no
//! ordering between them. There is no cancellation support: dropping a
//! future abandons the request, nothing more.

use std::sync::Arc;

use reqwest::{header, multipart, Client, Method, Response};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use super::request::{RequestBody, RequestSpec};
use crate::auth::SessionStore;
use crate::config::{Config, DEFAULT_API_URL, DEFAULT_LOGIN_PATH};

/// Buffered invalidation events per subscriber before old ones are dropped.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Emitted once for every response that rejects the session (HTTP 401).
/// Hosts subscribe with `ApiClient::subscribe` and send the user to `redirect_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInvalidated {
    pub redirect_to: String,
    pub method: Method,
    pub path: String,
}

/// API client for AdVision.
/// Clone is cheap - the connection pool, session store and event channel are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    login_path: Arc<str>,
    session: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionInvalidated>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the base URL and login path resolved from `config`.
    pub fn new(config: &Config, session: Arc<dyn SessionStore>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self::with_client(client, &config.api_url(), session).login_path(config.login_path()))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str, session: Arc<dyn SessionStore>) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let base_url = if base_url.is_empty() { DEFAULT_API_URL } else { base_url };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            client,
            base_url: Arc::from(base_url),
            login_path: Arc::from(DEFAULT_LOGIN_PATH),
            session,
            events,
        }
    }

    /// Set the login path announced in `SessionInvalidated` events
    pub fn login_path(mut self, path: &str) -> Self {
        self.login_path = Arc::from(path);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Receive an event for every response that rejects the session.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionInvalidated> {
        self.events.subscribe()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.token().filter(|t| !t.is_empty()) {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("Session token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send a request and return the response body.
    ///
    /// An empty body comes back as `Value::Null`, a body that is not JSON as
    /// `Value::String`.
    pub async fn send(&self, spec: RequestSpec) -> Result<serde_json::Value> {
        let response = self.execute(spec).await?;
        let text = response.text().await?;

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    /// Send a request and decode the JSON body into `T`.
    pub async fn send_as<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let path = spec.path.clone();
        let response = self.execute(spec).await?;
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    async fn execute(&self, spec: RequestSpec) -> Result<Response> {
        let RequestSpec {
            method,
            path,
            query,
            body,
        } = spec;

        let headers = self.auth_headers()?;
        debug!(
            method = %method,
            path = %path,
            authenticated = headers.contains_key(header::AUTHORIZATION),
            "Sending request"
        );

        let mut request = self
            .client
            .request(method.clone(), self.url(&path))
            .headers(headers);
        if !query.is_empty() {
            request = request.query(&query);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::File(upload) => {
                let mut part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
                if let Some(mime) = upload.mime {
                    part = part.mime_str(&mime)?;
                }
                request.multipart(multipart::Form::new().part("file", part))
            }
        };

        let response = request.send().await?;
        debug!(method = %method, path = %path, status = %response.status(), "Received response");
        self.check_response(response, method, path).await
    }

    /// Check if response is successful, returning an error with body if not.
    /// A 401 clears the session and notifies subscribers first.
    async fn check_response(&self, response: Response, method: Method, path: String) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, body);
        if error.is_unauthorized() {
            self.invalidate_session(method, path);
        }
        Err(error)
    }

    fn invalidate_session(&self, method: Method, path: String) {
        warn!(method = %method, path = %path, "Server rejected session, clearing token");

        if let Err(e) = self.session.remove_token() {
            warn!(error = %e, "Failed to remove session token");
        }

        let event = SessionInvalidated {
            redirect_to: self.login_path.to_string(),
            method,
            path,
        };
        // No subscribers is fine; the token is already gone
        if self.events.send(event).is_err() {
            debug!("No session listeners registered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::with_client(Client::new(), base_url, Arc::new(MemorySessionStore::new()))
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let api = client("http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url("/campaigns/"), "http://localhost:8000/campaigns/");
        assert_eq!(api.url("auth/me"), "http://localhost:8000/auth/me");
    }

    #[test]
    fn test_empty_base_url_falls_back_to_default() {
        assert_eq!(client("").base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_auth_headers_follow_store() {
        let store = Arc::new(MemorySessionStore::new());
        let api = ApiClient::with_client(Client::new(), "http://localhost:8000", store.clone());
        assert!(api.auth_headers().unwrap().is_empty());

        store.set_token("abc").unwrap();
        let headers = api.auth_headers().unwrap();
        assert_eq!(headers.get_all(header::AUTHORIZATION).iter().count(), 1);
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc");

        store.set_token("").unwrap();
        assert!(api.auth_headers().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_token_characters_are_rejected() {
        let store = Arc::new(MemorySessionStore::with_token("bad\ntoken"));
        let api = ApiClient::with_client(Client::new(), "http://localhost:8000", store);
        assert!(matches!(api.auth_headers(), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_invalidate_session_clears_token_and_notifies() {
        let store = Arc::new(MemorySessionStore::with_token("abc"));
        let api = ApiClient::with_client(Client::new(), "http://localhost:8000", store.clone())
            .login_path("/signin");
        let mut events = api.subscribe();

        api.invalidate_session(Method::GET, "/auth/me".into());

        assert!(!store.is_authenticated());
        let event = events.try_recv().unwrap();
        assert_eq!(event.redirect_to, "/signin");
        assert_eq!(event.path, "/auth/me");
        assert!(events.try_recv().is_err());
    }
}
