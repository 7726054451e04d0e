use std::fmt;
use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::comment::{Comment, CommentCreate};
use crate::models::ticket::{Ticket, TicketCreate, TicketListItem, TicketStatus, TicketUpdate};
use crate::models::user::{LoginRequest, RegisterRequest, TokenResponse, User};
use crate::store::credentials::{CredentialStore, PersistedSession};
use crate::store::session::SessionHandle;

/// Error shape shared by every endpoint method: either the request never
/// completed, or the backend answered with a non-2xx status and (usually)
/// a `detail` message.
#[derive(Debug)]
pub enum ApiError {
    /// Transport failure: connect, timeout, or reading/decoding the body.
    Network(String),
    /// Non-2xx response, with the backend's detail message when present.
    Status { status: u16, detail: String },
    /// Local credential persistence failed during login or logout.
    Storage(String),
}

impl ApiError {
    #[allow(dead_code)]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Status { status, detail } => {
                write!(f, "API error ({}): {}", status, detail)
            }
            ApiError::Storage(msg) => write!(f, "Session storage error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Backend error envelope: `{"detail": ...}`. FastAPI sends a string for
/// application errors and a list of objects for validation errors.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Thin wrapper over the Help Desk REST API. Attaches the bearer token from
/// the shared session to every request, and drops the session (memory and
/// disk) whenever the backend answers 401.
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionHandle,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: SessionHandle,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Status gate every response passes through. A 401 means the token is
    /// missing, expired or revoked, so the session is cleared right here;
    /// the error still propagates to the caller.
    async fn check(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "response");

        if status == StatusCode::UNAUTHORIZED {
            if let Err(err) = self.clear_session() {
                warn!("failed to clear stored session: {}", err);
            }
        }

        if status.is_success() {
            return Ok(response);
        }

        let detail = Self::error_detail(status, response).await;
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    async fn error_detail(status: StatusCode, response: Response) -> String {
        let body = response.text().await.unwrap_or_default();
        if body.is_empty() {
            return status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
        }
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => match parsed.detail {
                serde_json::Value::String(detail) => detail,
                other => other.to_string(),
            },
            Err(_) => body,
        }
    }

    /// Drops the in-memory session and the persisted credentials. Used by
    /// logout and by the 401 intercept.
    pub fn clear_session(&self) -> Result<(), ApiError> {
        self.session.clear();
        self.credentials
            .clear()
            .map_err(|err| ApiError::Storage(err.to_string()))
    }

    /// Exchanges credentials for a token, then stores the session for this
    /// process and persists it for the next one.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(Method::POST, "/api/auth/login")
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = self.check(response).await?.json().await?;

        self.credentials
            .save(&PersistedSession {
                access_token: token.access_token.clone(),
                user: token.user.clone(),
            })
            .map_err(|err| ApiError::Storage(err.to_string()))?;
        self.session
            .set(token.access_token.clone(), token.user.clone());
        debug!("authenticated as {}", token.user.username);

        Ok(token)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let response = self
            .request(Method::POST, "/api/auth/register")
            .json(request)
            .send()
            .await?;
        let user = self.check(response).await?.json().await?;
        Ok(user)
    }

    pub async fn create_ticket(&self, request: &TicketCreate) -> Result<Ticket, ApiError> {
        let response = self
            .request(Method::POST, "/api/tickets/")
            .json(request)
            .send()
            .await?;
        let ticket = self.check(response).await?.json().await?;
        Ok(ticket)
    }

    pub async fn get_tickets(
        &self,
        skip: u32,
        limit: u32,
        status: Option<TicketStatus>,
    ) -> Result<Vec<TicketListItem>, ApiError> {
        let mut request = self
            .request(Method::GET, "/api/tickets/")
            .query(&[("skip", skip.to_string()), ("limit", limit.to_string())]);
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }

        let response = request.send().await?;
        let tickets = self.check(response).await?.json().await?;
        Ok(tickets)
    }

    pub async fn get_ticket(&self, ticket_id: u64) -> Result<Ticket, ApiError> {
        let response = self
            .request(Method::GET, &format!("/api/tickets/{}", ticket_id))
            .send()
            .await?;
        let ticket = self.check(response).await?.json().await?;
        Ok(ticket)
    }

    pub async fn update_ticket(
        &self,
        ticket_id: u64,
        request: &TicketUpdate,
    ) -> Result<Ticket, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/api/tickets/{}", ticket_id))
            .json(request)
            .send()
            .await?;
        let ticket = self.check(response).await?.json().await?;
        Ok(ticket)
    }

    pub async fn delete_ticket(&self, ticket_id: u64) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/api/tickets/{}", ticket_id))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    pub async fn add_comment(&self, ticket_id: u64, content: &str) -> Result<Comment, ApiError> {
        let body = CommentCreate {
            content: content.to_string(),
        };
        let response = self
            .request(Method::POST, &format!("/api/tickets/{}/comments", ticket_id))
            .json(&body)
            .send()
            .await?;
        let comment = self.check(response).await?.json().await?;
        Ok(comment)
    }

    pub async fn get_comments(&self, ticket_id: u64) -> Result<Vec<Comment>, ApiError> {
        let response = self
            .request(Method::GET, &format!("/api/tickets/{}/comments", ticket_id))
            .send()
            .await?;
        let comments = self.check(response).await?.json().await?;
        Ok(comments)
    }

    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let response = self.request(Method::GET, "/health").send().await?;
        let health = self.check(response).await?.json().await?;
        Ok(health)
    }
}
