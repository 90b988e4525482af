//! HTTP client for the task backend.
//!
//! Each operation is a thin wrapper around one REST call. Non-2xx answers are
//! turned into `AppError::Api` carrying the server-provided message; nothing is
//! retried and no client-side timeout is configured.

use crate::error::AppError;
use crate::models::{AuthSession, Task, TaskPatch};
use log::{debug, warn};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmailExistsResponse {
    exists: bool,
}

#[derive(Debug, Serialize)]
struct NewTaskRequest<'a> {
    title: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticates a user.
    ///
    /// `POST /api/auth` with `{email, password}`.
    ///
    /// ## Errors:
    /// - `AppError::Unauthorized`: the backend answered 401.
    /// - `AppError::Api`: any other non-2xx answer, e.g. 500 on a backend failure.
    /// - `AppError::Network`: the request or the body decoding failed.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        debug!("POST /api/auth for {}", email);
        let response = self
            .http
            .post(self.url("/api/auth"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized(error_message(response).await));
        }
        let response = ensure_success(response).await?;
        Ok(response.json::<AuthSession>().await?)
    }

    /// Creates an account, then logs in with the same credentials.
    ///
    /// `POST /api/user` with `{username, email, password}`, expecting `201 Created`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        debug!("POST /api/user for {}", email);
        let response = self
            .http
            .post(self.url("/api/user"))
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;
        ensure_success(response).await?;

        self.login(email, password).await
    }

    /// Whether an account already uses `email`.
    ///
    /// Fails open: a 5xx answer, a network failure or an unparsable body all
    /// report `false`.
    pub async fn email_exists(&self, email: &str) -> bool {
        match self.check_email(email).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Email existence check failed, treating as unused: {}", e);
                false
            }
        }
    }

    async fn check_email(&self, email: &str) -> Result<bool, AppError> {
        let response = self
            .http
            .post(self.url("/api/user/email"))
            .json(&EmailRequest { email })
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: EmailExistsResponse = response.json().await?;
        Ok(body.exists)
    }

    /// `GET /api/tasks`
    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, AppError> {
        debug!("GET /api/tasks");
        let response = self
            .http
            .get(self.url("/api/tasks"))
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// `POST /api/tasks` with `{title}`; returns the task as stored by the server.
    pub async fn create_task(&self, token: &str, title: &str) -> Result<Task, AppError> {
        debug!("POST /api/tasks");
        let response = self
            .http
            .post(self.url("/api/tasks"))
            .bearer_auth(token)
            .json(&NewTaskRequest { title })
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// `PATCH /api/tasks/:id` with the fields present in `patch`.
    pub async fn update_task(&self, token: &str, id: &str, patch: &TaskPatch) -> Result<(), AppError> {
        debug!("PATCH /api/tasks/{}", id);
        let response = self
            .http
            .patch(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// `DELETE /api/tasks/:id`
    pub async fn delete_task(&self, token: &str, id: &str) -> Result<(), AppError> {
        debug!("DELETE /api/tasks/{}", id);
        let response = self
            .http
            .delete(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(AppError::Api {
        status,
        message: error_message(response).await,
    })
}

/// Extracts the failure reason from an error body.
///
/// Prefers a JSON `message` field, then `error`, then the raw text, and falls
/// back to the status reason phrase.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    message_from_body(status, &text)
}

fn message_from_body(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = value.get(key).and_then(|m| m.as_str()) {
                return message.to_string();
            }
        }
    }
    let body = body.trim();
    if !body.is_empty() && !body.starts_with('{') {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
