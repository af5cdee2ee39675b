use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::SupabaseConfig;
use crate::error::AppError;

/// A signed-in session as handed back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub user_id: Uuid,
}

/// Account management at the identity provider. Profiles live in our own
/// store; the provider only knows emails and passwords.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return its user id. A taken email is reported
    /// as [`AppError::DuplicateEmail`].
    async fn create_account(&self, email: &str, password: &str) -> Result<Uuid, AppError>;

    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, AppError>;

    async fn end_session(&self, access_token: &str) -> Result<(), AppError>;

    /// Remove an account created by [`create_account`](Self::create_account)
    /// whose profile could not be stored.
    async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError>;
}

/// Supabase Auth (GoTrue) over its REST API.
#[derive(Clone)]
pub struct SupabaseIdentity {
    client: reqwest::Client,
    auth_url: String,
    anon_key: String,
    service_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    // Depending on email-confirmation settings GoTrue returns either the user
    // itself or a session wrapping it.
    id: Option<Uuid>,
    user: Option<GoTrueUser>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    user: GoTrueUser,
}

#[derive(Debug, Default, Deserialize)]
struct GoTrueError {
    msg: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
}

impl GoTrueError {
    fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }

    fn is_duplicate(&self) -> bool {
        self.error_code.as_deref() == Some("user_already_exists")
            || self.message().to_lowercase().contains("already registered")
    }
}

impl SupabaseIdentity {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_url: format!("{}/auth/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            service_key: config.service_key.clone(),
        }
    }

    async fn error_from(response: reqwest::Response) -> (StatusCode, GoTrueError) {
        let status = response.status();
        let body = response.json::<GoTrueError>().await.unwrap_or_default();
        (status, body)
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<Uuid, AppError> {
        debug!("Creating identity account for {email}");

        let response = self
            .client
            .post(format!("{}/signup", self.auth_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Sign-up request failed: {e}")))?;

        if !response.status().is_success() {
            let (status, err) = Self::error_from(response).await;
            if err.is_duplicate() {
                return Err(AppError::DuplicateEmail(email.to_string()));
            }
            if status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::BAD_REQUEST {
                return Err(AppError::Validation(err.message()));
            }
            return Err(AppError::Identity(format!(
                "Sign-up failed: HTTP {status} {}",
                err.message()
            )));
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Unexpected sign-up response: {e}")))?;

        body.user
            .map(|u| u.id)
            .or(body.id)
            .ok_or_else(|| AppError::Identity("Sign-up response carried no user id".to_string()))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let response = self
            .client
            .post(format!("{}/token?grant_type=password", self.auth_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Sign-in request failed: {e}")))?;

        if !response.status().is_success() {
            let (status, err) = Self::error_from(response).await;
            return Err(if status.is_client_error() {
                AppError::Unauthorized("Invalid email or password".to_string())
            } else {
                AppError::Identity(format!("Sign-in failed: HTTP {status} {}", err.message()))
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Unexpected sign-in response: {e}")))?;

        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            user_id: token.user.id,
        })
    }

    async fn end_session(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Sign-out request failed: {e}")))?;

        let status = response.status();
        // An already-expired session is as good as ended.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AppError::Identity(format!("Sign-out failed: HTTP {status}")))
        }
    }

    async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        // The admin API only accepts the service-role key.
        let service_key = self.service_key.as_deref().ok_or_else(|| {
            AppError::Identity("SUPABASE_SERVICE_KEY is required to delete accounts".to_string())
        })?;

        let response = self
            .client
            .delete(format!("{}/admin/users/{user_id}", self.auth_url))
            .header("apikey", service_key)
            .bearer_auth(service_key)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Account removal request failed: {e}")))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            let (_, err) = Self::error_from(response).await;
            Err(AppError::Identity(format!(
                "Account removal failed: HTTP {status} {}",
                err.message()
            )))
        }
    }
}
