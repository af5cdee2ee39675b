use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use sea_orm::DatabaseConnection;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use crate::auth::jwt::TokenVerifier;
use crate::db::profiles::get_profile_by_id;
use crate::error::AppError;
use crate::models::profiles;

/// The caller's profile, resolved from a verified bearer token.
pub struct AuthenticatedUser(pub profiles::Model);

/// Like [`AuthenticatedUser`], but only admits admins.
pub struct AdminUser(pub profiles::Model);

/// The raw bearer token, for forwarding to the identity provider.
pub struct BearerToken(pub String);

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Unauthorized("Authorization header must be: Bearer <token>".to_string())
        })
}

/// Verify `token` and load the matching profile.
pub async fn resolve_profile(
    token: &str,
    verifier: &TokenVerifier,
    db: &DatabaseConnection,
) -> Result<profiles::Model, AppError> {
    let claims = verifier
        .verify(token)
        .await
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))?;

    let user_id = claims
        .user_id()
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    // Profiles are created at registration, so a valid token without one
    // belongs to an account that never finished signing up.
    get_profile_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("No profile exists for this account".to_string()))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let token = bearer_token(&req)?;

            let verifier = req
                .app_data::<web::Data<Arc<TokenVerifier>>>()
                .ok_or_else(|| {
                    actix_web::error::ErrorInternalServerError("Token verifier not configured")
                })?;

            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| {
                    actix_web::error::ErrorInternalServerError("Database not configured")
                })?;

            let profile = resolve_profile(&token, verifier.get_ref(), db.get_ref()).await?;
            Ok(AuthenticatedUser(profile))
        })
    }
}

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let user = AuthenticatedUser::from_request(req, payload);

        Box::pin(async move {
            let AuthenticatedUser(profile) = user.await?;
            if !profile.is_admin() {
                return Err(AppError::Forbidden("Admin access required".to_string()).into());
            }
            Ok(AdminUser(profile))
        })
    }
}

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(bearer_token(req).map(BearerToken).map_err(Error::from))
    }
}
