use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::auth::middleware::{AuthenticatedUser, BearerToken};
use crate::error::AppError;
use crate::models::profiles::{Credentials, ProfileResponse, RegisterWorker, UpdateProfile};
use crate::workflow::Workflow;

/// POST /api/auth/register: sign up as a worker. The account stays pending
/// until an admin approves it.
pub async fn register(
    workflow: web::Data<Arc<Workflow>>,
    body: web::Json<RegisterWorker>,
) -> Result<HttpResponse, AppError> {
    let profile = workflow.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// POST /api/auth/login
pub async fn login(
    workflow: web::Data<Arc<Workflow>>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, AppError> {
    let signed_in = workflow.authenticate(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(signed_in))
}

/// POST /api/auth/logout: revoke the caller's session at the identity provider.
pub async fn logout(
    _user: AuthenticatedUser,
    token: BearerToken,
    workflow: web::Data<Arc<Workflow>>,
) -> Result<HttpResponse, AppError> {
    workflow.end_session(&token.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/auth/me: the authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ProfileResponse::from(user.0))
}

/// PUT /api/auth/profile: edit the caller's own contact details.
pub async fn update_profile(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
    body: web::Json<UpdateProfile>,
) -> Result<HttpResponse, AppError> {
    let updated = workflow.update_profile(&user.0, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(updated)))
}
