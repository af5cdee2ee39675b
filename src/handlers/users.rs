use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AdminUser;
use crate::error::AppError;
use crate::models::ApprovalFilter;
use crate::models::profiles::{ApproveUserCommand, ProfileResponse, RejectUserCommand};
use crate::workflow::Workflow;

/// GET /api/users?approved=true|false: admin listing, newest first.
pub async fn get_users(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    query: web::Query<ApprovalFilter>,
) -> Result<HttpResponse, AppError> {
    let users = workflow.list_users(&admin.0, query.approved).await?;
    let response: Vec<ProfileResponse> = users.into_iter().map(ProfileResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/users/{id}
pub async fn get_user(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = workflow.get_user(&admin.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// POST /api/users/{id}/approve
pub async fn approve_user(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let command = ApproveUserCommand {
        user_id: path.into_inner(),
    };
    let user = workflow.approve_user(&admin.0, command).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// POST /api/users/{id}/reject
pub async fn reject_user(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let command = RejectUserCommand {
        user_id: path.into_inner(),
    };
    let user = workflow.reject_user(&admin.0, command).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}
