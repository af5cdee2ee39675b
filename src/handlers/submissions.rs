use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::{AdminUser, AuthenticatedUser};
use crate::error::AppError;
use crate::models::submissions::{ReviewSubmissionCommand, SubmitWork};
use crate::workflow::Workflow;

/// GET /api/submissions: all for admins, own for workers; newest first.
pub async fn get_submissions(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
) -> Result<HttpResponse, AppError> {
    let submissions = workflow.list_submissions(&user.0).await?;
    Ok(HttpResponse::Ok().json(submissions))
}

/// POST /api/submissions: an approved worker hands in a file.
pub async fn create_submission(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
    body: web::Json<SubmitWork>,
) -> Result<HttpResponse, AppError> {
    let submission = workflow.submit(&user.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(submission))
}

/// PUT /api/submissions/{id}/review: `{"decision": "approve" | "reject"}`.
pub async fn review_submission(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
    body: web::Json<ReviewSubmissionCommand>,
) -> Result<HttpResponse, AppError> {
    let submission = workflow
        .review(&admin.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(submission))
}
