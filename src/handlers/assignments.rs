use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::{AdminUser, AuthenticatedUser};
use crate::error::AppError;
use crate::models::assignments::{PublishAssignment, SetAssignmentStatus, UpdateAssignmentCommand};
use crate::workflow::Workflow;

/// GET /api/assignments: everything for admins; for approved workers the
/// assignments on offer, each with `my_status`.
pub async fn get_assignments(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
) -> Result<HttpResponse, AppError> {
    let listing = workflow.list_assignments(&user.0).await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// POST /api/assignments
pub async fn create_assignment(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    body: web::Json<PublishAssignment>,
) -> Result<HttpResponse, AppError> {
    let assignment = workflow
        .publish_assignment(&admin.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(assignment))
}

/// GET /api/assignments/{id}
pub async fn get_assignment(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let assignment = workflow.get_assignment(&user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(assignment))
}

/// PUT /api/assignments/{id}: partial update; may carry a replacement file.
pub async fn update_assignment(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAssignmentCommand>,
) -> Result<HttpResponse, AppError> {
    let assignment = workflow
        .update_assignment(&admin.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(assignment))
}

/// PUT /api/assignments/{id}/status
pub async fn update_status(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
    body: web::Json<SetAssignmentStatus>,
) -> Result<HttpResponse, AppError> {
    let assignment = workflow
        .set_assignment_status(&admin.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(assignment))
}

/// DELETE /api/assignments/{id}
pub async fn delete_assignment(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    workflow
        .delete_assignment(&admin.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
