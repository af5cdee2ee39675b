use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::auth::middleware::{AdminUser, AuthenticatedUser};
use crate::error::AppError;
use crate::workflow::Workflow;

/// GET /api/dashboard/admin
pub async fn admin_stats(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(workflow.admin_stats(&admin.0).await?))
}

/// GET /api/dashboard/me
pub async fn my_summary(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(workflow.worker_summary(&user.0).await?))
}
