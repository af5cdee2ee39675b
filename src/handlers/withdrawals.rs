use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::{AdminUser, AuthenticatedUser};
use crate::error::AppError;
use crate::models::withdrawals::{RequestWithdrawal, SettleWithdrawalCommand};
use crate::workflow::Workflow;

/// GET /api/withdrawals
pub async fn get_withdrawals(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
) -> Result<HttpResponse, AppError> {
    let withdrawals = workflow.list_withdrawals(&user.0).await?;
    Ok(HttpResponse::Ok().json(withdrawals))
}

/// POST /api/withdrawals: request a payout of part of the available balance.
pub async fn create_withdrawal(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
    body: web::Json<RequestWithdrawal>,
) -> Result<HttpResponse, AppError> {
    let withdrawal = workflow
        .request_withdrawal(&user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(withdrawal))
}

/// GET /api/withdrawals/balance
pub async fn get_balance(
    user: AuthenticatedUser,
    workflow: web::Data<Arc<Workflow>>,
) -> Result<HttpResponse, AppError> {
    let balance = workflow.balance(&user.0).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/// PUT /api/withdrawals/{id}/settle: `{"decision": "approve" | "reject"}`.
pub async fn settle_withdrawal(
    admin: AdminUser,
    workflow: web::Data<Arc<Workflow>>,
    path: web::Path<Uuid>,
    body: web::Json<SettleWithdrawalCommand>,
) -> Result<HttpResponse, AppError> {
    let withdrawal = workflow
        .settle_withdrawal(&admin.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(withdrawal))
}
