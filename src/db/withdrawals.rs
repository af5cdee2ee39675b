use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::withdrawals::{self, RequestWithdrawal, Status};

/// Insert a new withdrawal request in `pending`.
pub async fn insert_withdrawal<C: ConnectionTrait>(
    db: &C,
    worker_id: Uuid,
    input: RequestWithdrawal,
) -> Result<withdrawals::Model, DbErr> {
    let new_withdrawal = withdrawals::ActiveModel {
        id: Set(Uuid::new_v4()),
        worker_id: Set(worker_id),
        amount: Set(input.amount),
        payment_method: Set(input.payment_method),
        payment_details: Set(input.payment_details),
        status: Set(Status::Pending),
        requested_at: Set(chrono::Utc::now()),
        processed_at: Set(None),
    };

    new_withdrawal.insert(db).await
}

pub async fn get_withdrawal_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<withdrawals::Model>, DbErr> {
    withdrawals::Entity::find_by_id(id).one(db).await
}

/// Fetch withdrawals newest first, optionally only one worker's.
pub async fn get_withdrawals<C: ConnectionTrait>(
    db: &C,
    worker_id: Option<Uuid>,
) -> Result<Vec<withdrawals::Model>, DbErr> {
    let mut query = withdrawals::Entity::find();
    if let Some(worker_id) = worker_id {
        query = query.filter(withdrawals::Column::WorkerId.eq(worker_id));
    }
    query
        .order_by_desc(withdrawals::Column::RequestedAt)
        .all(db)
        .await
}

/// A worker's withdrawals that still hold back part of the balance.
pub async fn get_reserving_withdrawals<C: ConnectionTrait>(
    db: &C,
    worker_id: Uuid,
) -> Result<Vec<withdrawals::Model>, DbErr> {
    withdrawals::Entity::find()
        .filter(withdrawals::Column::WorkerId.eq(worker_id))
        .filter(withdrawals::Column::Status.is_in([Status::Pending, Status::Approved]))
        .all(db)
        .await
}

/// Settle a pending withdrawal. Guarded on `status = 'pending'`; returns
/// rows affected.
pub async fn resolve_pending<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    to: Status,
) -> Result<u64, DbErr> {
    let result = withdrawals::Entity::update_many()
        .col_expr(withdrawals::Column::Status, Expr::value(to))
        .col_expr(
            withdrawals::Column::ProcessedAt,
            Expr::value(Some(chrono::Utc::now())),
        )
        .filter(withdrawals::Column::Id.eq(id))
        .filter(withdrawals::Column::Status.eq(Status::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn count_withdrawals<C: ConnectionTrait>(
    db: &C,
    status: Option<Status>,
) -> Result<u64, DbErr> {
    let mut query = withdrawals::Entity::find();
    if let Some(status) = status {
        query = query.filter(withdrawals::Column::Status.eq(status));
    }
    query.count(db).await
}

/// Sum of approved (paid out) withdrawal amounts.
pub async fn total_paid_out<C: ConnectionTrait>(db: &C) -> Result<f64, DbErr> {
    let paid = withdrawals::Entity::find()
        .filter(withdrawals::Column::Status.eq(Status::Approved))
        .all(db)
        .await?;

    Ok(paid.iter().map(|w| w.amount).sum())
}
