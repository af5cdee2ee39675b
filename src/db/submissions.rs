use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::submissions::{self, Status};

/// Insert a new submission in `pending`.
pub async fn insert_submission<C: ConnectionTrait>(
    db: &C,
    assignment_id: Uuid,
    worker_id: Uuid,
    file_url: String,
) -> Result<submissions::Model, DbErr> {
    let new_submission = submissions::ActiveModel {
        id: Set(Uuid::new_v4()),
        assignment_id: Set(assignment_id),
        worker_id: Set(worker_id),
        file_url: Set(file_url),
        status: Set(Status::Pending),
        submitted_at: Set(chrono::Utc::now()),
        reviewed_at: Set(None),
    };

    new_submission.insert(db).await
}

/// Fetch a single submission by ID.
pub async fn get_submission_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<submissions::Model>, DbErr> {
    submissions::Entity::find_by_id(id).one(db).await
}

/// Fetch submissions newest first, optionally only one worker's.
pub async fn get_submissions<C: ConnectionTrait>(
    db: &C,
    worker_id: Option<Uuid>,
) -> Result<Vec<submissions::Model>, DbErr> {
    let mut query = submissions::Entity::find();
    if let Some(worker_id) = worker_id {
        query = query.filter(submissions::Column::WorkerId.eq(worker_id));
    }
    query
        .order_by_desc(submissions::Column::SubmittedAt)
        .all(db)
        .await
}

/// Whether the worker already has a pending or approved submission for the
/// assignment.
pub async fn has_open_submission<C: ConnectionTrait>(
    db: &C,
    worker_id: Uuid,
    assignment_id: Uuid,
) -> Result<bool, DbErr> {
    let count = submissions::Entity::find()
        .filter(submissions::Column::WorkerId.eq(worker_id))
        .filter(submissions::Column::AssignmentId.eq(assignment_id))
        .filter(submissions::Column::Status.is_in([Status::Pending, Status::Approved]))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Move a submission out of `pending`. The `WHERE status = 'pending'` guard
/// makes this a compare-and-set: of two racing reviews only one sees a row
/// affected.
pub async fn resolve_pending<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    to: Status,
) -> Result<u64, DbErr> {
    let result = submissions::Entity::update_many()
        .col_expr(submissions::Column::Status, Expr::value(to))
        .col_expr(
            submissions::Column::ReviewedAt,
            Expr::value(Some(chrono::Utc::now())),
        )
        .filter(submissions::Column::Id.eq(id))
        .filter(submissions::Column::Status.eq(Status::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn count_submissions<C: ConnectionTrait>(
    db: &C,
    worker_id: Option<Uuid>,
    status: Option<Status>,
) -> Result<u64, DbErr> {
    let mut query = submissions::Entity::find();
    if let Some(worker_id) = worker_id {
        query = query.filter(submissions::Column::WorkerId.eq(worker_id));
    }
    if let Some(status) = status {
        query = query.filter(submissions::Column::Status.eq(status));
    }
    query.count(db).await
}
