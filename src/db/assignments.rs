use sea_orm::*;
use uuid::Uuid;

use crate::models::assignments::{self, AssignmentStatus};

/// Row data for a new assignment, with its file already stored.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub file_url: String,
    pub payment_amount: f64,
    pub status: AssignmentStatus,
}

/// Field changes for an existing assignment; `None` leaves a column alone.
#[derive(Debug, Clone, Default)]
pub struct AssignmentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub payment_amount: Option<f64>,
    pub status: Option<AssignmentStatus>,
}

pub async fn insert_assignment<C: ConnectionTrait>(
    db: &C,
    input: NewAssignment,
) -> Result<assignments::Model, DbErr> {
    let new_assignment = assignments::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        file_url: Set(input.file_url),
        payment_amount: Set(input.payment_amount),
        status: Set(input.status),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_assignment.insert(db).await
}

/// Fetch assignments newest first, optionally only those with `status`.
pub async fn get_assignments<C: ConnectionTrait>(
    db: &C,
    status: Option<AssignmentStatus>,
) -> Result<Vec<assignments::Model>, DbErr> {
    let mut query = assignments::Entity::find();
    if let Some(status) = status {
        query = query.filter(assignments::Column::Status.eq(status));
    }
    query
        .order_by_desc(assignments::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch a single assignment by ID.
pub async fn get_assignment_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<assignments::Model>, DbErr> {
    assignments::Entity::find_by_id(id).one(db).await
}

pub async fn get_assignments_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> Result<Vec<assignments::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    assignments::Entity::find()
        .filter(assignments::Column::Id.is_in(ids))
        .all(db)
        .await
}

/// Apply `changes` to an assignment.
pub async fn update_assignment<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    changes: AssignmentChanges,
) -> Result<assignments::Model, DbErr> {
    let assignment = assignments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Assignment".to_string()))?;

    let mut active: assignments::ActiveModel = assignment.into();

    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(file_url) = changes.file_url {
        active.file_url = Set(file_url);
    }
    if let Some(payment_amount) = changes.payment_amount {
        active.payment_amount = Set(payment_amount);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Delete an assignment by ID. Submissions referencing it are kept.
pub async fn delete_assignment<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<DeleteResult, DbErr> {
    assignments::Entity::delete_by_id(id).exec(db).await
}

pub async fn count_assignments<C: ConnectionTrait>(
    db: &C,
    status: Option<AssignmentStatus>,
) -> Result<u64, DbErr> {
    let mut query = assignments::Entity::find();
    if let Some(status) = status {
        query = query.filter(assignments::Column::Status.eq(status));
    }
    query.count(db).await
}
