use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::submissions;
use crate::storage::UploadedFile;

/// Whether workers are offered the assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// SeaORM entity for the `assignments` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub file_url: String,
    #[sea_orm(column_type = "Double")]
    pub payment_amount: f64,
    pub status: AssignmentStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

// Submissions keep their `assignment_id` after the assignment is deleted,
// so the relation is one-way and carries no foreign key.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ── Commands ──

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PublishAssignment {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "Payment amount must be positive"))]
    pub payment_amount: f64,
    pub status: Option<AssignmentStatus>,
    pub file: UploadedFile,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAssignmentCommand {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Payment amount must be positive"))]
    pub payment_amount: Option<f64>,
    pub status: Option<AssignmentStatus>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SetAssignmentStatus {
    pub status: AssignmentStatus,
}

/// An assignment as listed to a worker, with that worker's latest
/// submission status on it.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerAssignmentView {
    #[serde(flatten)]
    pub assignment: Model,
    pub my_status: Option<submissions::Status>,
}
