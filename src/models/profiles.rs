use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::storage::UploadedFile;

/// The `Roles` enum maps to a TEXT column stored as lowercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Roles {
    #[sea_orm(string_value = "worker")]
    Worker,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// SeaORM entity for the `profiles` table.
///
/// `id` is the identity provider's user id, so a verified token maps
/// straight onto a row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub role: Roles,
    pub is_approved: bool,
    #[sea_orm(column_type = "Double")]
    pub total_earnings: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_screenshot_url: Option<String>,
    pub father_name: Option<String>,
    pub city: Option<String>,
    pub qualification: Option<String>,
    pub job: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
    #[sea_orm(has_many = "super::withdrawals::Entity")]
    Withdrawals,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::withdrawals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_admin(&self) -> bool {
        self.role == Roles::Admin
    }
}

// ── Commands ──

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterWorker {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Father name cannot be empty"))]
    pub father_name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub city: Option<String>,
    pub qualification: Option<String>,
    pub job: Option<String>,
    pub payment_proof: UploadedFile,
}

/// Row data for a freshly registered account (internal).
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: Roles,
    pub is_approved: bool,
    pub payment_screenshot_url: Option<String>,
    pub father_name: Option<String>,
    pub city: Option<String>,
    pub qualification: Option<String>,
    pub job: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Self-service profile edits. Role, approval and earnings are not reachable
/// from here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, message = "Phone number cannot be empty"))]
    pub phone: Option<String>,
    pub father_name: Option<String>,
    pub city: Option<String>,
    pub qualification: Option<String>,
    pub job: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ApproveUserCommand {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy)]
pub struct RejectUserCommand {
    pub user_id: Uuid,
}

/// Profile as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: Roles,
    pub is_approved: bool,
    pub total_earnings: f64,
    pub payment_screenshot_url: Option<String>,
    pub father_name: Option<String>,
    pub city: Option<String>,
    pub qualification: Option<String>,
    pub job: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for ProfileResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            full_name: m.full_name,
            email: m.email,
            phone: m.phone,
            role: m.role,
            is_approved: m.is_approved,
            total_earnings: m.total_earnings,
            payment_screenshot_url: m.payment_screenshot_url,
            father_name: m.father_name,
            city: m.city,
            qualification: m.qualification,
            job: m.job,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
