use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::*;
use uuid::Uuid;

use crate::models::profiles::{self, NewProfile, Roles, UpdateProfile};

/// Insert a profile for a freshly created identity.
pub async fn insert_profile<C: ConnectionTrait>(
    db: &C,
    input: NewProfile,
) -> Result<profiles::Model, DbErr> {
    let new_profile = profiles::ActiveModel {
        id: Set(input.id),
        full_name: Set(input.full_name),
        email: Set(input.email),
        phone: Set(input.phone),
        role: Set(input.role),
        is_approved: Set(input.is_approved),
        total_earnings: Set(0.0),
        payment_screenshot_url: Set(input.payment_screenshot_url),
        father_name: Set(input.father_name),
        city: Set(input.city),
        qualification: Set(input.qualification),
        job: Set(input.job),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_profile.insert(db).await
}

/// Fetch a single profile by ID.
pub async fn get_profile_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<profiles::Model>, DbErr> {
    profiles::Entity::find_by_id(id).one(db).await
}

pub async fn get_profile_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<profiles::Model>, DbErr> {
    profiles::Entity::find()
        .filter(profiles::Column::Email.eq(email))
        .one(db)
        .await
}

/// Fetch profiles, newest first, optionally filtered by approval.
pub async fn get_profiles<C: ConnectionTrait>(
    db: &C,
    approved: Option<bool>,
) -> Result<Vec<profiles::Model>, DbErr> {
    let mut query = profiles::Entity::find();
    if let Some(approved) = approved {
        query = query.filter(profiles::Column::IsApproved.eq(approved));
    }
    query
        .order_by_desc(profiles::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch the profiles with the given IDs (missing ones are simply absent).
pub async fn get_profiles_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> Result<Vec<profiles::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    profiles::Entity::find()
        .filter(profiles::Column::Id.is_in(ids))
        .all(db)
        .await
}

/// Set the approval flag.
pub async fn set_approval<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    approved: bool,
) -> Result<profiles::Model, DbErr> {
    let profile = profiles::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Profile".to_string()))?;

    let mut active: profiles::ActiveModel = profile.into();
    active.is_approved = Set(approved);
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Apply a self-service profile edit.
pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateProfile,
) -> Result<profiles::Model, DbErr> {
    let profile = profiles::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Profile".to_string()))?;

    let mut active: profiles::ActiveModel = profile.into();

    if let Some(full_name) = input.full_name {
        active.full_name = Set(full_name);
    }
    if let Some(phone) = input.phone {
        active.phone = Set(phone);
    }
    if let Some(father_name) = input.father_name {
        active.father_name = Set(Some(father_name));
    }
    if let Some(city) = input.city {
        active.city = Set(Some(city));
    }
    if let Some(qualification) = input.qualification {
        active.qualification = Set(Some(qualification));
    }
    if let Some(job) = input.job {
        active.job = Set(Some(job));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Add `amount` to a worker's earnings as a single `SET x = x + amount`, so
/// concurrent increments never overwrite each other. Returns rows affected.
pub async fn increment_earnings<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    amount: f64,
) -> Result<u64, DbErr> {
    let result = profiles::Entity::update_many()
        .col_expr(
            profiles::Column::TotalEarnings,
            Expr::col(profiles::Column::TotalEarnings).add(amount),
        )
        .filter(profiles::Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Write to the profile row so the surrounding transaction holds its row
/// lock until commit. Returns rows affected.
pub async fn touch_profile<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
    let result = profiles::Entity::update_many()
        .col_expr(
            profiles::Column::UpdatedAt,
            Expr::value(Some(chrono::Utc::now())),
        )
        .filter(profiles::Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn count_profiles<C: ConnectionTrait>(
    db: &C,
    approved: Option<bool>,
    role: Option<Roles>,
) -> Result<u64, DbErr> {
    let mut query = profiles::Entity::find();
    if let Some(approved) = approved {
        query = query.filter(profiles::Column::IsApproved.eq(approved));
    }
    if let Some(role) = role {
        query = query.filter(profiles::Column::Role.eq(role));
    }
    query.count(db).await
}
