use sea_orm::SqlErr;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::Workflow;
use crate::auth::authorization::require_admin;
use crate::auth::identity::Session;
use crate::db::profiles as profile_db;
use crate::error::AppError;
use crate::live::Collection;
use crate::models::profiles::{
    self, ApproveUserCommand, Credentials, NewProfile, ProfileResponse, RegisterWorker,
    RejectUserCommand, Roles, UpdateProfile,
};
use crate::storage::folders;

/// Returned by a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    #[serde(flatten)]
    pub session: Session,
    pub profile: ProfileResponse,
}

impl Workflow {
    /// Create a worker account awaiting approval.
    pub async fn register(&self, input: RegisterWorker) -> Result<profiles::Model, AppError> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if profile_db::get_profile_by_email(&self.db, &email)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateEmail(email));
        }

        // A failure in any later step undoes the earlier ones.
        let proof_url = self
            .store_file(&input.payment_proof, folders::PAYMENT_PROOFS)
            .await?;

        let user_id = match self.identity.create_account(&email, &input.password).await {
            Ok(user_id) => user_id,
            Err(e) => {
                self.release_file(&proof_url).await;
                return Err(e);
            }
        };

        let inserted = profile_db::insert_profile(
            &self.db,
            NewProfile {
                id: user_id,
                full_name: input.full_name.trim().to_string(),
                email: email.clone(),
                phone: input.phone.trim().to_string(),
                role: Roles::Worker,
                is_approved: false,
                payment_screenshot_url: Some(proof_url.clone()),
                father_name: input.father_name,
                city: input.city,
                qualification: input.qualification,
                job: input.job,
            },
        )
        .await;

        let profile = match inserted {
            Ok(profile) => profile,
            Err(e) => {
                if let Err(err) = self.identity.delete_account(user_id).await {
                    warn!("Failed to remove orphaned account {user_id} ({email}): {err}");
                }
                self.release_file(&proof_url).await;
                return Err(match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateEmail(email),
                    _ => AppError::Database(e),
                });
            }
        };

        info!("Registered worker {} ({})", profile.id, profile.email);
        self.notify(Collection::Users, Some(profile.id)).await;
        Ok(profile)
    }

    /// Sign in with email and password.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<SignedIn, AppError> {
        credentials.validate()?;

        let email = credentials.email.trim().to_lowercase();
        let session = self
            .identity
            .authenticate(&email, &credentials.password)
            .await?;

        let profile = profile_db::get_profile_by_id(&self.db, session.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("No profile exists for this account".to_string())
            })?;

        Ok(SignedIn {
            session,
            profile: profile.into(),
        })
    }

    pub async fn end_session(&self, access_token: &str) -> Result<(), AppError> {
        self.identity.end_session(access_token).await
    }

    /// Let a user edit their own contact details.
    pub async fn update_profile(
        &self,
        actor: &profiles::Model,
        input: UpdateProfile,
    ) -> Result<profiles::Model, AppError> {
        input.validate()?;

        let profile = profile_db::update_profile(&self.db, actor.id, input).await?;
        // Submission and withdrawal views carry the worker's name.
        for collection in [
            Collection::Users,
            Collection::Submissions,
            Collection::Withdrawals,
        ] {
            self.notify(collection, Some(profile.id)).await;
        }
        Ok(profile)
    }

    /// Admin listing of all users, optionally filtered by approval.
    pub async fn list_users(
        &self,
        actor: &profiles::Model,
        approved: Option<bool>,
    ) -> Result<Vec<profiles::Model>, AppError> {
        require_admin(actor)?;
        Ok(profile_db::get_profiles(&self.db, approved).await?)
    }

    pub async fn get_user(
        &self,
        actor: &profiles::Model,
        user_id: Uuid,
    ) -> Result<profiles::Model, AppError> {
        require_admin(actor)?;
        profile_db::get_profile_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Approve a user. Approving an already approved user changes nothing.
    pub async fn approve_user(
        &self,
        actor: &profiles::Model,
        command: ApproveUserCommand,
    ) -> Result<profiles::Model, AppError> {
        require_admin(actor)?;

        let user = self.get_user(actor, command.user_id).await?;
        if user.is_approved {
            return Ok(user);
        }

        let user = profile_db::set_approval(&self.db, user.id, true).await?;
        info!("User {} approved by {}", user.id, actor.id);
        self.notify(Collection::Users, Some(user.id)).await;
        Ok(user)
    }

    /// Revoke (or withhold) a user's approval.
    pub async fn reject_user(
        &self,
        actor: &profiles::Model,
        command: RejectUserCommand,
    ) -> Result<profiles::Model, AppError> {
        require_admin(actor)?;

        let user = self.get_user(actor, command.user_id).await?;
        if !user.is_approved {
            return Ok(user);
        }

        let user = profile_db::set_approval(&self.db, user.id, false).await?;
        info!("User {} rejected by {}", user.id, actor.id);
        self.notify(Collection::Users, Some(user.id)).await;
        Ok(user)
    }
}
