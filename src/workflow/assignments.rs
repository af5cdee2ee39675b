use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::Workflow;
use crate::auth::authorization::{require_admin, require_approved};
use crate::db::assignments::{self as assignment_db, AssignmentChanges, NewAssignment};
use crate::db::submissions as submission_db;
use crate::error::AppError;
use crate::live::Collection;
use crate::models::assignments::{
    self, AssignmentStatus, PublishAssignment, SetAssignmentStatus, UpdateAssignmentCommand,
    WorkerAssignmentView,
};
use crate::models::profiles;
use crate::models::submissions::current_status;
use crate::storage::folders;

/// What `list_assignments` hands back depends on who is looking.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AssignmentListing {
    All(Vec<assignments::Model>),
    ForWorker(Vec<WorkerAssignmentView>),
}

impl Workflow {
    pub async fn publish_assignment(
        &self,
        actor: &profiles::Model,
        input: PublishAssignment,
    ) -> Result<assignments::Model, AppError> {
        require_admin(actor)?;
        input.validate()?;

        let file_url = self.store_file(&input.file, folders::ASSIGNMENTS).await?;

        let assignment = assignment_db::insert_assignment(
            &self.db,
            NewAssignment {
                title: input.title.trim().to_string(),
                description: input.description,
                file_url,
                payment_amount: input.payment_amount,
                status: input.status.unwrap_or(AssignmentStatus::Active),
            },
        )
        .await?;

        info!(
            "Assignment {} published by {} ({})",
            assignment.id, actor.id, assignment.payment_amount
        );
        self.notify(Collection::Assignments, None).await;
        Ok(assignment)
    }

    /// Partial update. A new file replaces (and releases) the old one.
    pub async fn update_assignment(
        &self,
        actor: &profiles::Model,
        id: Uuid,
        command: UpdateAssignmentCommand,
    ) -> Result<assignments::Model, AppError> {
        require_admin(actor)?;
        command.validate()?;

        let existing = assignment_db::get_assignment_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment"))?;

        let file_url = match &command.file {
            Some(file) => Some(self.store_file(file, folders::ASSIGNMENTS).await?),
            None => None,
        };
        let replaced_file = file_url.is_some();

        let updated = assignment_db::update_assignment(
            &self.db,
            id,
            AssignmentChanges {
                title: command.title.map(|t| t.trim().to_string()),
                description: command.description,
                file_url,
                payment_amount: command.payment_amount,
                status: command.status,
            },
        )
        .await?;

        if replaced_file {
            self.release_file(&existing.file_url).await;
        }

        info!("Assignment {} updated by {}", id, actor.id);
        self.notify(Collection::Assignments, None).await;
        Ok(updated)
    }

    pub async fn set_assignment_status(
        &self,
        actor: &profiles::Model,
        id: Uuid,
        command: SetAssignmentStatus,
    ) -> Result<assignments::Model, AppError> {
        require_admin(actor)?;

        let updated = assignment_db::update_assignment(
            &self.db,
            id,
            AssignmentChanges {
                status: Some(command.status),
                ..Default::default()
            },
        )
        .await?;

        info!("Assignment {} set to {:?}", id, command.status);
        self.notify(Collection::Assignments, None).await;
        Ok(updated)
    }

    /// Delete the record, then release its file. Submissions that point at
    /// the assignment are left as they are.
    pub async fn delete_assignment(
        &self,
        actor: &profiles::Model,
        id: Uuid,
    ) -> Result<(), AppError> {
        require_admin(actor)?;

        let existing = assignment_db::get_assignment_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment"))?;

        let result = assignment_db::delete_assignment(&self.db, id).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Assignment"));
        }

        self.release_file(&existing.file_url).await;

        info!("Assignment {} deleted by {}", id, actor.id);
        self.notify(Collection::Assignments, None).await;
        Ok(())
    }

    pub async fn get_assignment(
        &self,
        actor: &profiles::Model,
        id: Uuid,
    ) -> Result<assignments::Model, AppError> {
        require_approved(actor)?;

        let assignment = assignment_db::get_assignment_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment"))?;

        if !actor.is_admin() && !self.offered_to_workers(&assignment) {
            return Err(AppError::not_found("Assignment"));
        }
        Ok(assignment)
    }

    /// Admins get every assignment. Approved workers get the ones offered to
    /// them, each with their own latest submission status.
    pub async fn list_assignments(
        &self,
        actor: &profiles::Model,
    ) -> Result<AssignmentListing, AppError> {
        if actor.is_admin() {
            let all = assignment_db::get_assignments(&self.db, None).await?;
            return Ok(AssignmentListing::All(all));
        }
        require_approved(actor)?;

        let status = self
            .policy
            .hide_inactive_assignments
            .then_some(AssignmentStatus::Active);
        let offered = assignment_db::get_assignments(&self.db, status).await?;
        let mine = submission_db::get_submissions(&self.db, Some(actor.id)).await?;

        let views = offered
            .into_iter()
            .map(|assignment| WorkerAssignmentView {
                my_status: current_status(&mine, assignment.id),
                assignment,
            })
            .collect();

        Ok(AssignmentListing::ForWorker(views))
    }

    pub(super) fn offered_to_workers(&self, assignment: &assignments::Model) -> bool {
        !self.policy.hide_inactive_assignments || assignment.status == AssignmentStatus::Active
    }
}
