use sea_orm::TransactionTrait;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::Workflow;
use crate::auth::authorization::{require_admin, require_approved_worker};
use crate::db::assignments as assignment_db;
use crate::db::profiles as profile_db;
use crate::db::submissions as submission_db;
use crate::error::AppError;
use crate::live::Collection;
use crate::models::profiles;
use crate::models::submissions::{
    self, ReviewSubmissionCommand, Status, SubmissionView, SubmitWork,
};
use crate::models::{Decision, UNKNOWN};
use crate::storage::folders;

impl Workflow {
    /// Hand in completed work for an assignment. Starts out `pending`.
    pub async fn submit(
        &self,
        actor: &profiles::Model,
        input: SubmitWork,
    ) -> Result<submissions::Model, AppError> {
        require_approved_worker(actor)?;

        let assignment = assignment_db::get_assignment_by_id(&self.db, input.assignment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment"))?;

        if !self.offered_to_workers(&assignment) {
            return Err(AppError::InvalidState(
                "This assignment is not accepting submissions".to_string(),
            ));
        }

        if !self.policy.allow_resubmission
            && submission_db::has_open_submission(&self.db, actor.id, assignment.id).await?
        {
            return Err(AppError::InvalidState(
                "You have already submitted this assignment".to_string(),
            ));
        }

        let file_url = self.store_file(&input.file, folders::SUBMISSIONS).await?;

        let submission =
            submission_db::insert_submission(&self.db, assignment.id, actor.id, file_url).await?;

        info!(
            "Worker {} submitted {} for assignment {}",
            actor.id, submission.id, assignment.id
        );
        // The worker's assignment view shows their latest status.
        self.notify(Collection::Submissions, Some(actor.id)).await;
        self.notify(Collection::Assignments, Some(actor.id)).await;
        Ok(submission)
    }

    /// Approve or reject a pending submission.
    ///
    /// The status change and (on approval) the earnings increment commit
    /// together. The status update only matches a row that is still
    /// `pending`, so when two admins race, one of them gets `InvalidState`
    /// and the worker is paid once.
    pub async fn review(
        &self,
        actor: &profiles::Model,
        submission_id: Uuid,
        command: ReviewSubmissionCommand,
    ) -> Result<submissions::Model, AppError> {
        require_admin(actor)?;

        let txn = self.db.begin().await?;

        let submission = submission_db::get_submission_by_id(&txn, submission_id)
            .await?
            .ok_or_else(|| AppError::not_found("Submission"))?;

        if submission.status != Status::Pending {
            return Err(already_reviewed());
        }

        let payment = match command.decision {
            Decision::Approve => {
                let assignment = assignment_db::get_assignment_by_id(&txn, submission.assignment_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Assignment"))?;
                Some(assignment.payment_amount)
            }
            Decision::Reject => None,
        };

        let to = Status::from(command.decision);
        if submission_db::resolve_pending(&txn, submission.id, to).await? == 0 {
            // Someone else reviewed it since we read it; dropping `txn` rolls back.
            return Err(already_reviewed());
        }

        if let Some(amount) = payment {
            if profile_db::increment_earnings(&txn, submission.worker_id, amount).await? == 0 {
                return Err(AppError::not_found("Worker"));
            }
        }

        let reviewed = submission_db::get_submission_by_id(&txn, submission.id)
            .await?
            .ok_or_else(|| AppError::not_found("Submission"))?;

        txn.commit().await?;

        info!(
            "Submission {} {:?} by {} (worker {})",
            reviewed.id, reviewed.status, actor.id, reviewed.worker_id
        );
        self.notify(Collection::Submissions, Some(reviewed.worker_id))
            .await;
        self.notify(Collection::Assignments, Some(reviewed.worker_id))
            .await;
        if payment.is_some() {
            self.notify(Collection::Users, Some(reviewed.worker_id)).await;
        }
        Ok(reviewed)
    }

    /// Admins see every submission, workers their own; newest first.
    pub async fn list_submissions(
        &self,
        actor: &profiles::Model,
    ) -> Result<Vec<SubmissionView>, AppError> {
        let owner = (!actor.is_admin()).then_some(actor.id);
        let rows = submission_db::get_submissions(&self.db, owner).await?;

        // Batch the lookups instead of querying per row.
        let mut assignment_ids: Vec<Uuid> = rows.iter().map(|s| s.assignment_id).collect();
        assignment_ids.sort_unstable();
        assignment_ids.dedup();
        let mut worker_ids: Vec<Uuid> = rows.iter().map(|s| s.worker_id).collect();
        worker_ids.sort_unstable();
        worker_ids.dedup();

        let assignments: HashMap<Uuid, _> =
            assignment_db::get_assignments_by_ids(&self.db, assignment_ids)
                .await?
                .into_iter()
                .map(|a| (a.id, a))
                .collect();
        let workers: HashMap<Uuid, String> =
            profile_db::get_profiles_by_ids(&self.db, worker_ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p.full_name))
                .collect();

        let views = rows
            .into_iter()
            .map(|s| {
                let assignment = assignments.get(&s.assignment_id);
                SubmissionView {
                    id: s.id,
                    assignment_id: s.assignment_id,
                    assignment_title: assignment
                        .map(|a| a.title.clone())
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    payment_amount: assignment.map(|a| a.payment_amount),
                    worker_id: s.worker_id,
                    worker_name: workers
                        .get(&s.worker_id)
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    file_url: s.file_url,
                    status: s.status,
                    submitted_at: s.submitted_at,
                    reviewed_at: s.reviewed_at,
                }
            })
            .collect();

        Ok(views)
    }
}

fn already_reviewed() -> AppError {
    AppError::InvalidState("Submission has already been reviewed".to_string())
}
