use serde::Serialize;

use super::Workflow;
use crate::auth::authorization::require_admin;
use crate::db::assignments as assignment_db;
use crate::db::profiles as profile_db;
use crate::db::submissions as submission_db;
use crate::db::withdrawals as withdrawal_db;
use crate::error::AppError;
use crate::models::assignments::AssignmentStatus;
use crate::models::profiles::{self, Roles};
use crate::models::submissions;
use crate::models::withdrawals;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdminStats {
    pub total_users: u64,
    pub pending_users: u64,
    pub total_assignments: u64,
    pub active_assignments: u64,
    pub pending_submissions: u64,
    pub approved_submissions: u64,
    pub pending_withdrawals: u64,
    pub total_paid_out: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerSummary {
    pub total_earnings: f64,
    pub reserved: f64,
    pub available: f64,
    pub pending_submissions: u64,
    pub approved_submissions: u64,
    pub rejected_submissions: u64,
}

impl Workflow {
    pub async fn admin_stats(&self, actor: &profiles::Model) -> Result<AdminStats, AppError> {
        require_admin(actor)?;
        let db = &self.db;

        Ok(AdminStats {
            total_users: profile_db::count_profiles(db, None, Some(Roles::Worker)).await?,
            pending_users: profile_db::count_profiles(db, Some(false), Some(Roles::Worker))
                .await?,
            total_assignments: assignment_db::count_assignments(db, None).await?,
            active_assignments: assignment_db::count_assignments(
                db,
                Some(AssignmentStatus::Active),
            )
            .await?,
            pending_submissions: submission_db::count_submissions(
                db,
                None,
                Some(submissions::Status::Pending),
            )
            .await?,
            approved_submissions: submission_db::count_submissions(
                db,
                None,
                Some(submissions::Status::Approved),
            )
            .await?,
            pending_withdrawals: withdrawal_db::count_withdrawals(
                db,
                Some(withdrawals::Status::Pending),
            )
            .await?,
            total_paid_out: withdrawal_db::total_paid_out(db).await?,
        })
    }

    /// The caller's own figures.
    pub async fn worker_summary(&self, actor: &profiles::Model) -> Result<WorkerSummary, AppError> {
        let balance = self.balance(actor).await?;
        let mine = Some(actor.id);

        Ok(WorkerSummary {
            total_earnings: balance.total_earnings,
            reserved: balance.reserved,
            available: balance.available,
            pending_submissions: submission_db::count_submissions(
                &self.db,
                mine,
                Some(submissions::Status::Pending),
            )
            .await?,
            approved_submissions: submission_db::count_submissions(
                &self.db,
                mine,
                Some(submissions::Status::Approved),
            )
            .await?,
            rejected_submissions: submission_db::count_submissions(
                &self.db,
                mine,
                Some(submissions::Status::Rejected),
            )
            .await?,
        })
    }
}
