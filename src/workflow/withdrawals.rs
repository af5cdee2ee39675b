use sea_orm::{ConnectionTrait, TransactionTrait};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::Workflow;
use crate::auth::authorization::{require_admin, require_approved_worker};
use crate::db::profiles as profile_db;
use crate::db::withdrawals as withdrawal_db;
use crate::error::AppError;
use crate::live::Collection;
use crate::models::profiles;
use crate::models::withdrawals::{
    self, Balance, RequestWithdrawal, SettleWithdrawalCommand, Status, WithdrawalView,
};
use crate::models::UNKNOWN;

/// Read a worker's balance through `db`, which may be an open transaction.
async fn balance_of<C: ConnectionTrait>(db: &C, worker_id: Uuid) -> Result<Balance, AppError> {
    let profile = profile_db::get_profile_by_id(db, worker_id)
        .await?
        .ok_or_else(|| AppError::not_found("Worker"))?;
    let reserving = withdrawal_db::get_reserving_withdrawals(db, worker_id).await?;

    Ok(Balance::compute(profile.total_earnings, &reserving))
}

impl Workflow {
    /// The caller's own earnings, reserved amount and available balance.
    pub async fn balance(&self, actor: &profiles::Model) -> Result<Balance, AppError> {
        balance_of(&self.db, actor.id).await
    }

    /// Ask for a payout of part of the available balance.
    ///
    /// The worker's profile row is written first so concurrent requests from
    /// the same worker queue up behind each other; each one then sees the
    /// amounts reserved by those before it.
    pub async fn request_withdrawal(
        &self,
        actor: &profiles::Model,
        input: RequestWithdrawal,
    ) -> Result<withdrawals::Model, AppError> {
        require_approved_worker(actor)?;
        input.validate()?;

        let txn = self.db.begin().await?;

        if profile_db::touch_profile(&txn, actor.id).await? == 0 {
            return Err(AppError::not_found("Worker"));
        }

        let balance = balance_of(&txn, actor.id).await?;
        if !balance.covers(input.amount) {
            return Err(AppError::InsufficientBalance {
                requested: input.amount,
                available: balance.available,
            });
        }

        let withdrawal = withdrawal_db::insert_withdrawal(&txn, actor.id, input).await?;
        txn.commit().await?;

        info!(
            "Worker {} requested withdrawal {} of {}",
            actor.id, withdrawal.id, withdrawal.amount
        );
        self.notify(Collection::Withdrawals, Some(actor.id)).await;
        Ok(withdrawal)
    }

    /// Approve (paid out) or reject (amount freed again) a pending
    /// withdrawal. Earnings are never touched.
    pub async fn settle_withdrawal(
        &self,
        actor: &profiles::Model,
        withdrawal_id: Uuid,
        command: SettleWithdrawalCommand,
    ) -> Result<withdrawals::Model, AppError> {
        require_admin(actor)?;

        let existing = withdrawal_db::get_withdrawal_by_id(&self.db, withdrawal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Withdrawal"))?;

        let to = Status::from(command.decision);
        if existing.status != Status::Pending
            || withdrawal_db::resolve_pending(&self.db, withdrawal_id, to).await? == 0
        {
            return Err(AppError::InvalidState(
                "Withdrawal has already been processed".to_string(),
            ));
        }

        let settled = withdrawal_db::get_withdrawal_by_id(&self.db, withdrawal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Withdrawal"))?;

        info!(
            "Withdrawal {} {:?} by {} (worker {})",
            settled.id, settled.status, actor.id, settled.worker_id
        );
        self.notify(Collection::Withdrawals, Some(settled.worker_id))
            .await;
        Ok(settled)
    }

    /// Admins see every withdrawal, workers their own; newest first.
    pub async fn list_withdrawals(
        &self,
        actor: &profiles::Model,
    ) -> Result<Vec<WithdrawalView>, AppError> {
        if !actor.is_admin() {
            let rows = withdrawal_db::get_withdrawals(&self.db, Some(actor.id)).await?;
            return Ok(rows
                .into_iter()
                .map(|withdrawal| WithdrawalView {
                    withdrawal,
                    worker_name: actor.full_name.clone(),
                })
                .collect());
        }

        let rows = withdrawal_db::get_withdrawals(&self.db, None).await?;

        let mut worker_ids: Vec<Uuid> = rows.iter().map(|w| w.worker_id).collect();
        worker_ids.sort_unstable();
        worker_ids.dedup();
        let names: HashMap<Uuid, String> = profile_db::get_profiles_by_ids(&self.db, worker_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.full_name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|withdrawal| WithdrawalView {
                worker_name: names
                    .get(&withdrawal.worker_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                withdrawal,
            })
            .collect())
    }
}
