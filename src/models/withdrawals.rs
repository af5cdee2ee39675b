use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "easypaisa")]
    Easypaisa,
    #[sea_orm(string_value = "jazzcash")]
    Jazzcash,
    #[sea_orm(string_value = "bank")]
    Bank,
}

/// Settlement status; `approved` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl Status {
    /// Pending and approved withdrawals hold back part of the balance.
    pub fn reserves_balance(self) -> bool {
        matches!(self, Status::Pending | Status::Approved)
    }
}

impl From<Decision> for Status {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => Status::Approved,
            Decision::Reject => Status::Rejected,
        }
    }
}

/// SeaORM entity for the `withdrawals` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub worker_id: Uuid,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[sea_orm(column_type = "Text")]
    pub payment_details: String,
    pub status: Status,
    pub requested_at: DateTimeUtc,
    pub processed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::WorkerId",
        to = "super::profiles::Column::Id"
    )]
    Worker,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── Commands ──

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestWithdrawal {
    #[validate(range(exclusive_min = 0.0, message = "Amount must be positive"))]
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[validate(length(min = 1, message = "Payment details are required"))]
    pub payment_details: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SettleWithdrawalCommand {
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalView {
    #[serde(flatten)]
    pub withdrawal: Model,
    pub worker_name: String,
}

/// Amounts are stored as `f64`; balances are worked out in whole cents so
/// that sums of fractional amounts compare exactly.
fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// A worker's earnings split into what is reserved by open withdrawals and
/// what can still be requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Balance {
    pub total_earnings: f64,
    pub reserved: f64,
    pub available: f64,
}

impl Balance {
    pub fn compute<'a, I>(total_earnings: f64, withdrawals: I) -> Self
    where
        I: IntoIterator<Item = &'a Model>,
    {
        let earned = to_cents(total_earnings);
        let reserved: i64 = withdrawals
            .into_iter()
            .filter(|w| w.status.reserves_balance())
            .map(|w| to_cents(w.amount))
            .sum();

        Self {
            total_earnings: from_cents(earned),
            reserved: from_cents(reserved),
            available: from_cents(earned - reserved),
        }
    }

    /// Whether `amount` can be withdrawn from what is available.
    pub fn covers(&self, amount: f64) -> bool {
        to_cents(amount) <= to_cents(self.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn withdrawal(amount: f64, status: Status) -> Model {
        Model {
            id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            amount,
            payment_method: PaymentMethod::Easypaisa,
            payment_details: "0300-0000000".to_string(),
            status,
            requested_at: Utc::now(),
            processed_at: None,
        }
    }

    #[test]
    fn pending_and_approved_withdrawals_are_reserved() {
        let rows = vec![
            withdrawal(20.0, Status::Pending),
            withdrawal(15.0, Status::Approved),
            withdrawal(100.0, Status::Rejected),
        ];

        let balance = Balance::compute(50.0, &rows);
        assert_eq!(balance.reserved, 35.0);
        assert_eq!(balance.available, 15.0);
    }

    #[test]
    fn rejected_withdrawal_frees_its_amount() {
        let rows = vec![withdrawal(50.0, Status::Rejected)];
        assert_eq!(Balance::compute(50.0, &rows).available, 50.0);
    }

    #[test]
    fn fractional_amounts_balance_to_the_cent() {
        let earned = 0.1 + 0.2;
        let rows = vec![withdrawal(0.1, Status::Pending)];

        let balance = Balance::compute(earned, &rows);
        assert_eq!(balance.total_earnings, 0.3);
        assert_eq!(balance.available, 0.2);
        assert!(balance.covers(0.2));
        assert!(!balance.covers(0.21));
    }
}
