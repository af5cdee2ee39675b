pub mod assignments;
pub mod profiles;
pub mod submissions;
pub mod withdrawals;

use serde::{Deserialize, Serialize};

/// Placeholder shown wherever a referenced record no longer exists.
pub const UNKNOWN: &str = "Unknown";

/// An admin's verdict on a pending submission or withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalFilter {
    pub approved: Option<bool>,
}
