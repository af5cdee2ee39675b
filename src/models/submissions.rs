use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::Decision;
use crate::storage::UploadedFile;

/// Review status; `approved` and `rejected` are terminal.
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

impl From<Decision> for Status {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => Status::Approved,
            Decision::Reject => Status::Rejected,
        }
    }
}

/// SeaORM entity for the `submissions` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub worker_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub file_url: String,
    pub status: Status,
    pub submitted_at: DateTimeUtc,
    pub reviewed_at: Option<DateTimeUtc>,
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

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitWork {
    pub assignment_id: Uuid,
    pub file: UploadedFile,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReviewSubmissionCommand {
    pub decision: Decision,
}

/// A submission joined with the names an admin or worker view renders.
/// Dangling references render as [`crate::models::UNKNOWN`].
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub assignment_title: String,
    pub payment_amount: Option<f64>,
    pub worker_id: Uuid,
    pub worker_name: String,
    pub file_url: String,
    pub status: Status,
    pub submitted_at: DateTimeUtc,
    pub reviewed_at: Option<DateTimeUtc>,
}

/// The worker's current status on an assignment: the most recent matching
/// submission wins.
pub fn current_status<'a, I>(submissions: I, assignment_id: Uuid) -> Option<Status>
where
    I: IntoIterator<Item = &'a Model>,
{
    submissions
        .into_iter()
        .filter(|s| s.assignment_id == assignment_id)
        .max_by_key(|s| s.submitted_at)
        .map(|s| s.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn submission(assignment_id: Uuid, status: Status, minutes_ago: i64) -> Model {
        Model {
            id: Uuid::new_v4(),
            assignment_id,
            worker_id: Uuid::new_v4(),
            file_url: "submissions/x.pdf".to_string(),
            status,
            submitted_at: Utc::now() - Duration::minutes(minutes_ago),
            reviewed_at: None,
        }
    }

    #[test]
    fn latest_submission_decides_current_status() {
        let assignment = Uuid::new_v4();
        let rows = vec![
            submission(assignment, Status::Rejected, 30),
            submission(assignment, Status::Pending, 5),
            submission(Uuid::new_v4(), Status::Approved, 1),
        ];

        assert_eq!(current_status(&rows, assignment), Some(Status::Pending));
    }

    #[test]
    fn no_submission_means_no_status() {
        let rows = vec![submission(Uuid::new_v4(), Status::Approved, 1)];
        assert_eq!(current_status(&rows, Uuid::new_v4()), None);
    }

    #[test]
    fn decisions_map_to_terminal_statuses() {
        assert_eq!(Status::from(Decision::Approve), Status::Approved);
        assert_eq!(Status::from(Decision::Reject), Status::Rejected);
    }
}
