use crate::auth::authorization::require_admin;
use crate::error::AppError;
use crate::live::protocol::Collection;
use crate::models::profiles::{self, ProfileResponse};
use crate::workflow::Workflow;

/// The viewer's full, scoped list for `collection`, as sent in a snapshot.
pub async fn snapshot(
    workflow: &Workflow,
    viewer: &profiles::Model,
    collection: Collection,
) -> Result<serde_json::Value, AppError> {
    let items = match collection {
        Collection::Users => {
            require_admin(viewer)?;
            let users: Vec<ProfileResponse> = workflow
                .list_users(viewer, None)
                .await?
                .into_iter()
                .map(ProfileResponse::from)
                .collect();
            serde_json::to_value(users)
        }
        Collection::Assignments => serde_json::to_value(workflow.list_assignments(viewer).await?),
        Collection::Submissions => serde_json::to_value(workflow.list_submissions(viewer).await?),
        Collection::Withdrawals => serde_json::to_value(workflow.list_withdrawals(viewer).await?),
    };

    items.map_err(|e| AppError::Internal(format!("Failed to encode snapshot: {e}")))
}
