//! The approval-gated workflow: registration and approval, assignment
//! publishing, submission review and withdrawals.
//!
//! Every operation takes the acting profile and checks its role itself, so
//! callers (HTTP handlers, the live session, tests) cannot skip a check.

mod assignments;
mod dashboard;
mod registration;
mod submissions;
mod withdrawals;

pub use assignments::AssignmentListing;
pub use dashboard::{AdminStats, WorkerSummary};
pub use registration::SignedIn;

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::auth::identity::IdentityProvider;
use crate::config::{DEFAULT_MAX_UPLOAD_BYTES, WorkflowPolicy};
use crate::error::AppError;
use crate::live::{Collection, LiveHub};
use crate::storage::{BlobStore, UploadedFile};

pub struct Workflow {
    db: DatabaseConnection,
    blobs: Arc<dyn BlobStore>,
    identity: Arc<dyn IdentityProvider>,
    live: Arc<LiveHub>,
    policy: WorkflowPolicy,
    max_upload_bytes: usize,
}

impl Workflow {
    pub fn new(
        db: DatabaseConnection,
        blobs: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityProvider>,
        live: Arc<LiveHub>,
    ) -> Self {
        Self {
            db,
            blobs,
            identity,
            live,
            policy: WorkflowPolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_policy(mut self, policy: WorkflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn live(&self) -> &Arc<LiveHub> {
        &self.live
    }

    /// Decode an uploaded file and put it in the blob store under `folder`.
    async fn store_file(&self, file: &UploadedFile, folder: &str) -> Result<String, AppError> {
        let bytes = file.decode(self.max_upload_bytes)?;
        self.blobs
            .upload(&file.object_path(folder), bytes, file.content_type.as_deref())
            .await
    }

    /// Best-effort removal of a stored file; the record change it follows
    /// has already committed.
    async fn release_file(&self, url: &str) {
        if let Err(e) = self.blobs.delete(url).await {
            warn!("Failed to release stored file {url}: {e}");
        }
    }

    async fn notify(&self, collection: Collection, owner: Option<Uuid>) {
        self.live.publish(collection, owner).await;
    }
}
