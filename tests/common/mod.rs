//! Shared fixtures: a SQLite database with the real migrations (in memory,
//! or on disk when transactions must overlap), plus in-process stand-ins for
//! the blob store and identity provider.
#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

use assignpro_backend::auth::identity::{IdentityProvider, Session};
use assignpro_backend::config::WorkflowPolicy;
use assignpro_backend::create_pool;
use assignpro_backend::db::profiles as profile_db;
use assignpro_backend::error::AppError;
use assignpro_backend::live::LiveHub;
use assignpro_backend::models::assignments::{self, PublishAssignment};
use assignpro_backend::models::profiles::{self, ApproveUserCommand, NewProfile, RegisterWorker, Roles};
use assignpro_backend::storage::{BlobStore, UploadedFile};
use assignpro_backend::workflow::Workflow;
use sea_orm::DatabaseConnection;

#[derive(Default)]
pub struct MemoryBlobStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub deleted: Mutex<Vec<String>>,
    /// While set, every upload fails.
    pub fail_uploads: AtomicBool,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<String, AppError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Storage("bucket unavailable".to_string()));
        }
        let url = format!("mem://{path}");
        self.objects.lock().unwrap().insert(url.clone(), bytes);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        self.objects.lock().unwrap().remove(url);
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Accounts keyed by email: (user id, password).
#[derive(Default)]
pub struct FakeIdentity {
    pub accounts: Mutex<HashMap<String, (Uuid, String)>>,
    /// Hand out this id for the next new account instead of a fresh one.
    pub next_id: Mutex<Option<Uuid>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<Uuid, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AppError::DuplicateEmail(email.to_string()));
        }
        let id = self.next_id.lock().unwrap().take().unwrap_or_else(Uuid::new_v4);
        accounts.insert(email.to_string(), (id, password.to_string()));
        Ok(id)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((id, stored)) if stored == password => Ok(Session {
                access_token: format!("token-{id}"),
                refresh_token: None,
                expires_in: Some(3600),
                user_id: *id,
            }),
            _ => Err(AppError::Unauthorized("Invalid login credentials".to_string())),
        }
    }

    async fn end_session(&self, _access_token: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        self.accounts
            .lock()
            .unwrap()
            .retain(|_, (id, _)| *id != user_id);
        Ok(())
    }
}

pub struct TestApp {
    pub workflow: Arc<Workflow>,
    pub blobs: Arc<MemoryBlobStore>,
    pub identity: Arc<FakeIdentity>,
    pub admin: profiles::Model,
    // Keeps an on-disk database alive for the test's duration.
    _dir: Option<TempDir>,
}

pub async fn setup() -> TestApp {
    setup_with_policy(WorkflowPolicy::default()).await
}

pub async fn setup_with_policy(policy: WorkflowPolicy) -> TestApp {
    let db = create_pool("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    build(db, policy, None).await
}

/// A file-backed database with a full connection pool, so concurrent
/// transactions are really in flight at the same time.
pub async fn setup_on_disk() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("workflow.db").display()
    );
    let db = create_pool(&url)
        .await
        .expect("Failed to open on-disk database");
    build(db, WorkflowPolicy::default(), Some(dir)).await
}

async fn build(db: DatabaseConnection, policy: WorkflowPolicy, dir: Option<TempDir>) -> TestApp {
    let admin = profile_db::insert_profile(
        &db,
        NewProfile {
            id: Uuid::new_v4(),
            full_name: "Site Admin".to_string(),
            email: "admin@example.com".to_string(),
            phone: "03000000000".to_string(),
            role: Roles::Admin,
            is_approved: true,
            payment_screenshot_url: None,
            father_name: None,
            city: None,
            qualification: None,
            job: None,
        },
    )
    .await
    .expect("Failed to seed admin");

    let blobs = Arc::new(MemoryBlobStore::default());
    let identity = Arc::new(FakeIdentity::default());
    let workflow = Workflow::new(
        db,
        blobs.clone(),
        identity.clone(),
        Arc::new(LiveHub::new()),
    )
    .with_policy(policy);

    TestApp {
        workflow: Arc::new(workflow),
        blobs,
        identity,
        admin,
        _dir: dir,
    }
}

pub fn file(name: &str) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        content_type: Some("application/pdf".to_string()),
        content_base64: STANDARD.encode(format!("contents of {name}")),
    }
}

pub fn registration(email: &str) -> RegisterWorker {
    RegisterWorker {
        full_name: "Ali Khan".to_string(),
        father_name: Some("Ahmed Khan".to_string()),
        email: email.to_string(),
        phone: "03001234567".to_string(),
        password: "secret123".to_string(),
        city: Some("Lahore".to_string()),
        qualification: None,
        job: None,
        payment_proof: file("receipt.png"),
    }
}

impl TestApp {
    pub async fn register(&self, email: &str) -> profiles::Model {
        self.workflow
            .register(registration(email))
            .await
            .expect("Registration should succeed")
    }

    /// Register and approve a worker.
    pub async fn approved_worker(&self, email: &str) -> profiles::Model {
        let worker = self.register(email).await;
        self.workflow
            .approve_user(&self.admin, ApproveUserCommand { user_id: worker.id })
            .await
            .expect("Approval should succeed")
    }

    pub async fn publish(&self, title: &str, payment_amount: f64) -> assignments::Model {
        self.workflow
            .publish_assignment(
                &self.admin,
                PublishAssignment {
                    title: title.to_string(),
                    description: format!("{title} description"),
                    payment_amount,
                    status: None,
                    file: file("brief.pdf"),
                },
            )
            .await
            .expect("Publishing should succeed")
    }

    /// Re-read a profile so earnings reflect committed reviews.
    pub async fn reload(&self, profile: &profiles::Model) -> profiles::Model {
        profile_db::get_profile_by_id(self.workflow.db(), profile.id)
            .await
            .unwrap()
            .expect("Profile should exist")
    }
}
