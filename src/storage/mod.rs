pub mod local;
pub mod supabase;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::AppError;

pub use local::LocalDiskStore;
pub use supabase::SupabaseStorage;

/// Folders objects are grouped under.
pub mod folders {
    pub const ASSIGNMENTS: &str = "assignments";
    pub const SUBMISSIONS: &str = "submissions";
    pub const PAYMENT_PROOFS: &str = "payment-proofs";
}

/// Where uploaded files live. Objects are addressed by the public URL the
/// store hands back from `upload`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, AppError>;

    async fn delete(&self, url: &str) -> Result<(), AppError>;
}

/// A file carried inside a JSON request body.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content_base64: String,
}

impl UploadedFile {
    /// Decode the payload, refusing empty files and files over `max_bytes`.
    pub fn decode(&self, max_bytes: usize) -> Result<Vec<u8>, AppError> {
        if self.file_name.trim().is_empty() {
            return Err(AppError::Validation("File name is required".to_string()));
        }

        let bytes = STANDARD
            .decode(self.content_base64.trim())
            .map_err(|e| AppError::Validation(format!("File content is not valid base64: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("File is empty".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "File size must be less than {}MB",
                max_bytes / 1024 / 1024
            )));
        }

        Ok(bytes)
    }

    /// `<folder>/<unix-millis>-<sanitized name>`
    pub fn object_path(&self, folder: &str) -> String {
        let stamp = chrono::Utc::now().timestamp_millis();
        format!("{folder}/{stamp}-{}", sanitize_file_name(&self.file_name))
    }
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            content_base64: STANDARD.encode(content),
        }
    }

    #[test]
    fn decode_enforces_size_limit() {
        assert_eq!(file("a.txt", b"hello").decode(5).unwrap(), b"hello");
        assert!(matches!(
            file("a.txt", b"hello!").decode(5),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn decode_rejects_empty_and_garbage() {
        assert!(file("a.txt", b"").decode(10).is_err());

        let garbage = UploadedFile {
            file_name: "a.txt".to_string(),
            content_type: None,
            content_base64: "***".to_string(),
        };
        assert!(garbage.decode(10).is_err());
    }

    #[test]
    fn object_paths_are_sanitized() {
        let path = file("../../etc/pass wd.pdf", b"x").object_path(folders::SUBMISSIONS);
        assert!(path.starts_with("submissions/"));
        assert!(path.ends_with("-pass_wd.pdf"));
        assert!(!path.contains(".."));
    }
}
