use async_trait::async_trait;
use tracing::debug;

use super::BlobStore;
use crate::config::SupabaseConfig;
use crate::error::AppError;

/// Supabase Storage adapter. Objects go into one public bucket and are
/// addressed by their public URL.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(config: &SupabaseConfig, bucket: &str, service_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket)
    }

    fn public_prefix(&self) -> String {
        format!("{}/storage/v1/object/public/{}/", self.base_url, self.bucket)
    }

    /// Map a public URL back onto its object path inside the bucket.
    pub fn path_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let prefix = self.public_prefix();
        url.strip_prefix(prefix.as_str())
    }
}

#[async_trait]
impl BlobStore for SupabaseStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, AppError> {
        debug!("Uploading {} bytes to {path}", bytes.len());

        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(
                "content-type",
                content_type.unwrap_or("application/octet-stream"),
            )
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload {path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Upload of {path} failed: HTTP {status} {body}"
            )));
        }

        Ok(format!("{}{path}", self.public_prefix()))
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        let path = self
            .path_from_url(url)
            .ok_or_else(|| AppError::Storage(format!("Not an object in this bucket: {url}")))?;

        debug!("Deleting object {path}");

        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete {path}: {e}")))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "Delete of {path} failed: HTTP {status}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_urls_map_back_to_object_paths() {
        let config = SupabaseConfig {
            url: "https://abcd.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
            service_key: Some("service".to_string()),
            jwt_secret: None,
        };
        let storage = SupabaseStorage::new(&config, "uploads", "service");

        let url = "https://abcd.supabase.co/storage/v1/object/public/uploads/assignments/1-a.pdf";
        assert_eq!(storage.path_from_url(url), Some("assignments/1-a.pdf"));
        assert_eq!(storage.path_from_url("https://elsewhere/x.pdf"), None);
    }
}
