use std::path::PathBuf;
use thiserror::Error;

/// Default upload limit: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Operator-tunable workflow rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Workers may submit again to an assignment they already submitted to.
    pub allow_resubmission: bool,
    /// Workers are only offered (and may only submit to) active assignments.
    pub hide_inactive_assignments: bool,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            allow_resubmission: true,
            hide_inactive_assignments: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// e.g. `https://PROJECT.supabase.co`
    pub url: String,
    pub anon_key: String,
    /// Required by the storage adapter; uploads bypass row-level security.
    pub service_key: Option<String>,
    /// Legacy HS256 projects verify tokens with this instead of JWKS.
    pub jwt_secret: Option<String>,
}

impl SupabaseConfig {
    /// The project ref parsed from the URL, used to build the JWKS endpoint.
    pub fn project_ref(&self) -> Result<&str, ConfigError> {
        self.url
            .strip_prefix("https://")
            .and_then(|s| s.strip_suffix(".supabase.co"))
            .ok_or_else(|| ConfigError::Invalid {
                key: "SUPABASE_URL",
                value: self.url.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Supabase { bucket: String },
    Local { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub supabase: SupabaseConfig,
    pub storage: StorageConfig,
    pub max_upload_bytes: usize,
    pub policy: WorkflowPolicy,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let supabase = SupabaseConfig {
            url: required("SUPABASE_URL")?,
            anon_key: required("SUPABASE_ANON_KEY")?,
            service_key: lookup("SUPABASE_SERVICE_KEY"),
            jwt_secret: lookup("SUPABASE_JWT_SECRET"),
        };

        let storage = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("supabase") => {
                if supabase.service_key.is_none() {
                    return Err(ConfigError::Missing("SUPABASE_SERVICE_KEY"));
                }
                StorageConfig::Supabase {
                    bucket: lookup("STORAGE_BUCKET").unwrap_or_else(|| "uploads".to_string()),
                }
            }
            Some("local") => StorageConfig::Local {
                root: lookup("LOCAL_STORAGE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./uploads")),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parse_or(&lookup, "PORT", 8080)?,
            supabase,
            storage,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            policy: WorkflowPolicy {
                allow_resubmission: parse_or(&lookup, "ALLOW_RESUBMISSION", true)?,
                hide_inactive_assignments: parse_or(&lookup, "HIDE_INACTIVE_ASSIGNMENTS", true)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/assignpro"),
        ("SUPABASE_URL", "https://abcd.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("SUPABASE_SERVICE_KEY", "service"),
    ];

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let config = AppConfig::from_lookup(lookup_from(BASE)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.policy, WorkflowPolicy::default());
        assert_eq!(
            config.storage,
            StorageConfig::Supabase {
                bucket: "uploads".to_string()
            }
        );
        assert_eq!(config.supabase.project_ref().unwrap(), "abcd");
    }

    #[test]
    fn policy_flags_and_local_storage_are_read() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_DIR", "/tmp/files"),
            ("ALLOW_RESUBMISSION", "false"),
            ("HIDE_INACTIVE_ASSIGNMENTS", "false"),
            ("PORT", "9000"),
        ]);

        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.port, 9000);
        assert!(!config.policy.allow_resubmission);
        assert!(!config.policy.hide_inactive_assignments);
        assert_eq!(
            config.storage,
            StorageConfig::Local {
                root: PathBuf::from("/tmp/files")
            }
        );
    }

    #[test]
    fn missing_and_malformed_values_are_reported() {
        let err = AppConfig::from_lookup(lookup_from(&BASE[1..])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn self_hosted_supabase_url_is_accepted() {
        let mut pairs = BASE.to_vec();
        pairs.retain(|(k, _)| *k != "SUPABASE_URL");
        pairs.push(("SUPABASE_URL", "http://localhost:54321"));

        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.supabase.url, "http://localhost:54321");
    }

    #[test]
    fn project_ref_rejects_foreign_urls() {
        let config = SupabaseConfig {
            url: "http://localhost:54321".to_string(),
            anon_key: "anon".to_string(),
            service_key: None,
            jwt_secret: None,
        };
        assert!(config.project_ref().is_err());
    }
}
