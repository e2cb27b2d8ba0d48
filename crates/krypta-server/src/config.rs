//! Server configuration
//!
//! Layered: defaults for application behavior, then an optional YAML file,
//! then `KRYPTA_`-prefixed environment variables (section separator `__`,
//! e.g. `KRYPTA_DATABASE__URL`). External dependencies and the default
//! admin password have NO defaults on purpose; startup fails with an
//! aggregated list of what is missing.

use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub object_store: ObjectStoreSettings,
    pub blob_storage: BlobStorageSettings,
    pub iam: IamSettings,
    pub crypto: CryptoSettings,
    pub log: LogSettings,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RedisSettings {
    /// Connection URL, e.g. `redis://localhost:6379/0`
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ObjectStoreSettings {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    pub container: String,
    pub region: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlobStorageSettings {
    /// Upper bound for a single blob upload body
    pub max_file_size_bytes: u64,
    /// Operator-declared capacity for the metrics summary; 0 = unknown
    pub capacity_bytes: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IamSettings {
    pub api_key_length: usize,
    pub session_validity_hours: i64,
    pub default_admin_username: String,
    pub default_admin_display_name: String,
    #[serde(default)]
    pub default_admin_password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CryptoSettings {
    pub argon2_memory: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    pub argon2_salt_length: u32,
    pub argon2_key_length: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LogSettings {
    pub level: String,
    /// `json` or `console`
    pub format: String,
}

impl Settings {
    /// Load configuration from defaults, the given YAML file (optional),
    /// and `KRYPTA_*` environment variables.
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9041)?
            .set_default("database.max_connections", 25)?
            .set_default("object_store.container", "krypta-blobs")?
            .set_default("object_store.region", "us-east-1")?
            .set_default("blob_storage.max_file_size_bytes", 5_368_709_120u64)?
            .set_default("blob_storage.capacity_bytes", 0u64)?
            .set_default("iam.api_key_length", 128)?
            .set_default("iam.session_validity_hours", 168)?
            .set_default("iam.default_admin_username", "admin")?
            .set_default("iam.default_admin_display_name", "Default Admin")?
            .set_default("crypto.argon2_memory", 65536)?
            .set_default("crypto.argon2_iterations", 3)?
            .set_default("crypto.argon2_parallelism", 4)?
            .set_default("crypto.argon2_salt_length", 16)?
            .set_default("crypto.argon2_key_length", 32)?
            .set_default("log.level", "info")?
            .set_default("log.format", "json")?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("KRYPTA").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check that every required external dependency is configured.
    fn validate(&self) -> anyhow::Result<()> {
        let mut missing = Vec::new();
        if self.database.url.is_empty() {
            missing.push("KRYPTA_DATABASE__URL");
        }
        if self.redis.url.is_empty() {
            missing.push("KRYPTA_REDIS__URL");
        }
        if self.object_store.endpoint.is_empty() {
            missing.push("KRYPTA_OBJECT_STORE__ENDPOINT");
        }
        if self.object_store.access_key.is_empty() {
            missing.push("KRYPTA_OBJECT_STORE__ACCESS_KEY");
        }
        if self.object_store.secret_key.is_empty() {
            missing.push("KRYPTA_OBJECT_STORE__SECRET_KEY");
        }
        if self.iam.default_admin_password.is_empty() {
            missing.push("KRYPTA_IAM__DEFAULT_ADMIN_PASSWORD");
        }

        if !missing.is_empty() {
            anyhow::bail!(
                "missing required configuration: {}\n\nExternal dependencies and security \
                 credentials must be explicitly configured.",
                missing.join(", ")
            );
        }
        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn argon2_config(&self) -> krypta_core::password::Argon2Config {
        krypta_core::password::Argon2Config {
            memory_kib: self.crypto.argon2_memory,
            iterations: self.crypto.argon2_iterations,
            parallelism: self.crypto.argon2_parallelism,
            salt_length: self.crypto.argon2_salt_length,
            key_length: self.crypto.argon2_key_length,
        }
    }

    pub fn session_validity(&self) -> chrono::Duration {
        chrono::Duration::hours(self.iam.session_validity_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Settings {
        Settings {
            server: ServerSettings {
                host: "0.0.0.0".into(),
                port: 9041,
            },
            database: DatabaseSettings {
                url: "postgres://localhost/krypta".into(),
                max_connections: 25,
            },
            redis: RedisSettings {
                url: "redis://localhost:6379".into(),
            },
            object_store: ObjectStoreSettings {
                endpoint: "http://localhost:9000".into(),
                access_key: "minio".into(),
                secret_key: "minio123".into(),
                container: "krypta-blobs".into(),
                region: "us-east-1".into(),
            },
            blob_storage: BlobStorageSettings {
                max_file_size_bytes: 5_368_709_120,
                capacity_bytes: 0,
            },
            iam: IamSettings {
                api_key_length: 128,
                session_validity_hours: 168,
                default_admin_username: "admin".into(),
                default_admin_display_name: "Default Admin".into(),
                default_admin_password: "changeme-now".into(),
            },
            crypto: CryptoSettings {
                argon2_memory: 65536,
                argon2_iterations: 3,
                argon2_parallelism: 4,
                argon2_salt_length: 16,
                argon2_key_length: 32,
            },
            log: LogSettings {
                level: "info".into(),
                format: "json".into(),
            },
        }
    }

    #[test]
    fn test_validate_accepts_complete_settings() {
        assert!(minimal().validate().is_ok());
    }

    #[test]
    fn test_validate_lists_every_missing_key() {
        let mut settings = minimal();
        settings.database.url.clear();
        settings.iam.default_admin_password.clear();
        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("KRYPTA_DATABASE__URL"));
        assert!(err.contains("KRYPTA_IAM__DEFAULT_ADMIN_PASSWORD"));
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(minimal().bind_addr(), "0.0.0.0:9041");
    }

    #[test]
    fn test_session_validity() {
        assert_eq!(minimal().session_validity(), chrono::Duration::hours(168));
    }
}
