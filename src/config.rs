/// Configuration management for the RSVP board
use crate::error::{RsvpError, RsvpResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Individual RSVP reset interval (12 hours in milliseconds)
pub const DEFAULT_RESET_INTERVAL_MS: u64 = 12 * 60 * 60 * 1000;

/// Sweep cadence of the expiry job
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Largest accepted avatar upload (2MB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub keys: StorageKeys,
    pub rsvp: RsvpConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub backend: StorageBackendConfig,
    /// Account directory file, loaded once at startup
    pub roster_path: PathBuf,
}

/// Key/value backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageBackendConfig {
    Disk { location: PathBuf },
    Memory,
}

/// Names of the three persisted blobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageKeys {
    pub session: String,
    pub records: String,
    pub custom_images: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            session: "rsvp_session".to_string(),
            records: "rsvp_records_v2".to_string(),
            custom_images: "rsvp_custom_images".to_string(),
        }
    }
}

/// RSVP timer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsvpConfig {
    pub reset_interval_ms: u64,
    pub tick_interval_ms: u64,
    /// Run an expiry sweep before status and count reads
    pub sweep_on_read: bool,
}

impl Default for RsvpConfig {
    fn default() -> Self {
        Self {
            reset_interval_ms: DEFAULT_RESET_INTERVAL_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            sweep_on_read: true,
        }
    }
}

impl RsvpConfig {
    pub fn reset_interval(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.reset_interval_ms as i64)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

/// Avatar upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_image_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for AppConfig {
    /// In-memory configuration, mostly for tests and embedding
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_directory: PathBuf::from("./data"),
                backend: StorageBackendConfig::Memory,
                roster_path: PathBuf::from("./data/roster.json"),
            },
            keys: StorageKeys::default(),
            rsvp: RsvpConfig::default(),
            upload: UploadConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> RsvpResult<Self> {
        dotenv::dotenv().ok();

        let data_directory: PathBuf = env::var("RSVP_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let backend = match env::var("RSVP_STORAGE_BACKEND")
            .unwrap_or_else(|_| "disk".to_string())
            .to_lowercase()
            .as_str()
        {
            "disk" => StorageBackendConfig::Disk {
                location: env::var("RSVP_STORAGE_DISK_LOCATION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("store")),
            },
            "memory" => StorageBackendConfig::Memory,
            other => {
                return Err(RsvpError::Validation(format!(
                    "Unknown storage backend: {}",
                    other
                )))
            }
        };

        let roster_path = env::var("RSVP_ROSTER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("roster.json"));

        let defaults = StorageKeys::default();
        let keys = StorageKeys {
            session: env::var("RSVP_SESSION_KEY").unwrap_or(defaults.session),
            records: env::var("RSVP_RECORDS_KEY").unwrap_or(defaults.records),
            custom_images: env::var("RSVP_CUSTOM_IMAGES_KEY").unwrap_or(defaults.custom_images),
        };

        let reset_interval_ms = parse_env("RSVP_RESET_INTERVAL_MS", DEFAULT_RESET_INTERVAL_MS)?;
        let tick_interval_ms = parse_env("RSVP_TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS)?;
        let sweep_on_read = parse_env("RSVP_SWEEP_ON_READ", true)?;
        let max_image_bytes = parse_env("RSVP_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(AppConfig {
            storage: StorageConfig {
                data_directory,
                backend,
                roster_path,
            },
            keys,
            rsvp: RsvpConfig {
                reset_interval_ms,
                tick_interval_ms,
                sweep_on_read,
            },
            upload: UploadConfig { max_image_bytes },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> RsvpResult<()> {
        if self.rsvp.reset_interval_ms == 0 {
            return Err(RsvpError::Validation(
                "Reset interval must be greater than zero".to_string(),
            ));
        }

        if self.rsvp.reset_interval_ms > i64::MAX as u64 {
            return Err(RsvpError::Validation(
                "Reset interval is out of range".to_string(),
            ));
        }

        if self.rsvp.tick_interval_ms == 0 {
            return Err(RsvpError::Validation(
                "Tick interval must be greater than zero".to_string(),
            ));
        }

        if self.upload.max_image_bytes == 0 {
            return Err(RsvpError::Validation(
                "Image upload limit must be greater than zero".to_string(),
            ));
        }

        let keys = [
            &self.keys.session,
            &self.keys.records,
            &self.keys.custom_images,
        ];
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(RsvpError::Validation(
                "Storage key names cannot be empty".to_string(),
            ));
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(RsvpError::Validation(
                "Storage key names must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}

/// Read a typed variable, falling back to `default` only when it is unset
fn parse_env<T>(name: &str, default: T) -> RsvpResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| RsvpError::Validation(format!("Invalid {}={:?}: {}", name, raw, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_rejects_malformed_values() {
        env::set_var("RSVP_TEST_PARSE_FLAG", "yes");
        env::set_var("RSVP_TEST_PARSE_BYTES", "2MB");
        env::set_var("RSVP_TEST_PARSE_OK", " 1024 ");

        assert!(matches!(
            parse_env("RSVP_TEST_PARSE_FLAG", true),
            Err(RsvpError::Validation(_))
        ));
        assert!(matches!(
            parse_env("RSVP_TEST_PARSE_BYTES", DEFAULT_MAX_IMAGE_BYTES),
            Err(RsvpError::Validation(_))
        ));
        assert_eq!(parse_env("RSVP_TEST_PARSE_OK", 0usize).unwrap(), 1024);
        assert!(!parse_env("RSVP_TEST_PARSE_UNSET", false).unwrap());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rsvp.reset_interval_ms, 43_200_000);
        assert_eq!(config.upload.max_image_bytes, 2_097_152);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_reset_interval_conversion() {
        let rsvp = RsvpConfig::default();
        assert_eq!(rsvp.reset_interval(), chrono::Duration::hours(12));
        assert_eq!(rsvp.tick_interval(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_zero_intervals() {
        let mut config = AppConfig::default();
        config.rsvp.reset_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.rsvp.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_colliding_keys() {
        let mut config = AppConfig::default();
        config.keys.custom_images = config.keys.records.clone();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.keys.session = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
