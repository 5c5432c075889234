mod file_config;

pub use file_config::{FileConfig, NotificationsConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub image_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub etcd_url: Option<String>,
    pub key_prefix: Option<String>,
    pub allocation_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub image_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub allocation_seed: Option<u64>,

    /// None when frames are not notified at all.
    pub notifications: Option<NotificationSettings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSettings {
    pub etcd_url: String,
    pub key_prefix: String,
    pub timeout: Duration,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let image_dir = file
            .image_dir
            .map(PathBuf::from)
            .or_else(|| cli.image_dir.clone())
            .unwrap_or_else(|| db_dir.join("images"));

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let allocation_seed = file.allocation_seed.or(cli.allocation_seed);

        let notifications_file = file.notifications.unwrap_or_default();
        let notifications = notifications_file
            .etcd_url
            .or_else(|| cli.etcd_url.clone())
            .map(|etcd_url| NotificationSettings {
                etcd_url,
                key_prefix: notifications_file
                    .key_prefix
                    .or_else(|| cli.key_prefix.clone())
                    .unwrap_or_default(),
                timeout: Duration::from_secs(notifications_file.timeout_sec.unwrap_or(5)),
            });

        Ok(Self {
            db_dir,
            image_dir,
            port,
            logging_level,
            allocation_seed,
            notifications,
        })
    }

    pub fn frames_db_path(&self) -> PathBuf {
        self.db_dir.join("frames.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
