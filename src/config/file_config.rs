use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub image_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub allocation_seed: Option<u64>,

    pub notifications: Option<NotificationsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Base URL of the etcd v3 JSON gateway, e.g. `http://localhost:2379`.
    pub etcd_url: Option<String>,
    pub key_prefix: Option<String>,
    pub timeout_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_nested_notifications_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
db_dir = "/var/lib/frames"
port = 8080
logging_level = "headers"

[notifications]
etcd_url = "http://etcd:2379"
key_prefix = "/frames"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.db_dir.as_deref(), Some("/var/lib/frames"));
        assert_eq!(config.port, Some(8080));
        assert!(config.image_dir.is_none());
        let notifications = config.notifications.unwrap();
        assert_eq!(notifications.etcd_url.as_deref(), Some("http://etcd:2379"));
        assert_eq!(notifications.key_prefix.as_deref(), Some("/frames"));
        assert!(notifications.timeout_sec.is_none());
    }

    #[test]
    fn rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
