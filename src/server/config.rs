use super::RequestsLoggingLevel;
use std::path::PathBuf;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Directory served under `/images`, where frames download pictures from.
    pub image_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 5000,
            image_dir: None,
        }
    }
}
