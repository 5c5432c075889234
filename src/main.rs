use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use photoframe_server::config::{AppConfig, CliConfig, FileConfig};
use photoframe_server::{
    run_server, EtcdSink, FrameManager, NoOpSink, NotificationSink, RequestsLoggingLevel,
    ServerConfig, SqliteFrameStore,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding frames.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 5000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Directory of picture files served to frames. Defaults to <db-dir>/images.
    #[clap(long, value_parser = parse_path)]
    pub image_dir: Option<PathBuf>,

    /// Base URL of the etcd gateway frames watch. Without it frames are not notified.
    #[clap(long)]
    pub etcd_url: Option<String>,

    /// Prefix of the etcd keys written for frames.
    #[clap(long)]
    pub key_prefix: Option<String>,

    /// Seed for the random allocation of images to frames.
    #[clap(long)]
    pub allocation_seed: Option<u64>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            image_dir: self.image_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            etcd_url: self.etcd_url.clone(),
            key_prefix: self.key_prefix.clone(),
            allocation_seed: self.allocation_seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening frames database at {:?}...", config.frames_db_path());
    let store = SqliteFrameStore::new(config.frames_db_path())?;

    let sink: Arc<dyn NotificationSink> = match &config.notifications {
        Some(settings) => {
            info!("Notifying frames through etcd at {}", settings.etcd_url);
            Arc::new(EtcdSink::new(
                &settings.etcd_url,
                &settings.key_prefix,
                settings.timeout,
            )?)
        }
        None => {
            info!("No etcd URL configured, frames will not be notified");
            Arc::new(NoOpSink)
        }
    };

    let manager = Arc::new(FrameManager::new(store, sink, config.allocation_seed));

    if !config.image_dir.is_dir() {
        info!("Image directory {:?} does not exist yet", config.image_dir);
    }
    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        image_dir: Some(config.image_dir.clone()),
    };
    run_server(server_config, manager).await
}
