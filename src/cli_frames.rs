use anyhow::{anyhow, Result};
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use photoframe_server::frame_store::Orientation;
use photoframe_server::{EtcdSink, FrameManager, NoOpSink, NotificationSink, SqliteFrameStore};

fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_orientation(s: &str) -> Result<Orientation> {
    Orientation::from_db_str(&s.to_uppercase())
        .ok_or_else(|| anyhow!("orientation must be one of H, V, S"))
}

#[derive(Parser)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Directory holding frames.db.
    #[clap(long, value_parser = parse_path)]
    db_dir: PathBuf,

    /// Base URL of the etcd gateway. Without it frames are not notified.
    #[clap(long)]
    etcd_url: Option<String>,

    #[clap(long, default_value = "")]
    key_prefix: String,

    /// Seed for the random allocation of images to frames.
    #[clap(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lists albums with their image counts.
    Albums {
        /// Hide sub-albums.
        #[clap(long)]
        top_level: bool,
    },

    /// Creates an empty album.
    CreateAlbum {
        name: String,
        #[clap(long, default_value = "H", value_parser = parse_orientation)]
        orientation: Orientation,
    },

    /// Deletes an album, its sub-albums and its memberships.
    DeleteAlbum { album_id: String },

    /// Adds an image to an album, allocating it to a sub-album if the album is split.
    AddImage { album_id: String, image_id: String },

    /// Removes an image from an album and rebalances its sub-albums.
    RemoveImage { album_id: String, image_id: String },

    /// Lists frames.
    Frames,

    /// Shows the settings and playlist of a frame.
    Status { frame_id: String },

    /// Lists framesets.
    Framesets,

    /// Creates an empty frameset.
    CreateFrameset {
        name: String,
        #[clap(long, default_value = "H", value_parser = parse_orientation)]
        orientation: Orientation,
    },

    /// Replaces the frames of a frameset.
    AssignFrames {
        frameset_id: String,
        frame_ids: Vec<String>,
    },

    /// Splits an album across the frames of a frameset. Omit the album to clear it.
    AssignAlbum {
        frameset_id: String,
        album_id: Option<String>,
    },

    /// Tells a frame to show another photo.
    Navigate {
        frame_id: String,
        #[clap(default_value = "next")]
        direction: String,
    },

    /// Reboots a frame.
    Reboot { frame_id: String },

    /// Restarts the screen of a frame.
    RestartScreen { frame_id: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn execute(manager: &FrameManager, command: Command) -> Result<()> {
    match command {
        Command::Albums { top_level } => print_json(&manager.list_albums(top_level)?),
        Command::CreateAlbum { name, orientation } => {
            print_json(&manager.create_album(&name, orientation)?)
        }
        Command::DeleteAlbum { album_id } => Ok(manager.delete_album(&album_id)?),
        Command::AddImage { album_id, image_id } => {
            if !manager.add_image_to_album(&album_id, &image_id)? {
                println!("Image {} was already in album {}", image_id, album_id);
            }
            Ok(())
        }
        Command::RemoveImage { album_id, image_id } => {
            if !manager.remove_image_from_album(&album_id, &image_id)? {
                println!("Image {} was not in album {}", image_id, album_id);
            }
            Ok(())
        }
        Command::Frames => print_json(&manager.list_frames()?),
        Command::Status { frame_id } => print_json(&manager.frame_status(&frame_id)?),
        Command::Framesets => print_json(&manager.list_framesets(None)?),
        Command::CreateFrameset { name, orientation } => {
            print_json(&manager.create_frameset(&name, orientation)?)
        }
        Command::AssignFrames {
            frameset_id,
            frame_ids,
        } => print_json(&manager.assign_frames(&frameset_id, &frame_ids)?),
        Command::AssignAlbum {
            frameset_id,
            album_id,
        } => print_json(&manager.assign_album(&frameset_id, album_id.as_deref())?),
        Command::Navigate {
            frame_id,
            direction,
        } => Ok(manager.navigate(&frame_id, &direction)?),
        Command::Reboot { frame_id } => Ok(manager.reboot(&frame_id)?),
        Command::RestartScreen { frame_id } => Ok(manager.restart_screen(&frame_id)?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let store = SqliteFrameStore::new(cli_args.db_dir.join("frames.db"))?;

    let etcd = match &cli_args.etcd_url {
        Some(url) => Some(Arc::new(EtcdSink::new(
            url,
            &cli_args.key_prefix,
            Duration::from_secs(5),
        )?)),
        None => None,
    };
    let sink: Arc<dyn NotificationSink> = match &etcd {
        Some(etcd) => etcd.clone() as Arc<dyn NotificationSink>,
        None => Arc::new(NoOpSink),
    };

    let manager = FrameManager::new(store, sink, cli_args.seed);
    let result = execute(&manager, cli_args.command);

    // Let pending notifications leave before the runtime shuts down.
    if let Some(etcd) = etcd {
        etcd.drain().await;
    }
    result
}
