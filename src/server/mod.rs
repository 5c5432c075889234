mod album_routes;
pub mod config;
mod frame_routes;
mod http_layers;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
