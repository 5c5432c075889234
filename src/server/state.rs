use axum::extract::FromRef;

use crate::photoframes::FrameManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedFrameManager = Arc<FrameManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub manager: GuardedFrameManager,
}

impl ServerState {
    pub fn new(config: ServerConfig, manager: GuardedFrameManager) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            manager,
        }
    }
}

impl FromRef<ServerState> for GuardedFrameManager {
    fn from_ref(input: &ServerState) -> Self {
        input.manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
