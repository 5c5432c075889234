//! Test server lifecycle management

use super::constants::*;
use photoframe_server::{
    make_app, FrameManager, RecordingSink, RequestsLoggingLevel, ServerConfig, SqliteFrameStore,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A running server with an isolated database.
///
/// The server shuts down when this is dropped.
pub struct TestServer {
    pub base_url: String,
    pub port: u16,
    /// Everything the server pushed to frames
    pub sink: Arc<RecordingSink>,
    /// Direct access for setting up fixtures without going through HTTP
    pub manager: Arc<FrameManager>,
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SqliteFrameStore::new(temp_db_dir.path().join("frames.db"))
            .expect("Failed to open frame store");

        let sink = Arc::new(RecordingSink::new());
        let manager = Arc::new(FrameManager::new(
            store,
            sink.clone(),
            Some(ALLOCATION_SEED),
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().unwrap().port();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            image_dir: None,
        };
        let app = make_app(config, manager.clone()).expect("Failed to build app");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            port,
            sink,
            manager,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
