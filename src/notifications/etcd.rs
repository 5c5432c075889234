//! Publishes frame messages as keys in etcd through its v3 JSON gateway.
//!
//! Each message becomes a PUT of `"{prefix}/{frame_id}:{topic}"` whose value is the
//! JSON-encoded payload. Frames watch their own keys.

use super::sink::{NotificationSink, Topic};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct EtcdSink {
    client: reqwest::Client,
    put_url: String,
    key_prefix: String,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl EtcdSink {
    pub fn new(base_url: &str, key_prefix: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build etcd HTTP client")?;
        Ok(Self {
            client,
            put_url: format!("{}/v3/kv/put", base_url.trim_end_matches('/')),
            key_prefix: key_prefix.trim_end_matches('/').to_string(),
            in_flight: Mutex::new(Vec::new()),
        })
    }

    pub fn key_for(&self, target_id: &str, topic: Topic) -> String {
        format!("{}/{}:{}", self.key_prefix, target_id, topic.as_str())
    }

    pub fn put_body(key: &str, payload: &Value) -> Value {
        json!({
            "key": STANDARD.encode(key),
            "value": STANDARD.encode(payload.to_string()),
        })
    }

    /// Waits for every delivery started so far. Useful for short-lived processes
    /// that would otherwise exit before their messages leave.
    pub async fn drain(&self) {
        let handles = std::mem::take(&mut *self.in_flight.lock().unwrap());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("etcd delivery task failed: {}", e);
            }
        }
    }
}

async fn deliver(client: reqwest::Client, url: String, key: String, body: Value) {
    match client.post(&url).json(&body).send().await {
        Ok(response) if response.status().is_success() => {
            debug!("Published {}", key);
        }
        Ok(response) => {
            warn!("etcd rejected {}: HTTP {}", key, response.status());
        }
        Err(e) => {
            warn!("Failed to publish {}: {}", key, e);
        }
    }
}

impl NotificationSink for EtcdSink {
    fn publish(&self, target_id: &str, topic: Topic, payload: Value) {
        let key = self.key_for(target_id, topic);
        let body = Self::put_body(&key, &payload);
        let client = self.client.clone();
        let url = self.put_url.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(deliver(client, url, key, body));
                let mut in_flight = self.in_flight.lock().unwrap();
                in_flight.retain(|h| !h.is_finished());
                in_flight.push(task);
            }
            Err(_) => {
                // No runtime on this thread: deliver from a throwaway one.
                std::thread::spawn(move || {
                    match tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                    {
                        Ok(rt) => rt.block_on(deliver(client, url, key, body)),
                        Err(e) => warn!("Could not start runtime to publish {}: {}", key, e),
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::post, Json, Router};
    use std::sync::Arc;

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn record_put(State(received): State<Received>, Json(body): Json<Value>) -> Json<Value> {
        received.lock().unwrap().push(body);
        Json(json!({}))
    }

    fn decode(field: &Value) -> String {
        let bytes = STANDARD.decode(field.as_str().unwrap()).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn key_and_body_encoding() {
        let sink = EtcdSink::new("http://localhost:2379/", "", Duration::from_secs(1)).unwrap();
        let key = sink.key_for("frame-1", Topic::Images);
        assert_eq!(key, "/frame-1:images");
        assert_eq!(sink.put_url, "http://localhost:2379/v3/kv/put");

        let body = EtcdSink::put_body(&key, &json!(["a.jpg", "b.jpg"]));
        assert_eq!(decode(&body["key"]), "/frame-1:images");
        assert_eq!(decode(&body["value"]), r#"["a.jpg","b.jpg"]"#);
    }

    #[test]
    fn key_prefix_is_prepended() {
        let sink = EtcdSink::new("http://x", "/frames/", Duration::from_secs(1)).unwrap();
        assert_eq!(sink.key_for("f", Topic::Reboot), "/frames/f:reboot");
    }

    #[tokio::test]
    async fn publishes_to_gateway() {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v3/kv/put", post(record_put))
            .with_state(received.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let sink = EtcdSink::new(&format!("http://{}", addr), "", Duration::from_secs(5)).unwrap();
        sink.publish("f9", Topic::ChangePhoto, json!("next"));
        sink.drain().await;

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(decode(&received[0]["key"]), "/f9:change_photo");
        assert_eq!(decode(&received[0]["value"]), "\"next\"");
    }

    #[tokio::test]
    async fn unreachable_gateway_is_not_fatal() {
        // Nothing listens on port 9 on loopback.
        let sink = EtcdSink::new("http://127.0.0.1:9", "", Duration::from_millis(500)).unwrap();
        sink.publish("f1", Topic::Images, json!([]));
        sink.drain().await;
    }
}
