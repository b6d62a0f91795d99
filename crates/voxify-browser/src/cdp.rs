//! Low-level CDP (Chrome DevTools Protocol) WebSocket client.
//!
//! Speaks the DevTools JSON-RPC dialect over a WebSocket: commands carry an
//! auto-incrementing `id` and are correlated back to their responses, while
//! messages without an `id` are events and are forwarded to an event channel.
//!
//! A background task owns the read half of the socket; callers share the
//! write half behind a mutex. Every command wait is bounded by a timeout.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::BrowserError;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>>;

/// Default bound on how long a single command may wait for its response.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A CDP event pushed by the browser (a message with `method` but no `id`).
#[derive(Debug, Clone)]
pub struct CdpEvent {
    /// Event method name, e.g. `Page.lifecycleEvent`.
    pub method: String,
    /// Event parameters.
    pub params: Value,
}

/// A command sent to the browser.
#[derive(Debug, Clone, serde::Serialize)]
struct CdpCommand {
    id: u64,
    method: String,
    params: Value,
}

/// A response correlated to a previously sent command.
#[derive(Debug, Clone)]
pub struct CdpResponse {
    pub id: u64,
    pub result: Option<Value>,
    pub error: Option<CdpResponseError>,
}

/// Error object carried inside a CDP response.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CdpResponseError {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

// ---------------------------------------------------------------------------
// CdpClient
// ---------------------------------------------------------------------------

/// CDP client bound to one page target.
pub struct CdpClient {
    next_id: AtomicU64,
    pending: PendingMap,
    writer: Arc<Mutex<WsSink>>,
    event_rx: mpsc::UnboundedReceiver<CdpEvent>,
    _reader_handle: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a DevTools page target WebSocket
    /// (`ws://127.0.0.1:{port}/devtools/page/{target_id}`).
    pub async fn connect(ws_url: &str) -> Result<Self, BrowserError> {
        tracing::debug!(url = ws_url, "connecting to DevTools WebSocket");

        let (stream, _) = tokio_tungstenite::connect_async(ws_url).await.map_err(|e| {
            BrowserError::ConnectionFailed {
                url: ws_url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let (writer, reader) = stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let pending_for_reader = Arc::clone(&pending);
        let reader_handle = tokio::spawn(async move {
            read_loop(reader, pending_for_reader, event_tx).await;
        });

        Ok(Self {
            next_id: AtomicU64::new(1),
            pending,
            writer: Arc::new(Mutex::new(writer)),
            event_rx,
            _reader_handle: reader_handle,
        })
    }

    /// Send a command and wait for its response with the default timeout.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, BrowserError> {
        self.send_command_with_timeout(method, params, DEFAULT_COMMAND_TIMEOUT)
            .await
    }

    /// Send a command and wait for its response with an explicit timeout.
    pub async fn send_command_with_timeout(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, BrowserError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let command = CdpCommand {
            id,
            method: method.to_string(),
            params,
        };
        let payload = serde_json::to_string(&command).map_err(|e| BrowserError::Protocol {
            detail: format!("failed to serialize command: {e}"),
        })?;

        tracing::trace!(id, method, "sending CDP command");

        // Register the waiter before sending so the response cannot race us.
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        {
            let mut writer = self.writer.lock().await;
            writer
                .send(Message::Text(payload.into()))
                .await
                .map_err(|e| BrowserError::Protocol {
                    detail: format!("failed to send WebSocket message: {e}"),
                })?;
        }

        let response = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(BrowserError::Protocol {
                    detail: "response channel closed unexpectedly".to_string(),
                })
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(BrowserError::CommandTimeout {
                    method: method.to_string(),
                    duration: timeout,
                });
            }
        };

        if let Some(err) = response.error {
            return Err(BrowserError::Cdp {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Receive the next event, waiting if none is queued.
    ///
    /// Returns `None` once the WebSocket has disconnected.
    pub async fn recv_event(&mut self) -> Option<CdpEvent> {
        self.event_rx.recv().await
    }

    /// Drain any already-queued events without waiting.
    pub fn drain_events(&mut self) {
        while self.event_rx.try_recv().is_ok() {}
    }

    /// Enable a CDP domain (`Page`, `DOM`, `Runtime`, ...). Many domains emit
    /// no events until explicitly enabled.
    pub async fn enable_domain(&self, domain: &str) -> Result<(), BrowserError> {
        self.send_command(&format!("{domain}.enable"), serde_json::json!({}))
            .await?;
        Ok(())
    }
}

/// Background task: read messages off the socket and dispatch them either to
/// a pending command waiter (messages with `id`) or to the event channel.
async fn read_loop(mut reader: WsSource, pending: PendingMap, event_tx: mpsc::UnboundedSender<CdpEvent>) {
    while let Some(next) = reader.next().await {
        let message = match next {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "WebSocket read error, stopping reader");
                break;
            }
        };

        let text = match message {
            Message::Text(t) => t.to_string(),
            Message::Binary(b) => match String::from_utf8(b.to_vec()) {
                Ok(s) => s,
                Err(_) => continue,
            },
            Message::Close(_) => {
                tracing::debug!("WebSocket closed by remote");
                break;
            }
            _ => continue,
        };

        let json: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparseable CDP message");
                continue;
            }
        };

        if let Some(response) = parse_cdp_response(&json) {
            let mut pending = pending.lock().await;
            if let Some(tx) = pending.remove(&response.id) {
                let _ = tx.send(response);
            } else {
                tracing::trace!(id = response.id, "response for unknown command id");
            }
        } else if let Some(event) = parse_cdp_event(&json) {
            // Nobody listening is fine; the event is simply dropped.
            let _ = event_tx.send(event);
        }
    }

    // Connection gone: fail every outstanding command instead of hanging it.
    let mut pending = pending.lock().await;
    for (id, tx) in pending.drain() {
        let _ = tx.send(CdpResponse {
            id,
            result: None,
            error: Some(CdpResponseError {
                code: -1,
                message: "WebSocket connection closed".to_string(),
                data: None,
            }),
        });
    }
}

// ---------------------------------------------------------------------------
// Message parsing
// ---------------------------------------------------------------------------

/// Parse a CDP response. Responses are the messages that carry an `id`.
pub fn parse_cdp_response(json: &Value) -> Option<CdpResponse> {
    let id = json.get("id")?.as_u64()?;
    Some(CdpResponse {
        id,
        result: json.get("result").cloned(),
        error: json
            .get("error")
            .and_then(|e| serde_json::from_value(e.clone()).ok()),
    })
}

/// Parse a CDP event. Events carry a `method` and no `id`.
pub fn parse_cdp_event(json: &Value) -> Option<CdpEvent> {
    if json.get("id").is_some() {
        return None;
    }
    let method = json.get("method")?.as_str()?.to_string();
    let params = json.get("params").cloned().unwrap_or(Value::Null);
    Some(CdpEvent { method, params })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = CdpCommand {
            id: 7,
            method: "Page.navigate".to_string(),
            params: serde_json::json!({ "url": "https://www.turbify.com" }),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["method"], "Page.navigate");
        assert_eq!(json["params"]["url"], "https://www.turbify.com");
    }

    #[test]
    fn test_parse_response_success() {
        let json = serde_json::json!({
            "id": 3,
            "result": { "frameId": "F1" }
        });
        let resp = parse_cdp_response(&json).unwrap();
        assert_eq!(resp.id, 3);
        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap()["frameId"], "F1");
    }

    #[test]
    fn test_parse_response_error() {
        let json = serde_json::json!({
            "id": 4,
            "error": { "code": -32000, "message": "Cannot navigate" }
        });
        let resp = parse_cdp_response(&json).unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "Cannot navigate");
        assert!(err.data.is_none());
    }

    #[test]
    fn test_event_is_not_a_response() {
        let json = serde_json::json!({
            "method": "Page.lifecycleEvent",
            "params": { "name": "networkIdle" }
        });
        assert!(parse_cdp_response(&json).is_none());
        let event = parse_cdp_event(&json).unwrap();
        assert_eq!(event.method, "Page.lifecycleEvent");
        assert_eq!(event.params["name"], "networkIdle");
    }

    #[test]
    fn test_response_is_not_an_event() {
        let json = serde_json::json!({
            "id": 1,
            "result": {}
        });
        assert!(parse_cdp_event(&json).is_none());
    }

    #[test]
    fn test_event_without_params() {
        let json = serde_json::json!({ "method": "Page.loadEventFired" });
        let event = parse_cdp_event(&json).unwrap();
        assert_eq!(event.params, Value::Null);
    }
}
