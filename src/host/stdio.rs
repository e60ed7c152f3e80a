//! JSONL stdio bridge to a real host
//!
//! The browser side of the deployment (an extension or native-messaging
//! shim) speaks newline-delimited JSON over our stdin/stdout. Three message
//! kinds flow inbound: responses to our host calls, lifecycle events, and UI
//! requests. Outbound we write host calls, indicator updates, and UI
//! responses. The bridge is a transport adapter only; the engine sees it as
//! just another [`BrowserHost`] + [`IndicatorSink`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use crate::host::browser::{BrowserHost, IndicatorSink};
use crate::host::error::HostError;
use crate::host::events::HostEvent;
use crate::host::types::{LiveWindow, TabId, WindowId};

/// Inbound traffic that is not a response to one of our calls.
#[derive(Debug)]
pub enum Inbound {
    /// A window/tab lifecycle event.
    Event(HostEvent),
    /// A UI request; answer it with [`StdioHost::respond`] using the same id.
    Request { id: u64, payload: Value },
}

/// Incoming wire message.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum WireIn {
    Response {
        id: u64,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    },
    Event {
        event: HostEvent,
    },
    Request {
        id: u64,
        request: Value,
    },
}

/// Outgoing wire message.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum WireOut<'a> {
    Call {
        id: u64,
        method: &'a str,
        params: Value,
    },
    Response {
        id: u64,
        response: Value,
    },
}

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, String>>>>>;

/// Host bound to a JSONL peer on stdin/stdout.
#[derive(Clone)]
pub struct StdioHost {
    out_tx: mpsc::UnboundedSender<String>,
    pending: PendingMap,
    next_id: Arc<AtomicU64>,
}

impl StdioHost {
    /// Spawn reader and writer tasks over the given transport halves and
    /// return the host plus the channel of inbound events and UI requests.
    pub fn spawn<R, W>(reader: R, writer: W) -> (Self, mpsc::Receiver<Inbound>)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::channel::<Inbound>(64);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let host = Self {
            out_tx,
            pending: pending.clone(),
            next_id: Arc::new(AtomicU64::new(1)),
        };

        tokio::spawn(async move {
            let mut writer = writer;
            while let Some(line) = out_rx.recv().await {
                if writer.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if writer.write_all(b"\n").await.is_err() {
                    break;
                }
                if writer.flush().await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }

                tracing::trace!("wire raw line: {}", &line);

                let message = match serde_json::from_str::<WireIn>(&line) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!("Failed to parse wire line: {e}. Line: {line}");
                        continue;
                    }
                };

                match message {
                    WireIn::Response { id, result, error } => {
                        let sender = pending.lock().remove(&id);
                        if let Some(sender) = sender {
                            let outcome = match error {
                                Some(message) => Err(message),
                                None => Ok(result.unwrap_or(Value::Null)),
                            };
                            let _ = sender.send(outcome);
                        } else {
                            tracing::warn!(id, "Response for unknown call id");
                        }
                    }
                    WireIn::Event { event } => {
                        if in_tx.send(Inbound::Event(event)).await.is_err() {
                            break;
                        }
                    }
                    WireIn::Request { id, request } => {
                        if in_tx
                            .send(Inbound::Request {
                                id,
                                payload: request,
                            })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
            // Reader gone: fail anything still waiting.
            for (_, sender) in pending.lock().drain() {
                let _ = sender.send(Err("host disconnected".to_string()));
            }
        });

        (host, in_rx)
    }

    /// Answer a UI request received through the inbound channel.
    pub fn respond(&self, id: u64, response: Value) -> Result<(), HostError> {
        self.send(&WireOut::Response { id, response })
    }

    fn send(&self, message: &WireOut<'_>) -> Result<(), HostError> {
        let line = serde_json::to_string(message)
            .map_err(|e| HostError::Protocol(format!("failed to encode message: {e}")))?;
        self.out_tx
            .send(line)
            .map_err(|_| HostError::Disconnected)
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, HostError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        if let Err(e) = self.send(&WireOut::Call { id, method, params }) {
            self.pending.lock().remove(&id);
            return Err(e);
        }

        match rx.await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(message)) => Err(HostError::CallFailed(message)),
            Err(_) => Err(HostError::Disconnected),
        }
    }

    async fn call_decoded<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, HostError> {
        let result = self.call(method, params).await?;
        serde_json::from_value(result)
            .map_err(|e| HostError::Protocol(format!("bad result for {method}: {e}")))
    }
}

#[async_trait]
impl BrowserHost for StdioHost {
    async fn list_windows(&self) -> Result<Vec<LiveWindow>, HostError> {
        self.call_decoded("windows.getAll", serde_json::json!({ "populate": true }))
            .await
    }

    async fn get_window(&self, id: WindowId) -> Result<LiveWindow, HostError> {
        self.call_decoded(
            "windows.get",
            serde_json::json!({ "id": id, "populate": true }),
        )
        .await
    }

    async fn current_window(&self) -> Result<LiveWindow, HostError> {
        self.call_decoded("windows.getCurrent", serde_json::json!({ "populate": true }))
            .await
    }

    async fn create_window(&self, urls: Vec<String>) -> Result<LiveWindow, HostError> {
        self.call_decoded("windows.create", serde_json::json!({ "url": urls }))
            .await
    }

    async fn set_tab_pinned(&self, tab: TabId, pinned: bool) -> Result<(), HostError> {
        self.call("tabs.update", serde_json::json!({ "tab": tab, "pinned": pinned }))
            .await?;
        Ok(())
    }

    async fn close_tab(&self, tab: TabId) -> Result<(), HostError> {
        self.call("tabs.remove", serde_json::json!({ "tab": tab }))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IndicatorSink for StdioHost {
    async fn set_tab_text(&self, tab: TabId, text: &str) -> Result<(), HostError> {
        self.call(
            "indicator.setTabText",
            serde_json::json!({ "tab": tab, "text": text }),
        )
        .await?;
        Ok(())
    }

    async fn set_window_text(&self, window: &LiveWindow, text: &str) -> Result<(), HostError> {
        let tabs: Vec<TabId> = window.tabs.iter().map(|t| t.id).collect();
        self.call(
            "indicator.setWindowText",
            serde_json::json!({ "window": window.id, "tabs": tabs, "text": text }),
        )
        .await?;
        Ok(())
    }
}
