//! WebSocket JSON-RPC client
//!
//! One I/O task per connection owns the socket. Callers hand it outbound frames over
//! a channel and wait on their own [`PendingReply`]; nothing blocks a thread.

use futures::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};
use veil_types::{
    to_hex, DirectRequestStatus, RpcRequest, RpcResponse, RpcReturnValue, TrustedOperationStatus,
};

use crate::correlation::{CorrelationTable, PendingReply};
use crate::error::{Result, TransportError};

/// Connection to one worker endpoint
pub struct WorkerClient {
    endpoint: String,
    table: Arc<CorrelationTable>,
    outbound: mpsc::UnboundedSender<Message>,
    io_task: JoinHandle<()>,
}

impl WorkerClient {
    /// Open a websocket to `endpoint`
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let (stream, _) = tokio_tungstenite::connect_async(endpoint)
            .await
            .map_err(|e| TransportError::Connect {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        info!(endpoint = %endpoint, "Connected to worker");
        Ok(Self::from_stream(endpoint, stream))
    }

    /// Drive an already established websocket
    pub fn from_stream<S>(endpoint: impl Into<String>, stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Message, tungstenite::Error>>
            + Sink<Message, Error = tungstenite::Error>
            + Send
            + Unpin
            + 'static,
    {
        let endpoint = endpoint.into();
        let table = CorrelationTable::new();
        let (outbound, rx) = mpsc::unbounded_channel();
        let io_task = tokio::spawn(run_io(stream, rx, Arc::clone(&table), endpoint.clone()));

        Self {
            endpoint,
            table,
            outbound,
            io_task,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.table.is_closed()
    }

    /// Requests still waiting for a final reply
    pub fn pending_requests(&self) -> usize {
        self.table.pending()
    }

    /// Submit a hex-encoded envelope and wait for the final reply
    pub async fn submit(&self, method: &str, envelope_hex: String) -> Result<RpcReturnValue> {
        self.submit_with_observer(method, envelope_hex, |_| {}).await
    }

    /// Like [`WorkerClient::submit`], calling `observer` on every `do_watch` reply
    pub async fn submit_with_observer<F>(
        &self,
        method: &str,
        envelope_hex: String,
        mut observer: F,
    ) -> Result<RpcReturnValue>
    where
        F: FnMut(&RpcReturnValue),
    {
        let mut pending = self.send(method, json!([envelope_hex]))?;
        loop {
            let reply = decode_reply(&pending.next().await?)?;
            debug!(
                id = pending.id(),
                do_watch = reply.do_watch,
                status = ?reply.status,
                "Received reply"
            );

            if reply.do_watch {
                observer(&reply);
                continue;
            }

            log_terminal_status(method, &reply);
            return Ok(reply);
        }
    }

    /// Single request with arbitrary params, decoding the first reply
    pub async fn request(&self, method: &str, params: Value) -> Result<RpcReturnValue> {
        let mut pending = self.send(method, params)?;
        let reply = decode_reply(&pending.next().await?)?;
        log_terminal_status(method, &reply);
        Ok(reply)
    }

    /// Single request returning the raw JSON `result`
    pub async fn request_raw(&self, method: &str, params: Value) -> Result<Value> {
        let mut pending = self.send(method, params)?;
        pending
            .next()
            .await?
            .result
            .ok_or_else(|| TransportError::MalformedReply("response has no result".to_string()))
    }

    /// Send a close frame. Pending requests fail with `ConnectionClosed`.
    pub fn disconnect(&self) {
        self.table.close();
        if self.outbound.send(Message::Close(None)).is_err() {
            debug!(endpoint = %self.endpoint, "Connection already gone");
        }
    }

    /// Close the socket and wait for the I/O task to finish
    pub async fn close(self) {
        let WorkerClient {
            endpoint,
            table,
            outbound,
            io_task,
        } = self;
        drop(outbound);
        if let Err(e) = io_task.await {
            warn!(endpoint = %endpoint, error = %e, "I/O task ended abnormally");
        }
        table.close();
    }

    fn send(&self, method: &str, params: Value) -> Result<PendingReply> {
        let pending = self.table.register()?;
        let request = RpcRequest::new(pending.id(), method, params);
        let text =
            serde_json::to_string(&request).map_err(|e| TransportError::MalformedJson(e.to_string()))?;

        self.outbound
            .send(Message::Text(text))
            .map_err(|_| TransportError::ConnectionClosed)?;
        debug!(id = pending.id(), method, "Sent request");
        Ok(pending)
    }
}

fn decode_reply(response: &RpcResponse) -> Result<RpcReturnValue> {
    response
        .return_value()
        .map_err(|e| TransportError::MalformedReply(e.to_string()))
}

fn log_terminal_status(method: &str, reply: &RpcReturnValue) {
    match reply.status {
        DirectRequestStatus::Error => {
            let message = reply
                .value_as_string()
                .unwrap_or_else(|_| to_hex(&reply.value));
            warn!(method, error = %message, "Worker returned error status");
        }
        DirectRequestStatus::TrustedOperationStatus(TrustedOperationStatus::Invalid, top_hash) => {
            warn!(
                method,
                top_hash = %to_hex(&top_hash),
                value = %to_hex(&reply.value),
                "Trusted operation is invalid"
            );
        }
        _ => {}
    }
}

async fn run_io<S>(
    stream: S,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    table: Arc<CorrelationTable>,
    endpoint: String,
) where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Send
        + Unpin
        + 'static,
{
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            message = outbound.recv() => match message {
                Some(message) => {
                    if let Err(e) = sink.send(message).await {
                        warn!(endpoint = %endpoint, error = %e, "Failed to send frame");
                        break;
                    }
                }
                None => {
                    if let Err(e) = sink.close().await {
                        debug!(endpoint = %endpoint, error = %e, "Failed to close WebSocket sink");
                    }
                    break;
                }
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => table.dispatch_text(&text),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => table.dispatch_text(&text),
                    Err(_) => warn!(endpoint = %endpoint, "Dropping non UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!(endpoint = %endpoint, ?frame, "Worker closed the connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(endpoint = %endpoint, error = %e, "WebSocket error");
                    break;
                }
                None => break,
            },
        }
    }

    table.close();
    info!(endpoint = %endpoint, "Disconnected from worker");
}
