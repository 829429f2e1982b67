//! Correlation table
//!
//! Maps request ids to the listener waiting for replies to that id. Owned by one
//! client; several clients in one process share nothing.
//!
//! ```text
//! register() ──► PendingReply(id) ──next()──► RpcResponse for id, in arrival order
//!                     │
//!                   drop ──► listener removed, late replies are discarded
//! ```

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use veil_types::RpcResponse;

use crate::error::{Result, TransportError};

type Listener = mpsc::UnboundedSender<RpcResponse>;

#[derive(Default)]
struct State {
    listeners: HashMap<u64, Listener>,
    closed: bool,
}

pub struct CorrelationTable {
    next_id: AtomicU64,
    state: Mutex<State>,
}

impl CorrelationTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            state: Mutex::new(State::default()),
        })
    }

    /// Allocate an id and register a listener for it
    pub fn register(self: &Arc<Self>) -> Result<PendingReply> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut state = self.state.lock();
        if state.closed {
            return Err(TransportError::ConnectionClosed);
        }
        state.listeners.insert(id, tx);
        drop(state);

        Ok(PendingReply {
            id,
            table: Arc::clone(self),
            replies: rx,
        })
    }

    /// Route one inbound text frame to its listener
    pub fn dispatch_text(&self, text: &str) {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, len = text.len(), "Dropping malformed frame");
                return;
            }
        };

        match serde_json::from_value::<RpcResponse>(value) {
            Ok(response) => self.dispatch(response),
            Err(e) => warn!(error = %e, "Dropping frame that is not a JSON-RPC response"),
        }
    }

    pub fn dispatch(&self, response: RpcResponse) {
        let Some(id) = response.numeric_id() else {
            warn!(id = ?response.id, "Dropping reply without a numeric id");
            return;
        };

        let state = self.state.lock();
        match state.listeners.get(&id) {
            Some(listener) => {
                if listener.send(response).is_err() {
                    debug!(id, "Listener gone before reply was delivered");
                }
            }
            None => debug!(id, "No registered listener, dropping reply"),
        }
    }

    /// Fail every pending request and refuse new ones
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        let dropped = state.listeners.len();
        state.listeners.clear();
        if dropped > 0 {
            debug!(pending = dropped, "Correlation table closed with pending requests");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of registered listeners
    pub fn pending(&self) -> usize {
        self.state.lock().listeners.len()
    }

    fn deregister(&self, id: u64) {
        self.state.lock().listeners.remove(&id);
    }
}

/// Receiving half of one registered request. Dropping it deregisters the id.
pub struct PendingReply {
    id: u64,
    table: Arc<CorrelationTable>,
    replies: mpsc::UnboundedReceiver<RpcResponse>,
}

impl PendingReply {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next reply for this id
    pub async fn next(&mut self) -> Result<RpcResponse> {
        match self.replies.recv().await {
            Some(response) => self.check(response),
            None => Err(TransportError::ConnectionClosed),
        }
    }

    /// Next reply if one is already queued
    pub fn try_next(&mut self) -> Option<Result<RpcResponse>> {
        match self.replies.try_recv() {
            Ok(response) => Some(self.check(response)),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => Some(Err(TransportError::ConnectionClosed)),
        }
    }

    fn check(&self, mut response: RpcResponse) -> Result<RpcResponse> {
        let actual = response.numeric_id();
        if actual != Some(self.id) {
            return Err(TransportError::IdMismatch {
                expected: self.id,
                actual,
            });
        }
        if let Some(error) = response.error.take() {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response)
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.table.deregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(id: u64, result: &str) -> String {
        json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string()
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let table = CorrelationTable::new();
        let a = table.register().unwrap();
        let b = table.register().unwrap();
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert_eq!(table.pending(), 2);
    }

    #[test]
    fn test_replies_are_not_cross_delivered() {
        let table = CorrelationTable::new();
        let mut a = table.register().unwrap();
        let mut b = table.register().unwrap();

        table.dispatch_text(&reply(b.id(), "0xbb"));
        assert!(a.try_next().is_none());

        let got = b.try_next().unwrap().unwrap();
        assert_eq!(got.result, Some(json!("0xbb")));

        table.dispatch_text(&reply(a.id(), "0xaa"));
        assert_eq!(a.try_next().unwrap().unwrap().result, Some(json!("0xaa")));
        assert!(b.try_next().is_none());
    }

    #[test]
    fn test_replies_keep_arrival_order() {
        let table = CorrelationTable::new();
        let mut pending = table.register().unwrap();
        for result in ["0x01", "0x02", "0x03"] {
            table.dispatch_text(&reply(pending.id(), result));
        }
        for expected in ["0x01", "0x02", "0x03"] {
            assert_eq!(pending.try_next().unwrap().unwrap().result, Some(json!(expected)));
        }
    }

    #[test]
    fn test_drop_deregisters() {
        let table = CorrelationTable::new();
        let pending = table.register().unwrap();
        let id = pending.id();
        drop(pending);
        assert_eq!(table.pending(), 0);

        // a late reply has nowhere to go
        table.dispatch_text(&reply(id, "0x"));
    }

    #[tokio::test]
    async fn test_close_fails_pending_and_new_requests() {
        let table = CorrelationTable::new();
        let mut pending = table.register().unwrap();
        table.close();

        assert_eq!(pending.next().await.unwrap_err(), TransportError::ConnectionClosed);
        assert!(matches!(table.register(), Err(TransportError::ConnectionClosed)));
        assert!(table.is_closed());
    }

    #[test]
    fn test_rpc_error_member() {
        let table = CorrelationTable::new();
        let mut pending = table.register().unwrap();
        let frame = json!({
            "jsonrpc": "2.0",
            "id": pending.id(),
            "error": {"code": -32601, "message": "Method not found"}
        });
        table.dispatch_text(&frame.to_string());

        assert_eq!(
            pending.try_next().unwrap().unwrap_err(),
            TransportError::Rpc {
                code: -32601,
                message: "Method not found".to_string()
            }
        );
    }

    #[test]
    fn test_garbage_frames_are_ignored() {
        let table = CorrelationTable::new();
        let mut pending = table.register().unwrap();
        table.dispatch_text("not json");
        table.dispatch_text(r#"{"jsonrpc":"2.0","result":"0x"}"#);
        table.dispatch_text(r#"{"id":"abc","result":"0x"}"#);
        assert!(pending.try_next().is_none());
    }
}
