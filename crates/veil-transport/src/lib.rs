//! # Veil Transport
//!
//! JSON-RPC 2.0 over a single long-lived WebSocket to an enclave worker.
//!
//! - [`correlation`]: request ids and per-id reply routing
//! - [`client`]: the connection, its I/O task and the submit/request calls
//!
//! ```rust,ignore
//! let client = WorkerClient::connect("ws://127.0.0.1:2000").await?;
//! let reply = client
//!     .submit_with_observer(methods::AUTHOR_REQUEST_VC, request.to_hex(), |interim| {
//!         println!("{:?}", interim.status);
//!     })
//!     .await?;
//! ```

pub mod client;
pub mod correlation;
pub mod error;

pub use client::WorkerClient;
pub use correlation::{CorrelationTable, PendingReply};
pub use error::{Result, TransportError};

pub use tokio_tungstenite::tungstenite::Message;
pub use tokio_tungstenite::{tungstenite, WebSocketStream};
