//! # Veil RPC
//!
//! Typed client for an enclave worker's trusted RPC surface.
//!
//! ```rust,ignore
//! let api = WorkerApi::connect(&WorkerConfig::from_env()?).await?;
//! let nonce = api.next_nonce(&signer.identity()).await?;
//! let call = build_call(variant, &args, &signer, api.shard(), nonce, false).await?;
//! let outcome = api.submit_call(call, &AesKey::generate(), |_| {}).await?;
//! outcome.into_result()?;
//! ```

pub mod error;
pub mod outcome;
pub mod worker;

pub use error::{ApiError, Result};
pub use outcome::CallOutcome;
pub use worker::{
    fetch_metadata, fetch_scheduled_enclaves, fetch_shielding_key, latest_enclave, RsaMethod,
    ScheduledEnclaves, SidechainBlock, WorkerApi,
};
