//! Scoped resource stack
//!
//! Builds a chain of resources where each step may depend on the previous ones
//! (socket, then shielding key, then metadata...). Every acquired step registers
//! its release action; the stack releases in reverse acquisition order, both on
//! [`ScopeStack::close`] and when a later acquire fails.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut scope = ScopeStack::new();
//! let client = scope
//!     .push("worker", || connect(url), |client| async move { client.close().await })
//!     .await?;
//! let key = scope.push("shielding-key", || fetch_key(&client), |_| async {}).await?;
//! // ... use client and key ...
//! scope.close().await;
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tracing::{debug, warn};

type ReleaseFn = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

struct Step {
    name: String,
    release: ReleaseFn,
}

/// Stack of acquired resources released in reverse order
#[derive(Default)]
pub struct ScopeStack {
    steps: Vec<Step>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a resource and register its release.
    ///
    /// On failure every step acquired so far is released (newest first) before the
    /// error is returned, leaving the stack empty.
    pub async fn push<T, E, A, AFut, R, RFut>(
        &mut self,
        name: impl Into<String>,
        acquire: A,
        release: R,
    ) -> Result<T, E>
    where
        T: Clone + Send + 'static,
        A: FnOnce() -> AFut,
        AFut: Future<Output = Result<T, E>>,
        R: FnOnce(T) -> RFut + Send + 'static,
        RFut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        match acquire().await {
            Ok(resource) => {
                debug!(step = %name, depth = self.steps.len() + 1, "Acquired scoped resource");
                let handle = resource.clone();
                self.steps.push(Step {
                    name,
                    release: Box::new(move || Box::pin(release(handle))),
                });
                Ok(resource)
            }
            Err(err) => {
                warn!(step = %name, acquired = self.steps.len(), "Scoped acquire failed, unwinding");
                self.release_all().await;
                Err(err)
            }
        }
    }

    /// Number of acquired steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Release every step, newest first
    pub async fn close(mut self) {
        self.release_all().await;
    }

    async fn release_all(&mut self) {
        while let Some(step) = self.steps.pop() {
            debug!(step = %step.name, "Releasing scoped resource");
            (step.release)().await;
        }
    }
}

impl Drop for ScopeStack {
    fn drop(&mut self) {
        if !self.steps.is_empty() {
            let names: Vec<&str> = self.steps.iter().map(|s| s.name.as_str()).collect();
            warn!(steps = ?names, "ScopeStack dropped without close, resources not released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    async fn push_named(
        scope: &mut ScopeStack,
        log: &Arc<Mutex<Vec<String>>>,
        name: &'static str,
    ) -> Result<&'static str, String> {
        let release_log = log.clone();
        scope
            .push(
                name,
                || async move { Ok::<_, String>(name) },
                move |value| async move {
                    release_log.lock().push(format!("release {}", value));
                },
            )
            .await
    }

    #[tokio::test]
    async fn test_close_releases_in_reverse_order() {
        let log = recorder();
        let mut scope = ScopeStack::new();

        push_named(&mut scope, &log, "socket").await.unwrap();
        push_named(&mut scope, &log, "api").await.unwrap();
        push_named(&mut scope, &log, "metadata").await.unwrap();
        assert_eq!(scope.len(), 3);

        scope.close().await;
        assert_eq!(
            *log.lock(),
            vec!["release metadata", "release api", "release socket"]
        );
    }

    #[tokio::test]
    async fn test_failed_acquire_unwinds_partial_chain() {
        let log = recorder();
        let mut scope = ScopeStack::new();

        push_named(&mut scope, &log, "socket").await.unwrap();
        push_named(&mut scope, &log, "api").await.unwrap();

        let failed: Result<(), String> = scope
            .push(
                "metadata",
                || async { Err("metadata unavailable".to_string()) },
                |_| async {},
            )
            .await;

        assert_eq!(failed.unwrap_err(), "metadata unavailable");
        assert!(scope.is_empty());
        assert_eq!(*log.lock(), vec!["release api", "release socket"]);
    }
}
