//! Page render state.
//!
//! Provides [`PageRenderState`], the owned replacement for a global
//! "content ready" flag. Readiness is a single-fire notification: once
//! [`PageRenderState::mark_ready`] has run, [`PageRenderState::is_ready`]
//! stays `true` and subscribers that attach late observe it immediately.
//!
//! # Example
//!
//! ```
//! use vitrin_core::PageRenderState;
//!
//! # tokio_test::block_on(async {
//! let state = PageRenderState::new();
//! assert!(!state.is_ready());
//!
//! assert!(state.mark_ready());
//! assert!(!state.mark_ready()); // fires once
//!
//! // A listener attaching after the fact still sees readiness.
//! state.wait_ready().await;
//! # });
//! ```

use std::sync::Arc;

use tokio::sync::watch;

/// Name of the event dispatched on the document once content is rendered.
pub const CONTENT_READY_EVENT: &str = "content:ready";

/// Shared, cloneable readiness state for one page lifetime.
///
/// Cloning is cheap (Arc clone); all clones observe the same flag.
#[derive(Debug, Clone)]
pub struct PageRenderState {
    ready: Arc<watch::Sender<bool>>,
}

impl PageRenderState {
    /// Create a state that is not yet ready.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            ready: Arc::new(tx),
        }
    }

    /// Whether content has become ready.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Mark content as ready and notify subscribers.
    ///
    /// Returns `true` only for the call that flipped the flag.
    pub fn mark_ready(&self) -> bool {
        let fired = self.ready.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if fired {
            log::debug!("page render state: {CONTENT_READY_EVENT}");
        }
        fired
    }

    /// Subscribe to readiness changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    /// Wait until content is ready; returns immediately if it already is.
    pub async fn wait_ready(&self) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for PageRenderState {
    fn default() -> Self {
        Self::new()
    }
}
