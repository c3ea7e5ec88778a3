use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};
use serde::Deserialize;

use crate::middleware::server_timing;
use crate::timing::Clock;

/// Route-level settings for the timing middleware.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerTimingConfig {
    /// When false, sessions are still created and reachable from handlers
    /// but nothing is written to the response.
    pub send_headers: bool,

    /// Time source for every session; the monotonic clock when unset.
    #[serde(skip)]
    pub clock: Option<Arc<dyn Clock>>,
}

impl Default for ServerTimingConfig {
    fn default() -> Self {
        Self {
            send_headers: true,
            clock: None,
        }
    }
}

impl ServerTimingConfig {
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Installs the timing middleware on every route of `router`.
    pub fn attach<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(from_fn_with_state(self, server_timing))
    }
}
