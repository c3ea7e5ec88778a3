use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::USER_AGENT, request::Parts},
    middleware::Next,
    response::Response,
};
use parking_lot::{Mutex, MutexGuard};

use crate::config::ServerTimingConfig;
use crate::error::ServerTimingError;
use crate::timing::{MonotonicClock, TimingSession};

/// Handle to the request's [`TimingSession`], shared between the handler
/// and the middleware that finalizes it.
///
/// Extract it in a handler:
///
/// ```ignore
/// async fn handler(timing: ServerTiming) -> Result<String, ServerTimingError> {
///     timing.lock().from("db", Some("query"))?;
///     // ... query ...
///     timing.lock().to("db", None)?;
///     Ok("done".into())
/// }
/// ```
///
/// Do not hold the guard from [`ServerTiming::lock`] across an `.await`.
#[derive(Debug, Clone)]
pub struct ServerTiming(Arc<Mutex<TimingSession>>);

impl ServerTiming {
    pub fn new(session: TimingSession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub fn lock(&self) -> MutexGuard<'_, TimingSession> {
        self.0.lock()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ServerTiming
where
    S: Send + Sync,
{
    type Rejection = ServerTimingError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ServerTiming>()
            .cloned()
            .ok_or(ServerTimingError::NotAttached)
    }
}

/// Middleware that gives every request its own [`TimingSession`] and, once
/// the inner service has produced the response and before it is sent,
/// writes the session's metrics into the `Server-Timing` header.
///
/// The user agent picks the header syntax: Chrome 64 and older get the
/// legacy form.
pub async fn server_timing(
    State(config): State<ServerTimingConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let clock = config
        .clock
        .clone()
        .unwrap_or_else(|| Arc::new(MonotonicClock));
    let timing = ServerTiming::new(TimingSession::with_clock(user_agent, clock));

    req.extensions_mut().insert(timing.clone());
    let mut response = next.run(req).await;

    if !config.send_headers {
        return response;
    }

    // ── Headers are about to go out ─────────────────────────────
    if let Err(err) = timing.lock().add_headers(&mut response) {
        tracing::warn!(error = %err, "failed to write server-timing header");
    }

    response
}
