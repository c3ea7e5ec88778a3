//! Request-scoped `Server-Timing` instrumentation for axum.
//!
//! Each request gets a [`TimingSession`] through the [`ServerTiming`]
//! extractor. Handlers record named spans or externally measured durations;
//! right before the response leaves the middleware the session renders them
//! into `Server-Timing` header values that browser devtools understand.
//!
//! ```ignore
//! let app = ServerTimingConfig::default().attach(Router::new().route("/", get(handler)));
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod timing;

pub use config::ServerTimingConfig;
pub use error::{Result, ServerTimingError};
pub use middleware::{server_timing, ServerTiming};
pub use response::{TimingResponse, SERVER_TIMING};
pub use timing::{
    Clock, HeaderFormat, ManualClock, Metric, MetricMap, MonotonicClock, Timeline, Timestamp,
    TimingSession,
};
