pub mod clock;
pub mod format;
pub mod hook;
pub mod metric;
pub mod name;
pub mod session;

pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use format::HeaderFormat;
pub use hook::{HookChain, Transform};
pub use metric::{compute_duration_ms, Metric, MetricMap};
pub use name::is_valid_name;
pub use session::{Timeline, TimingSession};
