use indexmap::IndexMap;

use super::clock::Timestamp;

/// Metrics keyed by name. Iteration order is insertion order, which is also
/// the order fragments are emitted in.
///
/// Hooks that drop entries should use `shift_remove` to keep the order of
/// the remaining metrics.
pub type MetricMap = IndexMap<String, Metric>;

/// One named measurement.
///
/// Unset `from` means "session start" and unset `to` means "now" when the
/// duration is resolved. An explicit `duration` wins over both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metric {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub description: Option<String>,
    /// Milliseconds.
    pub duration: Option<f64>,
}

impl Metric {
    /// An externally measured metric with no span.
    pub fn measured(description: impl Into<String>, duration: f64) -> Self {
        Self {
            description: Some(description.into()),
            duration: Some(duration),
            ..Self::default()
        }
    }
}

/// Signed whole-millisecond distance from `from` to `to`.
pub fn compute_duration_ms(from: Timestamp, to: Timestamp) -> f64 {
    (to.to_millis() - from.to_millis()) as f64
}
