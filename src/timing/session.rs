use std::fmt;
use std::sync::Arc;

use axum::http::HeaderValue;

use super::clock::{Clock, MonotonicClock, Timestamp};
use super::format::HeaderFormat;
use super::hook::{HookChain, Transform};
use super::metric::{compute_duration_ms, Metric, MetricMap};
use super::name::validate_name;
use crate::error::{Result, ServerTimingError};
use crate::response::TimingResponse;

/// The time base of a session: when it started and where "now" comes from.
#[derive(Clone)]
pub struct Timeline {
    initialized_at: Timestamp,
    clock: Arc<dyn Clock>,
}

impl Timeline {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            initialized_at: clock.now(),
            clock,
        }
    }

    pub fn initialized_at(&self) -> Timestamp {
        self.initialized_at
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Duration of `metric` without finalizing anything: the explicit
    /// duration if set, otherwise the absolute span between its resolved
    /// endpoints.
    pub fn calculate_duration_smart(&self, metric: &Metric) -> f64 {
        match metric.duration {
            Some(duration) => duration,
            None => {
                let (from, to) = self.resolve(metric);
                compute_duration_ms(from, to).abs()
            }
        }
    }

    fn resolve(&self, metric: &Metric) -> (Timestamp, Timestamp) {
        let from = metric.from.unwrap_or(self.initialized_at);
        let to = metric.to.unwrap_or_else(|| self.now());
        (from, to)
    }
}

/// `NaN` and infinities have no representation in the header grammar.
fn validate_duration(name: &str, ms: f64) -> Result<()> {
    if ms.is_finite() {
        Ok(())
    } else {
        Err(ServerTimingError::InvalidDuration {
            name: name.to_owned(),
        })
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("initialized_at", &self.initialized_at)
            .finish_non_exhaustive()
    }
}

/// Per-request accumulator of named timings.
///
/// Handler code records metrics through the `from`/`to`/`description`/
/// `duration`/`add` calls; [`TimingSession::add_headers`] renders them
/// into `Server-Timing` values on the response and empties the store.
/// Hooks survive finalization.
#[derive(Debug)]
pub struct TimingSession {
    timeline: Timeline,
    format: HeaderFormat,
    metrics: MetricMap,
    hooks: HookChain,
}

impl TimingSession {
    pub fn new(user_agent: &str) -> Self {
        Self::with_clock(user_agent, Arc::new(MonotonicClock))
    }

    pub fn with_clock(user_agent: &str, clock: Arc<dyn Clock>) -> Self {
        Self::with_format(HeaderFormat::from_user_agent(user_agent), clock)
    }

    pub fn with_format(format: HeaderFormat, clock: Arc<dyn Clock>) -> Self {
        Self {
            timeline: Timeline::new(clock),
            format,
            metrics: MetricMap::new(),
            hooks: HookChain::new(),
        }
    }

    // ── Recording ───────────────────────────────────────────────

    /// Marks the start of `name`.
    pub fn from(&mut self, name: &str, description: Option<&str>) -> Result<()> {
        validate_name(name)?;
        let now = self.timeline.now();
        let metric = self.entry(name);
        metric.from = Some(now);
        if let Some(desc) = description {
            metric.description = Some(desc.to_owned());
        }
        Ok(())
    }

    /// Marks the end of `name`.
    pub fn to(&mut self, name: &str, description: Option<&str>) -> Result<()> {
        validate_name(name)?;
        let now = self.timeline.now();
        let metric = self.entry(name);
        metric.to = Some(now);
        if let Some(desc) = description {
            metric.description = Some(desc.to_owned());
        }
        Ok(())
    }

    pub fn description(&mut self, name: &str, text: impl Into<String>) -> Result<()> {
        validate_name(name)?;
        self.entry(name).description = Some(text.into());
        Ok(())
    }

    /// Sets an explicit duration in milliseconds, overriding any span.
    pub fn duration(&mut self, name: &str, ms: f64) -> Result<()> {
        validate_name(name)?;
        validate_duration(name, ms)?;
        self.entry(name).duration = Some(ms);
        Ok(())
    }

    /// Replaces `name` with an externally measured value, discarding any
    /// `from`/`to` recorded so far.
    pub fn add(&mut self, name: &str, description: impl Into<String>, duration: f64) -> Result<()> {
        validate_name(name)?;
        validate_duration(name, duration)?;
        self.metrics
            .insert(name.to_owned(), Metric::measured(description, duration));
        Ok(())
    }

    pub fn calculate_duration_smart(&self, metric: &Metric) -> f64 {
        self.timeline.calculate_duration_smart(metric)
    }

    fn entry(&mut self, name: &str) -> &mut Metric {
        self.metrics.entry(name.to_owned()).or_default()
    }

    // ── Hooks ───────────────────────────────────────────────────

    /// Registers a transform run before serialization; see [`HookChain::add`].
    pub fn add_hook<T>(&mut self, name: impl Into<String>, transform: T, index: Option<i64>) -> i64
    where
        T: Transform + 'static,
    {
        self.hooks.add(name, transform, index)
    }

    pub fn remove_hook(&mut self, name: &str) {
        self.hooks.remove(name);
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    // ── Finalization ────────────────────────────────────────────

    /// Runs the hook chain over a copy of the metrics and renders one
    /// fragment per surviving metric, in insertion order. Nothing is cleared.
    pub fn render(&self) -> Vec<String> {
        let metrics = self.hooks.apply(self.metrics.clone(), &self.timeline);
        metrics
            .iter()
            .map(|(name, metric)| {
                let duration = metric.duration.unwrap_or_else(|| {
                    let (from, to) = self.timeline.resolve(metric);
                    compute_duration_ms(from, to)
                });
                self.format
                    .render(name, metric.description.as_deref(), Some(duration))
            })
            .collect()
    }

    /// Writes all metrics to the response's `server-timing` header after
    /// any values already present, then clears the metric store.
    ///
    /// Nothing is written or cleared when this fails.
    pub fn add_headers<R>(&mut self, response: &mut R) -> Result<()>
    where
        R: TimingResponse + ?Sized,
    {
        if response.headers_sent() {
            return Err(ServerTimingError::AlreadySent);
        }

        let fragments = self
            .render()
            .into_iter()
            .map(|fragment| {
                HeaderValue::from_str(&fragment)
                    .map_err(|_| ServerTimingError::InvalidHeaderValue { fragment })
            })
            .collect::<Result<Vec<_>>>()?;

        if !fragments.is_empty() {
            let mut values = response.server_timing_values();
            values.extend(fragments);
            tracing::debug!(
                fragments = values.len(),
                legacy = self.format.is_legacy(),
                "writing server-timing header"
            );
            response.set_server_timing(values);
        }

        self.metrics.clear();
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn metrics(&self) -> &MetricMap {
        &self.metrics
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }

    pub fn format(&self) -> HeaderFormat {
        self.format
    }

    pub fn is_legacy(&self) -> bool {
        self.format.is_legacy()
    }

    pub fn initialized_at(&self) -> Timestamp {
        self.timeline.initialized_at()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}
