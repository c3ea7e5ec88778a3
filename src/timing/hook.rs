use std::fmt;

use super::metric::MetricMap;
use super::session::Timeline;

/// A transform applied to the full metric map right before serialization.
///
/// It receives the current map by value and returns the replacement. The
/// [`Timeline`] gives access to the session's time base, e.g. for
/// [`Timeline::calculate_duration_smart`].
pub trait Transform: Send + Sync {
    fn apply(&self, metrics: MetricMap, timeline: &Timeline) -> MetricMap;
}

impl<F> Transform for F
where
    F: Fn(MetricMap, &Timeline) -> MetricMap + Send + Sync,
{
    fn apply(&self, metrics: MetricMap, timeline: &Timeline) -> MetricMap {
        self(metrics, timeline)
    }
}

struct Hook {
    name: String,
    index: i64,
    seq: u64,
    transform: Box<dyn Transform>,
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// Hooks ordered by `(index, insertion sequence)`.
///
/// Equal indexes run in the order they were added.
#[derive(Debug, Default)]
pub struct HookChain {
    hooks: Vec<Hook>,
    next_seq: u64,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook and returns the index it was given. Without an
    /// explicit index the hook gets `len() + 1`.
    pub fn add<T>(&mut self, name: impl Into<String>, transform: T, index: Option<i64>) -> i64
    where
        T: Transform + 'static,
    {
        let index = index.unwrap_or(self.hooks.len() as i64 + 1);
        let seq = self.next_seq;
        self.next_seq += 1;

        self.hooks.push(Hook {
            name: name.into(),
            index,
            seq,
            transform: Box::new(transform),
        });
        self.hooks.sort_by_key(|h| (h.index, h.seq));
        index
    }

    /// Removes every hook named `name`. Unknown names are ignored.
    pub fn remove(&mut self, name: &str) {
        self.hooks.retain(|h| h.name != name);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn apply(&self, metrics: MetricMap, timeline: &Timeline) -> MetricMap {
        self.hooks
            .iter()
            .fold(metrics, |acc, hook| hook.transform.apply(acc, timeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::clock::ManualClock;
    use crate::timing::metric::Metric;
    use std::sync::Arc;

    fn tag(label: &'static str) -> impl Fn(MetricMap, &Timeline) -> MetricMap + Send + Sync {
        move |mut metrics: MetricMap, _: &Timeline| {
            metrics.insert(label.to_owned(), Metric::default());
            metrics
        }
    }

    fn order(chain: &HookChain) -> Vec<String> {
        let timeline = Timeline::new(Arc::new(ManualClock::new()));
        chain
            .apply(MetricMap::new(), &timeline)
            .keys()
            .cloned()
            .collect()
    }

    #[test]
    fn default_index_is_count_plus_one() {
        let mut chain = HookChain::new();
        assert_eq!(chain.add("a", tag("a"), None), 1);
        assert_eq!(chain.add("b", tag("b"), None), 2);
        assert_eq!(chain.add("c", tag("c"), Some(10)), 10);
        assert_eq!(chain.add("d", tag("d"), None), 4);
    }

    #[test]
    fn lower_explicit_index_runs_first() {
        let mut chain = HookChain::new();
        chain.add("late", tag("late"), None);
        chain.add("early", tag("early"), Some(0));
        assert_eq!(order(&chain), ["early", "late"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut chain = HookChain::new();
        chain.add("first", tag("first"), Some(5));
        chain.add("second", tag("second"), Some(5));
        chain.add("third", tag("third"), Some(5));
        assert_eq!(order(&chain), ["first", "second", "third"]);
    }

    #[test]
    fn remove_drops_every_hook_with_that_name() {
        let mut chain = HookChain::new();
        chain.add("dup", tag("one"), None);
        chain.add("keep", tag("keep"), None);
        chain.add("dup", tag("two"), None);
        chain.remove("dup");
        chain.remove("missing");

        assert_eq!(chain.len(), 1);
        assert_eq!(order(&chain), ["keep"]);

        chain.remove("keep");
        assert!(chain.is_empty());
        assert!(order(&chain).is_empty());
    }
}
