//! # Bus Events
//!
//! The bus is generic over the event type it carries. Any type that can
//! name its topic can be published.

/// An event that can travel over the bus.
///
/// Topics are static strings (`"bounty.created"`, `"reputation.updated"`)
/// so filters can be built without depending on the producer's enum.
pub trait BusEvent: Clone + Send + Sync + 'static {
    /// Topic this event is published under.
    fn topic(&self) -> &'static str;

    /// Name of the component that produced the event.
    fn source(&self) -> &'static str {
        "unknown"
    }
}

/// Wildcard topic matching every event.
pub const ALL_TOPICS: &str = "*";

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<String>,
    /// Sources to include. Empty means all sources.
    pub sources: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
            sources: Vec::new(),
        }
    }

    /// Create a filter for events from specific sources.
    #[must_use]
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: Vec::new(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if an event matches this filter.
    ///
    /// A topic entry ending in `.*` matches every topic with that prefix.
    #[must_use]
    pub fn matches<E: BusEvent>(&self, event: &E) -> bool {
        let topic = event.topic();
        let topic_match = self.topics.is_empty()
            || self.topics.iter().any(|t| topic_matches(t, topic));

        let source_match =
            self.sources.is_empty() || self.sources.iter().any(|s| s == event.source());

        topic_match && source_match
    }
}

fn topic_matches(pattern: &str, topic: &str) -> bool {
    if pattern == ALL_TOPICS {
        return true;
    }
    match pattern.strip_suffix(".*") {
        Some(prefix) => topic
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.')),
        None => pattern == topic,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum TestEvent {
        Created(u64),
        Paused(u64),
        Scored(u64),
    }

    impl BusEvent for TestEvent {
        fn topic(&self) -> &'static str {
            match self {
                Self::Created(_) => "item.created",
                Self::Paused(_) => "item.paused",
                Self::Scored(_) => "score.updated",
            }
        }

        fn source(&self) -> &'static str {
            match self {
                Self::Scored(_) => "scorer",
                _ => "lifecycle",
            }
        }
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&TestEvent::Created(1)));
        assert!(filter.matches(&TestEvent::Scored(1)));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(["item.created"]);
        assert!(filter.matches(&TestEvent::Created(1)));
        assert!(!filter.matches(&TestEvent::Paused(1)));
    }

    #[test]
    fn test_filter_by_prefix() {
        let filter = EventFilter::topics(["item.*"]);
        assert!(filter.matches(&TestEvent::Created(1)));
        assert!(filter.matches(&TestEvent::Paused(1)));
        assert!(!filter.matches(&TestEvent::Scored(1)));
    }

    #[test]
    fn test_prefix_requires_segment_boundary() {
        assert!(!topic_matches("item.*", "items.created"));
        assert!(!topic_matches("item.*", "item"));
    }

    #[test]
    fn test_wildcard_topic() {
        let filter = EventFilter::topics([ALL_TOPICS]);
        assert!(filter.matches(&TestEvent::Scored(7)));
    }

    #[test]
    fn test_filter_by_source() {
        let filter = EventFilter::from_sources(["scorer"]);
        assert!(filter.matches(&TestEvent::Scored(1)));
        assert!(!filter.matches(&TestEvent::Created(1)));
    }
}
