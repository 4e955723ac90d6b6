//! Wait mechanisms for synchronizing with a single-page app.
//!
//! Client-side routing means a URL change says nothing about whether the
//! next screen has rendered, so callers combine a URL wait with load-state
//! waits. Every wait carries an explicit timeout.
//!
//! `NetworkIdle` is inferred from the count of resource timing entries. An
//! entry is recorded only when a request finishes, and the browser stops
//! recording once its resource buffer (250 entries by default) is full, so
//! a request still in flight after the quiet window reads as idle. Journeys
//! follow every idle wait with a URL or element wait.

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for load-state waits (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without new requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle (no new requests for the idle window)
    NetworkIdle,
}

impl LoadState {
    /// Get the event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    /// Document still parsing
    Loading,
    /// DOM parsed, subresources pending
    Interactive,
    /// Load event fired
    Complete,
}

impl ReadyState {
    /// Whether this ready state satisfies a plain (non-network) load state
    #[must_use]
    pub const fn satisfies(self, state: LoadState) -> bool {
        match state {
            LoadState::DomContentLoaded => matches!(self, Self::Interactive | Self::Complete),
            LoadState::Load | LoadState::NetworkIdle => matches!(self, Self::Complete),
        }
    }
}

/// One reading of the document's loading progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadProbe {
    /// Current ready state
    pub ready_state: ReadyState,
    /// Number of resource timing entries recorded so far
    pub resource_count: usize,
}

/// Tracks resource-count changes to decide network idleness.
///
/// The page counts as idle once it is `Complete` and the resource count
/// has not moved for `window`. Requests that have not finished are not
/// counted.
#[derive(Debug, Clone)]
pub struct NetworkIdleTracker {
    window: Duration,
    last_count: Option<usize>,
    quiet_since: Instant,
}

impl NetworkIdleTracker {
    /// Create a tracker for the given quiet window
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_count: None,
            quiet_since: Instant::now(),
        }
    }

    /// Feed a probe taken at `now`; returns whether the network is idle
    pub fn observe(&mut self, probe: LoadProbe, now: Instant) -> bool {
        if self.last_count != Some(probe.resource_count) {
            self.last_count = Some(probe.resource_count);
            self.quiet_since = now;
        }
        if probe.ready_state != ReadyState::Complete {
            self.quiet_since = now;
            return false;
        }
        now.duration_since(self.quiet_since) >= self.window
    }
}

// =============================================================================
// URL PATTERNS
// =============================================================================

/// URL matching pattern for URL waits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern.as_str()),
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "URL == {p}"),
            Self::Prefix(p) => write!(f, "URL starting with {p}"),
            Self::Contains(p) => write!(f, "URL containing {p}"),
            Self::Regex(p) => write!(f, "URL matching /{p}/"),
            Self::Any => write!(f, "any URL"),
        }
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Timeout
    pub timeout: Duration,
    /// Polling interval
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields `Some`, or fail with [`E2eError::Timeout`].
///
/// Probe errors are treated as "not yet" while time remains; the last one
/// is reported in the timeout message.
pub async fn poll_until<T, F, Fut>(options: WaitOptions, what: &str, mut probe: F) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Option<T>>>,
{
    let start = Instant::now();
    let mut last_error: Option<E2eError> = None;
    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) => last_error = Some(err),
        }
        if start.elapsed() >= options.timeout {
            let what = match last_error {
                Some(err) => format!("{what} (last error: {err})"),
                None => what.to_string(),
            };
            return Err(E2eError::timeout(what, options.timeout));
        }
        tokio::time::sleep(options.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_load_state_event_names() {
            assert_eq!(LoadState::Load.event_name(), "load");
            assert_eq!(LoadState::DomContentLoaded.event_name(), "DOMContentLoaded");
            assert_eq!(LoadState::NetworkIdle.to_string(), "networkidle");
        }

        #[test]
        fn test_ready_state_satisfies() {
            assert!(!ReadyState::Loading.satisfies(LoadState::DomContentLoaded));
            assert!(ReadyState::Interactive.satisfies(LoadState::DomContentLoaded));
            assert!(!ReadyState::Interactive.satisfies(LoadState::Load));
            assert!(ReadyState::Complete.satisfies(LoadState::Load));
        }

        #[test]
        fn test_ready_state_deserializes_dom_strings() {
            let state: ReadyState = serde_json::from_str("\"interactive\"").unwrap();
            assert_eq!(state, ReadyState::Interactive);
        }
    }

    mod network_idle_tests {
        use super::*;

        fn probe(ready_state: ReadyState, resource_count: usize) -> LoadProbe {
            LoadProbe {
                ready_state,
                resource_count,
            }
        }

        #[test]
        fn test_idle_after_quiet_window() {
            let start = Instant::now();
            let mut tracker = NetworkIdleTracker::new(Duration::from_millis(500));
            assert!(!tracker.observe(probe(ReadyState::Complete, 4), start));
            assert!(!tracker.observe(
                probe(ReadyState::Complete, 4),
                start + Duration::from_millis(300)
            ));
            assert!(tracker.observe(
                probe(ReadyState::Complete, 4),
                start + Duration::from_millis(500)
            ));
        }

        #[test]
        fn test_new_resource_restarts_window() {
            let start = Instant::now();
            let mut tracker = NetworkIdleTracker::new(Duration::from_millis(500));
            tracker.observe(probe(ReadyState::Complete, 4), start);
            assert!(!tracker.observe(
                probe(ReadyState::Complete, 5),
                start + Duration::from_millis(600)
            ));
            assert!(tracker.observe(
                probe(ReadyState::Complete, 5),
                start + Duration::from_millis(1100)
            ));
        }

        #[test]
        fn test_flat_count_reads_idle_with_request_in_flight() {
            // A slow fetch adds no entry until it completes
            let start = Instant::now();
            let mut tracker = NetworkIdleTracker::new(Duration::from_millis(500));
            tracker.observe(probe(ReadyState::Complete, 250), start);
            assert!(tracker.observe(
                probe(ReadyState::Complete, 250),
                start + Duration::from_millis(800)
            ));
        }

        #[test]
        fn test_never_idle_while_loading() {
            let start = Instant::now();
            let mut tracker = NetworkIdleTracker::new(Duration::ZERO);
            assert!(!tracker.observe(probe(ReadyState::Interactive, 1), start));
        }
    }

    mod url_pattern_tests {
        use super::*;

        #[test]
        fn test_exact_requires_whole_url() {
            let pattern = UrlPattern::Exact("https://app.test/#/".to_string());
            assert!(pattern.matches("https://app.test/#/"));
            assert!(!pattern.matches("https://app.test/#/login"));
        }

        #[test]
        fn test_regex_pattern() {
            let pattern = UrlPattern::Regex(".*article.*my-post.*".to_string());
            assert!(pattern.matches("https://app.test/#/article/my-post"));
            assert!(!pattern.matches("https://app.test/#/editor"));
        }

        #[test]
        fn test_invalid_regex_never_matches() {
            assert!(!UrlPattern::Regex("(".to_string()).matches("anything"));
        }

        #[test]
        fn test_prefix_contains_any() {
            assert!(UrlPattern::Prefix("https://a".to_string()).matches("https://a/b"));
            assert!(UrlPattern::Contains("/#/editor".to_string()).matches("http://x/#/editor/s"));
            assert!(UrlPattern::Any.matches(""));
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_poll_until_returns_first_some() {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();
            let options = WaitOptions::new()
                .with_timeout(Duration::from_secs(1))
                .with_poll_interval(Duration::from_millis(1));
            let value = poll_until(options, "third call", move || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok((n >= 3).then_some(n))
                }
            })
            .await
            .unwrap();
            assert_eq!(value, 3);
        }

        #[tokio::test]
        async fn test_poll_until_times_out_with_last_error() {
            let options = WaitOptions::new()
                .with_timeout(Duration::from_millis(20))
                .with_poll_interval(Duration::from_millis(5));
            let err = poll_until::<(), _, _>(options, "never", || async {
                Err(E2eError::ElementNotFound {
                    selector: "div.nope".to_string(),
                })
            })
            .await
            .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("div.nope"));
        }
    }
}
