//! Run configuration.
//!
//! Defaults reproduce the hosted-demo setup: Chromium, headless, 1280x720,
//! 10s action timeout, 30s navigation timeout, 50s per test, zero retries.
//! A YAML file can override any field and `CONDUIT_E2E_*` environment
//! variables override the file.

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hosted Conduit demo
pub const DEFAULT_BASE_URL: &str = "https://conduit-realworld-example-app.fly.dev";

/// Named timeouts shared by page objects
#[derive(Debug, Clone, Copy)]
pub struct Timeouts;

impl Timeouts {
    /// Element actions and selector waits
    pub const MEDIUM: Duration = Duration::from_millis(10_000);
    /// Navigation and load-state waits
    pub const LONG: Duration = Duration::from_millis(30_000);
}

/// When to capture a screenshot at the end of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotPolicy {
    /// Never capture
    Off,
    /// Capture only when the test failed
    #[default]
    OnlyOnFailure,
    /// Capture after every test
    Always,
}

impl ScreenshotPolicy {
    /// Whether a test with this outcome gets a screenshot
    #[must_use]
    pub const fn should_capture(self, passed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::OnlyOnFailure => !passed,
            Self::Always => true,
        }
    }
}

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Base URL of the application under test
    pub base_url: String,
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Timeout for element actions and selector waits
    #[serde(with = "millis")]
    pub action_timeout: Duration,
    /// Timeout for navigation and load-state waits
    #[serde(with = "millis")]
    pub navigation_timeout: Duration,
    /// Upper bound for a whole scenario
    #[serde(with = "millis")]
    pub test_timeout: Duration,
    /// Extra attempts after a failed scenario
    pub retries: u32,
    /// Pause between scenario steps (for watching headed runs)
    #[serde(with = "millis")]
    pub step_pause: Duration,
    /// Pause after each tag typed into the tag widget
    #[serde(with = "millis")]
    pub tag_settle: Duration,
    /// Quiet period with no new resource entries that counts as network idle
    #[serde(with = "millis")]
    pub network_idle_window: Duration,
    /// Screenshot capture policy
    pub screenshots: ScreenshotPolicy,
    /// Directory screenshots are written to
    pub screenshots_dir: PathBuf,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout: Timeouts::MEDIUM,
            navigation_timeout: Timeouts::LONG,
            test_timeout: Duration::from_millis(50_000),
            retries: 0,
            step_pause: Duration::ZERO,
            tag_settle: Duration::from_millis(100),
            network_idle_window: Duration::from_millis(500),
            screenshots: ScreenshotPolicy::OnlyOnFailure,
            screenshots_dir: PathBuf::from("screenshots"),
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl E2eConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML config file; absent fields keep their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> E2eResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&raw)
    }

    /// Parse YAML config text
    pub fn from_yaml_str(raw: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml_ng::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CONDUIT_E2E_*` overrides from the process environment
    pub fn apply_env(self) -> E2eResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CONDUIT_E2E_BASE_URL") {
            self.base_url = url;
        }
        if let Some(raw) = lookup("CONDUIT_E2E_HEADLESS") {
            self.headless = parse_bool("CONDUIT_E2E_HEADLESS", &raw)?;
        }
        if let Some(path) = lookup("CONDUIT_E2E_CHROMIUM_PATH") {
            self.chromium_path = Some(path);
        }
        if let Some(raw) = lookup("CONDUIT_E2E_NO_SANDBOX") {
            self.sandbox = !parse_bool("CONDUIT_E2E_NO_SANDBOX", &raw)?;
        }
        if let Some(raw) = lookup("CONDUIT_E2E_STEP_PAUSE_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                E2eError::config(format!("CONDUIT_E2E_STEP_PAUSE_MS is not a number: {raw}"))
            })?;
            self.step_pause = Duration::from_millis(ms);
        }
        self.validate()?;
        Ok(self)
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set action timeout
    #[must_use]
    pub const fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set scenario timeout
    #[must_use]
    pub const fn with_test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = timeout;
        self
    }

    /// Set retry count
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set pause between scenario steps
    #[must_use]
    pub const fn with_step_pause(mut self, pause: Duration) -> Self {
        self.step_pause = pause;
        self
    }

    /// Set tag-widget settle delay
    #[must_use]
    pub const fn with_tag_settle(mut self, settle: Duration) -> Self {
        self.tag_settle = settle;
        self
    }

    /// Set network idle window
    #[must_use]
    pub const fn with_network_idle_window(mut self, window: Duration) -> Self {
        self.network_idle_window = window;
        self
    }

    /// Set screenshot policy
    #[must_use]
    pub const fn with_screenshots(mut self, policy: ScreenshotPolicy) -> Self {
        self.screenshots = policy;
        self
    }

    /// Set screenshot directory
    #[must_use]
    pub fn with_screenshots_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshots_dir = dir.into();
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Resolve an application route (`/#/login`) against the base URL
    #[must_use]
    pub fn url_for(&self, route: &str) -> String {
        if route.starts_with("http://") || route.starts_with("https://") {
            return route.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let route = route.trim_start_matches('/');
        format!("{base}/{route}")
    }

    /// Reject settings no run could use
    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::config(format!(
                "base_url must be an http(s) URL, got `{}`",
                self.base_url
            )));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(E2eError::config("viewport dimensions must be non-zero"));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, raw: &str) -> E2eResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::config(format!("{key} is not a boolean: {other}"))),
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
