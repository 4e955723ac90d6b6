//! Automation client shared by every page object.
//!
//! Holds the driver for one session plus the run configuration. Navigation
//! and load waits report failure as `false` and log it; URL waits return
//! `E2eResult` so callers can decide.

use crate::config::E2eConfig;
use crate::dialog::{ArmedDialog, DialogAction};
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::wait::{poll_until, LoadState, NetworkIdleTracker, UrlPattern, WaitOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// One session's view of the browser
#[derive(Debug, Clone)]
pub struct AutomationClient {
    driver: Arc<dyn PageDriver>,
    config: Arc<E2eConfig>,
}

impl AutomationClient {
    /// Create a client over `driver`
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: E2eConfig) -> Self {
        Self {
            driver,
            config: Arc::new(config),
        }
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &E2eConfig {
        &self.config
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// Build a locator that auto-waits for the action timeout
    #[must_use]
    pub fn locator(&self, css: &str) -> Locator {
        Locator::new(Arc::clone(&self.driver), css, self.config.action_timeout)
    }

    /// Resolve an application route against the base URL
    #[must_use]
    pub fn url_for(&self, route: &str) -> String {
        self.config.url_for(route)
    }

    /// Live URL of the tab
    pub async fn current_url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    /// Navigate to `route` and wait for the page to load
    pub async fn navigate_to(&self, route: &str) -> bool {
        self.navigate_to_with_timeout(route, self.config.navigation_timeout)
            .await
    }

    /// Navigate with an explicit load timeout
    #[tracing::instrument(skip(self))]
    pub async fn navigate_to_with_timeout(&self, route: &str, timeout: Duration) -> bool {
        let url = self.url_for(route);
        if let Err(err) = self.driver.goto(&url).await {
            error!(%url, error = %err, "navigation failed");
            return false;
        }
        if self.wait_for_load_with_timeout(timeout).await {
            info!(%url, "navigated");
            true
        } else {
            error!(%url, "navigation did not finish loading");
            false
        }
    }

    /// Wait for network idle and DOM content, with the navigation timeout
    pub async fn wait_for_load(&self) -> bool {
        self.wait_for_load_with_timeout(self.config.navigation_timeout)
            .await
    }

    /// Wait for network idle and then DOM content within `timeout`
    #[tracing::instrument(skip(self))]
    pub async fn wait_for_load_with_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let result = async {
            self.wait_for_state(LoadState::NetworkIdle, timeout).await?;
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.wait_for_state(LoadState::DomContentLoaded, remaining)
                .await
        }
        .await;
        match result {
            Ok(()) => {
                debug!("page loaded");
                true
            }
            Err(err) => {
                warn!(error = %err, "page did not finish loading");
                false
            }
        }
    }

    async fn wait_for_state(&self, state: LoadState, timeout: Duration) -> E2eResult<()> {
        let options = WaitOptions::new().with_timeout(timeout);
        let what = format!("load state {state}");
        match state {
            LoadState::NetworkIdle => {
                let tracker = std::sync::Mutex::new(NetworkIdleTracker::new(
                    self.config.network_idle_window,
                ));
                poll_until(options, &what, || async {
                    let probe = self.driver.load_probe().await?;
                    let idle = tracker
                        .lock()
                        .map_err(|e| E2eError::Page {
                            message: format!("idle tracker poisoned: {e}"),
                        })?
                        .observe(probe, Instant::now());
                    Ok(idle.then_some(()))
                })
                .await
            }
            LoadState::Load | LoadState::DomContentLoaded => {
                poll_until(options, &what, || async {
                    let probe = self.driver.load_probe().await?;
                    Ok(probe.ready_state.satisfies(state).then_some(()))
                })
                .await
            }
        }
    }

    /// Wait until the live URL matches `pattern`; returns that URL
    #[tracing::instrument(skip(self), fields(pattern = %pattern))]
    pub async fn wait_for_url(&self, pattern: &UrlPattern, timeout: Duration) -> E2eResult<String> {
        let options = WaitOptions::new().with_timeout(timeout);
        let url = poll_until(options, &pattern.to_string(), || async {
            let url = self.driver.current_url().await?;
            Ok(pattern.matches(&url).then_some(url))
        })
        .await?;
        debug!(%url, "url reached");
        Ok(url)
    }

    /// Wait until the live URL is exactly `route` under the base URL
    pub async fn wait_for_route(&self, route: &str) -> E2eResult<String> {
        let pattern = UrlPattern::Exact(self.url_for(route));
        self.wait_for_url(&pattern, self.config.navigation_timeout)
            .await
    }

    /// Sleep; a zero duration returns at once
    pub async fn settle(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Arm the answer for the next native dialog
    pub async fn arm_dialog(&self, action: DialogAction) -> E2eResult<ArmedDialog> {
        self.driver.arm_dialog(action).await
    }

    /// Capture the viewport and write it to `path` as PNG
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub async fn capture_screenshot(&self, path: &Path) -> E2eResult<()> {
        let png = self.driver.screenshot().await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &png).await?;
        info!(bytes = png.len(), "screenshot saved");
        Ok(())
    }
}
