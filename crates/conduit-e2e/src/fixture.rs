//! Fixture provisioning: one session, one set of page objects per test.
//!
//! A [`TestSession`] owns the driver for exactly one test. It is created
//! at test start, hands out the page objects, and on [`TestSession::finish`]
//! applies the screenshot policy and closes the browser.

use crate::client::AutomationClient;
use crate::config::E2eConfig;
use crate::driver::PageDriver;
use crate::pages::{ArticleDetailPage, ArticleEditorPage, HomePage, LoginPage};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// One instance of every page object, sharing a session
#[derive(Debug, Clone)]
pub struct Pages {
    /// Home feed and navigation
    pub home: HomePage,
    /// Sign-in screen
    pub login: LoginPage,
    /// Article editor
    pub editor: ArticleEditorPage,
    /// Article detail
    pub article: ArticleDetailPage,
}

impl Pages {
    /// Build every page object over `client`
    #[must_use]
    pub fn provision(client: &AutomationClient) -> Self {
        Self {
            home: HomePage::new(client.clone()),
            login: LoginPage::new(client.clone()),
            editor: ArticleEditorPage::new(client.clone()),
            article: ArticleDetailPage::new(client.clone()),
        }
    }
}

/// The browser session and page objects for one test
#[derive(Debug)]
pub struct TestSession {
    client: AutomationClient,
    pages: Pages,
}

impl TestSession {
    /// Wrap an existing driver
    #[must_use]
    pub fn with_driver(driver: Arc<dyn PageDriver>, config: E2eConfig) -> Self {
        let client = AutomationClient::new(driver, config);
        let pages = Pages::provision(&client);
        Self { client, pages }
    }

    /// Launch a fresh Chromium for this test
    #[cfg(feature = "browser")]
    pub async fn launch(config: E2eConfig) -> E2eResult<Self> {
        let driver = crate::browser::CdpDriver::launch(&config).await?;
        Ok(Self::with_driver(Arc::new(driver), config))
    }

    /// Page objects for this session
    #[must_use]
    pub const fn pages(&self) -> &Pages {
        &self.pages
    }

    /// Client for this session
    #[must_use]
    pub const fn client(&self) -> &AutomationClient {
        &self.client
    }

    /// End the test: screenshot per policy, then close the browser.
    ///
    /// Returns the screenshot path if one was written. A failed capture is
    /// logged and does not fail teardown; a failed close does.
    pub async fn finish(self, name: &str, passed: bool) -> E2eResult<Option<PathBuf>> {
        let config = self.client.config();
        let mut written = None;
        if config.screenshots.should_capture(passed) {
            let path = config
                .screenshots_dir
                .join(format!("{}.png", sanitize_name(name)));
            match self.client.capture_screenshot(&path).await {
                Ok(()) => written = Some(path),
                Err(err) => warn!(test = name, error = %err, "screenshot failed"),
            }
        }
        self.client
            .driver()
            .close()
            .await
            .map_err(|e| E2eError::Fixture {
                message: format!("closing session for `{name}`: {e}"),
            })?;
        info!(test = name, passed, "session closed");
        Ok(written)
    }
}

/// File-name-safe form of a test name
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "test".to_string()
    } else {
        cleaned
    }
}

/// Source of fresh sessions, one per scenario attempt
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Create a new, isolated session
    async fn create(&self, config: &E2eConfig) -> E2eResult<TestSession>;
}

#[async_trait]
impl<F> SessionFactory for F
where
    F: Fn(&E2eConfig) -> E2eResult<TestSession> + Send + Sync,
{
    async fn create(&self, config: &E2eConfig) -> E2eResult<TestSession> {
        self(config)
    }
}

/// Launches a new Chromium per session
#[cfg(feature = "browser")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSessions;

#[cfg(feature = "browser")]
#[async_trait]
impl SessionFactory for BrowserSessions {
    async fn create(&self, config: &E2eConfig) -> E2eResult<TestSession> {
        TestSession::launch(config.clone()).await
    }
}
