//! Page objects, one per Conduit screen.
//!
//! Each page object owns an [`AutomationClient`] and a fixed set of
//! [`Locator`]s. Nothing read from the DOM is cached: every operation
//! re-queries the live document.
//!
//! Operations that the journeys branch on return `bool` and log the
//! failure. Reads that a caller compares against expected text return
//! `E2eResult` so a missing element surfaces as an error.

mod article;
mod editor;
mod home;
mod login;

pub use article::ArticleDetailPage;
pub use editor::ArticleEditorPage;
pub use home::HomePage;
pub use login::{LoginPage, LoginState};

use crate::client::AutomationClient;
use crate::locator::{ElementState, Locator};
use crate::result::E2eResult;
use async_trait::async_trait;

/// Trait for page objects representing one screen of the app.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Route this screen lives at (e.g., "/#/login")
    fn route(&self) -> &str;

    /// Container element that marks the screen as rendered
    fn root(&self) -> &Locator;

    /// Client the page drives
    fn client(&self) -> &AutomationClient;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("page")
    }

    /// Wait for the root to be visible within the action timeout
    async fn wait_until_loaded(&self) -> E2eResult<()> {
        let timeout = self.client().config().action_timeout;
        self.root().wait_for(ElementState::Visible, timeout).await
    }

    /// Navigate to [`Self::route`] and wait for the root.
    ///
    /// The navigation result is logged but not decisive: the screen counts
    /// as reached once its root is visible.
    async fn open(&self) -> bool {
        let navigated = self.client().navigate_to(self.route()).await;
        match self.wait_until_loaded().await {
            Ok(()) => {
                tracing::info!(page = self.page_name(), navigated, "page is visible");
                true
            }
            Err(err) => {
                tracing::error!(page = self.page_name(), error = %err, "page did not render");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared mock setup for page object tests.

    use crate::client::AutomationClient;
    use crate::config::E2eConfig;
    use crate::driver::MockDriver;
    use std::sync::Arc;
    use std::time::Duration;

    pub const BASE: &str = "http://conduit.test";

    /// Client over `driver` with timeouts short enough for unit tests
    pub fn client(driver: &MockDriver) -> AutomationClient {
        let config = E2eConfig::new()
            .with_base_url(BASE)
            .with_action_timeout(Duration::from_millis(100))
            .with_navigation_timeout(Duration::from_millis(200))
            .with_network_idle_window(Duration::from_millis(5))
            .with_tag_settle(Duration::ZERO);
        AutomationClient::new(Arc::new(driver.clone()), config)
    }

    pub fn url(route: &str) -> String {
        format!("{BASE}{route}")
    }
}
