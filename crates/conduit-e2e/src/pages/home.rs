use super::PageObject;
use crate::client::AutomationClient;
use crate::locator::Locator;
use crate::result::E2eResult;
use async_trait::async_trait;
use tracing::{error, info};

/// The article feed and top navigation
#[derive(Debug, Clone)]
pub struct HomePage {
    client: AutomationClient,
    root: Locator,
    login_link: Locator,
    new_article_link: Locator,
    user_dropdown: Locator,
}

impl HomePage {
    /// Home route
    pub const ROUTE: &'static str = "/#/";

    /// Build the page object over `client`
    #[must_use]
    pub fn new(client: AutomationClient) -> Self {
        Self {
            root: client.locator("div.home-page"),
            login_link: client.locator(r##"li.nav-item a[href="#/login"]"##),
            new_article_link: client.locator(r##"li.nav-item a[href="#/editor"]"##),
            user_dropdown: client.locator("li.nav-item.dropdown .nav-link.dropdown-toggle"),
            client,
        }
    }

    /// Open the home route and wait for the feed container
    #[tracing::instrument(skip(self))]
    pub async fn go_to_home_page(&self) -> bool {
        self.open().await
    }

    /// Click the Sign in link and wait for the login route
    #[tracing::instrument(skip(self))]
    pub async fn go_to_login_from_home(&self) -> bool {
        let result: E2eResult<String> = async {
            self.login_link.click().await?;
            self.client.wait_for_route("/#/login").await
        }
        .await;
        match result {
            Ok(url) => {
                info!(%url, "on login page");
                true
            }
            Err(err) => {
                error!(error = %err, "failed to reach login page");
                false
            }
        }
    }

    /// Click New Article, wait for load, then wait for the editor route
    #[tracing::instrument(skip(self))]
    pub async fn create_new_article(&self) -> bool {
        let result: E2eResult<String> = async {
            self.new_article_link.click().await?;
            let _ = self.client.wait_for_load().await;
            self.client.wait_for_route("/#/editor").await
        }
        .await;
        match result {
            Ok(url) => {
                info!(%url, "on article editor");
                true
            }
            Err(err) => {
                error!(error = %err, "failed to reach article editor");
                false
            }
        }
    }

    /// Signed in and settled: login link hidden, user menu visible, feed visible.
    ///
    /// The three readings are taken independently so a half-rendered header
    /// (login link gone, user menu not yet drawn) reads as signed out.
    #[tracing::instrument(skip(self))]
    pub async fn is_user_authenticated(&self) -> bool {
        let readings: E2eResult<(bool, bool, bool)> = async {
            Ok((
                self.login_link.is_hidden().await?,
                self.user_dropdown.is_visible().await?,
                self.root.is_visible().await?,
            ))
        }
        .await;
        match readings {
            Ok((login_link_hidden, user_dropdown_visible, home_page_visible)) => {
                info!(
                    login_link_hidden,
                    user_dropdown_visible, home_page_visible, "authentication checks"
                );
                login_link_hidden && user_dropdown_visible && home_page_visible
            }
            Err(err) => {
                error!(error = %err, "could not read authentication state");
                false
            }
        }
    }
}

#[async_trait]
impl PageObject for HomePage {
    fn route(&self) -> &str {
        Self::ROUTE
    }

    fn root(&self) -> &Locator {
        &self.root
    }

    fn client(&self) -> &AutomationClient {
        &self.client
    }
}
