use super::{HomePage, PageObject};
use crate::client::AutomationClient;
use crate::dialog::DialogAction;
use crate::locator::Locator;
use crate::result::E2eResult;
use async_trait::async_trait;
use tracing::{error, info, warn};

/// A published article
#[derive(Debug, Clone)]
pub struct ArticleDetailPage {
    client: AutomationClient,
    root: Locator,
    title: Locator,
    body: Locator,
    tags: Locator,
    delete_button: Locator,
    edit_button: Locator,
}

impl ArticleDetailPage {
    /// Prefix of every article route
    pub const ROUTE: &'static str = "/#/article/";

    /// Build the page object over `client`
    #[must_use]
    pub fn new(client: AutomationClient) -> Self {
        Self {
            root: client.locator("div.article-page"),
            title: client.locator(".banner h1"),
            body: client.locator(".article-content .col-md-12"),
            tags: client.locator(".article-content .tag-list .tag-default"),
            delete_button: client
                .locator("button.btn.btn-sm:has(i.ion-trash-a)")
                .first(),
            edit_button: client.locator("a.nav-link:has(i.ion-edit)").first(),
            client,
        }
    }

    /// Headline, trimmed; empty when absent
    pub async fn get_article_title(&self) -> E2eResult<String> {
        Ok(trimmed(self.title.text_content().await?))
    }

    /// Rendered body, trimmed; empty when absent
    pub async fn get_article_body(&self) -> E2eResult<String> {
        Ok(trimmed(self.body.text_content().await?))
    }

    /// Tag pills in display order, trimmed, empties skipped
    pub async fn get_article_tags(&self) -> E2eResult<Vec<String>> {
        Ok(self
            .tags
            .all_text_contents()
            .await?
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect())
    }

    /// Headline equals `expected`, both trimmed
    pub async fn validate_article_title(&self, expected: &str) -> bool {
        match self.get_article_title().await {
            Ok(actual) => actual == expected.trim(),
            Err(err) => {
                error!(error = %err, "could not read article title");
                false
            }
        }
    }

    /// Body equals `expected`, both trimmed
    pub async fn validate_article_body(&self, expected: &str) -> bool {
        match self.get_article_body().await {
            Ok(actual) => actual == expected.trim(),
            Err(err) => {
                error!(error = %err, "could not read article body");
                false
            }
        }
    }

    /// Every expected tag is shown; extra tags are allowed
    pub async fn validate_article_tags(&self, expected: &[String]) -> bool {
        match self.get_article_tags().await {
            Ok(actual) => expected.iter().all(|tag| actual.contains(tag)),
            Err(err) => {
                error!(error = %err, "could not read article tags");
                false
            }
        }
    }

    /// Delete the article, accepting the confirmation, and wait for home.
    ///
    /// The confirm dialog blocks the page until answered, so the answer is
    /// armed before the click.
    #[tracing::instrument(skip(self))]
    pub async fn delete_article(&self) -> bool {
        let armed = match self.client.arm_dialog(DialogAction::Accept).await {
            Ok(armed) => armed,
            Err(err) => {
                error!(error = %err, "could not arm confirmation handler");
                return false;
            }
        };

        if let Err(err) = self.delete_button.click().await {
            error!(error = %err, "failed to click delete");
            return false;
        }

        match armed.resolved(self.client.config().action_timeout).await {
            Ok(dialog) => info!(
                kind = %dialog.dialog_type(),
                message = dialog.message(),
                "dialog accepted"
            ),
            Err(err) => warn!(error = %err, "confirmation dialog was not handled"),
        }

        let _ = self.client.wait_for_load().await;
        match self.client.wait_for_route(HomePage::ROUTE).await {
            Ok(_) => {
                info!("article deleted, redirected to home page");
                true
            }
            Err(err) => {
                error!(error = %err, "failed to delete article");
                false
            }
        }
    }

    /// Click Edit Article and wait for the editor to load
    #[tracing::instrument(skip(self))]
    pub async fn edit_article(&self) -> bool {
        if let Err(err) = self.edit_button.click().await {
            error!(error = %err, "failed to click edit");
            return false;
        }
        let loaded = self.client.wait_for_load().await;
        if loaded {
            info!("navigated to editor page");
        }
        loaded
    }
}

fn trimmed(text: Option<String>) -> String {
    text.map(|t| t.trim().to_string()).unwrap_or_default()
}

#[async_trait]
impl PageObject for ArticleDetailPage {
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
