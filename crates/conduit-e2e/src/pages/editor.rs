use super::PageObject;
use crate::client::AutomationClient;
use crate::locator::{ElementState, Locator};
use crate::result::E2eResult;
use crate::slug::{article_slug, article_url_pattern};
use crate::tags::{expected_field_value, normalize_field_value, tags_match_field, TagFieldFormat};
use crate::wait::UrlPattern;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// The article form, used both for new articles and for edits
#[derive(Debug, Clone)]
pub struct ArticleEditorPage {
    client: AutomationClient,
    root: Locator,
    title: Locator,
    description: Locator,
    body: Locator,
    tags: Locator,
    publish_button: Locator,
}

impl ArticleEditorPage {
    /// New-article route
    pub const ROUTE: &'static str = "/#/editor";

    /// Build the page object over `client`
    #[must_use]
    pub fn new(client: AutomationClient) -> Self {
        Self {
            root: client.locator("form"),
            title: client.locator(r#"input[name="title"]"#),
            description: client.locator(r#"input[name="description"]"#),
            body: client.locator(r#"textarea[name="body"]"#),
            tags: client.locator(r#"input[name="tags"]"#),
            publish_button: client.locator(r#"button[type="submit"]"#),
            client,
        }
    }

    /// Open the new-article route and wait for the form
    #[tracing::instrument(skip(self))]
    pub async fn goto_new_article_page(&self) -> bool {
        self.open().await
    }

    /// Fill the form, publish, and confirm the app routed to the new article.
    ///
    /// The same form serves edits: the fields are overwritten and the tag
    /// input is cleared before the tags are typed again.
    #[tracing::instrument(skip(self, description, body, tags))]
    pub async fn create_article(
        &self,
        title: &str,
        description: &str,
        body: &str,
        tags: &[String],
    ) -> bool {
        match self.try_create_article(title, description, body, tags).await {
            Ok(on_article) => on_article,
            Err(err) => {
                error!(error = %err, "failed to create article");
                false
            }
        }
    }

    async fn try_create_article(
        &self,
        title: &str,
        description: &str,
        body: &str,
        tags: &[String],
    ) -> E2eResult<bool> {
        info!("creating article");
        self.title.fill(title).await?;
        self.description.fill(description).await?;
        self.body.fill(body).await?;
        self.enter_tags(tags).await?;

        debug!("clicking publish button");
        self.publish_button.click().await?;
        let _ = self.client.wait_for_load().await;

        let slug = article_slug(title);
        let pattern = UrlPattern::Regex(article_url_pattern(&slug));
        let _ = self
            .client
            .wait_for_url(&pattern, self.client.config().navigation_timeout)
            .await?;

        // A URL wait can be satisfied by an unrelated route change.
        let url = self.client.current_url().await?;
        if url.contains(&slug) {
            info!(%url, "article published");
            Ok(true)
        } else {
            warn!(%slug, %url, "not on the expected article page");
            Ok(false)
        }
    }

    // The widget commits a tag on whitespace, so tags are typed one at a time
    // with a space between them and a pause after each.
    async fn enter_tags(&self, tags: &[String]) -> E2eResult<()> {
        self.tags.click().await?;
        self.tags.fill("").await?;
        let settle = self.client.config().tag_settle;
        for (i, tag) in tags.iter().enumerate() {
            debug!(%tag, "adding tag");
            self.tags.press_sequentially(tag).await?;
            if i + 1 < tags.len() {
                self.tags.press_sequentially(" ").await?;
            }
            self.client.settle(settle).await;
        }
        Ok(())
    }

    /// Whether the form currently holds exactly the expected article.
    ///
    /// Title, description and body must match exactly. Tags are compared in
    /// whichever serialization the field is showing.
    #[tracing::instrument(skip(self, description, body, tags))]
    pub async fn verify_article_fields_data(
        &self,
        title: &str,
        description: &str,
        body: &str,
        tags: &[String],
    ) -> bool {
        match self.try_verify(title, description, body, tags).await {
            Ok(matches) => matches,
            Err(err) => {
                error!(error = %err, "error verifying article fields");
                false
            }
        }
    }

    async fn try_verify(
        &self,
        title: &str,
        description: &str,
        body: &str,
        tags: &[String],
    ) -> E2eResult<bool> {
        let timeout = self.client.config().action_timeout;
        for field in [&self.title, &self.description, &self.body, &self.tags] {
            field.wait_for(ElementState::Visible, timeout).await?;
        }

        let fields = [
            ("title", &self.title, title),
            ("description", &self.description, description),
            ("body", &self.body, body),
        ];
        for (name, locator, expected) in fields {
            let actual = locator.input_value().await?;
            if actual != expected {
                warn!(field = name, %expected, %actual, "field verification failed");
                return Ok(false);
            }
            debug!(field = name, "field verification passed");
        }

        let raw = self.tags.input_value().await?;
        let format = TagFieldFormat::detect(&raw);
        if !tags_match_field(&raw, tags) {
            let expected = expected_field_value(format, tags);
            let actual = normalize_field_value(&raw);
            warn!(?format, %expected, %actual, "tags verification failed");
            return Ok(false);
        }
        info!(?format, "all field verifications passed");
        Ok(true)
    }
}

#[async_trait]
impl PageObject for ArticleEditorPage {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockAction, MockDriver, MockElement};
    use crate::pages::testing::{client, url};

    const TITLE: &str = r#"input[name="title"]"#;
    const DESCRIPTION: &str = r#"input[name="description"]"#;
    const BODY: &str = r#"textarea[name="body"]"#;
    const TAGS: &str = r#"input[name="tags"]"#;
    const PUBLISH: &str = r#"button[type="submit"]"#;

    fn editor_form(driver: &MockDriver, values: [&str; 4]) {
        driver.with_dom(|dom| {
            dom.set_url(url("/#/editor"));
            dom.put("form", MockElement::visible());
            dom.put(TITLE, MockElement::input(values[0]));
            dom.put(DESCRIPTION, MockElement::input(values[1]));
            dom.put(BODY, MockElement::input(values[2]));
            dom.put(TAGS, MockElement::input(values[3]));
            dom.put(PUBLISH, MockElement::visible());
        });
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| (*t).to_string()).collect()
    }

    fn publish_routes_to_slug(driver: &MockDriver) {
        driver.on_click(PUBLISH, |dom| {
            let title = dom.value(TITLE).unwrap_or_default().to_string();
            dom.set_url(url(&crate::slug::article_route(&title)));
            Ok(())
        });
    }

    mod create_tests {
        use super::*;

        #[tokio::test]
        async fn test_create_types_tags_with_spaces() {
            let driver = MockDriver::new();
            editor_form(&driver, ["", "", "", "stale"]);
            publish_routes_to_slug(&driver);
            let editor = ArticleEditorPage::new(client(&driver));

            let created = editor
                .create_article("Hello World 1", "d", "b", &tags(&["a", "b", "c"]))
                .await;

            assert!(created);
            assert_eq!(driver.with_dom(|dom| dom.value(TAGS).map(String::from)), Some("a b c".into()));
            let typed: Vec<String> = driver
                .actions()
                .into_iter()
                .filter_map(|a| match a {
                    MockAction::Type(_, text) => Some(text),
                    _ => None,
                })
                .collect();
            assert_eq!(typed, vec!["a", " ", "b", " ", "c"]);
        }

        #[tokio::test]
        async fn test_tags_field_is_cleared_before_typing() {
            let driver = MockDriver::new();
            editor_form(&driver, ["", "", "", "old,tags"]);
            publish_routes_to_slug(&driver);
            let editor = ArticleEditorPage::new(client(&driver));
            assert!(editor.create_article("T", "d", "b", &tags(&["x"])).await);
            assert!(driver
                .actions()
                .contains(&MockAction::Fill(format!("{TAGS} >> nth=0"), String::new())));
        }

        #[tokio::test]
        async fn test_unrelated_article_route_fails() {
            let driver = MockDriver::new();
            editor_form(&driver, ["", "", "", ""]);
            driver.on_click(PUBLISH, |dom| {
                dom.set_url(url("/#/article/something-else"));
                Ok(())
            });
            let editor = ArticleEditorPage::new(client(&driver));
            assert!(!editor.create_article("My Title", "d", "b", &[]).await);
        }

        #[tokio::test]
        async fn test_missing_form_fails() {
            let driver = MockDriver::new();
            let editor = ArticleEditorPage::new(client(&driver));
            assert!(!editor.create_article("T", "d", "b", &[]).await);
        }
    }

    mod verify_tests {
        use super::*;

        #[tokio::test]
        async fn test_verify_create_view() {
            let driver = MockDriver::new();
            editor_form(&driver, ["T", "D", "B", "a b"]);
            let editor = ArticleEditorPage::new(client(&driver));
            assert!(editor.verify_article_fields_data("T", "D", "B", &tags(&["a", "b"])).await);
            assert!(!editor.verify_article_fields_data("T", "D", "B", &tags(&["b", "a"])).await);
        }

        #[tokio::test]
        async fn test_verify_edit_view_ignores_order() {
            let driver = MockDriver::new();
            editor_form(&driver, ["T", "D", "B", "playwright,testing,automation"]);
            let editor = ArticleEditorPage::new(client(&driver));
            assert!(
                editor
                    .verify_article_fields_data(
                        "T",
                        "D",
                        "B",
                        &tags(&["testing", "automation", "playwright"])
                    )
                    .await
            );
        }

        #[tokio::test]
        async fn test_verify_edit_view_rejects_missing_tag() {
            let driver = MockDriver::new();
            editor_form(&driver, ["T", "D", "B", "playwright,testing"]);
            let editor = ArticleEditorPage::new(client(&driver));
            assert!(
                !editor
                    .verify_article_fields_data(
                        "T",
                        "D",
                        "B",
                        &tags(&["testing", "automation", "playwright"])
                    )
                    .await
            );
        }

        #[tokio::test]
        async fn test_verify_rejects_field_mismatch() {
            let driver = MockDriver::new();
            editor_form(&driver, ["T", "D", "B", ""]);
            let editor = ArticleEditorPage::new(client(&driver));
            assert!(!editor.verify_article_fields_data("T", "D", "B ", &[]).await);
            assert!(!editor.verify_article_fields_data("t", "D", "B", &[]).await);
        }

        #[tokio::test]
        async fn test_verify_fails_when_field_hidden() {
            let driver = MockDriver::new();
            editor_form(&driver, ["T", "D", "B", ""]);
            driver.with_dom(|dom| dom.put(BODY, MockElement::hidden()));
            let editor = ArticleEditorPage::new(client(&driver));
            assert!(!editor.verify_article_fields_data("T", "D", "B", &[]).await);
        }
    }
}
