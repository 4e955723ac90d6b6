//! Locator abstraction for element selection and interaction.
//!
//! # Design Philosophy
//!
//! - **Lazy**: a locator is a recipe, never a handle. Every call re-queries
//!   the live document, so a re-rendered screen is always seen fresh.
//! - **Auto-Waiting**: actions wait for the target to be visible within the
//!   action timeout before acting
//! - **Cheap**: clone freely; it is a selector plus a driver pointer

use crate::driver::{ElementSnapshot, PageDriver};
use crate::result::{E2eError, E2eResult};
use crate::wait::{poll_until, WaitOptions};
use std::sync::Arc;
use std::time::Duration;

/// A CSS selector, optionally narrowed to one match by index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    css: String,
    nth: Option<usize>,
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            css: selector.into(),
            nth: None,
        }
    }

    /// Narrow to the `index`-th match (zero-based)
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        self.nth = Some(index);
        self
    }

    /// The CSS text
    #[must_use]
    pub fn css_text(&self) -> &str {
        &self.css
    }

    /// Index the selector is narrowed to, if any
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.nth
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.nth {
            Some(i) => write!(f, "{} >> nth={i}", self.css),
            None => write!(f, "{}", self.css),
        }
    }
}

/// States [`Locator::wait_for`] can wait on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// At least one match, and it is visible
    Visible,
    /// No match, or the match is not visible
    Hidden,
    /// At least one match in the document
    Attached,
    /// No match in the document
    Detached,
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visible => write!(f, "visible"),
            Self::Hidden => write!(f, "hidden"),
            Self::Attached => write!(f, "attached"),
            Self::Detached => write!(f, "detached"),
        }
    }
}

/// A lazily-resolved reference to zero or more elements
#[derive(Debug, Clone)]
pub struct Locator {
    driver: Arc<dyn PageDriver>,
    selector: Selector,
    timeout: Duration,
}

impl Locator {
    /// Create a locator; `timeout` bounds the auto-wait before actions
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, css: impl Into<String>, timeout: Duration) -> Self {
        Self {
            driver,
            selector: Selector::css(css),
            timeout,
        }
    }

    /// Narrow to the first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Narrow to the `index`-th match
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            selector: self.selector.clone().nth(index),
            timeout: self.timeout,
        }
    }

    /// Set a custom auto-wait timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    async fn resolve(&self) -> E2eResult<Vec<ElementSnapshot>> {
        let mut all = self.driver.query(self.selector.css_text()).await?;
        Ok(match self.selector.index() {
            Some(i) if i < all.len() => vec![all.swap_remove(i)],
            Some(_) => Vec::new(),
            None => all,
        })
    }

    async fn target(&self) -> E2eResult<ElementSnapshot> {
        self.resolve()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found())
    }

    fn not_found(&self) -> E2eError {
        E2eError::ElementNotFound {
            selector: self.selector.to_string(),
        }
    }

    /// Number of current matches
    pub async fn count(&self) -> E2eResult<usize> {
        Ok(self.resolve().await?.len())
    }

    /// Whether the first match exists and is visible
    pub async fn is_visible(&self) -> E2eResult<bool> {
        Ok(self.resolve().await?.first().is_some_and(|e| e.visible))
    }

    /// Whether there is no visible match
    pub async fn is_hidden(&self) -> E2eResult<bool> {
        Ok(!self.is_visible().await?)
    }

    /// Text content of the first match; `None` when nothing matches
    pub async fn text_content(&self) -> E2eResult<Option<String>> {
        Ok(self.resolve().await?.into_iter().next().map(|e| e.text))
    }

    /// Text content of every match, in document order
    pub async fn all_text_contents(&self) -> E2eResult<Vec<String>> {
        Ok(self.resolve().await?.into_iter().map(|e| e.text).collect())
    }

    /// Current value of the first match (a form control)
    pub async fn input_value(&self) -> E2eResult<String> {
        let element = self.target().await?;
        element.value.ok_or_else(|| E2eError::Input {
            message: format!("`{}` is not a form control", self.selector),
        })
    }

    /// Wait until the element reaches `state`
    pub async fn wait_for(&self, state: ElementState, timeout: Duration) -> E2eResult<()> {
        let what = format!("selector `{}` to be {state}", self.selector);
        let options = WaitOptions::new().with_timeout(timeout);
        poll_until(options, &what, || async {
            let found = self.resolve().await?;
            let visible = found.first().is_some_and(|e| e.visible);
            let reached = match state {
                ElementState::Visible => visible,
                ElementState::Hidden => !visible,
                ElementState::Attached => !found.is_empty(),
                ElementState::Detached => found.is_empty(),
            };
            Ok(reached.then_some(()))
        })
        .await
    }

    async fn actionable(&self) -> E2eResult<()> {
        let Err(err) = self.wait_for(ElementState::Visible, self.timeout).await else {
            return Ok(());
        };
        if self.count().await.unwrap_or(0) == 0 {
            tracing::debug!(selector = %self.selector, error = %err, "no match for action");
            return Err(self.not_found());
        }
        Err(err)
    }

    /// Click the element
    pub async fn click(&self) -> E2eResult<()> {
        self.actionable().await?;
        self.driver.click(&self.actionable_selector()).await
    }

    /// Replace the element's value
    pub async fn fill(&self, value: &str) -> E2eResult<()> {
        self.actionable().await?;
        self.driver.fill(&self.actionable_selector(), value).await
    }

    /// Type `text` key by key, appending to the current value
    pub async fn press_sequentially(&self, text: &str) -> E2eResult<()> {
        self.actionable().await?;
        self.driver.type_text(&self.actionable_selector(), text).await
    }

    // Actions always hit a single element; an unnarrowed locator acts on the first.
    fn actionable_selector(&self) -> Selector {
        match self.selector.index() {
            Some(_) => self.selector.clone(),
            None => self.selector.clone().nth(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockAction, MockDriver, MockElement};

    fn locator(driver: &MockDriver, css: &str) -> Locator {
        Locator::new(Arc::new(driver.clone()), css, Duration::from_millis(50))
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_selector_display() {
            assert_eq!(Selector::css("a.nav-link").to_string(), "a.nav-link");
            assert_eq!(Selector::css("a.nav-link").nth(0).to_string(), "a.nav-link >> nth=0");
        }
    }

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_locator_re_resolves_each_call() {
            let driver = MockDriver::new();
            let title = locator(&driver, ".banner h1");
            assert_eq!(title.text_content().await.unwrap(), None);

            driver.with_dom(|dom| dom.put(".banner h1", MockElement::visible().with_text("One")));
            assert_eq!(title.text_content().await.unwrap().as_deref(), Some("One"));

            driver.with_dom(|dom| dom.put(".banner h1", MockElement::visible().with_text("Two")));
            assert_eq!(title.text_content().await.unwrap().as_deref(), Some("Two"));
        }

        #[tokio::test]
        async fn test_nth_and_all_text_contents() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                dom.set(
                    ".tag-default",
                    vec![
                        MockElement::visible().with_text("a"),
                        MockElement::visible().with_text("b"),
                    ],
                );
            });
            let tags = locator(&driver, ".tag-default");
            assert_eq!(tags.count().await.unwrap(), 2);
            assert_eq!(tags.all_text_contents().await.unwrap(), vec!["a", "b"]);
            assert_eq!(tags.nth(1).text_content().await.unwrap().as_deref(), Some("b"));
            assert_eq!(tags.nth(5).count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_hidden_when_missing_or_invisible() {
            let driver = MockDriver::new();
            let link = locator(&driver, "a.login");
            assert!(link.is_hidden().await.unwrap());
            driver.with_dom(|dom| dom.put("a.login", MockElement::hidden()));
            assert!(link.is_hidden().await.unwrap());
            driver.with_dom(|dom| dom.put("a.login", MockElement::visible()));
            assert!(link.is_visible().await.unwrap());
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_on_missing_element_is_not_found() {
            let driver = MockDriver::new();
            let err = locator(&driver, "button").click().await.unwrap_err();
            assert!(matches!(err, E2eError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_click_on_hidden_element_times_out() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| dom.put("button", MockElement::hidden()));
            let err = locator(&driver, "button").click().await.unwrap_err();
            assert!(err.is_timeout());
            assert!(!driver.was_clicked("button"));
        }

        #[tokio::test]
        async fn test_fill_then_press_sequentially() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| dom.put("input", MockElement::input("stale")));
            let input = locator(&driver, "input");
            input.fill("").await.unwrap();
            input.press_sequentially("rust").await.unwrap();
            assert_eq!(input.input_value().await.unwrap(), "rust");
            assert!(driver
                .actions()
                .contains(&MockAction::Type("input >> nth=0".to_string(), "rust".to_string())));
        }

        #[tokio::test]
        async fn test_input_value_requires_form_control() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| dom.put("h1", MockElement::visible()));
            let err = locator(&driver, "h1").input_value().await.unwrap_err();
            assert!(matches!(err, E2eError::Input { .. }));
        }
    }

    mod wait_tests {
        use super::*;

        #[tokio::test]
        async fn test_wait_for_visible_sees_late_render() {
            let driver = MockDriver::new();
            let spawned = driver.clone();
            let _task = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                spawned.with_dom(|dom| dom.put("ul.error-messages", MockElement::visible()));
            });
            locator(&driver, "ul.error-messages")
                .wait_for(ElementState::Visible, Duration::from_secs(2))
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_wait_for_detached_and_attached() {
            let driver = MockDriver::new();
            let spinner = locator(&driver, ".spinner");
            spinner
                .wait_for(ElementState::Detached, Duration::from_millis(50))
                .await
                .unwrap();
            driver.with_dom(|dom| dom.put(".spinner", MockElement::hidden()));
            spinner
                .wait_for(ElementState::Attached, Duration::from_millis(50))
                .await
                .unwrap();
            let err = spinner
                .wait_for(ElementState::Visible, Duration::from_millis(30))
                .await
                .unwrap_err();
            assert!(err.to_string().contains(".spinner"));
        }
    }
}
