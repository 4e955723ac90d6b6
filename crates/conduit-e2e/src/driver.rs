//! PageDriver - the seam between page objects and the automation protocol.
//!
//! Page objects never talk to the protocol directly. They go through a
//! [`PageDriver`], which has two implementations:
//!
//! - `CdpDriver` (feature `browser`): a real Chromium tab over CDP
//! - [`MockDriver`]: a scriptable in-memory DOM for unit tests
//!
//! Every query re-reads the live document. Drivers hold no element handles
//! between calls.

use crate::dialog::{self, ArmedDialog, Dialog, DialogAction, DialogResponder};
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use crate::wait::{LoadProbe, ReadyState};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// What a query sees of one matched element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Non-empty box and not `visibility: hidden`
    pub visible: bool,
    /// `textContent`
    pub text: String,
    /// Current `value` for form controls
    pub value: Option<String>,
}

/// Abstract driver trait for browser automation
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Get the live URL of the tab
    async fn current_url(&self) -> E2eResult<String>;

    /// Read the document's loading progress
    async fn load_probe(&self) -> E2eResult<LoadProbe>;

    /// Snapshot every element matching a CSS selector, in document order
    async fn query(&self, css: &str) -> E2eResult<Vec<ElementSnapshot>>;

    /// Click the selected element
    async fn click(&self, selector: &Selector) -> E2eResult<()>;

    /// Replace the value of the selected form control
    async fn fill(&self, selector: &Selector, value: &str) -> E2eResult<()>;

    /// Type text one key at a time into the selected element
    async fn type_text(&self, selector: &Selector, text: &str) -> E2eResult<()>;

    /// Arm a one-shot answer for the next native dialog
    async fn arm_dialog(&self, action: DialogAction) -> E2eResult<ArmedDialog>;

    /// Capture the viewport as PNG
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    /// Close the tab and its browser
    async fn close(&self) -> E2eResult<()>;
}

// ============================================================================
// Mock driver
// ============================================================================

/// PNG signature, returned as the mock screenshot
pub const MOCK_PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// One element in the mock document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MockElement {
    /// Rendered and visible
    pub visible: bool,
    /// Text content
    pub text: String,
    /// Form control value
    pub value: Option<String>,
}

impl MockElement {
    /// A visible element with no text
    #[must_use]
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    /// An attached but hidden element
    #[must_use]
    pub fn hidden() -> Self {
        Self::default()
    }

    /// A visible form control holding `value`
    #[must_use]
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            visible: true,
            text: String::new(),
            value: Some(value.into()),
        }
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn snapshot(&self) -> ElementSnapshot {
        ElementSnapshot {
            visible: self.visible,
            text: self.text.clone(),
            value: self.value.clone(),
        }
    }
}

/// A driver call recorded by [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    /// `goto(url)`
    Goto(String),
    /// `click(selector)`
    Click(String),
    /// `fill(selector, value)`
    Fill(String, String),
    /// `type_text(selector, text)`
    Type(String, String),
    /// `arm_dialog(action)`
    ArmDialog(DialogAction),
    /// `screenshot()`
    Screenshot,
    /// `close()`
    Close,
}

/// In-memory document model the mock driver reads and mutates
#[derive(Debug)]
pub struct MockDom {
    url: String,
    elements: HashMap<String, Vec<MockElement>>,
    ready_state: ReadyState,
    resource_count: usize,
    armed: Option<DialogResponder>,
    dialogs: Vec<Dialog>,
    actions: Vec<MockAction>,
    closed: bool,
}

impl Default for MockDom {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            elements: HashMap::new(),
            ready_state: ReadyState::Complete,
            resource_count: 0,
            armed: None,
            dialogs: Vec::new(),
            actions: Vec::new(),
            closed: false,
        }
    }
}

impl MockDom {
    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Change the URL (client-side routing)
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Replace all elements matching `css`
    pub fn set(&mut self, css: impl Into<String>, elements: Vec<MockElement>) {
        let _ = self.elements.insert(css.into(), elements);
    }

    /// Make `css` match exactly one element
    pub fn put(&mut self, css: impl Into<String>, element: MockElement) {
        self.set(css, vec![element]);
    }

    /// Make `css` match nothing
    pub fn remove(&mut self, css: &str) {
        let _ = self.elements.remove(css);
    }

    /// Remove every element
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Elements matching `css`
    #[must_use]
    pub fn elements(&self, css: &str) -> &[MockElement] {
        self.elements.get(css).map_or(&[], Vec::as_slice)
    }

    /// Value of the first element matching `css`
    #[must_use]
    pub fn value(&self, css: &str) -> Option<&str> {
        self.elements(css).first().and_then(|e| e.value.as_deref())
    }

    /// Set the document ready state
    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Pretend the page fetched `n` more resources
    pub fn add_resources(&mut self, n: usize) {
        self.resource_count += n;
    }

    /// Dialogs answered so far
    #[must_use]
    pub fn dialogs(&self) -> &[Dialog] {
        &self.dialogs
    }

    /// Driver calls so far
    #[must_use]
    pub fn actions(&self) -> &[MockAction] {
        &self.actions
    }

    /// Whether `close()` was called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Open a native dialog from inside a hook.
    ///
    /// Answered by the armed responder if there is one. With nothing armed
    /// the page would block forever, which the mock reports as an error.
    pub fn open_dialog(&mut self, dialog: Dialog) -> E2eResult<DialogAction> {
        let responder = self.armed.take().filter(|r| !r.is_disarmed());
        let Some(responder) = responder else {
            return Err(E2eError::Dialog {
                message: format!(
                    "{} dialog \"{}\" opened with no handler armed; page is blocked",
                    dialog.dialog_type(),
                    dialog.message()
                ),
            });
        };
        let action = responder.action().clone();
        let answered = dialog.answered(action.clone());
        self.dialogs.push(answered.clone());
        responder.resolve(Ok(answered));
        Ok(action)
    }

    fn element_mut(&mut self, selector: &Selector) -> E2eResult<&mut MockElement> {
        let index = selector.index().unwrap_or(0);
        self.elements
            .get_mut(selector.css_text())
            .and_then(|els| els.get_mut(index))
            .ok_or_else(|| E2eError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

/// Hook run when an element is clicked
pub type ClickHook = Arc<dyn Fn(&mut MockDom) -> E2eResult<()> + Send + Sync>;

/// Hook run after every `goto`, with the target URL
pub type NavigateHook = Arc<dyn Fn(&mut MockDom, &str) + Send + Sync>;

/// Mock driver for unit testing
///
/// Clones share the same document, so a test can keep a handle for
/// inspection while page objects drive it.
#[derive(Clone, Default)]
pub struct MockDriver {
    dom: Arc<Mutex<MockDom>>,
    click_hooks: Arc<Mutex<HashMap<String, ClickHook>>>,
    navigate_hook: Arc<Mutex<Option<NavigateHook>>>,
}

impl std::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hooks = self.click_hooks.lock().map(|h| h.len()).unwrap_or(0);
        f.debug_struct("MockDriver")
            .field("click_hooks", &hooks)
            .finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Create new mock driver on `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the document
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        let mut dom = self
            .dom
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut dom)
    }

    /// Run `hook` whenever the element matching `css` is clicked
    pub fn on_click<F>(&self, css: impl Into<String>, hook: F)
    where
        F: Fn(&mut MockDom) -> E2eResult<()> + Send + Sync + 'static,
    {
        if let Ok(mut hooks) = self.click_hooks.lock() {
            let _ = hooks.insert(css.into(), Arc::new(hook));
        }
    }

    /// Run `hook` after every navigation
    pub fn on_navigate<F>(&self, hook: F)
    where
        F: Fn(&mut MockDom, &str) + Send + Sync + 'static,
    {
        if let Ok(mut slot) = self.navigate_hook.lock() {
            *slot = Some(Arc::new(hook));
        }
    }

    /// Recorded driver calls
    #[must_use]
    pub fn actions(&self) -> Vec<MockAction> {
        self.with_dom(|dom| dom.actions().to_vec())
    }

    /// Check if a click on `css` was recorded
    #[must_use]
    pub fn was_clicked(&self, css: &str) -> bool {
        self.actions()
            .iter()
            .any(|a| matches!(a, MockAction::Click(s) if s.starts_with(css)))
    }

    fn dom(&self) -> E2eResult<MutexGuard<'_, MockDom>> {
        let dom = self.dom.lock().map_err(|e| E2eError::Page {
            message: format!("mock document poisoned: {e}"),
        })?;
        if dom.closed {
            return Err(E2eError::Page {
                message: "page has been closed".to_string(),
            });
        }
        Ok(dom)
    }

    fn click_hook(&self, css: &str) -> Option<ClickHook> {
        self.click_hooks.lock().ok().and_then(|h| h.get(css).cloned())
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let hook = self.navigate_hook.lock().ok().and_then(|h| h.clone());
        let mut dom = self.dom()?;
        dom.actions.push(MockAction::Goto(url.to_string()));
        dom.set_url(url);
        if let Some(hook) = hook {
            hook(&mut dom, url);
        }
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.dom()?.url.clone())
    }

    async fn load_probe(&self) -> E2eResult<LoadProbe> {
        let dom = self.dom()?;
        Ok(LoadProbe {
            ready_state: dom.ready_state,
            resource_count: dom.resource_count,
        })
    }

    async fn query(&self, css: &str) -> E2eResult<Vec<ElementSnapshot>> {
        let dom = self.dom()?;
        Ok(dom.elements(css).iter().map(MockElement::snapshot).collect())
    }

    async fn click(&self, selector: &Selector) -> E2eResult<()> {
        let hook = self.click_hook(selector.css_text());
        let mut dom = self.dom()?;
        dom.actions.push(MockAction::Click(selector.to_string()));
        let _ = dom.element_mut(selector)?;
        match hook {
            Some(hook) => hook(&mut dom),
            None => Ok(()),
        }
    }

    async fn fill(&self, selector: &Selector, value: &str) -> E2eResult<()> {
        let mut dom = self.dom()?;
        dom.actions
            .push(MockAction::Fill(selector.to_string(), value.to_string()));
        dom.element_mut(selector)?.value = Some(value.to_string());
        Ok(())
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> E2eResult<()> {
        let mut dom = self.dom()?;
        dom.actions
            .push(MockAction::Type(selector.to_string(), text.to_string()));
        let element = dom.element_mut(selector)?;
        element.value.get_or_insert_with(String::new).push_str(text);
        Ok(())
    }

    async fn arm_dialog(&self, action: DialogAction) -> E2eResult<ArmedDialog> {
        let mut dom = self.dom()?;
        dom.actions.push(MockAction::ArmDialog(action.clone()));
        let (armed, responder) = dialog::arm(action);
        dom.armed = Some(responder);
        Ok(armed)
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let mut dom = self.dom()?;
        dom.actions.push(MockAction::Screenshot);
        Ok(MOCK_PNG.to_vec())
    }

    async fn close(&self) -> E2eResult<()> {
        let mut dom = self.dom()?;
        dom.actions.push(MockAction::Close);
        dom.closed = true;
        Ok(())
    }
}
