//! Real browser control over the Chrome `DevTools` Protocol.
//!
//! Compiled with the `browser` feature. [`CdpDriver`] owns one Chromium
//! process and one tab, and implements [`PageDriver`] against it.

use crate::config::E2eConfig;
use crate::dialog::{self, ArmedDialog, Dialog, DialogAction, DialogType};
use crate::driver::{ElementSnapshot, PageDriver};
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use crate::wait::LoadProbe;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, DialogType as CdpDialogType,
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const QUERY_JS: &str = r"
(css) => Array.from(document.querySelectorAll(css)).map((el) => {
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return {
        visible: rect.width > 0 && rect.height > 0
            && style.visibility !== 'hidden' && style.display !== 'none',
        text: el.textContent ?? '',
        value: typeof el.value === 'string' ? el.value : null,
    };
})";

const LOAD_PROBE_JS: &str = r"({
    ready_state: document.readyState,
    resource_count: performance.getEntriesByType('resource').length,
})";

fn page_error(e: impl std::fmt::Display) -> E2eError {
    E2eError::Page {
        message: e.to_string(),
    }
}

fn eval_error(e: impl std::fmt::Display) -> E2eError {
    E2eError::Evaluation {
        message: e.to_string(),
    }
}

fn input_error(e: impl std::fmt::Display) -> E2eError {
    E2eError::Input {
        message: e.to_string(),
    }
}

/// Chromium tab driven over CDP
#[derive(Debug)]
pub struct CdpDriver {
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    handler: tokio::task::JoinHandle<()>,
}

impl CdpDriver {
    /// Launch Chromium per `config` and open a blank tab
    ///
    /// # Errors
    ///
    /// Returns error if browser cannot be launched
    #[tracing::instrument(skip(config), fields(headless = config.headless))]
    pub async fn launch(config: &E2eConfig) -> E2eResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(config.navigation_timeout);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder.build().map_err(|e| E2eError::BrowserLaunch { message: e })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| E2eError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        // Handler errors are per-message; the loop ends when the connection does.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "cdp handler");
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(page_error)?;
        info!("browser launched");

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
        })
    }

    async fn element(&self, selector: &Selector) -> E2eResult<Element> {
        let index = selector.index().unwrap_or(0);
        self.page
            .find_elements(selector.css_text())
            .await
            .map_err(page_error)?
            .into_iter()
            .nth(index)
            .ok_or_else(|| E2eError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

fn dialog_type(kind: &CdpDialogType) -> DialogType {
    match kind {
        CdpDialogType::Alert => DialogType::Alert,
        CdpDialogType::Confirm => DialogType::Confirm,
        CdpDialogType::Prompt => DialogType::Prompt,
        CdpDialogType::Beforeunload => DialogType::BeforeUnload,
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| E2eError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(page_error)?
            .unwrap_or_default())
    }

    async fn load_probe(&self) -> E2eResult<LoadProbe> {
        self.page
            .evaluate(LOAD_PROBE_JS)
            .await
            .map_err(eval_error)?
            .into_value()
            .map_err(eval_error)
    }

    async fn query(&self, css: &str) -> E2eResult<Vec<ElementSnapshot>> {
        let css = serde_json::to_string(css)?;
        self.page
            .evaluate(format!("({QUERY_JS})({css})"))
            .await
            .map_err(eval_error)?
            .into_value()
            .map_err(eval_error)
    }

    async fn click(&self, selector: &Selector) -> E2eResult<()> {
        let element = self.element(selector).await?;
        element.click().await.map_err(input_error)?;
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> E2eResult<()> {
        let element = self.element(selector).await?;
        let value = serde_json::to_string(value)?;
        // Native setter so framework-controlled inputs see the change.
        let function = format!(
            "function() {{
                this.focus();
                const proto = this instanceof HTMLTextAreaElement
                    ? HTMLTextAreaElement.prototype
                    : HTMLInputElement.prototype;
                Object.getOwnPropertyDescriptor(proto, 'value').set.call(this, {value});
                this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                this.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }}"
        );
        element
            .call_js_fn(function, false)
            .await
            .map_err(input_error)?;
        Ok(())
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> E2eResult<()> {
        let element = self.element(selector).await?;
        element.focus().await.map_err(input_error)?;
        element.type_str(text).await.map_err(input_error)?;
        Ok(())
    }

    async fn arm_dialog(&self, action: DialogAction) -> E2eResult<ArmedDialog> {
        let mut events = self
            .page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(|e| E2eError::Dialog {
                message: e.to_string(),
            })?;
        let (armed, mut responder) = dialog::arm(action);
        let page = self.page.clone();

        drop(tokio::spawn(async move {
            let event = tokio::select! {
                event = events.next() => event,
                () = responder.disarmed() => {
                    debug!("dialog handler disarmed before any dialog opened");
                    return;
                }
            };
            let Some(event) = event else {
                responder.resolve(Err(E2eError::Dialog {
                    message: "page closed before a dialog opened".to_string(),
                }));
                return;
            };

            let answer = responder.action().clone();
            let mut params = HandleJavaScriptDialogParams::builder().accept(answer.accepts());
            if let Some(text) = answer.prompt_text() {
                params = params.prompt_text(text);
            }
            let outcome = match params.build() {
                Ok(params) => page
                    .execute(params)
                    .await
                    .map(|_| {
                        Dialog::new(dialog_type(&event.r#type), event.message.clone())
                            .answered(answer)
                    })
                    .map_err(|e| E2eError::Dialog {
                        message: e.to_string(),
                    }),
                Err(message) => Err(E2eError::Dialog { message }),
            };
            if let Err(ref err) = outcome {
                warn!(error = %err, "failed to answer dialog");
            }
            responder.resolve(outcome);
        }));

        Ok(armed)
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| E2eError::Screenshot {
                message: e.to_string(),
            })?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| E2eError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn close(&self) -> E2eResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| E2eError::BrowserLaunch {
                message: e.to_string(),
            })?;
        if let Err(err) = browser.wait().await {
            warn!(error = %err, "browser process did not exit cleanly");
        }
        self.handler.abort();
        info!("browser closed");
        Ok(())
    }
}
