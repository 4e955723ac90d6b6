//! conduit-e2e: page-object end-to-end suite for the Conduit demo app
//!
//! Drives a real Chromium over CDP through sign-in and the full article
//! lifecycle (create, verify, edit, verify, delete). The same page objects
//! run against an in-memory [`MockDriver`] in unit tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    conduit-e2e Architecture                      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ Automation │            │
//! │   │ Runner     │───►│ Objects    │───►│ Client     │            │
//! │   │ (retries)  │    │ (4 screens)│    │ (waits)    │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │                    │
//! │                          ┌──────────────────┴─────┐              │
//! │                          ▼                        ▼              │
//! │                   ┌────────────┐          ┌────────────┐         │
//! │                   │ CdpDriver  │          │ MockDriver │         │
//! │                   │ (chromium) │          │ (in-memory)│         │
//! │                   └────────────┘          └────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use conduit_e2e::{run_scenario, E2eConfig, E2eResult, ScenarioKind, TestSession};
//!
//! # async fn demo() {
//! let config = E2eConfig::new();
//! let sessions = |config: &E2eConfig| -> E2eResult<TestSession> {
//!     Ok(TestSession::with_driver(
//!         std::sync::Arc::new(conduit_e2e::MockDriver::new()),
//!         config.clone(),
//!     ))
//! };
//! let report = run_scenario(ScenarioKind::ArticleLifecycle, &sessions, &config).await;
//! println!("{}: {}", report.name, report.passed);
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod client;
mod config;
mod data;
mod dialog;
mod driver;
mod fixture;
mod locator;
mod result;
mod scenario;
mod slug;
mod tags;
mod wait;

/// CDP-backed driver (requires the `browser` feature)
#[cfg(feature = "browser")]
pub mod browser;

/// Page objects for the four Conduit screens
pub mod pages;

/// Tracing subscriber setup
pub mod telemetry;

pub use client::AutomationClient;
pub use config::{E2eConfig, ScreenshotPolicy, Timeouts, DEFAULT_BASE_URL};
pub use data::{
    credentials_for, generate_random_id, login_test_data, random_id, test_article,
    CredentialRecord, LoginScenario, TestArticle, DEFAULT_ID_MAX, DEFAULT_ID_MIN,
};
pub use dialog::{arm, ArmedDialog, Dialog, DialogAction, DialogResponder, DialogType};
pub use driver::{
    ClickHook, ElementSnapshot, MockAction, MockDom, MockDriver, MockElement, NavigateHook,
    PageDriver, MOCK_PNG,
};
pub use fixture::{sanitize_name, Pages, SessionFactory, TestSession};
pub use locator::{ElementState, Locator, Selector};
pub use pages::{
    ArticleDetailPage, ArticleEditorPage, HomePage, LoginPage, LoginState, PageObject,
};
pub use result::{E2eError, E2eResult};
pub use scenario::{
    article_lifecycle_journey, login_journey, run_scenario, ScenarioKind, ScenarioReport,
};
pub use slug::{article_route, article_slug, article_url_pattern};
pub use tags::{expected_field_value, normalize_field_value, tags_match_field, TagFieldFormat};
pub use wait::{
    poll_until, LoadProbe, LoadState, NetworkIdleTracker, ReadyState, UrlPattern, WaitOptions,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS, NETWORK_IDLE_THRESHOLD_MS,
};

#[cfg(feature = "browser")]
pub use browser::CdpDriver;
#[cfg(feature = "browser")]
pub use fixture::BrowserSessions;
