//! User journeys and the scenario runner.
//!
//! A journey is a sequence of page-object calls. Every step that decides
//! the outcome is checked, and a failed check is an
//! [`E2eError::AssertionFailed`] naming the step. The runner gives each
//! attempt a fresh session, a time limit and a teardown.

use crate::config::E2eConfig;
use crate::data::{credentials_for, random_id, test_article, CredentialRecord, LoginScenario, TestArticle};
use crate::fixture::{Pages, SessionFactory};
use crate::pages::PageObject;
use crate::result::{E2eError, E2eResult};
use crate::slug::collapse_whitespace;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, Instrument};

/// A runnable scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    /// One row of the login table
    Login(LoginScenario),
    /// Sign in, create, verify, edit, verify, delete
    ArticleLifecycle,
}

impl ScenarioKind {
    /// Every scenario, in run order
    #[must_use]
    pub fn all() -> Vec<Self> {
        LoginScenario::ALL
            .into_iter()
            .map(Self::Login)
            .chain(std::iter::once(Self::ArticleLifecycle))
            .collect()
    }

    /// Stable name used on the command line and in screenshot names
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Login(LoginScenario::Valid) => "login-valid",
            Self::Login(LoginScenario::InvalidEmail) => "login-invalid-email",
            Self::Login(LoginScenario::WrongPassword) => "login-wrong-password",
            Self::ArticleLifecycle => "article-lifecycle",
        }
    }

    /// One-line description for listings
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Login(LoginScenario::Valid) => "sign in with valid credentials",
            Self::Login(LoginScenario::InvalidEmail) => "unknown email shows an error",
            Self::Login(LoginScenario::WrongPassword) => "wrong password shows an error",
            Self::ArticleLifecycle => "create, verify, edit and delete an article",
        }
    }

    /// Look up a scenario by [`Self::name`]
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one scenario run
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Whether the last attempt passed
    pub passed: bool,
    /// Attempts made
    pub attempts: u32,
    /// Wall time across all attempts
    pub duration: Duration,
    /// Failure of the last attempt
    pub error: Option<String>,
    /// Screenshot written by the last attempt
    pub screenshot: Option<PathBuf>,
}

fn require(step: &str, ok: bool) -> E2eResult<()> {
    if ok {
        info!(step, "step passed");
        Ok(())
    } else {
        Err(E2eError::assertion(format!("{step}: expected true, got false")))
    }
}

fn require_eq(step: &str, expected: &str, actual: &str) -> E2eResult<()> {
    if expected == actual {
        info!(step, "step passed");
        Ok(())
    } else {
        Err(E2eError::assertion(format!(
            "{step}: expected \"{expected}\", got \"{actual}\""
        )))
    }
}

fn require_contains(step: &str, expected: &str, actual: &str) -> E2eResult<()> {
    if actual.contains(expected) {
        info!(step, "step passed");
        Ok(())
    } else {
        Err(E2eError::assertion(format!(
            "{step}: expected text containing \"{expected}\", got \"{actual}\""
        )))
    }
}

/// Sign in (or fail to) with `record`, checking the outcome its scenario expects
pub async fn login_journey(pages: &Pages, record: &CredentialRecord, pause: Duration) -> E2eResult<()> {
    let client = pages.home.client();

    info!(scenario = %record.scenario, "step 1: navigating to home page");
    require("navigate to home page", pages.home.go_to_home_page().await)?;
    client.settle(pause).await;

    info!("step 2: navigating to login page");
    require("navigate to login page", pages.home.go_to_login_from_home().await)?;
    client.settle(pause).await;

    match record.scenario {
        LoginScenario::Valid => {
            info!(email = %record.email, "step 3: logging in with valid credentials");
            let success = pages
                .login
                .login_with_valid_credentials(&record.email, &record.password)
                .await;
            require("login with valid credentials", success)?;
        }
        LoginScenario::InvalidEmail | LoginScenario::WrongPassword => {
            info!(email = %record.email, "step 3: logging in expecting an error");
            let message = if record.scenario == LoginScenario::InvalidEmail {
                pages
                    .login
                    .login_with_invalid_email(&record.email, &record.password)
                    .await?
            } else {
                pages
                    .login
                    .login_with_wrong_password(&record.email, &record.password)
                    .await?
            };
            let expected = record.expected_error.as_deref().unwrap_or_default();
            require_eq("login error message", expected, &message)?;
        }
    }
    client.settle(pause).await;
    info!(scenario = %record.scenario, "login journey completed");
    Ok(())
}

/// Full article lifecycle: sign in, publish, verify, edit, verify, delete
pub async fn article_lifecycle_journey(
    pages: &Pages,
    credentials: &CredentialRecord,
    article: &TestArticle,
    pause: Duration,
) -> E2eResult<()> {
    let client = pages.home.client();

    info!("step 1: navigating to home page");
    require("navigate to home page", pages.home.go_to_home_page().await)?;
    client.settle(pause).await;

    info!("step 2: navigating to login page");
    require("navigate to login page", pages.home.go_to_login_from_home().await)?;
    client.settle(pause).await;

    info!("step 3: logging in");
    require(
        "login with valid credentials",
        pages
            .login
            .login_with_valid_credentials(&credentials.email, &credentials.password)
            .await,
    )?;
    client.settle(pause).await;

    info!("step 4: opening the article editor");
    require("open article editor", pages.home.create_new_article().await)?;
    client.settle(pause).await;

    info!(title = %article.title, tags = ?article.tags, "step 5: creating article");
    require("create article", publish(pages, article).await)?;
    client.settle(pause).await;

    verify_detail(pages, article, pause, "created").await?;

    info!("step 9: opening the editor for the article");
    require("edit article", pages.article.edit_article().await)?;
    client.settle(pause).await;

    info!("step 10: checking the editor is pre-populated");
    require(
        "editor holds existing article",
        pages
            .editor
            .verify_article_fields_data(&article.title, &article.description, &article.body, &article.tags)
            .await,
    )?;
    client.settle(pause).await;

    let updated = article.updated();
    info!(title = %updated.title, "step 11: updating article");
    require("update article", publish(pages, &updated).await)?;
    client.settle(pause).await;

    verify_detail(pages, &updated, pause, "updated").await?;

    info!("step 15: deleting the article");
    require("delete article", pages.article.delete_article().await)?;
    client.settle(pause).await;

    info!("article lifecycle completed");
    Ok(())
}

async fn publish(pages: &Pages, article: &TestArticle) -> bool {
    pages
        .editor
        .create_article(&article.title, &article.description, &article.body, &article.tags)
        .await
}

// The body container also renders the tag list and the markdown paragraphs
// lose their blank lines, so the rendered body only has to contain the
// expected text with whitespace collapsed.
async fn verify_detail(pages: &Pages, article: &TestArticle, pause: Duration, which: &str) -> E2eResult<()> {
    let client = pages.home.client();

    info!(which, "validating article title");
    require(
        &format!("{which} article title"),
        pages.article.validate_article_title(&article.title).await,
    )?;
    client.settle(pause).await;

    info!(which, "validating article body");
    let body = collapse_whitespace(&pages.article.get_article_body().await?);
    require_contains(
        &format!("{which} article body"),
        &collapse_whitespace(&article.body),
        &body,
    )?;
    client.settle(pause).await;

    info!(which, "validating article tags");
    require(
        &format!("{which} article tags"),
        pages.article.validate_article_tags(&article.tags).await,
    )?;
    client.settle(pause).await;
    Ok(())
}

async fn run_journey(kind: ScenarioKind, pages: &Pages, config: &E2eConfig) -> E2eResult<()> {
    match kind {
        ScenarioKind::Login(scenario) => {
            login_journey(pages, &credentials_for(scenario), config.step_pause).await
        }
        ScenarioKind::ArticleLifecycle => {
            let article = test_article(&random_id());
            let credentials = credentials_for(LoginScenario::Valid);
            article_lifecycle_journey(pages, &credentials, &article, config.step_pause).await
        }
    }
}

/// Run `kind` with up to `1 + config.retries` attempts, each in a new session
pub async fn run_scenario(
    kind: ScenarioKind,
    sessions: &dyn SessionFactory,
    config: &E2eConfig,
) -> ScenarioReport {
    let started = Instant::now();
    let max_attempts = config.retries.saturating_add(1);
    let mut report = ScenarioReport {
        name: kind.name().to_string(),
        passed: false,
        attempts: 0,
        duration: Duration::ZERO,
        error: None,
        screenshot: None,
    };

    while report.attempts < max_attempts && !report.passed {
        report.attempts += 1;
        let span = tracing::info_span!("scenario", name = kind.name(), attempt = report.attempts);
        let outcome = attempt(kind, sessions, config).instrument(span).await;
        report.passed = outcome.error.is_none();
        report.error = outcome.error;
        report.screenshot = outcome.screenshot;
        if let Some(ref err) = report.error {
            error!(scenario = kind.name(), attempt = report.attempts, error = %err, "scenario failed");
        }
    }

    report.duration = started.elapsed();
    info!(scenario = kind.name(), passed = report.passed, attempts = report.attempts, "scenario finished");
    report
}

struct AttemptOutcome {
    error: Option<String>,
    screenshot: Option<PathBuf>,
}

async fn attempt(kind: ScenarioKind, sessions: &dyn SessionFactory, config: &E2eConfig) -> AttemptOutcome {
    let session = match sessions.create(config).await {
        Ok(session) => session,
        Err(err) => {
            return AttemptOutcome {
                error: Some(err.to_string()),
                screenshot: None,
            }
        }
    };

    let result = match tokio::time::timeout(config.test_timeout, run_journey(kind, session.pages(), config)).await
    {
        Ok(result) => result,
        Err(_) => Err(E2eError::timeout(format!("scenario `{kind}`"), config.test_timeout)),
    };
    let passed = result.is_ok();

    match session.finish(kind.name(), passed).await {
        Ok(screenshot) => AttemptOutcome {
            error: result.err().map(|e| e.to_string()),
            screenshot,
        },
        Err(teardown) => AttemptOutcome {
            error: Some(match result {
                Ok(()) => teardown.to_string(),
                Err(err) => format!("{err} (teardown: {teardown})"),
            }),
            screenshot: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScreenshotPolicy;
    use crate::driver::{MockDriver, MockElement};
    use crate::fixture::TestSession;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    mod kind_tests {
        use super::*;

        #[test]
        fn test_names_round_trip() {
            for kind in ScenarioKind::all() {
                assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
            }
            assert_eq!(ScenarioKind::from_name("nope"), None);
        }

        #[test]
        fn test_all_lists_login_rows_then_lifecycle() {
            let names: Vec<&str> = ScenarioKind::all().into_iter().map(ScenarioKind::name).collect();
            assert_eq!(
                names,
                vec![
                    "login-valid",
                    "login-invalid-email",
                    "login-wrong-password",
                    "article-lifecycle"
                ]
            );
        }
    }

    mod check_tests {
        use super::*;

        #[test]
        fn test_require_names_step() {
            let err = require("delete article", false).unwrap_err();
            assert!(err.to_string().contains("delete article"));
            assert!(require("x", true).is_ok());
        }

        #[test]
        fn test_require_eq_shows_both_values() {
            let err = require_eq("login error message", "a", "b").unwrap_err();
            assert!(matches!(err, E2eError::AssertionFailed { .. }));
            assert!(err.to_string().contains("expected \"a\", got \"b\""));
        }

        #[test]
        fn test_require_contains_accepts_surrounding_text() {
            assert!(require_contains("created article body", "Body text", "Body text\ntag1 tag2").is_ok());
            let err = require_contains("updated article body", "New body", "Old body\ntag1").unwrap_err();
            assert!(err.to_string().contains("updated article body"));
            assert!(err.to_string().contains("Old body"));
        }
    }

    mod runner_tests {
        use super::*;

        fn config() -> E2eConfig {
            E2eConfig::new()
                .with_base_url("http://conduit.test")
                .with_action_timeout(Duration::from_millis(50))
                .with_navigation_timeout(Duration::from_millis(50))
                .with_network_idle_window(Duration::ZERO)
                .with_screenshots(ScreenshotPolicy::Off)
        }

        #[tokio::test]
        async fn test_blank_app_fails_first_step() {
            let factory = |config: &E2eConfig| -> E2eResult<TestSession> {
                Ok(TestSession::with_driver(Arc::new(MockDriver::new()), config.clone()))
            };
            let report = run_scenario(ScenarioKind::Login(LoginScenario::Valid), &factory, &config()).await;
            assert!(!report.passed);
            assert_eq!(report.attempts, 1);
            assert!(report.error.unwrap().contains("navigate to home page"));
        }

        #[tokio::test]
        async fn test_retries_use_fresh_sessions() {
            let created = Arc::new(AtomicU32::new(0));
            let counter = created.clone();
            let factory = move |config: &E2eConfig| -> E2eResult<TestSession> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(TestSession::with_driver(Arc::new(MockDriver::new()), config.clone()))
            };
            let report = run_scenario(ScenarioKind::ArticleLifecycle, &factory, &config().with_retries(2)).await;
            assert!(!report.passed);
            assert_eq!(report.attempts, 3);
            assert_eq!(created.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_session_creation_failure_is_reported() {
            let factory = |_: &E2eConfig| -> E2eResult<TestSession> {
                Err(E2eError::BrowserLaunch {
                    message: "no chromium".to_string(),
                })
            };
            let report = run_scenario(ScenarioKind::ArticleLifecycle, &factory, &config()).await;
            assert!(!report.passed);
            assert!(report.error.unwrap().contains("no chromium"));
        }

        #[tokio::test]
        async fn test_scenario_timeout() {
            let factory = |config: &E2eConfig| -> E2eResult<TestSession> {
                let driver = MockDriver::new();
                driver.on_navigate(|dom, _| dom.put("div.home-page", MockElement::hidden()));
                Ok(TestSession::with_driver(Arc::new(driver), config.clone()))
            };
            let config = config()
                .with_action_timeout(Duration::from_secs(5))
                .with_test_timeout(Duration::from_millis(100));
            let report = run_scenario(ScenarioKind::Login(LoginScenario::Valid), &factory, &config).await;
            assert!(!report.passed);
            assert!(report.error.unwrap().contains("Timed out"));
        }
    }
}
