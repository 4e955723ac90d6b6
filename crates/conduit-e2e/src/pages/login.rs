use super::{HomePage, PageObject};
use crate::client::AutomationClient;
use crate::locator::{ElementState, Locator};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Where the sign-in flow stands, as read from the live DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Form shown, nothing submitted
    Unauthenticated,
    /// Submit pressed, request in flight
    Submitting,
    /// Signed in and back on the home feed
    Authenticated,
    /// The server rejected the credentials
    ErrorShown,
}

/// The sign-in screen
#[derive(Debug, Clone)]
pub struct LoginPage {
    client: AutomationClient,
    root: Locator,
    email_input: Locator,
    password_input: Locator,
    login_button: Locator,
    busy_button: Locator,
    error_list: Locator,
    first_error: Locator,
    home: HomePage,
}

impl LoginPage {
    /// Login route
    pub const ROUTE: &'static str = "/#/login";

    /// Build the page object over `client`
    #[must_use]
    pub fn new(client: AutomationClient) -> Self {
        Self {
            root: client.locator("div.auth-page"),
            email_input: client.locator(r#"input[name="email"]"#),
            password_input: client.locator(r#"input[name="password"]"#),
            login_button: client.locator("button.btn-primary"),
            busy_button: client.locator("button.btn-primary[disabled]"),
            error_list: client.locator("ul.error-messages"),
            first_error: client.locator("ul.error-messages li").first(),
            home: HomePage::new(client.clone()),
            client,
        }
    }

    /// Open the login route and wait for the form
    #[tracing::instrument(skip(self))]
    pub async fn goto_login_page(&self) -> bool {
        self.open().await
    }

    /// Sign in and confirm the home screen shows a signed-in user.
    ///
    /// False when any step fails, including a redirect home that still
    /// shows the signed-out header.
    #[tracing::instrument(skip(self, password))]
    pub async fn login_with_valid_credentials(&self, email: &str, password: &str) -> bool {
        let reached: E2eResult<String> = async {
            self.submit(email, password).await?;
            let _ = self.client.wait_for_load().await;
            self.client.wait_for_route(HomePage::ROUTE).await
        }
        .await;
        if let Err(err) = reached {
            error!(error = %err, "failed to login with valid credentials");
            return false;
        }
        if self.home.is_user_authenticated().await {
            info!("logged in and fully authenticated");
            true
        } else {
            warn!("login completed but authentication checks failed");
            false
        }
    }

    /// Submit an unknown email; returns the first error shown
    #[tracing::instrument(skip(self, password))]
    pub async fn login_with_invalid_email(&self, email: &str, password: &str) -> E2eResult<String> {
        self.submit_expecting_error(email, password).await
    }

    /// Submit a wrong password; returns the first error shown
    #[tracing::instrument(skip(self, password))]
    pub async fn login_with_wrong_password(
        &self,
        email: &str,
        password: &str,
    ) -> E2eResult<String> {
        self.submit_expecting_error(email, password).await
    }

    /// Classify the screen right now
    pub async fn observe_state(&self) -> E2eResult<LoginState> {
        if self.error_list.is_visible().await? {
            return Ok(LoginState::ErrorShown);
        }
        if self.home.is_user_authenticated().await {
            return Ok(LoginState::Authenticated);
        }
        if self.busy_button.count().await? > 0 {
            return Ok(LoginState::Submitting);
        }
        Ok(LoginState::Unauthenticated)
    }

    async fn submit(&self, email: &str, password: &str) -> E2eResult<()> {
        self.email_input.fill(email).await?;
        self.password_input.fill(password).await?;
        self.login_button.click().await
    }

    // A missing banner is an error for the caller, not an empty string.
    async fn submit_expecting_error(&self, email: &str, password: &str) -> E2eResult<String> {
        self.submit(email, password).await?;
        self.error_list
            .wait_for(ElementState::Visible, self.client.config().action_timeout)
            .await?;
        let message = self
            .first_error
            .text_content()
            .await?
            .ok_or_else(|| E2eError::ElementNotFound {
                selector: self.first_error.selector().to_string(),
            })?;
        let message = message.trim().to_string();
        info!(%message, "error message");
        Ok(message)
    }
}

#[async_trait]
impl PageObject for LoginPage {
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
    use crate::driver::{MockDom, MockDriver, MockElement};
    use crate::pages::testing::{client, url};

    const EMAIL: &str = r#"input[name="email"]"#;
    const PASSWORD: &str = r#"input[name="password"]"#;
    const SUBMIT: &str = "button.btn-primary";

    fn login_form(driver: &MockDriver) {
        driver.with_dom(|dom| {
            dom.set_url(url("/#/login"));
            dom.put("div.auth-page", MockElement::visible());
            dom.put(EMAIL, MockElement::input(""));
            dom.put(PASSWORD, MockElement::input(""));
            dom.put(SUBMIT, MockElement::visible().with_text("Login"));
            dom.put(r##"li.nav-item a[href="#/login"]"##, MockElement::visible());
        });
    }

    fn show_error(dom: &mut MockDom, message: &str) {
        dom.put("ul.error-messages", MockElement::visible());
        dom.put("ul.error-messages li", MockElement::visible().with_text(message));
    }

    fn sign_in(dom: &mut MockDom) {
        dom.clear();
        dom.set_url(url("/#/"));
        dom.put("div.home-page", MockElement::visible());
        dom.put(
            "li.nav-item.dropdown .nav-link.dropdown-toggle",
            MockElement::visible(),
        );
    }

    mod valid_tests {
        use super::*;

        #[tokio::test]
        async fn test_valid_login_fills_and_lands_home() {
            let driver = MockDriver::new();
            login_form(&driver);
            driver.on_click(SUBMIT, |dom| {
                if dom.value(EMAIL) == Some("nipuna@gmail.com") {
                    sign_in(dom);
                }
                Ok(())
            });
            let login = LoginPage::new(client(&driver));
            assert!(login.login_with_valid_credentials("nipuna@gmail.com", "test1234").await);
            assert_eq!(login.observe_state().await.unwrap(), LoginState::Authenticated);
        }

        #[tokio::test]
        async fn test_home_redirect_without_signed_in_header_fails() {
            let driver = MockDriver::new();
            login_form(&driver);
            driver.on_click(SUBMIT, |dom| {
                dom.clear();
                dom.set_url(url("/#/"));
                dom.put("div.home-page", MockElement::visible());
                dom.put(r##"li.nav-item a[href="#/login"]"##, MockElement::visible());
                Ok(())
            });
            let login = LoginPage::new(client(&driver));
            assert!(!login.login_with_valid_credentials("a@b.c", "x").await);
        }

        #[tokio::test]
        async fn test_missing_form_fails() {
            let driver = MockDriver::new();
            let login = LoginPage::new(client(&driver));
            assert!(!login.login_with_valid_credentials("a@b.c", "x").await);
        }
    }

    mod error_tests {
        use super::*;

        #[tokio::test]
        async fn test_invalid_email_returns_trimmed_banner() {
            let driver = MockDriver::new();
            login_form(&driver);
            driver.on_click(SUBMIT, |dom| {
                show_error(dom, "  Email not found sign in first \n");
                Ok(())
            });
            let login = LoginPage::new(client(&driver));
            let message = login
                .login_with_invalid_email("invalid@email.com", "anypassword")
                .await
                .unwrap();
            assert_eq!(message, "Email not found sign in first");
            assert_eq!(login.observe_state().await.unwrap(), LoginState::ErrorShown);
        }

        #[tokio::test]
        async fn test_only_first_error_is_returned() {
            let driver = MockDriver::new();
            login_form(&driver);
            driver.on_click(SUBMIT, |dom| {
                dom.put("ul.error-messages", MockElement::visible());
                dom.set(
                    "ul.error-messages li",
                    vec![
                        MockElement::visible().with_text("Wrong email/password combination"),
                        MockElement::visible().with_text("second"),
                    ],
                );
                Ok(())
            });
            let message = LoginPage::new(client(&driver))
                .login_with_wrong_password("nipuna@gmail.com", "wrongpassword")
                .await
                .unwrap();
            assert_eq!(message, "Wrong email/password combination");
        }

        #[tokio::test]
        async fn test_missing_banner_propagates_timeout() {
            let driver = MockDriver::new();
            login_form(&driver);
            let err = LoginPage::new(client(&driver))
                .login_with_wrong_password("nipuna@gmail.com", "wrongpassword")
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("ul.error-messages"));
        }

        #[tokio::test]
        async fn test_empty_banner_list_is_not_found() {
            let driver = MockDriver::new();
            login_form(&driver);
            driver.on_click(SUBMIT, |dom| {
                dom.put("ul.error-messages", MockElement::visible());
                Ok(())
            });
            let err = LoginPage::new(client(&driver))
                .login_with_invalid_email("x@y.z", "p")
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::ElementNotFound { .. }));
        }
    }

    mod state_tests {
        use super::*;

        #[tokio::test]
        async fn test_fresh_form_is_unauthenticated() {
            let driver = MockDriver::new();
            login_form(&driver);
            let login = LoginPage::new(client(&driver));
            assert_eq!(login.observe_state().await.unwrap(), LoginState::Unauthenticated);
        }

        #[tokio::test]
        async fn test_disabled_submit_is_submitting() {
            let driver = MockDriver::new();
            login_form(&driver);
            driver.with_dom(|dom| dom.put("button.btn-primary[disabled]", MockElement::visible()));
            let login = LoginPage::new(client(&driver));
            assert_eq!(login.observe_state().await.unwrap(), LoginState::Submitting);
        }

        #[tokio::test]
        async fn test_goto_login_page() {
            let driver = MockDriver::new();
            driver.on_navigate(|dom, target| {
                if target.ends_with("/#/login") {
                    dom.put("div.auth-page", MockElement::visible());
                }
            });
            assert!(LoginPage::new(client(&driver)).goto_login_page().await);
        }
    }
}
