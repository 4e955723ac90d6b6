//! Test data providers: credentials and article content.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lower bound for generated ids
pub const DEFAULT_ID_MIN: u64 = 10_000;

/// Upper bound for generated ids (inclusive)
pub const DEFAULT_ID_MAX: u64 = 999_999;

/// Which login path a credential record exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginScenario {
    /// Registered user, correct password
    Valid,
    /// Address with no account
    InvalidEmail,
    /// Registered user, wrong password
    WrongPassword,
}

impl LoginScenario {
    /// All scenarios in table order
    pub const ALL: [Self; 3] = [Self::Valid, Self::InvalidEmail, Self::WrongPassword];

    /// Tag as it appears in the credential table
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::InvalidEmail => "invalid_email",
            Self::WrongPassword => "wrong_password",
        }
    }
}

impl std::fmt::Display for LoginScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of login test data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Email to submit
    pub email: String,
    /// Password to submit
    pub password: String,
    /// Path exercised
    pub scenario: LoginScenario,
    /// Banner text the app must show; `None` for a successful login
    pub expected_error: Option<String>,
}

impl CredentialRecord {
    fn new(email: &str, password: &str, scenario: LoginScenario, error: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            scenario,
            expected_error: error.map(str::to_string),
        }
    }
}

/// Credentials for every login scenario, against the hosted demo's seed user
#[must_use]
pub fn login_test_data() -> Vec<CredentialRecord> {
    vec![
        CredentialRecord::new("nipuna@gmail.com", "test1234", LoginScenario::Valid, None),
        CredentialRecord::new(
            "invalid@email.com",
            "anypassword",
            LoginScenario::InvalidEmail,
            Some("Email not found sign in first"),
        ),
        CredentialRecord::new(
            "nipuna@gmail.com",
            "wrongpassword",
            LoginScenario::WrongPassword,
            Some("Wrong email/password combination"),
        ),
    ]
}

/// The record for `scenario`
#[must_use]
pub fn credentials_for(scenario: LoginScenario) -> CredentialRecord {
    login_test_data()
        .into_iter()
        .find(|record| record.scenario == scenario)
        .unwrap_or_else(|| CredentialRecord::new("", "", scenario, None))
}

/// Article content for create/edit journeys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestArticle {
    /// Title
    pub title: String,
    /// One-line description
    pub description: String,
    /// Markdown body
    pub body: String,
    /// Tags in entry order
    pub tags: Vec<String>,
}

impl TestArticle {
    /// The edited version: every text field extended, tags kept
    #[must_use]
    pub fn updated(&self) -> Self {
        Self {
            title: format!("{} updated", self.title),
            description: format!("{} - This has been updated", self.description),
            body: format!(
                "{}\n\nUPDATE: This article has been modified with additional content for testing purposes.",
                self.body
            ),
            tags: self.tags.clone(),
        }
    }
}

/// Article titled `Test Article <id>`
#[must_use]
pub fn test_article(id: &str) -> TestArticle {
    TestArticle {
        title: format!("Test Article {id}"),
        description: "A comprehensive test article for validation".to_string(),
        body: "This article tests the complete lifecycle from creation to deletion. It includes \
               proper validation of all article components including title, description, body \
               content, and tags."
            .to_string(),
        tags: ["testing", "automation", "playwright"]
            .iter()
            .map(|t| (*t).to_string())
            .collect(),
    }
}

/// Random integer id in `min..=max` as a string; bounds may be given in either order
#[must_use]
pub fn generate_random_id(min: u64, max: u64) -> String {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let span = u128::from(hi - lo) + 1;
    let offset = Uuid::new_v4().as_u128() % span;
    (lo + offset as u64).to_string()
}

/// Random id in the default range
#[must_use]
pub fn random_id() -> String {
    generate_random_id(DEFAULT_ID_MIN, DEFAULT_ID_MAX)
}
