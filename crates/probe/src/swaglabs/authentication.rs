//! Logging in.

use crate::action::Action;
use crate::config::AppConfig;
use crate::locator::Locator;
use crate::model::Credentials;
use crate::result::ProbeResult;
use crate::screenplay::{Actor, Performable, Question};
use async_trait::async_trait;

/// Navigate to the login page, fill in both fields and submit
#[must_use]
pub fn login_actions(config: &AppConfig, credentials: &Credentials) -> Vec<Action> {
    let locators = &config.locators;
    vec![
        Action::navigate(config.login_url()),
        Action::enter(
            &credentials.username,
            Locator::new(&locators.username_field).described_as("the user name field"),
        ),
        Action::enter(
            &credentials.password,
            Locator::new(&locators.password_field).described_as("the password field"),
        ),
        Action::click(Locator::new(&locators.login_button).described_as("the login button")),
    ]
}

/// Log in through the login form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    // None means the configured standard user
    credentials: Option<Credentials>,
}

impl Login {
    /// Log in with explicit credentials; either part may be empty
    #[must_use]
    pub const fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    /// Log in as the configured standard user
    #[must_use]
    pub const fn as_a_standard_user() -> Self {
        Self { credentials: None }
    }

    /// Text of the login error banner
    #[must_use]
    pub const fn error_message() -> LoginErrorMessage {
        LoginErrorMessage
    }
}

#[async_trait]
impl Performable for Login {
    fn title(&self) -> String {
        match &self.credentials {
            Some(credentials) => format!(
                "Log in to the Swaglabs application as {}",
                credentials.username
            ),
            None => "Log in as a standard user".to_string(),
        }
    }

    async fn perform_as(&self, actor: &Actor) -> ProbeResult<()> {
        match &self.credentials {
            Some(credentials) => {
                for action in login_actions(actor.config(), credentials) {
                    actor.attempts_to(&action).await?;
                }
                Ok(())
            }
            None => {
                let standard = Self::with_credentials(actor.config().standard_user.clone());
                actor.attempts_to(&standard).await
            }
        }
    }
}

/// Text of `[data-test='error']`; `NotFound` when no banner is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginErrorMessage;

#[async_trait]
impl Question for LoginErrorMessage {
    type Answer = String;

    fn subject(&self) -> String {
        "the login error message".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> ProbeResult<String> {
        let banner = Locator::new(&actor.config().locators.error_banner)
            .strict(true)
            .described_as("the login error banner");
        let element = actor.session().find(&banner).await?;
        actor.session().text(&element).await
    }
}
