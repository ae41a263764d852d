//! Logging on.

use crate::assertion::Assertion;
use crate::model::Credentials;
use crate::result::ProbeResult;
use crate::scenario::{DataTable, Scenario, Suite};
use crate::swaglabs::{Login, PageHeader};

const INVALID_CREDENTIALS: &str = "
    standard_user   | wrong_password | Username and password do not match
    locked_out_user | secret_sauce   | Sorry, this user has been locked out
    standard_user   | ''             | Password is required
    ''              | secret_sauce   | Username is required
";

/// Valid credentials land on the product page
#[must_use]
pub fn with_valid_credentials() -> Scenario {
    Scenario::new("log in with valid credentials", |actor, _| async move {
        actor
            .attempts_to(&Login::with_credentials(Credentials::new(
                "standard_user",
                "secret_sauce",
            )))
            .await?;
        let title = actor.asks_for(&PageHeader::title()).await?;
        Assertion::equals_ignore_case("Products", &title).into_result()
    })
}

/// Each invalid pair shows the matching error banner
pub fn with_invalid_credentials() -> ProbeResult<Scenario> {
    let table = DataTable::parse(["username", "password", "error"], INVALID_CREDENTIALS)?;
    Ok(
        Scenario::new("log in with invalid credentials", |actor, row| async move {
            let credentials = Credentials::new(row.require("username")?, row.require("password")?);
            actor.attempts_to(&Login::with_credentials(credentials)).await?;
            let message = actor.asks_for(&Login::error_message()).await?;
            Assertion::contains(&message, row.require("error")?).into_result()
        })
        .with_rows(table)
        .named_rows("'{username}' / '{password}' shows '{error}'"),
    )
}

/// The "login" suite
pub fn suite() -> ProbeResult<Suite> {
    Ok(Suite::new("login")
        .with_scenario(with_valid_credentials())
        .with_scenario(with_invalid_credentials()?))
}
