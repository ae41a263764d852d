//! In-memory Swag Labs simulator.
//!
//! Used by the test suite and by the CLI's default `--driver mock` mode, so
//! every scenario can run without a browser.

mod dom;
mod selector;
mod storefront;

pub use dom::{Document, El, Node, NodeId};
pub use selector::SelectorList;
pub use storefront::{default_catalog, CatalogEntry, MockSessions, MockStorefront};

use crate::config::AppConfig;
use crate::result::ProbeResult;
use crate::session::PageSession;
use crate::swaglabs::authentication::login_actions;

/// Log `session` in with the default configuration's standard user
pub async fn login_as_standard_user(session: &PageSession) -> ProbeResult<()> {
    let config = AppConfig::default();
    for action in login_actions(&config, &config.standard_user) {
        action.perform(session).await?;
    }
    Ok(())
}
