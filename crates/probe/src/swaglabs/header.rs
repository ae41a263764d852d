//! Page header component.

use crate::locator::Locator;
use crate::result::ProbeResult;
use crate::screenplay::{Actor, Question};
use async_trait::async_trait;

/// Secondary header shown on every logged-in page
#[derive(Debug, Clone, Copy, Default)]
pub struct PageHeader;

impl PageHeader {
    /// Title text ("Products", "Your Cart", ...)
    #[must_use]
    pub const fn title() -> HeaderTitle {
        HeaderTitle
    }
}

/// Question answering the header title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderTitle;

#[async_trait]
impl Question for HeaderTitle {
    type Answer = String;

    fn subject(&self) -> String {
        "the page header title".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> ProbeResult<String> {
        let title = Locator::new(&actor.config().locators.page_title);
        let element = actor.session().find(&title).await?;
        Ok(actor.session().text(&element).await?.trim().to_string())
    }
}
