//! Shopping cart actions and components.

use crate::component::{extract_records, read_optional_text, text_in, RecordExtractor};
use crate::config::AppConfig;
use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::model::{Price, ShoppingCartItem};
use crate::result::ProbeResult;
use crate::screenplay::{Actor, Performable, Question};
use crate::session::PageSession;
use async_trait::async_trait;

/// Click "Add to cart" inside the one product card containing a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItemToCart {
    name: String,
}

impl AddItemToCart {
    /// Add the product whose card contains `name`
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Strict locator for the add button; an ambiguous card name fails
    #[must_use]
    pub fn button(&self, config: &AppConfig) -> Locator {
        let locators = &config.locators;
        Locator::new(&locators.add_to_cart_button)
            .with_text(&locators.add_to_cart_label)
            .inside(Locator::new(&locators.inventory_item).with_text(&self.name))
    }
}

#[async_trait]
impl Performable for AddItemToCart {
    fn title(&self) -> String {
        format!("Add {} to the cart", self.name)
    }

    async fn perform_as(&self, actor: &Actor) -> ProbeResult<()> {
        let session = actor.session();
        let button = session.find(&self.button(actor.config())).await?;
        session.click(&button).await
    }
}

/// Open the cart page through the cart icon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewCart;

#[async_trait]
impl Performable for ViewCart {
    fn title(&self) -> String {
        "View the cart".to_string()
    }

    async fn perform_as(&self, actor: &Actor) -> ProbeResult<()> {
        let link = Locator::new(&actor.config().locators.cart_link).described_as("the cart icon");
        let element = actor.session().find(&link).await?;
        actor.session().click(&element).await
    }
}

/// Cart icon in the page header
#[derive(Debug, Clone, Copy, Default)]
pub struct ShoppingCartIcon;

impl ShoppingCartIcon {
    /// Badge text; `None` when the cart is empty and no badge is rendered
    #[must_use]
    pub const fn item_count() -> CartItemCount {
        CartItemCount
    }
}

/// Question answering the cart badge text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartItemCount;

#[async_trait]
impl Question for CartItemCount {
    type Answer = Option<String>;

    fn subject(&self) -> String {
        "the cart item count".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> ProbeResult<Option<String>> {
        let badge = Locator::new(&actor.config().locators.cart_badge);
        Ok(read_optional_text(actor.session(), &badge)
            .await?
            .map(|count| count.trim().to_string()))
    }
}

/// Reads one [`ShoppingCartItem`] per cart line
#[derive(Debug, Clone)]
pub struct CartItemExtractor {
    container: Locator,
    name: Locator,
    description: Locator,
    price: Locator,
    currency_prefix: String,
}

impl CartItemExtractor {
    /// Build from configured selectors
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let locators = &config.locators;
        Self {
            container: Locator::new(&locators.cart_item),
            name: Locator::new(&locators.item_name),
            description: Locator::new(&locators.item_description),
            price: Locator::new(&locators.item_price),
            currency_prefix: config.currency_prefix.clone(),
        }
    }
}

#[async_trait]
impl RecordExtractor for CartItemExtractor {
    type Record = ShoppingCartItem;

    fn container(&self) -> &Locator {
        &self.container
    }

    async fn extract(
        &self,
        session: &PageSession,
        line: &ElementHandle,
    ) -> ProbeResult<ShoppingCartItem> {
        let title = text_in(session, line, &self.name).await?;
        let description = text_in(session, line, &self.description).await?;
        let price = Price::parse(&text_in(session, line, &self.price).await?, &self.currency_prefix)?;
        Ok(ShoppingCartItem {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            price,
        })
    }

    fn component_name(&self) -> &str {
        "cart summary"
    }
}

/// Cart page line items
#[derive(Debug, Clone, Copy, Default)]
pub struct ShoppingCartSummary;

impl ShoppingCartSummary {
    /// Titles of the items in the cart
    #[must_use]
    pub const fn item_titles() -> CartItemTitles {
        CartItemTitles
    }

    /// Full cart lines
    #[must_use]
    pub const fn items() -> CartItems {
        CartItems
    }
}

/// Question answering the cart item titles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartItemTitles;

#[async_trait]
impl Question for CartItemTitles {
    type Answer = Vec<String>;

    fn subject(&self) -> String {
        "the cart item titles".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> ProbeResult<Vec<String>> {
        let items = extract_records(actor.session(), &CartItemExtractor::new(actor.config())).await?;
        Ok(items.into_iter().map(|item| item.title).collect())
    }
}

/// Question answering every cart line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartItems;

#[async_trait]
impl Question for CartItems {
    type Answer = Vec<ShoppingCartItem>;

    fn subject(&self) -> String {
        "the cart items".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> ProbeResult<Vec<ShoppingCartItem>> {
        extract_records(actor.session(), &CartItemExtractor::new(actor.config())).await
    }
}
