//! Product catalog component.

use crate::component::{attribute_in, extract_records, text_in, RecordExtractor};
use crate::config::AppConfig;
use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::model::{Price, ProductInfo};
use crate::result::ProbeResult;
use crate::screenplay::{Actor, Question};
use crate::session::PageSession;
use async_trait::async_trait;

/// Reads one [`ProductInfo`] per `.inventory_item` card
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    container: Locator,
    name: Locator,
    description: Locator,
    price: Locator,
    image: Locator,
    currency_prefix: String,
}

impl ProductExtractor {
    /// Build from configured selectors
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let locators = &config.locators;
        Self {
            container: Locator::new(&locators.inventory_item),
            name: Locator::new(&locators.item_name),
            description: Locator::new(&locators.item_description),
            price: Locator::new(&locators.item_price),
            image: Locator::new(&locators.item_image),
            currency_prefix: config.currency_prefix.clone(),
        }
    }
}

#[async_trait]
impl RecordExtractor for ProductExtractor {
    type Record = ProductInfo;

    fn container(&self) -> &Locator {
        &self.container
    }

    async fn extract(
        &self,
        session: &PageSession,
        card: &ElementHandle,
    ) -> ProbeResult<ProductInfo> {
        let title = text_in(session, card, &self.name).await?;
        let description = text_in(session, card, &self.description).await?;
        let price = Price::parse(&text_in(session, card, &self.price).await?, &self.currency_prefix)?;
        let image_url = attribute_in(session, card, &self.image, "src").await?;
        Ok(ProductInfo {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            price,
            image_url,
        })
    }

    fn component_name(&self) -> &str {
        "catalog"
    }
}

/// The inventory page's product list
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    /// Product names in listing order
    #[must_use]
    pub const fn product_titles() -> ProductTitles {
        ProductTitles
    }

    /// Full product records in listing order
    #[must_use]
    pub const fn products() -> Products {
        Products
    }

    /// Image URLs in listing order
    #[must_use]
    pub const fn product_images() -> ProductImages {
        ProductImages
    }
}

/// Question answering the product names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductTitles;

#[async_trait]
impl Question for ProductTitles {
    type Answer = Vec<String>;

    fn subject(&self) -> String {
        "the product titles".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> ProbeResult<Vec<String>> {
        let names = Locator::new(&actor.config().locators.item_name);
        Ok(actor
            .session()
            .texts(&names)
            .await?
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect())
    }
}

/// Question answering every product record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Products;

#[async_trait]
impl Question for Products {
    type Answer = Vec<ProductInfo>;

    fn subject(&self) -> String {
        "the displayed products".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> ProbeResult<Vec<ProductInfo>> {
        extract_records(actor.session(), &ProductExtractor::new(actor.config())).await
    }
}

/// Question answering the product image URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductImages;

#[async_trait]
impl Question for ProductImages {
    type Answer = Vec<String>;

    fn subject(&self) -> String {
        "the product images".to_string()
    }

    async fn answered_by(&self, actor: &Actor) -> ProbeResult<Vec<String>> {
        let products = extract_records(actor.session(), &ProductExtractor::new(actor.config())).await?;
        Ok(products.into_iter().map(|p| p.image_url).collect())
    }
}
