//! Browsing the catalog.

use crate::assertion::Assertion;
use crate::model::ProductInfo;
use crate::result::ProbeResult;
use crate::scenario::{Scenario, Suite};
use crate::screenplay::Actor;
use crate::swaglabs::{Catalog, Login};
use std::sync::Arc;

/// Products every storefront lists
pub const EXPECTED_PRODUCTS: [&str; 6] = [
    "Sauce Labs Backpack",
    "Sauce Labs Bolt T-Shirt",
    "Sauce Labs Onesie",
    "Sauce Labs Bike Light",
    "Sauce Labs Fleece Jacket",
    "Test.allTheThings() T-Shirt (Red)",
];

async fn log_in(actor: Arc<Actor>) -> ProbeResult<()> {
    actor.attempts_to(&Login::as_a_standard_user()).await
}

/// All known products are listed
#[must_use]
pub fn shows_all_inventory_products() -> Scenario {
    Scenario::new("should see all inventory products", |actor, _| async move {
        let titles = actor.asks_for(&Catalog::product_titles()).await?;
        Assertion::contains_all(&titles, &EXPECTED_PRODUCTS).into_result()
    })
    .before_each(log_in)
}

/// Every product has a title, a description and a positive price
#[must_use]
pub fn every_product_has_description_and_price() -> Scenario {
    Scenario::new(
        "each product should have a description and a price",
        |actor, _| async move {
            let products = actor.asks_for(&Catalog::products()).await?;
            Assertion::is_true(!products.is_empty(), "the catalog is empty").into_result()?;
            Assertion::all_match(
                &products,
                "have a title, a description and a positive price",
                ProductInfo::is_valid_catalog_entry,
            )
            .into_result()
        },
    )
    .before_each(log_in)
}

/// No two products share an image
#[must_use]
pub fn every_product_has_a_different_image() -> Scenario {
    Scenario::new("each product should have a different image", |actor, _| async move {
        let images = actor.asks_for(&Catalog::product_images()).await?;
        Assertion::no_duplicates(&images).into_result()
    })
    .before_each(log_in)
}

/// The "catalog" suite
#[must_use]
pub fn suite() -> Suite {
    Suite::new("catalog")
        .with_scenario(shows_all_inventory_products())
        .with_scenario(every_product_has_description_and_price())
        .with_scenario(every_product_has_a_different_image())
}
