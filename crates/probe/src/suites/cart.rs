//! Adding items to the cart.

use crate::assertion::Assertion;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{DataTable, Scenario, Suite};
use crate::screenplay::Actor;
use crate::swaglabs::{AddItemToCart, Login, ShoppingCartIcon, ShoppingCartSummary, ViewCart};
use std::sync::Arc;

async fn log_in(actor: Arc<Actor>) -> ProbeResult<()> {
    actor.attempts_to(&Login::as_a_standard_user()).await
}

/// No badge before anything is added
#[must_use]
pub fn cart_is_initially_empty() -> Scenario {
    Scenario::new("the cart should initially be empty", |actor, _| async move {
        let count = actor.asks_for(&ShoppingCartIcon::item_count()).await?;
        Assertion::is_none(&count).into_result()
    })
    .before_each(log_in)
}

/// Adding the same product `n` times shows `n` on the badge
#[must_use]
pub fn item_count_tracks_added_items() -> Scenario {
    let table = DataTable::new(["product", "times"])
        .with_row(["Sauce Labs Backpack", "1"])
        .with_row(["Sauce Labs Backpack", "2"])
        .with_row(["Sauce Labs Onesie", "3"]);
    Scenario::new(
        "the item count should represent the number of items in the cart",
        |actor, row| async move {
            let product = row.require("product")?;
            let times: usize = row
                .require("times")?
                .parse()
                .map_err(|_| ProbeError::config("'times' must be a whole number"))?;
            let add = AddItemToCart::named(product);
            for _ in 0..times {
                actor.attempts_to(&add).await?;
            }
            let count = actor.asks_for(&ShoppingCartIcon::item_count()).await?;
            Assertion::equals(&Some(times.to_string()), &count).into_result()
        },
    )
    .with_rows(table)
    .named_rows("{times} x {product}")
    .before_each(log_in)
}

/// Added products appear on the cart page
#[must_use]
pub fn cart_lists_added_items() -> Scenario {
    Scenario::new("the cart should list the added items", |actor, _| async move {
        actor
            .attempts_to(&AddItemToCart::named("Sauce Labs Backpack"))
            .await?;
        actor
            .attempts_to(&AddItemToCart::named("Sauce Labs Bike Light"))
            .await?;
        actor.attempts_to(&ViewCart).await?;
        let titles = actor.asks_for(&ShoppingCartSummary::item_titles()).await?;
        Assertion::contains_all(&titles, &["Sauce Labs Backpack", "Sauce Labs Bike Light"])
            .into_result()
    })
    .before_each(log_in)
}

/// A name shared by two cards cannot be added
#[must_use]
pub fn ambiguous_product_name_is_rejected() -> Scenario {
    Scenario::new(
        "a product name matching several cards should be rejected",
        |actor, _| async move {
            match actor.attempts_to(&AddItemToCart::named("T-Shirt")).await {
                Err(ProbeError::AmbiguousMatch { .. }) => Ok(()),
                Err(other) => Err(other),
                Ok(()) => Err(ProbeError::assertion(
                    "adding 'T-Shirt' should match more than one product",
                )),
            }
        },
    )
    .before_each(log_in)
}

/// The "cart" suite
#[must_use]
pub fn suite() -> Suite {
    Suite::new("cart")
        .with_scenario(cart_is_initially_empty())
        .with_scenario(item_count_tracks_added_items())
        .with_scenario(cart_lists_added_items())
        .with_scenario(ambiguous_product_name_is_rejected())
}
