//! Swag Labs business actions and page components.

pub mod authentication;
pub mod cart;
pub mod catalog;
pub mod header;

pub use authentication::{login_actions, Login, LoginErrorMessage};
pub use cart::{
    AddItemToCart, CartItemCount, CartItemExtractor, CartItemTitles, CartItems, ShoppingCartIcon,
    ShoppingCartSummary, ViewCart,
};
pub use catalog::{Catalog, ProductExtractor, ProductImages, ProductTitles, Products};
pub use header::{HeaderTitle, PageHeader};
