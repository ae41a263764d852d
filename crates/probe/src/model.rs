//! Value objects extracted from, or fed into, the storefront.

use crate::result::{ProbeError, ProbeResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Non-negative money amount held exactly as cents
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Price {
    cents: u64,
}

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)(?:\.(\d{1,2}))?$").expect("amount pattern is a valid regex")
    })
}

impl Price {
    /// Zero amount
    pub const ZERO: Self = Self { cents: 0 };

    /// Create a price from whole cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Amount in cents
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.cents
    }

    /// Render with an arbitrary currency prefix, e.g. `"EUR 7.99"`
    #[must_use]
    pub fn format_with(self, prefix: &str) -> String {
        format!("{prefix}{}.{:02}", self.cents / 100, self.cents % 100)
    }

    /// Amount as a float, for display arithmetic only
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Parse `"$29.99"`-style text by stripping `prefix` and reading a
    /// non-negative decimal with at most two fraction digits.
    pub fn parse(raw: &str, prefix: &str) -> ProbeResult<Self> {
        let trimmed = raw.trim();
        let amount = trimmed
            .strip_prefix(prefix)
            .ok_or_else(|| {
                ProbeError::parse("price", raw, format!("missing currency prefix {prefix:?}"))
            })?
            .trim();

        let captures = amount_pattern()
            .captures(amount)
            .ok_or_else(|| ProbeError::parse("price", raw, "not a decimal amount"))?;

        let whole: u64 = captures[1]
            .parse()
            .map_err(|_| ProbeError::parse("price", raw, "amount out of range"))?;
        let fraction = match captures.get(2).map(|m| m.as_str()) {
            None => 0,
            Some(digits) if digits.len() == 1 => u64::from(digits.as_bytes()[0] - b'0') * 10,
            Some(digits) => digits
                .parse::<u64>()
                .map_err(|_| ProbeError::parse("price", raw, "bad fraction"))?,
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .map(Self::from_cents)
            .ok_or_else(|| ProbeError::parse("price", raw, "amount out of range"))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
    }
}

/// A catalog card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    /// Product name
    pub title: String,
    /// Marketing description
    pub description: String,
    /// Listed price
    pub price: Price,
    /// Image source URL
    pub image_url: String,
}

impl ProductInfo {
    /// Title and description present and a positive price
    #[must_use]
    pub fn is_valid_catalog_entry(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && self.price > Price::ZERO
    }
}

/// A line in the shopping cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCartItem {
    /// Product name
    pub title: String,
    /// Marketing description
    pub description: String,
    /// Price charged
    pub price: Price,
}

/// Login credentials; either part may be empty to exercise validation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
