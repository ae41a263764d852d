//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a declarative description of which elements to find: a CSS
//! selector, an optional "contains text" filter and an optional parent locator
//! it must be scoped inside. Resolving one is pure read access against the
//! current page; see `PageSession::find` and `PageSession::find_all`.
//!
//! # Strictness
//!
//! - A text-filtered locator is always strict: more than one match is an
//!   `AmbiguousMatch` error instead of silently picking the first card.
//! - A plain CSS locator resolves to its first match in document order unless
//!   marked `.strict(true)`.
//! - A parent given to `.inside()` is resolved with the same rules before the
//!   child is looked up inside it.

use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// CSS selector narrowed to elements whose rendered text contains `text`
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// The CSS part handed to the driver
    #[must_use]
    pub fn css_part(&self) -> &str {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        }
    }

    /// Text filter applied after the driver query, if any
    #[must_use]
    pub fn text_filter(&self) -> Option<&str> {
        match self {
            Self::Css(_) => None,
            Self::CssWithText { text, .. } => Some(text),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
        }
    }
}

/// A locator for finding elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    scope: Option<Box<Locator>>,
    strict: bool,
    label: Option<String>,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            scope: None,
            strict: false,
            label: None,
        }
    }

    /// Filter by text content
    ///
    /// `Locator::new(".inventory_item").with_text("Sauce Labs Backpack")`
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let Self {
            selector,
            scope,
            strict,
            label,
        } = self;
        let css = match selector {
            Selector::Css(css) | Selector::CssWithText { css, .. } => css,
        };
        Self {
            selector: Selector::CssWithText {
                css,
                text: text.into(),
            },
            scope,
            strict,
            label,
        }
    }

    /// Scope this locator inside the single element matched by `parent`
    #[must_use]
    pub fn inside(mut self, parent: Self) -> Self {
        self.scope = Some(Box::new(parent));
        self
    }

    /// Require a unique match even without a text filter
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Human-readable name used in errors and logs instead of the selector
    #[must_use]
    pub fn described_as(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Parent locator, if scoped
    #[must_use]
    pub fn scope(&self) -> Option<&Self> {
        self.scope.as_deref()
    }

    /// Whether more than one match is an error
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict || matches!(self.selector, Selector::CssWithText { .. })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            return f.write_str(label);
        }
        write!(f, "{}", self.selector)?;
        if let Some(parent) = &self.scope {
            write!(f, " inside {parent}")?;
        }
        Ok(())
    }
}

impl From<&str> for Locator {
    fn from(css: &str) -> Self {
        Self::new(css)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_selector() {
            let selector = Selector::css(".inventory_item");
            assert_eq!(selector.css_part(), ".inventory_item");
            assert!(selector.text_filter().is_none());
        }

        #[test]
        fn test_display_with_text() {
            let selector = Selector::CssWithText {
                css: "button".into(),
                text: "Add to cart".into(),
            };
            assert_eq!(selector.to_string(), "button:has-text(\"Add to cart\")");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_new_is_lenient() {
            let locator = Locator::new("#user-name");
            assert_eq!(locator.selector(), &Selector::Css("#user-name".into()));
            assert!(!locator.is_strict());
            assert!(locator.scope().is_none());
        }

        #[test]
        fn test_with_text_makes_locator_strict() {
            let locator = Locator::new(".inventory_item").with_text("Backpack");
            assert!(locator.is_strict());
            assert_eq!(locator.selector().text_filter(), Some("Backpack"));
        }

        #[test]
        fn test_with_text_replaces_previous_filter() {
            let locator = Locator::new("button")
                .with_text("Remove")
                .with_text("Add to cart");
            assert_eq!(locator.selector().text_filter(), Some("Add to cart"));
            assert_eq!(locator.selector().css_part(), "button");
        }

        #[test]
        fn test_inside_composes_display() {
            let locator = Locator::new("button")
                .with_text("Add to cart")
                .inside(Locator::new(".inventory_item").with_text("Sauce Labs Onesie"));

            assert_eq!(
                locator.to_string(),
                "button:has-text(\"Add to cart\") inside .inventory_item:has-text(\"Sauce Labs Onesie\")"
            );
            assert!(locator.scope().is_some_and(Locator::is_strict));
        }

        #[test]
        fn test_label_overrides_display() {
            let locator = Locator::new("[data-test='error']").described_as("login error banner");
            assert_eq!(locator.to_string(), "login error banner");
        }

        #[test]
        fn test_explicit_strict() {
            assert!(Locator::new(".title").strict(true).is_strict());
        }

        #[test]
        fn test_from_str() {
            let locator: Locator = ".shopping_cart_link".into();
            assert_eq!(locator.selector().css_part(), ".shopping_cart_link");
        }
    }
}
