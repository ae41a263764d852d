//! Application-under-test configuration.
//!
//! Defaults describe the public Swag Labs demo site. A YAML or JSON file can
//! override any subset of fields; `SHOPPROBE_BASE_URL` overrides the base URL.

use crate::model::Credentials;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding [`AppConfig::base_url`]
pub const BASE_URL_ENV: &str = "SHOPPROBE_BASE_URL";

/// CSS selectors for every element the harness touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Login form user name field
    pub username_field: String,
    /// Login form password field
    pub password_field: String,
    /// Login form submit button
    pub login_button: String,
    /// Login error banner
    pub error_banner: String,
    /// Secondary header title
    pub page_title: String,
    /// Product card container
    pub inventory_item: String,
    /// Product name inside a card
    pub item_name: String,
    /// Product description inside a card
    pub item_description: String,
    /// Product price inside a card
    pub item_price: String,
    /// Product image inside a card
    pub item_image: String,
    /// Buttons inside a product card
    pub add_to_cart_button: String,
    /// Text of the add button
    pub add_to_cart_label: String,
    /// Cart icon link
    pub cart_link: String,
    /// Item count badge on the cart icon
    pub cart_badge: String,
    /// Cart line container
    pub cart_item: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            username_field: "#user-name".to_string(),
            password_field: "#password".to_string(),
            login_button: "#login-button".to_string(),
            error_banner: "[data-test='error']".to_string(),
            page_title: ".title".to_string(),
            inventory_item: ".inventory_item".to_string(),
            item_name: ".inventory_item_name".to_string(),
            item_description: ".inventory_item_desc".to_string(),
            item_price: ".inventory_item_price".to_string(),
            item_image: "img.inventory_item_img".to_string(),
            add_to_cart_button: "button".to_string(),
            add_to_cart_label: "Add to cart".to_string(),
            cart_link: ".shopping_cart_link".to_string(),
            cart_badge: ".shopping_cart_badge".to_string(),
            cart_item: ".cart_item_label".to_string(),
        }
    }
}

impl LocatorConfig {
    /// Every configured selector paired with its field name
    fn selectors(&self) -> [(&'static str, &str); 14] {
        [
            ("username_field", self.username_field.as_str()),
            ("password_field", self.password_field.as_str()),
            ("login_button", self.login_button.as_str()),
            ("error_banner", self.error_banner.as_str()),
            ("page_title", self.page_title.as_str()),
            ("inventory_item", self.inventory_item.as_str()),
            ("item_name", self.item_name.as_str()),
            ("item_description", self.item_description.as_str()),
            ("item_price", self.item_price.as_str()),
            ("item_image", self.item_image.as_str()),
            ("add_to_cart_button", self.add_to_cart_button.as_str()),
            ("cart_link", self.cart_link.as_str()),
            ("cart_badge", self.cart_badge.as_str()),
            ("cart_item", self.cart_item.as_str()),
        ]
    }
}

/// Configuration of the application under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Site root; the login page lives here
    pub base_url: String,
    /// Currency symbol stripped before parsing prices
    pub currency_prefix: String,
    /// Credentials used by "log in as a standard user"
    pub standard_user: Credentials,
    /// Element selectors
    pub locators: LocatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.saucedemo.com/".to_string(),
            currency_prefix: "$".to_string(),
            standard_user: Credentials::new("standard_user", "secret_sauce"),
            locators: LocatorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the site root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the currency prefix
    #[must_use]
    pub fn with_currency_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.currency_prefix = prefix.into();
        self
    }

    /// Set the standard user's credentials
    #[must_use]
    pub fn with_standard_user(mut self, credentials: Credentials) -> Self {
        self.standard_user = credentials;
        self
    }

    /// Parse from YAML and validate
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON and validate
    pub fn from_json_str(json: &str) -> ProbeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            other => Err(ProbeError::config(format!(
                "unsupported config format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    /// Apply overrides from a variable lookup
    #[must_use]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url;
        }
        self
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Reject configurations the harness cannot run with
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.currency_prefix.is_empty() {
            return Err(ProbeError::config("currency_prefix must not be empty"));
        }
        if let Some((field, _)) = self
            .locators
            .selectors()
            .into_iter()
            .find(|(_, selector)| selector.trim().is_empty())
        {
            return Err(ProbeError::config(format!("locator {field} is empty")));
        }
        Ok(())
    }

    /// URL of the login page
    #[must_use]
    pub fn login_url(&self) -> String {
        self.base_url.clone()
    }

    /// URL of a page relative to the site root
    #[must_use]
    pub fn page_url(&self, page: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            page.trim_start_matches('/')
        )
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ErrorKind;
    use std::io::Write;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_defaults_target_demo_site() {
            let config = AppConfig::default();
            assert_eq!(config.login_url(), "https://www.saucedemo.com/");
            assert_eq!(config.standard_user.username, "standard_user");
            assert_eq!(config.locators.error_banner, "[data-test='error']");
            config.validate().unwrap();
        }

        #[test]
        fn test_page_url_joins_cleanly() {
            let config = AppConfig::default();
            assert_eq!(
                config.page_url("/inventory.html"),
                "https://www.saucedemo.com/inventory.html"
            );
            let config = config.with_base_url("http://localhost:8080");
            assert_eq!(config.page_url("cart.html"), "http://localhost:8080/cart.html");
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = AppConfig::from_yaml_str(
                "base_url: http://localhost:3000/\nlocators:\n  page_title: h1.title\n",
            )
            .unwrap();
            assert_eq!(config.base_url, "http://localhost:3000/");
            assert_eq!(config.locators.page_title, "h1.title");
            assert_eq!(config.locators.cart_badge, ".shopping_cart_badge");
            assert_eq!(config.currency_prefix, "$");
        }

        #[test]
        fn test_json_config() {
            let config =
                AppConfig::from_json_str(r#"{"currency_prefix": "€", "standard_user": {"username": "u", "password": "p"}}"#)
                    .unwrap();
            assert_eq!(config.currency_prefix, "€");
            assert_eq!(config.standard_user, Credentials::new("u", "p"));
        }

        #[test]
        fn test_invalid_yaml_is_config_error() {
            let err = AppConfig::from_yaml_str("base_url: [unclosed").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }

        #[test]
        fn test_validation_rejects_bad_values() {
            let err = AppConfig::from_yaml_str("base_url: ftp://example.com\n").unwrap_err();
            assert!(err.to_string().contains("http(s)"));

            let err = AppConfig::from_yaml_str("locators:\n  cart_badge: ' '\n").unwrap_err();
            assert!(err.to_string().contains("cart_badge"));
        }

        #[test]
        fn test_yaml_round_trip_of_defaults() {
            let yaml = AppConfig::default().to_yaml().unwrap();
            assert_eq!(AppConfig::from_yaml_str(&yaml).unwrap(), AppConfig::default());
        }
    }

    mod load_tests {
        use super::*;

        #[test]
        fn test_load_by_extension() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("shopprobe.yaml");
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "currency_prefix: 'USD '").unwrap();

            let config = AppConfig::load(&path).unwrap();
            assert_eq!(config.currency_prefix, "USD ");
        }

        #[test]
        fn test_load_unknown_extension() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("shopprobe.toml");
            std::fs::write(&path, "x = 1").unwrap();
            let err = AppConfig::load(&path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }

        #[test]
        fn test_load_missing_file_is_io_error() {
            let err = AppConfig::load(Path::new("/nonexistent/shopprobe.yaml")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Io);
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_base_url_override() {
            let config = AppConfig::default().apply_overrides(|key| {
                (key == BASE_URL_ENV).then(|| "http://127.0.0.1:9000/".to_string())
            });
            assert_eq!(config.base_url, "http://127.0.0.1:9000/");
        }

        #[test]
        fn test_blank_override_ignored() {
            let config = AppConfig::default().apply_overrides(|_| Some("  ".to_string()));
            assert_eq!(config.base_url, "https://www.saucedemo.com/");
        }
    }
}
