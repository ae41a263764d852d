//! In-memory Swag Labs storefront implementing [`Driver`].
//!
//! Every state change that re-renders the page bumps a generation counter;
//! handles from an older generation are reported as stale, the way a real
//! browser detaches nodes after navigation. Typing only updates form state
//! and keeps existing handles valid.

use super::dom::{Document, El, NodeId};
use super::selector::SelectorList;
use crate::driver::{Driver, DriverError, DriverResult, ElementHandle, SessionFactory};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const ERROR_PREFIX: &str = "Epic sadface: ";
const VALID_PASSWORD: &str = "secret_sauce";
const KNOWN_USERS: [&str; 6] = [
    "standard_user",
    "locked_out_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

/// A product offered by the mock storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Product name
    pub name: String,
    /// Description
    pub description: String,
    /// Price exactly as rendered, e.g. `"$29.99"`
    pub price: String,
    /// Image source
    pub image: String,
    /// Rendered with a disabled add button
    pub sold_out: bool,
}

impl CatalogEntry {
    /// Create an entry
    #[must_use]
    pub fn new(name: &str, description: &str, price: &str, image: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            price: price.to_string(),
            image: image.to_string(),
            sold_out: false,
        }
    }

    /// Render with a disabled add button
    #[must_use]
    pub const fn sold_out(mut self) -> Self {
        self.sold_out = true;
        self
    }
}

/// The six products of the public demo site, in listing order
#[must_use]
pub fn default_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(
            "Sauce Labs Backpack",
            "Sleek, streamlined pack with unequaled laptop and tablet protection.",
            "$29.99",
            "/static/media/sauce-backpack-1200x1500.jpg",
        ),
        CatalogEntry::new(
            "Sauce Labs Bike Light",
            "A red light that makes riding at night safer. Water-resistant with 3 lighting modes.",
            "$9.99",
            "/static/media/bike-light-1200x1500.jpg",
        ),
        CatalogEntry::new(
            "Sauce Labs Bolt T-Shirt",
            "Get your testing superhero on with this bolt-printed tee in soft cotton.",
            "$15.99",
            "/static/media/bolt-shirt-1200x1500.jpg",
        ),
        CatalogEntry::new(
            "Sauce Labs Fleece Jacket",
            "A midweight quarter-zip fleece, warm enough for chilly mornings in the office.",
            "$49.99",
            "/static/media/sauce-pullover-1200x1500.jpg",
        ),
        CatalogEntry::new(
            "Sauce Labs Onesie",
            "Rib snap infant onesie for the junior automation engineer.",
            "$7.99",
            "/static/media/red-onesie-1200x1500.jpg",
        ),
        CatalogEntry::new(
            "Test.allTheThings() T-Shirt (Red)",
            "This classic tee features a screenprint you can wear anywhere. Super-soft cotton.",
            "$15.99",
            "/static/media/red-tatt-1200x1500.jpg",
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Blank,
    Login,
    Inventory,
    Cart,
}

#[derive(Debug)]
struct StoreState {
    screen: Screen,
    url: String,
    user: Option<String>,
    username: String,
    password: String,
    error: Option<String>,
    cart: Vec<usize>,
    doc: Document,
    generation: u64,
    history: Vec<String>,
    closed: bool,
    query_failure: Option<DriverError>,
}

/// In-memory storefront driver. Clones share the same page.
#[derive(Debug, Clone)]
pub struct MockStorefront {
    state: Arc<Mutex<StoreState>>,
    catalog: Arc<Vec<CatalogEntry>>,
    latency: Option<Duration>,
    close_counter: Option<Arc<AtomicUsize>>,
}

impl Default for MockStorefront {
    fn default() -> Self {
        Self::with_catalog(default_catalog())
    }
}

impl MockStorefront {
    /// Create a storefront showing the default catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storefront with a custom catalog
    #[must_use]
    pub fn with_catalog(catalog: Vec<CatalogEntry>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                screen: Screen::Blank,
                url: "about:blank".to_string(),
                user: None,
                username: String::new(),
                password: String::new(),
                error: None,
                cart: Vec::new(),
                doc: Document::from_root(El::new("div").id("root")),
                generation: 0,
                history: Vec::new(),
                closed: false,
                query_failure: None,
            })),
            catalog: Arc::new(catalog),
            latency: None,
            close_counter: None,
        }
    }

    /// Delay every driver call by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Count `close` calls into a shared counter
    #[must_use]
    pub fn with_close_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.close_counter = Some(counter);
        self
    }

    /// Make every subsequent query fail with `error`
    pub fn fail_queries_with(&self, error: DriverError) {
        self.lock().query_failure = Some(error);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(method))
    }

    /// Products currently in the cart, in the order they were added
    #[must_use]
    pub fn cart_contents(&self) -> Vec<String> {
        let state = self.lock();
        state
            .cart
            .iter()
            .filter_map(|index| self.catalog.get(*index))
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Logged-in user, if any
    #[must_use]
    pub fn logged_in_user(&self) -> Option<String> {
        self.lock().user.clone()
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn render(&self, state: &mut StoreState) {
        state.generation += 1;
        state.doc = match state.screen {
            Screen::Blank => Document::from_root(El::new("div").id("root")),
            Screen::Login => render_login(state),
            Screen::Inventory => self.render_inventory(state),
            Screen::Cart => self.render_cart(state),
        };
    }

    fn show(&self, state: &mut StoreState, screen: Screen, path: &str) {
        state.screen = screen;
        state.url = format!("{}{}", origin(&state.url), path);
        self.render(state);
    }

    fn render_inventory(&self, state: &StoreState) -> Document {
        let items = self.catalog.iter().enumerate().map(|(index, entry)| {
            let button = El::new("button")
                .class("btn")
                .class("btn_primary")
                .class("btn_inventory")
                .attr("data-index", index.to_string())
                .text("Add to cart");
            let button = if entry.sold_out {
                button.disabled()
            } else {
                button
            };
            El::new("div")
                .class("inventory_item")
                .child(
                    El::new("div").class("inventory_item_img").child(
                        El::new("a").child(
                            El::new("img")
                                .class("inventory_item_img")
                                .attr("alt", entry.name.as_str())
                                .attr("src", entry.image.as_str()),
                        ),
                    ),
                )
                .child(
                    El::new("div")
                        .class("inventory_item_description")
                        .child(
                            El::new("div")
                                .class("inventory_item_label")
                                .child(
                                    El::new("a").child(
                                        El::new("div")
                                            .class("inventory_item_name")
                                            .text(entry.name.as_str()),
                                    ),
                                )
                                .child(
                                    El::new("div")
                                        .class("inventory_item_desc")
                                        .text(entry.description.as_str()),
                                ),
                        )
                        .child(
                            El::new("div")
                                .class("pricebar")
                                .child(
                                    El::new("div")
                                        .class("inventory_item_price")
                                        .text(entry.price.as_str()),
                                )
                                .child(button),
                        ),
                )
        });

        Document::from_root(
            El::new("div")
                .id("root")
                .child(header(state.cart.len()))
                .child(
                    El::new("div")
                        .class("header_secondary_container")
                        .child(El::new("span").class("title").text("Products")),
                )
                .child(El::new("div").class("inventory_list").children(items)),
        )
    }

    fn render_cart(&self, state: &StoreState) -> Document {
        let lines = state.cart.iter().enumerate().filter_map(|(line, index)| {
            let entry = self.catalog.get(*index)?;
            Some(
                El::new("div")
                    .class("cart_item")
                    .child(El::new("div").class("cart_quantity").text("1"))
                    .child(
                        El::new("div")
                            .class("cart_item_label")
                            .child(
                                El::new("a").child(
                                    El::new("div")
                                        .class("inventory_item_name")
                                        .text(entry.name.as_str()),
                                ),
                            )
                            .child(
                                El::new("div")
                                    .class("inventory_item_desc")
                                    .text(entry.description.as_str()),
                            )
                            .child(
                                El::new("div").class("item_pricebar").child(
                                    El::new("div")
                                        .class("inventory_item_price")
                                        .text(entry.price.as_str()),
                                ),
                            )
                            .child(
                                El::new("button")
                                    .class("btn")
                                    .class("cart_button")
                                    .attr("data-line", line.to_string())
                                    .text("Remove"),
                            ),
                    ),
            )
        });

        Document::from_root(
            El::new("div")
                .id("root")
                .child(header(state.cart.len()))
                .child(
                    El::new("div")
                        .class("header_secondary_container")
                        .child(El::new("span").class("title").text("Your Cart")),
                )
                .child(El::new("div").class("cart_list").children(lines))
                .child(
                    El::new("button")
                        .id("continue-shopping")
                        .text("Continue Shopping"),
                )
                .child(El::new("button").id("checkout").text("Checkout")),
        )
    }

    fn route(&self, state: &mut StoreState, url: &str) -> DriverResult<()> {
        let path = path_of(url);
        let screen = match path {
            "" | "/" | "/index.html" => Screen::Login,
            "/inventory.html" => Screen::Inventory,
            "/cart.html" => Screen::Cart,
            other => {
                return Err(DriverError::Protocol {
                    message: format!("404 Not Found: {other}"),
                })
            }
        };
        state.url = url.to_string();

        if screen != Screen::Login && state.user.is_none() {
            state.screen = Screen::Login;
            state.error = Some(format!(
                "{ERROR_PREFIX}You can only access '{path}' when you are logged in."
            ));
            state.url = format!("{}/", origin(url));
        } else {
            state.screen = screen;
            if screen == Screen::Login {
                state.user = None;
                state.error = None;
                state.username.clear();
                state.password.clear();
            }
        }
        self.render(state);
        Ok(())
    }

    fn submit_login(&self, state: &mut StoreState) {
        let outcome = if state.username.is_empty() {
            Err("Username is required")
        } else if state.password.is_empty() {
            Err("Password is required")
        } else if !KNOWN_USERS.contains(&state.username.as_str())
            || state.password != VALID_PASSWORD
        {
            Err("Username and password do not match any user in this service")
        } else if state.username == "locked_out_user" {
            Err("Sorry, this user has been locked out.")
        } else {
            Ok(())
        };

        match outcome {
            Ok(()) => {
                state.user = Some(state.username.clone());
                state.error = None;
                self.show(state, Screen::Inventory, "/inventory.html");
            }
            Err(message) => {
                state.error = Some(format!("{ERROR_PREFIX}{message}"));
                self.render(state);
            }
        }
    }

    fn activate(&self, state: &mut StoreState, node: NodeId) {
        let element = state.doc.node(node).clone();
        if element.attr("id") == Some("login-button") {
            self.submit_login(state);
        } else if let Some(index) = element
            .attr("data-index")
            .and_then(|i| i.parse::<usize>().ok())
        {
            // Every add is a separate cart line, even for the same product
            state.cart.push(index);
            self.render(state);
        } else if let Some(line) = element
            .attr("data-line")
            .and_then(|l| l.parse::<usize>().ok())
        {
            if line < state.cart.len() {
                state.cart.remove(line);
            }
            self.render(state);
        } else if element.has_class("shopping_cart_link") {
            self.show(state, Screen::Cart, "/cart.html");
        } else if element.attr("id") == Some("continue-shopping") {
            self.show(state, Screen::Inventory, "/inventory.html");
        }
    }
}

fn header(cart_size: usize) -> El {
    let mut cart_link = El::new("a").class("shopping_cart_link");
    if cart_size > 0 {
        cart_link = cart_link.child(
            El::new("span")
                .class("shopping_cart_badge")
                .text(cart_size.to_string()),
        );
    }
    El::new("div")
        .class("primary_header")
        .child(
            El::new("div")
                .class("bm-menu-wrap")
                .hidden()
                .child(
                    El::new("a")
                        .id("logout_sidebar_link")
                        .text("Logout"),
                ),
        )
        .child(El::new("div").class("app_logo").text("Swag Labs"))
        .child(cart_link)
}

fn render_login(state: &StoreState) -> Document {
    let mut form = El::new("form")
        .child(
            El::new("input")
                .id("user-name")
                .attr("data-test", "username")
                .attr("value", state.username.as_str()),
        )
        .child(
            El::new("input")
                .id("password")
                .attr("type", "password")
                .attr("data-test", "password")
                .attr("value", state.password.as_str()),
        );
    if let Some(error) = &state.error {
        form = form.child(
            El::new("div")
                .class("error-message-container")
                .class("error")
                .child(El::new("h3").attr("data-test", "error").text(error.as_str())),
        );
    }
    form = form.child(
        El::new("input")
            .id("login-button")
            .attr("type", "submit")
            .attr("value", "Login"),
    );
    Document::from_root(
        El::new("div")
            .id("root")
            .child(El::new("div").class("login_logo").text("Swag Labs"))
            .child(form),
    )
}

fn origin(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(0, |i| i + 3);
    match url[after_scheme..].find('/') {
        Some(slash) => &url[..after_scheme + slash],
        None => url,
    }
}

fn path_of(url: &str) -> &str {
    let rest = &url[origin(url).len()..];
    let end = rest.find(|c| c == '?' || c == '#').unwrap_or(rest.len());
    &rest[..end]
}

fn resolve(state: &StoreState, handle: &ElementHandle) -> DriverResult<NodeId> {
    if state.closed {
        return Err(closed_error());
    }
    let stale = || DriverError::Stale {
        id: handle.id().to_string(),
    };
    if handle.generation() != state.generation {
        return Err(stale());
    }
    handle
        .id()
        .parse::<usize>()
        .ok()
        .and_then(|index| state.doc.get(index))
        .ok_or_else(stale)
}

fn closed_error() -> DriverError {
    DriverError::Protocol {
        message: "page is closed".to_string(),
    }
}

fn ensure_interactable(state: &StoreState, node: NodeId, id: &str) -> DriverResult<()> {
    let reason = if !state.doc.is_visible(node) {
        "hidden"
    } else if state.doc.node(node).is_disabled() {
        "disabled"
    } else {
        return Ok(());
    };
    Err(DriverError::NotInteractable {
        id: id.to_string(),
        reason: reason.to_string(),
    })
}

#[async_trait]
impl Driver for MockStorefront {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.pause().await;
        let mut state = self.lock();
        if state.closed {
            return Err(closed_error());
        }
        state.history.push(format!("navigate:{url}"));
        self.route(&mut state, url)
    }

    async fn query(
        &self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> DriverResult<Vec<ElementHandle>> {
        self.pause().await;
        let mut state = self.lock();
        if state.closed {
            return Err(closed_error());
        }
        state.history.push(format!("query:{selector}"));
        if let Some(failure) = &state.query_failure {
            return Err(failure.clone());
        }
        let parsed = SelectorList::parse(selector).map_err(|selector| {
            DriverError::InvalidSelector { selector }
        })?;
        let scope = scope.map(|handle| resolve(&state, handle)).transpose()?;
        let generation = state.generation;
        Ok(state
            .doc
            .query_all(&parsed, scope)
            .into_iter()
            .map(|node| ElementHandle::new(node.index().to_string(), generation))
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.pause().await;
        let mut state = self.lock();
        let node = resolve(&state, element)?;
        state.history.push(format!("click:{}", element.id()));
        ensure_interactable(&state, node, element.id())?;
        self.activate(&mut state, node);
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.pause().await;
        let mut state = self.lock();
        let node = resolve(&state, element)?;
        state.history.push(format!("send_keys:{}", element.id()));
        ensure_interactable(&state, node, element.id())?;
        if state.doc.node(node).tag() != "input" {
            return Err(DriverError::NotInteractable {
                id: element.id().to_string(),
                reason: "not an input".to_string(),
            });
        }

        let value = format!(
            "{}{text}",
            state.doc.node(node).attr("value").unwrap_or_default()
        );
        match state.doc.node(node).attr("id") {
            Some("user-name") => state.username.clone_from(&value),
            Some("password") => state.password.clone_from(&value),
            _ => {}
        }
        state.doc.set_attr(node, "value", value);
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        self.pause().await;
        let state = self.lock();
        let node = resolve(&state, element)?;
        if !state.doc.is_visible(node) {
            return Ok(String::new());
        }
        Ok(state.doc.text_content(node))
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        self.pause().await;
        let state = self.lock();
        let node = resolve(&state, element)?;
        Ok(state.doc.node(node).attr(name).map(str::to_string))
    }

    async fn current_url(&self) -> DriverResult<String> {
        let state = self.lock();
        if state.closed {
            return Err(closed_error());
        }
        Ok(state.url.clone())
    }

    async fn close(&self) -> DriverResult<()> {
        let mut state = self.lock();
        state.history.push("close".to_string());
        state.closed = true;
        if let Some(counter) = &self.close_counter {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Session factory handing out a fresh storefront per session
#[derive(Debug, Clone)]
pub struct MockSessions {
    catalog: Arc<Vec<CatalogEntry>>,
    latency: Option<Duration>,
    open_failure: Option<String>,
    opened: Arc<Mutex<Vec<MockStorefront>>>,
    closed: Arc<AtomicUsize>,
}

impl Default for MockSessions {
    fn default() -> Self {
        Self::with_catalog(default_catalog())
    }
}

impl MockSessions {
    /// Create a factory for the default catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory for a custom catalog
    #[must_use]
    pub fn with_catalog(catalog: Vec<CatalogEntry>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            latency: None,
            open_failure: None,
            opened: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delay every driver call of every session
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Refuse to open sessions
    #[must_use]
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.open_failure = Some(message.into());
        self
    }

    /// Storefronts opened so far, in opening order
    #[must_use]
    pub fn storefronts(&self) -> Vec<MockStorefront> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of sessions opened
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of `close` calls across all sessions
    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for MockSessions {
    async fn open(&self) -> DriverResult<Box<dyn Driver>> {
        if let Some(message) = &self.open_failure {
            return Err(DriverError::Protocol {
                message: message.clone(),
            });
        }
        let mut storefront = MockStorefront::with_catalog(self.catalog.as_ref().clone())
            .with_close_counter(Arc::clone(&self.closed));
        if let Some(latency) = self.latency {
            storefront = storefront.with_latency(latency);
        }
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(storefront.clone());
        Ok(Box::new(storefront))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.saucedemo.com/";

    async fn query_one(store: &MockStorefront, selector: &str) -> ElementHandle {
        let mut found = store.query(selector, None).await.unwrap();
        assert_eq!(found.len(), 1, "{selector}");
        found.remove(0)
    }

    async fn login(store: &MockStorefront, username: &str, password: &str) {
        store.navigate(BASE).await.unwrap();
        let user = query_one(store, "#user-name").await;
        store.send_keys(&user, username).await.unwrap();
        let pass = query_one(store, "#password").await;
        store.send_keys(&pass, password).await.unwrap();
        let button = query_one(store, "#login-button").await;
        store.click(&button).await.unwrap();
    }

    async fn error_banner(store: &MockStorefront) -> String {
        let banner = query_one(store, "[data-test='error']").await;
        store.text(&banner).await.unwrap()
    }

    mod url_tests {
        use super::*;

        #[test]
        fn test_origin_and_path() {
            assert_eq!(origin("https://www.saucedemo.com/cart.html"), "https://www.saucedemo.com");
            assert_eq!(path_of("https://www.saucedemo.com/cart.html?x=1"), "/cart.html");
            assert_eq!(path_of("https://www.saucedemo.com"), "");
            assert_eq!(path_of(BASE), "/");
        }
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_standard_user_reaches_inventory() {
            let store = MockStorefront::new();
            login(&store, "standard_user", "secret_sauce").await;
            assert_eq!(store.logged_in_user().as_deref(), Some("standard_user"));
            assert_eq!(
                store.current_url().await.unwrap(),
                "https://www.saucedemo.com/inventory.html"
            );
        }

        #[tokio::test]
        async fn test_login_messages() {
            let cases = [
                ("", "secret_sauce", "Username is required"),
                ("standard_user", "", "Password is required"),
                ("locked_out_user", "secret_sauce", "Sorry, this user has been locked out."),
                ("standard_user", "wrong", "Username and password do not match"),
            ];
            for (user, pass, expected) in cases {
                let store = MockStorefront::new();
                login(&store, user, pass).await;
                let message = error_banner(&store).await;
                assert!(message.starts_with(ERROR_PREFIX), "{message}");
                assert!(message.contains(expected), "{message}");
                assert!(store.logged_in_user().is_none());
            }
        }

        #[tokio::test]
        async fn test_protected_page_redirects_to_login() {
            let store = MockStorefront::new();
            store
                .navigate("https://www.saucedemo.com/inventory.html")
                .await
                .unwrap();
            assert!(error_banner(&store)
                .await
                .contains("You can only access '/inventory.html' when you are logged in."));
            assert_eq!(store.current_url().await.unwrap(), BASE);
        }

        #[tokio::test]
        async fn test_typing_keeps_handles_valid() {
            let store = MockStorefront::new();
            store.navigate(BASE).await.unwrap();
            let user = query_one(&store, "#user-name").await;
            store.send_keys(&user, "standard").await.unwrap();
            store.send_keys(&user, "_user").await.unwrap();
            assert_eq!(
                store.attribute(&user, "value").await.unwrap().as_deref(),
                Some("standard_user")
            );
        }
    }

    mod cart_tests {
        use super::*;

        async fn add(store: &MockStorefront, index: usize) {
            let selector = format!("button[data-index='{index}']");
            let button = query_one(store, &selector).await;
            store.click(&button).await.unwrap();
        }

        #[tokio::test]
        async fn test_add_updates_badge() {
            let store = MockStorefront::new();
            login(&store, "standard_user", "secret_sauce").await;
            assert!(store
                .query(".shopping_cart_badge", None)
                .await
                .unwrap()
                .is_empty());

            add(&store, 0).await;
            add(&store, 4).await;
            let badge = query_one(&store, ".shopping_cart_badge").await;
            assert_eq!(store.text(&badge).await.unwrap(), "2");
            assert_eq!(
                store.cart_contents(),
                vec!["Sauce Labs Backpack", "Sauce Labs Onesie"]
            );
        }

        #[tokio::test]
        async fn test_repeated_add_is_not_collapsed() {
            let store = MockStorefront::new();
            login(&store, "standard_user", "secret_sauce").await;
            for _ in 0..3 {
                add(&store, 2).await;
            }
            let badge = query_one(&store, ".shopping_cart_badge").await;
            assert_eq!(store.text(&badge).await.unwrap(), "3");
            let button = query_one(&store, "button[data-index='2']").await;
            assert_eq!(store.text(&button).await.unwrap(), "Add to cart");
        }

        #[tokio::test]
        async fn test_cart_page_lists_lines() {
            let store = MockStorefront::new();
            login(&store, "standard_user", "secret_sauce").await;
            add(&store, 1).await;
            let link = query_one(&store, ".shopping_cart_link").await;
            store.click(&link).await.unwrap();

            let labels = store.query(".cart_item_label", None).await.unwrap();
            assert_eq!(labels.len(), 1);
            let name = store
                .query(".inventory_item_name", Some(&labels[0]))
                .await
                .unwrap();
            assert_eq!(store.text(&name[0]).await.unwrap(), "Sauce Labs Bike Light");

            let remove = query_one(&store, ".cart_button").await;
            store.click(&remove).await.unwrap();
            assert!(store.cart_contents().is_empty());
        }

        #[tokio::test]
        async fn test_sold_out_button_is_not_interactable() {
            let catalog = vec![CatalogEntry::new("Lamp", "Bright", "$5.00", "/lamp.jpg").sold_out()];
            let store = MockStorefront::with_catalog(catalog);
            login(&store, "standard_user", "secret_sauce").await;
            let button = query_one(&store, ".btn_inventory").await;
            let err = store.click(&button).await.unwrap_err();
            assert!(matches!(err, DriverError::NotInteractable { ref reason, .. } if reason == "disabled"));
        }

        #[tokio::test]
        async fn test_hidden_menu_link_is_not_interactable() {
            let store = MockStorefront::new();
            login(&store, "standard_user", "secret_sauce").await;
            let logout = query_one(&store, "#logout_sidebar_link").await;
            assert_eq!(store.text(&logout).await.unwrap(), "");
            assert!(matches!(
                store.click(&logout).await,
                Err(DriverError::NotInteractable { .. })
            ));
        }
    }

    mod driver_contract_tests {
        use super::*;

        #[tokio::test]
        async fn test_rerender_makes_handles_stale() {
            let store = MockStorefront::new();
            store.navigate(BASE).await.unwrap();
            let button = query_one(&store, "#login-button").await;
            store.click(&button).await.unwrap();
            assert!(matches!(
                store.click(&button).await,
                Err(DriverError::Stale { .. })
            ));
        }

        #[tokio::test]
        async fn test_invalid_selector() {
            let store = MockStorefront::new();
            store.navigate(BASE).await.unwrap();
            assert!(matches!(
                store.query("div >", None).await,
                Err(DriverError::InvalidSelector { .. })
            ));
        }

        #[tokio::test]
        async fn test_injected_query_failure() {
            let store = MockStorefront::new();
            store.fail_queries_with(DriverError::Timeout { ms: 10 });
            assert_eq!(
                store.query(".title", None).await,
                Err(DriverError::Timeout { ms: 10 })
            );
        }

        #[tokio::test]
        async fn test_closed_page_rejects_calls() {
            let store = MockStorefront::new();
            store.close().await.unwrap();
            assert!(store.is_closed());
            assert!(store.navigate(BASE).await.is_err());
            assert!(store.was_called("close"));
        }

        #[tokio::test]
        async fn test_unknown_path_is_protocol_error() {
            let store = MockStorefront::new();
            assert!(matches!(
                store.navigate("https://www.saucedemo.com/nope.html").await,
                Err(DriverError::Protocol { .. })
            ));
        }
    }

    mod session_factory_tests {
        use super::*;

        #[tokio::test]
        async fn test_sessions_are_isolated() {
            let sessions = MockSessions::new();
            let first = sessions.open().await.unwrap();
            let second = sessions.open().await.unwrap();
            first.navigate(BASE).await.unwrap();

            assert_eq!(sessions.opened(), 2);
            assert_eq!(second.current_url().await.unwrap(), "about:blank");

            first.close().await.unwrap();
            assert_eq!(sessions.closed(), 1);
            assert!(sessions.storefronts()[0].is_closed());
            assert!(!sessions.storefronts()[1].is_closed());
        }

        #[tokio::test]
        async fn test_failing_factory() {
            let sessions = MockSessions::new().failing_with("no browser");
            assert!(sessions.open().await.is_err());
            assert_eq!(sessions.opened(), 0);
        }
    }
}
