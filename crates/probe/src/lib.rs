//! Shopprobe: Screenplay-style acceptance testing for the Swag Labs storefront
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     SHOPPROBE Architecture                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐             │
//! │   │ Scenario   │    │ Actor      │    │ PageSession│             │
//! │   │ Executor   │───►│ Performable│───►│ Locator    │──► Driver   │
//! │   │ (rows)     │    │ Question   │    │ Action     │             │
//! │   └────────────┘    └────────────┘    └────────────┘             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every scenario row gets its own [`PageSession`] from a [`SessionFactory`]
//! and its own [`Actor`]. Business actions ([`Login`], [`AddItemToCart`])
//! are [`Performable`] steps recorded in the actor's trace; page components
//! answer [`Question`]s with typed snapshots. The in-memory
//! [`MockStorefront`] lets everything run without a browser.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod action;
mod assertion;
#[cfg(feature = "browser")]
mod browser;
mod component;
mod config;
mod driver;
mod locator;
mod logging;
mod model;
mod report;
mod result;
mod scenario;
mod screenplay;
mod session;

/// In-memory Swag Labs simulator
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod mock;

/// Swag Labs acceptance suites
pub mod suites;

/// Swag Labs business actions and page components
pub mod swaglabs;

pub use action::Action;
pub use assertion::{Assertion, AssertionResult};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumSessions};
pub use component::{attribute_in, extract_records, read_optional_text, text_in, RecordExtractor};
pub use config::{AppConfig, LocatorConfig, BASE_URL_ENV};
pub use driver::{Driver, DriverConfig, DriverError, DriverResult, ElementHandle, SessionFactory};
pub use locator::{Locator, Selector};
pub use logging::{env_filter, init_tracing, LogFormat, LOG_ENV};
pub use mock::MockStorefront;
pub use model::{Credentials, Price, ProductInfo, ShoppingCartItem};
pub use report::{RowError, RowResult, ScenarioError, ScenarioReport, SuiteReport};
pub use result::{ErrorKind, ProbeError, ProbeResult};
pub use scenario::{
    DataTable, ExecutorConfig, RowSource, RowState, Scenario, ScenarioExecutor, ScenarioRow, Suite,
};
pub use screenplay::{failed_step, Actor, Performable, Question, StepOutcome, StepRecord, Task};
pub use session::{Elements, PageSession, SessionGuard};
pub use swaglabs::{AddItemToCart, Login, PageHeader, ShoppingCartIcon, ShoppingCartSummary, ViewCart};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::mock::{MockSessions, MockStorefront};
    pub use super::swaglabs::*;
    pub use super::{
        Action, Actor, AppConfig, Assertion, AssertionResult, Credentials, DataTable, ErrorKind,
        ExecutorConfig, Locator, PageSession, Performable, Price, ProbeError, ProbeResult,
        Question, RowSource, Scenario, ScenarioExecutor, ScenarioReport, ScenarioRow,
        SessionFactory, Suite, SuiteReport, Task,
    };
}
