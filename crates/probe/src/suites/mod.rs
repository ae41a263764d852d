//! Swag Labs acceptance suites.
//!
//! Each suite is plain data: scenarios with their tables, ready for a
//! [`ScenarioExecutor`](crate::scenario::ScenarioExecutor).

pub mod authentication;
pub mod cart;
pub mod catalog;

use crate::result::{ProbeError, ProbeResult};
use crate::scenario::Suite;

/// Suite names accepted by [`by_name`]
pub const SUITE_NAMES: [&str; 4] = ["login", "catalog", "cart", "all"];

/// Every suite in run order
pub fn all() -> ProbeResult<Vec<Suite>> {
    Ok(vec![authentication::suite()?, catalog::suite(), cart::suite()])
}

/// Suites selected by name; `all` selects every suite
pub fn by_name(name: &str) -> ProbeResult<Vec<Suite>> {
    match name {
        "login" => Ok(vec![authentication::suite()?]),
        "catalog" => Ok(vec![catalog::suite()]),
        "cart" => Ok(vec![cart::suite()]),
        "all" => all(),
        other => Err(ProbeError::config(format!(
            "unknown suite '{other}', expected one of {}",
            SUITE_NAMES.join(", ")
        ))),
    }
}
