//! cachegrid library
//!
//! Fetches a list of items from a public API, memoizes the result for a TTL,
//! and renders it as a grid. The modules are exposed for the binary and for
//! integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod plain;
pub mod refresh;
pub mod ui;
