//! LifeLink notification sync client — library crate.
//!
//! Re-exports modules used by the `lifelink` binary and the integration
//! tests in `tests/`.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod poller;
pub mod store;
pub mod sync;
