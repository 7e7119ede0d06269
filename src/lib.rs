//! Typed, version-aware access layer for the ONTAP storage cluster REST API.
//!
//! Domain operations ("get the route to D on SVM S", "create a snapshot",
//! "delete by UUID") become correctly shaped REST calls, and the API's
//! heterogeneous JSON comes back as typed records, an explicit absence, or a
//! classified [`ResourceError`].
//!
//! - [`resource`] - the generic mapping framework
//! - [`kinds`] - per-resource records and operations
//! - [`ontap`] - the reqwest-backed transport
//! - [`diagnostics`] - reporting boundary for classified errors
//! - [`config`] - connection profiles

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod kinds;
pub mod ontap;
pub mod resource;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ResourceError, Result};
