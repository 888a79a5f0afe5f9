//! Approvals dashboard: fetch the approval rule snapshot from the server,
//! hold it, and render it through a named template.
//!
//! The binary wires these modules together; integration tests in `tests/`
//! use them directly.

pub mod config;
pub mod errors;
pub mod host;
pub mod models;
pub mod registry;
pub mod render;
pub mod rpc;
pub mod view;
