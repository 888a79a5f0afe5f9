//! Outbound read calls to the server's JSON routes.

pub mod client;
pub mod source;
pub mod types;
