//! # Quill Shared
//!
//! Wire types of the Quill HTTP API: request bodies, response bodies and the
//! success/error envelopes.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
