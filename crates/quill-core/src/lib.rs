//! # Quill Core
//!
//! Domain layer of the Quill blogging backend: entities, ports, the access
//! policy and the transactional services. No infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use validation::parse_id;
