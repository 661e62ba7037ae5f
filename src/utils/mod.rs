//! Helpers shared by the service and HTTP layers.
//!
//! - [`code_generator`] - Short code generation strategies
//! - [`url_validator`] - Long URL validation

pub mod code_generator;
pub mod url_validator;
