//! Security Module
//!
//! Security headers, CORS and request validation for the chat API.

pub mod middleware;
pub mod validation;

pub use middleware::{cors_layer, security_headers_middleware};
pub use validation::{RequestValidator, ValidationError};
