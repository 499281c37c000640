//! Admin access control

pub mod api_key;
pub mod permissions;

pub use api_key::ApiKeyValidator;
pub use permissions::{required_access, AccessLevel};
