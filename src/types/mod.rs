//! Shared types

pub mod dates;
pub mod error;

pub use dates::parse_date;
pub use error::{HubError, Result};
