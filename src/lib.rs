//! Community Hub - REST API for a community support platform
//!
//! Members keep a private wellbeing journal (emotional check-ins, a planner,
//! brain dumps and focus sessions) alongside their course enrolments, event
//! registrations and favourite resources. Admins curate the catalogue of
//! courses, events, resources and expert talks.
//!
//! ## Layout
//!
//! - **db**: document collections over MongoDB or an in-process store
//! - **services**: validation and business rules, one service per collection
//! - **routes**: HTTP request parsing and dispatch
//! - **auth**: admin API key gate
//! - **server**: hyper accept loop and shared state

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{HubError, Result};
