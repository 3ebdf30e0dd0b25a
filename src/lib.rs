//! Weather logging backend.
//!
//! Clients submit periodic weather readings; the service stores them, keeps a
//! small set of threshold-based insights up to date, and serves history plus
//! CSV/XLSX exports to an authenticated dashboard.
//!
//! Module layout follows the Explicit Module Boundary Pattern (EMBP): this
//! file is the gateway, and sibling modules import shared types through it
//! rather than reaching into each other's internals.

pub mod accounts;
pub mod auth;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod insights;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod weather;

mod state;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
