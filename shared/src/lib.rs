//! Shared types and models for the SiteOps Field Operations Platform
//!
//! This crate contains domain types shared between the backend and other
//! components of the system: the stock ledger vocabulary, transfer workflow
//! types, alert severities, and pure validation rules that the backend
//! services apply before touching the store.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
