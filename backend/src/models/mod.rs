//! Database models for the SiteOps backend
//!
//! Re-exports domain models from the shared crate; row types that exist only
//! for SQL mapping live next to the services that own them.

pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;
