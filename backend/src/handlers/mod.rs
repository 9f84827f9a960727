//! HTTP handlers for the SiteOps backend

pub mod alert;
pub mod health;
pub mod inventory;
pub mod notification;
pub mod transfer;

pub use alert::*;
pub use health::*;
pub use inventory::*;
pub use notification::*;
pub use transfer::*;
