//! Domain models for the SiteOps Field Operations Platform

pub mod alert;
pub mod inventory;
pub mod material;
pub mod notification;
pub mod transfer;
pub mod user;
pub mod warehouse;

pub use alert::*;
pub use inventory::*;
pub use material::*;
pub use notification::*;
pub use transfer::*;
pub use user::*;
pub use warehouse::*;
