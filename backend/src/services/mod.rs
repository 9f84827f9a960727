//! Business logic services for the SiteOps backend

pub mod alert;
pub mod inventory;
pub mod notification;
pub mod transfer;

pub use alert::AlertService;
pub use inventory::InventoryService;
pub use notification::NotificationService;
pub use transfer::TransferService;
