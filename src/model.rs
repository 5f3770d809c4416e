//! Domain models for the inventory.
//!
//! - [`Device`] - A device as reported by the gateway
//! - [`InventoryDocument`] - The Ansible inventory built from those devices

pub mod device;
pub mod inventory;

pub use device::{Device, DevicesResponse, LoginResponse};
pub use inventory::InventoryDocument;
