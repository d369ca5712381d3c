//! Marketplace backend access

pub mod client;
pub mod error;
pub mod wire;

pub use client::{load_address_hierarchy, load_reference_data, ApiClient, RegistrationBackend};
pub use error::ApiError;
pub use wire::RegistrationReceipt;
