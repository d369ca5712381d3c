//! Entity type definitions
//!
//! **Registration:**
//! - [`RegistrationForm`] - The aggregate edited by the registration wizard
//! - [`AddressHierarchy`] - Region → district → county → sub-county → parish tree
//! - [`ImageSet`] - Property images with a designated cover
//! - [`ReferenceData`] - Banks, account types, business and ownership types
//!
//! **Back-office:**
//! - [`PendingBusiness`] - Entries of the approval queue
//! - [`DashboardSummary`] - Admin dashboard counters

pub mod address;
pub mod admin;
pub mod image;
pub mod reference;
pub mod registration;

pub use address::{AddressChain, AddressHierarchy, AddressItem, AddressLevel, ParishSelection};
pub use admin::{ApprovalDecision, DashboardSummary, PendingBusiness};
pub use image::{FileRejection, ImageCandidate, ImageError, ImageSet, UploadedImage};
pub use reference::{ReferenceData, ReferenceItem, ReferenceKind};
pub use registration::{
    AddressFields, AttachmentField, Attachments, BankAccount, BankField, BusinessField,
    BusinessInfo, Contact, ContactField, Primary, RegistrationForm, StaffField, StaffMember,
};
