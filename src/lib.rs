//! Innkeeper: business onboarding for a hospitality marketplace
//!
//! Owners register a property through a six-step wizard (business details,
//! address, bank accounts, contacts, staff, images) that validates each step
//! before moving on and submits everything as one multipart request. Admins
//! review the resulting queue from the same tool.

pub mod api;
pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
pub mod wizard;
