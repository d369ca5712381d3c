//! CLI command implementations

pub mod address;
pub mod admin;
pub mod auth;
pub mod completions;
pub mod config;
pub mod register;
pub mod validate;
