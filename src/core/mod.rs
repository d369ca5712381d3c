//! Core module - fundamental types and utilities

pub mod config;
pub mod identity;
pub mod logging;
pub mod session;
pub mod status;

pub use config::{Config, ConfigError};
pub use identity::{ClientReference, IdParseError};
pub use session::{Session, SessionContext, SessionError, SessionStore, UserProfile};
pub use status::ApprovalStatus;
