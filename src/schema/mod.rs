//! Schema system - step schemas and validation

pub mod registry;
pub mod rules;
pub mod validator;

pub use registry::SchemaRegistry;
pub use rules::normalize_phone;
pub use validator::{StepValidator, ValidationErrors};
