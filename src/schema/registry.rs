//! Embedded step schemas

use rust_embed::Embed;
use serde_json::Value;

use crate::wizard::step::WizardStep;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Access to the JSON Schemas shipped inside the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaRegistry;

impl SchemaRegistry {
    /// Raw schema text for a step
    pub fn get(&self, step: WizardStep) -> Option<String> {
        EmbeddedSchemas::get(step.schema_file())
            .map(|file| String::from_utf8_lossy(&file.data).into_owned())
    }

    /// Parsed schema for a step
    pub fn get_json(&self, step: WizardStep) -> Option<Value> {
        let text = self.get(step)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(schema = step.schema_file(), error = %e, "embedded schema is not valid JSON");
                None
            }
        }
    }

    pub fn has_schema(&self, step: WizardStep) -> bool {
        EmbeddedSchemas::get(step.schema_file()).is_some()
    }
}
