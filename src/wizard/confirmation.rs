//! Thank-you screen shown after a successful submission

use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

use crate::api::wire::RegistrationReceipt;
use crate::core::identity::ClientReference;
use crate::entities::image::ImageSet;
use crate::entities::registration::RegistrationForm;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const THANK_YOU_TEMPLATE: &str = "thank_you.txt.tera";

#[derive(Debug, Error)]
pub enum ConfirmationError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

/// Facts shown on the thank-you screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub business_name: String,
    pub reference: Option<ClientReference>,
    pub business_id: Option<String>,
    pub image_count: usize,
    pub cover_index: Option<usize>,
    pub contact: String,
    pub server_message: String,
}

impl Confirmation {
    pub fn new(
        form: &RegistrationForm,
        images: &ImageSet,
        reference: Option<ClientReference>,
        receipt: &RegistrationReceipt,
    ) -> Self {
        let contact = form
            .contacts
            .iter()
            .find(|c| c.is_primary)
            .map(|c| c.name.trim())
            .filter(|n| !n.is_empty())
            .unwrap_or("you")
            .to_string();
        Self {
            business_name: form.business.display_name().trim().to_string(),
            reference,
            business_id: receipt.business_id.clone(),
            image_count: images.len(),
            cover_index: images.cover_index(),
            contact,
            server_message: receipt.message.clone(),
        }
    }
}

/// Renders [`Confirmation`]s from the embedded template
pub struct ConfirmationRenderer {
    tera: Tera,
}

impl ConfirmationRenderer {
    pub fn new() -> Result<Self, ConfirmationError> {
        let mut tera = Tera::default();
        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let text = String::from_utf8_lossy(&content.data);
                tera.add_raw_template(filename, &text)
                    .map_err(|e| ConfirmationError::RenderError(e.to_string()))?;
            }
        }
        if !tera.get_template_names().any(|n| n == THANK_YOU_TEMPLATE) {
            return Err(ConfirmationError::NotFound(THANK_YOU_TEMPLATE.to_string()));
        }
        Ok(Self { tera })
    }

    pub fn render(&self, confirmation: &Confirmation) -> Result<String, ConfirmationError> {
        let mut context = tera::Context::new();
        context.insert("business_name", &confirmation.business_name);
        context.insert(
            "reference",
            &confirmation
                .reference
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        context.insert("business_id", &confirmation.business_id);
        context.insert("image_count", &confirmation.image_count);
        context.insert("cover_number", &(confirmation.cover_index.unwrap_or(0) + 1));
        context.insert("contact", &confirmation.contact);
        context.insert("server_message", &confirmation.server_message);

        self.tera
            .render(THANK_YOU_TEMPLATE, &context)
            .map_err(|e| ConfirmationError::RenderError(e.to_string()))
    }
}
