//! Submission assembly
//!
//! Turns the finished form and image list into the multipart payload sent to
//! `businesses/register`: one JSON document describing the business plus one
//! file part per image and an optional licence document. Every record in the
//! JSON is stamped with `status: PENDING` and the submitting user.

use miette::Diagnostic;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use thiserror::Error;

use crate::api::error::ApiError;
use crate::api::wire::RegistrationReceipt;
use crate::core::identity::ClientReference;
use crate::core::status::ApprovalStatus;
use crate::entities::image::{content_type_for, ImageSet};
use crate::entities::registration::RegistrationForm;
use crate::schema::validator::ValidationErrors;
use crate::wizard::step::WizardStep;

/// Multipart field carrying one property image
pub const IMAGES_FIELD: &str = "images";
/// Multipart field carrying the licence document
pub const LICENSE_FIELD: &str = "businessLicense";
/// Multipart field carrying the JSON document
pub const REGISTRATION_FIELD: &str = "registration";
/// Multipart field carrying the cover index
pub const COVER_FIELD: &str = "coverImageIndex";

/// A file to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: &'static str,
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
}

/// Everything sent with a registration
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub reference: ClientReference,
    pub registration: Value,
    pub files: Vec<FilePart>,
    pub cover_image_index: usize,
}

impl SubmissionPayload {
    /// The JSON document as sent
    pub fn registration_json(&self) -> String {
        self.registration.to_string()
    }

    /// Number of property images attached
    pub fn image_count(&self) -> usize {
        self.files.iter().filter(|f| f.field == IMAGES_FIELD).count()
    }

    /// Printable form of the whole payload, for dry runs
    pub fn describe(&self) -> Value {
        json!({
            "registration": self.registration,
            "coverImageIndex": self.cover_image_index,
            "files": self.files.iter().map(|f| json!({
                "field": f.field,
                "fileName": f.file_name,
                "contentType": f.content_type,
                "path": f.path.display().to_string(),
            })).collect::<Vec<_>>(),
        })
    }
}

/// A registration the backend accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub reference: ClientReference,
    pub receipt: RegistrationReceipt,
}

/// Builds [`SubmissionPayload`]s on behalf of one user
#[derive(Debug, Clone)]
pub struct SubmissionAssembler {
    created_by: String,
}

impl SubmissionAssembler {
    pub fn new(created_by: impl Into<String>) -> Self {
        Self {
            created_by: created_by.into(),
        }
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Assemble a payload under a fresh client reference
    pub fn assemble(&self, form: &RegistrationForm, images: &ImageSet) -> SubmissionPayload {
        self.assemble_with(ClientReference::new(), form, images)
    }

    /// Assemble a payload under the given client reference
    pub fn assemble_with(
        &self,
        reference: ClientReference,
        form: &RegistrationForm,
        images: &ImageSet,
    ) -> SubmissionPayload {
        let mut address = self.stamped(&form.address);
        if let Value::Object(map) = &mut address {
            map.insert(
                "parishVerified".to_string(),
                Value::Bool(form.address.parish_is_verified()),
            );
        }

        let registration = json!({
            "clientReference": reference.to_string(),
            "business": self.stamped(&form.business),
            "address": address,
            "bankAccounts": form.bank_accounts.iter().map(|a| self.stamped(a)).collect::<Vec<_>>(),
            "contacts": form.contacts.iter().map(|c| self.stamped(c)).collect::<Vec<_>>(),
            "staff": form.staff.iter().map(|m| self.stamped(m)).collect::<Vec<_>>(),
            "attachments": self.stamp(json!({ "ownerNin": form.attachments.owner_nin })),
        });

        let mut files: Vec<FilePart> = images
            .images()
            .iter()
            .map(|image| FilePart {
                field: IMAGES_FIELD,
                path: image.path.clone(),
                file_name: image.file_name.clone(),
                content_type: image.content_type.to_string(),
            })
            .collect();

        if let Some(path) = form.attachments.license_path() {
            files.push(FilePart {
                field: LICENSE_FIELD,
                path: path.to_path_buf(),
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                content_type: license_content_type(path).to_string(),
            });
        }

        SubmissionPayload {
            reference,
            registration,
            files,
            cover_image_index: images.cover_index().unwrap_or(0),
        }
    }

    fn stamped<T: serde::Serialize>(&self, record: &T) -> Value {
        // Plain data structs always serialize
        self.stamp(serde_json::to_value(record).unwrap_or(Value::Null))
    }

    fn stamp(&self, value: Value) -> Value {
        let mut map = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        map.insert(
            "status".to_string(),
            Value::String(ApprovalStatus::Pending.to_string()),
        );
        map.insert("createdBy".to_string(), Value::String(self.created_by.clone()));
        Value::Object(map)
    }
}

fn license_content_type(path: &std::path::Path) -> &'static str {
    let is_pdf = path
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        "application/pdf"
    } else {
        content_type_for(path).unwrap_or("application/octet-stream")
    }
}

/// Why a submission did not go through
#[derive(Debug, Error, Diagnostic)]
pub enum SubmitError {
    #[error("Submit is only available on the last step")]
    #[diagnostic(code(innkeeper::submit::not_last_step))]
    NotOnLastStep,

    #[error("The registration is incomplete ({} step(s) need attention)", .0.len())]
    #[diagnostic(
        code(innkeeper::submit::invalid),
        help("Fix the fields listed for each step and submit again")
    )]
    Invalid(Vec<(WizardStep, ValidationErrors)>),

    #[error("{message}")]
    #[diagnostic(code(innkeeper::submit::backend))]
    Backend { message: String, requires_login: bool },
}

impl SubmitError {
    pub fn requires_login(&self) -> bool {
        matches!(self, SubmitError::Backend { requires_login: true, .. })
    }
}

impl From<ApiError> for SubmitError {
    fn from(error: ApiError) -> Self {
        let requires_login = error.requires_login();
        let message = match &error {
            ApiError::SessionExpired | ApiError::NotAuthenticated => {
                "Your session has expired. Please log in again.".to_string()
            }
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Network { .. } | ApiError::InvalidUrl { .. } => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Decode { .. } => {
                "The server returned an unexpected response. Please try again.".to_string()
            }
            ApiError::File { path, .. } => format!("Could not read {}", path.display()),
        };
        SubmitError::Backend {
            message,
            requires_login,
        }
    }
}
