//! Registration drafts stored as YAML
//!
//! A draft is a [`RegistrationForm`] with two extra keys, `images` (paths)
//! and `coverImage` (index into `images`). Relative paths are resolved
//! against the draft file's directory.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entities::image::{FileRejection, ImageError, ImageSet};
use crate::entities::registration::RegistrationForm;
use crate::wizard::store::normalize_phones;

#[derive(Debug, Error, Diagnostic)]
pub enum DraftError {
    #[error("Failed to read draft {path}: {source}")]
    #[diagnostic(code(innkeeper::draft::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid draft {path}: {message}")]
    #[diagnostic(
        code(innkeeper::draft::parse),
        help("Drafts use the camelCase keys of the registration form, e.g. `business.legalName`")
    )]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write draft {path}: {message}")]
    #[diagnostic(code(innkeeper::draft::write))]
    Write { path: PathBuf, message: String },
}

/// A saved, possibly incomplete registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Draft {
    #[serde(flatten)]
    pub form: RegistrationForm,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<usize>,
}

impl Draft {
    /// Read a draft and resolve its relative paths
    pub fn load(path: &Path) -> Result<Self, DraftError> {
        let text = std::fs::read_to_string(path).map_err(|source| DraftError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut draft: Draft = serde_yml::from_str(&text).map_err(|e| DraftError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        draft.form = normalize_phones(&draft.form);
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for image in &mut draft.images {
            *image = resolve(base, image);
        }
        if let Some(license) = draft.form.attachments.license_document.take() {
            draft.form.attachments.license_document = Some(resolve(base, &license));
        }
        tracing::debug!(path = %path.display(), images = draft.images.len(), "loaded draft");
        Ok(draft)
    }

    /// Write the draft as YAML
    pub fn save(&self, path: &Path) -> Result<(), DraftError> {
        let text = serde_yml::to_string(self).map_err(|e| DraftError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|e| DraftError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the image set, collecting rejected files. An out-of-range
    /// cover index is reported as a rejection and the default cover kept.
    pub fn image_set(&self) -> (ImageSet, Vec<FileRejection>) {
        let mut images = ImageSet::new();
        let mut rejections = images.add_paths(&self.images);
        if let Some(cover) = self.cover_image {
            if let Err(ImageError::OutOfRange { index, len }) = images.set_cover(cover) {
                rejections.push(FileRejection {
                    file_name: "coverImage".to_string(),
                    message: format!("Cover image {} does not exist ({} image(s) accepted)", index, len),
                });
            }
        }
        (images, rejections)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
