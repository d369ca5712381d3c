//! Property images and cover selection

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest accepted image, in bytes
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Content types accepted for property images
pub const ACCEPTED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Errors raised by image list edits
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("At least one image is required")]
    LastImage,

    #[error("No image at position {index} (have {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Why a file was not added
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRejection {
    pub file_name: String,
    pub message: String,
}

/// A file the user picked, before acceptance checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: Option<&'static str>,
    pub size: u64,
}

impl ImageCandidate {
    /// Inspect a file on disk
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file_name: file_name_of(path),
            content_type: content_type_for(path),
            size: metadata.len(),
        })
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Content type from the file extension, for the accepted types only
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// An accepted image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
    pub size: u64,
}

impl UploadedImage {
    /// `file://` URL for previewing the image
    pub fn preview_url(&self) -> String {
        let absolute = std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        format!("file://{}", absolute.display())
    }
}

/// Ordered image list with exactly one cover whenever non-empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    images: Vec<UploadedImage>,
    cover: Option<usize>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Index of the cover image; `None` only when the list is empty
    pub fn cover_index(&self) -> Option<usize> {
        self.cover
    }

    pub fn is_cover(&self, index: usize) -> bool {
        self.cover == Some(index)
    }

    /// Add a batch. Bad files are reported and skipped; the rest are added.
    pub fn add(&mut self, candidates: Vec<ImageCandidate>) -> Vec<FileRejection> {
        let mut rejections = Vec::new();
        for candidate in candidates {
            let Some(content_type) = candidate
                .content_type
                .filter(|ct| ACCEPTED_TYPES.contains(ct))
            else {
                rejections.push(FileRejection {
                    message: format!(
                        "{} is not a supported image type (JPEG, PNG or WebP)",
                        candidate.file_name
                    ),
                    file_name: candidate.file_name,
                });
                continue;
            };
            if candidate.size > MAX_IMAGE_BYTES {
                rejections.push(FileRejection {
                    message: format!("{} exceeds the 5MB size limit", candidate.file_name),
                    file_name: candidate.file_name,
                });
                continue;
            }
            self.images.push(UploadedImage {
                path: candidate.path,
                file_name: candidate.file_name,
                content_type,
                size: candidate.size,
            });
        }
        if self.cover.is_none() && !self.images.is_empty() {
            self.cover = Some(0);
        }
        for rejection in &rejections {
            tracing::debug!(file = %rejection.file_name, "image rejected");
        }
        rejections
    }

    /// Add files from disk, reporting unreadable ones like any other rejection
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<FileRejection> {
        let mut rejections = Vec::new();
        let mut candidates = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match ImageCandidate::from_path(path) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => rejections.push(FileRejection {
                    file_name: file_name_of(path),
                    message: format!("{} could not be read: {}", file_name_of(path), e),
                }),
            }
        }
        rejections.extend(self.add(candidates));
        rejections
    }

    /// Remove an image, keeping the cover on the same logical image
    pub fn remove(&mut self, index: usize) -> Result<UploadedImage, ImageError> {
        let len = self.images.len();
        if index >= len {
            return Err(ImageError::OutOfRange { index, len });
        }
        if len == 1 {
            return Err(ImageError::LastImage);
        }
        let removed = self.images.remove(index);
        self.cover = match self.cover {
            Some(cover) if cover == index => Some(0),
            Some(cover) if index < cover => Some(cover - 1),
            other => other,
        };
        if self.images.is_empty() {
            self.cover = None;
        }
        Ok(removed)
    }

    /// Designate the cover image
    pub fn set_cover(&mut self, index: usize) -> Result<(), ImageError> {
        if index >= self.images.len() {
            return Err(ImageError::OutOfRange {
                index,
                len: self.images.len(),
            });
        }
        self.cover = Some(index);
        Ok(())
    }
}
