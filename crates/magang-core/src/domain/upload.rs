//! Upload acceptance rules for evidence files and profile photos

use magang_shared::utils::file_extension;

use crate::error::ValidationError;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Logbook evidence: images or documents.
    Evidence,
    /// Profile photo: images only.
    ProfilePhoto,
}

impl UploadKind {
    pub fn accepts(&self, extension: &str) -> bool {
        match self {
            UploadKind::Evidence => {
                IMAGE_EXTENSIONS.contains(&extension) || DOCUMENT_EXTENSIONS.contains(&extension)
            }
            UploadKind::ProfilePhoto => IMAGE_EXTENSIONS.contains(&extension),
        }
    }

    /// Sub-directory of the upload root.
    pub fn folder(&self) -> &'static str {
        match self {
            UploadKind::Evidence => "logbook",
            UploadKind::ProfilePhoto => "profile",
        }
    }
}

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl UploadPolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Returns the lower-cased extension the stored file will keep.
    pub fn check(&self, kind: UploadKind, upload: &FileUpload) -> Result<String, ValidationError> {
        let extension = file_extension(&upload.file_name)
            .filter(|ext| kind.accepts(ext))
            .ok_or_else(|| ValidationError::FileTypeRejected(upload.file_name.clone()))?;

        if upload.bytes.len() > self.max_bytes {
            return Err(ValidationError::FileTooLarge { limit: self.max_bytes });
        }
        if upload.bytes.is_empty() {
            return Err(ValidationError::MissingField(upload.file_name.clone()));
        }

        Ok(extension)
    }
}
