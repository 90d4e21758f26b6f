// src/storage.rs
//! CV file storage on the local disk: `<data_path>/cvs/<user_id>/<file_id>`.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::app_log;
use crate::core::FsOps;
use crate::domain::DomainError;
use crate::utils::{format_megabytes, get_file_extension};

pub const MAX_CV_SIZE: u64 = 10 * 1024 * 1024;

const PDF_SIGNATURE: &[u8] = b"%PDF-";
// OLE2 compound document, the container of legacy .doc files
const DOC_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvFormat {
    Pdf,
    Doc,
}

impl CvFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            CvFormat::Pdf => "application/pdf",
            CvFormat::Doc => "application/msword",
        }
    }

    fn signature(&self) -> &'static [u8] {
        match self {
            CvFormat::Pdf => PDF_SIGNATURE,
            CvFormat::Doc => DOC_SIGNATURE,
        }
    }

    /// Resolve from the declared content type, falling back to the file extension.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        let declared = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_lowercase());

        match declared.as_deref() {
            Some("application/pdf") => return Some(CvFormat::Pdf),
            Some("application/msword") => return Some(CvFormat::Doc),
            _ => {}
        }

        match get_file_extension(file_name).as_deref() {
            Some("pdf") => Some(CvFormat::Pdf),
            Some("doc") => Some(CvFormat::Doc),
            _ => None,
        }
    }
}

/// Check type, size and magic bytes of an uploaded CV.
pub fn validate_cv(
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<CvFormat, DomainError> {
    let format = CvFormat::detect(content_type, file_name).ok_or(DomainError::UnsupportedFileType)?;

    if bytes.len() as u64 > MAX_CV_SIZE {
        return Err(DomainError::FileTooLarge {
            max_mb: MAX_CV_SIZE / 1024 / 1024,
        });
    }

    if !bytes.starts_with(format.signature()) {
        app_log!(
            warn,
            "Rejected upload {}: content does not look like {}",
            file_name,
            format.content_type()
        );
        return Err(DomainError::UnsupportedFileType);
    }

    Ok(format)
}

#[derive(Debug, Clone)]
pub struct CvStorage {
    root: PathBuf,
}

impl CvStorage {
    pub fn new(data_path: &Path) -> Self {
        Self {
            root: data_path.join("cvs"),
        }
    }

    fn file_path(&self, user_id: &str, file_id: &str) -> PathBuf {
        self.root
            .join(FsOps::sanitize_file_name(user_id))
            .join(FsOps::sanitize_file_name(file_id))
    }

    /// Store the bytes under a fresh id and return it.
    pub async fn save(&self, user_id: &str, bytes: &[u8]) -> Result<String> {
        let file_id = uuid::Uuid::new_v4().to_string();
        let path = self.file_path(user_id, &file_id);
        FsOps::write_file_safe(&path, bytes).await?;

        app_log!(
            info,
            "Saved CV file {} ({}) for user {}",
            file_id,
            format_megabytes(bytes.len() as u64),
            user_id
        );
        Ok(file_id)
    }

    pub async fn read(&self, user_id: &str, file_id: &str) -> Result<Vec<u8>> {
        FsOps::read_file_bytes(&self.file_path(user_id, file_id)).await
    }

    pub async fn remove(&self, user_id: &str, file_id: &str) -> Result<()> {
        FsOps::remove_file(&self.file_path(user_id, file_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_bytes() -> Vec<u8> {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(CvFormat::detect(Some("application/pdf"), "x"), Some(CvFormat::Pdf));
        assert_eq!(CvFormat::detect(None, "resume.DOC"), Some(CvFormat::Doc));
        assert_eq!(
            CvFormat::detect(Some("application/octet-stream"), "cv.pdf"),
            Some(CvFormat::Pdf)
        );
        assert_eq!(CvFormat::detect(Some("text/plain"), "cv.txt"), None);
        assert_eq!(CvFormat::detect(None, "cv.docx"), None);
    }

    #[test]
    fn test_validate_cv() {
        assert_eq!(
            validate_cv("cv.pdf", Some("application/pdf"), &pdf_bytes()),
            Ok(CvFormat::Pdf)
        );

        let mut doc = DOC_SIGNATURE.to_vec();
        doc.extend_from_slice(b"rest");
        assert_eq!(validate_cv("cv.doc", None, &doc), Ok(CvFormat::Doc));

        assert_eq!(
            validate_cv("cv.pdf", Some("application/pdf"), b"not a pdf"),
            Err(DomainError::UnsupportedFileType)
        );
        assert_eq!(
            validate_cv("cv.png", Some("image/png"), &pdf_bytes()),
            Err(DomainError::UnsupportedFileType)
        );

        let mut huge = pdf_bytes();
        huge.resize(MAX_CV_SIZE as usize + 1, 0);
        assert_eq!(
            validate_cv("cv.pdf", None, &huge),
            Err(DomainError::FileTooLarge { max_mb: 10 })
        );
    }

    #[tokio::test]
    async fn test_save_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CvStorage::new(dir.path());

        let file_id = storage.save("user-1", &pdf_bytes()).await.unwrap();
        assert_eq!(storage.read("user-1", &file_id).await.unwrap(), pdf_bytes());
        assert!(storage.read("user-2", &file_id).await.is_err());

        storage.remove("user-1", &file_id).await.unwrap();
        assert!(storage.read("user-1", &file_id).await.is_err());
    }
}
