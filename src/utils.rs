// src/utils.rs
use anyhow::Result;

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file extension: {}. Allowed: {:?}",
            ext,
            allowed
        );
    }

    Ok(())
}

/// `Content-Disposition` value for a download; quotes and control chars are dropped.
pub fn attachment_disposition(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{}\"", cleaned)
}

/// Format a byte count as the upload limits are displayed, e.g. `10MB`.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("cv.pdf"), Some("pdf".to_string()));
        assert_eq!(get_file_extension("Resume.DOC"), Some("doc".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("cv.pdf", &["pdf", "doc"]).is_ok());
        assert!(validate_file_extension("cv.txt", &["pdf", "doc"]).is_err());
        assert!(validate_file_extension("noext", &["pdf"]).is_err());
    }

    #[test]
    fn test_attachment_disposition() {
        assert_eq!(
            attachment_disposition("my \"cv\".pdf"),
            "attachment; filename=\"my cv.pdf\""
        );
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(10 * 1024 * 1024), "10.0MB");
        assert_eq!(format_megabytes(1536 * 1024), "1.5MB");
    }
}
