// src/core/fs_ops.rs
//! File system helpers shared by CV storage and report rendering

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::app_log;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            app_log!(info, "Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn write_file_safe(path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        app_log!(debug, "Written file: {}", path.display());
        Ok(())
    }

    pub async fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
        fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Remove a file; a missing file is not an error.
    pub async fn remove_file(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .await
                .with_context(|| format!("Failed to remove file: {}", path.display()))?;
            app_log!(info, "Removed file: {}", path.display());
        }
        Ok(())
    }

    pub fn normalize_path(base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            base.join(relative)
        }
    }

    /// Turn a user-supplied file name into something safe to store and serve.
    pub fn sanitize_file_name(name: &str) -> String {
        let trimmed = name.trim();
        let cleaned: String = trimmed
            .chars()
            .map(|c| match c {
                c if c.is_alphanumeric() => c,
                '.' | '-' | '_' => c,
                _ => '_',
            })
            .collect();

        let cleaned = cleaned.trim_matches('.').to_string();
        if cleaned.is_empty() {
            "file".to_string()
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(FsOps::sanitize_file_name("Mi CV 2025.pdf"), "Mi_CV_2025.pdf");
        assert_eq!(FsOps::sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(FsOps::sanitize_file_name("   "), "file");
    }

    #[test]
    fn test_normalize_path() {
        let base = Path::new("/srv/joblyst");
        assert_eq!(
            FsOps::normalize_path(base, Path::new("data")),
            PathBuf::from("/srv/joblyst/data")
        );
        assert_eq!(
            FsOps::normalize_path(base, Path::new("/var/data")),
            PathBuf::from("/var/data")
        );
    }

    #[tokio::test]
    async fn test_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/file.bin");
        FsOps::write_file_safe(&path, b"abc").await.unwrap();
        assert_eq!(FsOps::read_file_bytes(&path).await.unwrap(), b"abc");
        FsOps::remove_file(&path).await.unwrap();
        assert!(!path.exists());
        FsOps::remove_file(&path).await.unwrap();
    }
}
