//! ImageMagick integration. Implements ImageConverterPort.
//!
//! Runs `convert <input> <output>`; the output format follows the extension.

use crate::domain::DomainError;
use crate::ports::ImageConverterPort;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

pub const DEFAULT_CONVERT_BIN: &str = "convert";

/// External converter. `bin_path` defaults to `convert` on PATH.
pub struct ImageMagickConverter {
    bin_path: PathBuf,
}

impl ImageMagickConverter {
    pub fn new(bin_path: Option<impl AsRef<Path>>) -> Self {
        Self {
            bin_path: bin_path
                .map(|p| p.as_ref().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONVERT_BIN)),
        }
    }
}

#[async_trait]
impl ImageConverterPort for ImageMagickConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), DomainError> {
        debug!(bin = %self.bin_path.display(), input = %input.display(), output = %output.display(), "running converter");
        let result = Command::new(&self.bin_path)
            .arg(input)
            .arg(output)
            .output()
            .await
            .map_err(|e| {
                DomainError::Conversion(format!("spawn {}: {}", self.bin_path.display(), e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(DomainError::Conversion(format!(
                "{} exited with {}: {}",
                self.bin_path.display(),
                result.status,
                stderr.trim()
            )));
        }

        info!(output = %output.display(), "image converted");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_conversion_error() {
        let converter = ImageMagickConverter::new(Some("/nonexistent/convert-tool"));
        let dir = tempfile::tempdir().unwrap();
        let err = converter
            .convert(&dir.path().join("a.webp"), &dir.path().join("a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conversion(_)));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_conversion_error() {
        // `false` ignores its arguments and exits 1.
        let converter = ImageMagickConverter::new(Some("false"));
        let dir = tempfile::tempdir().unwrap();
        let err = converter
            .convert(&dir.path().join("a.webp"), &dir.path().join("a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conversion(_)));
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let converter = ImageMagickConverter::new(Some("true"));
        let dir = tempfile::tempdir().unwrap();
        converter
            .convert(&dir.path().join("a.webp"), &dir.path().join("a.png"))
            .await
            .unwrap();
    }
}
