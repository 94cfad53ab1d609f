//! Input validation before an image is read in full.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates files before upload.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Quick checks: the file exists, fits the size limit, and starts with
    /// the magic bytes of a format the hosted models accept.
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {e}"),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path)
    }

    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {e}"),
        })?;

        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).unwrap_or(0);

        if bytes_read < 4 {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        if !Self::is_valid_image_header(&header[..bytes_read]) {
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }

        Ok(())
    }

    /// JPEG, PNG, GIF, WebP and BMP signatures.
    fn is_valid_image_header(header: &[u8]) -> bool {
        match header {
            [0xFF, 0xD8, 0xFF, ..] => true,
            [0x89, b'P', b'N', b'G', ..] => true,
            [b'G', b'I', b'F', b'8', ..] => true,
            [b'R', b'I', b'F', b'F', _, _, _, _, rest @ ..] if rest.len() >= 4 => {
                &rest[..4] == b"WEBP"
            }
            [b'B', b'M', ..] => true,
            _ => false,
        }
    }
}
