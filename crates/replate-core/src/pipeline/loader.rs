//! Image loading: content-based format detection and downscaling before upload.

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::PipelineError;
use crate::llm::ImageInput;

/// Reads images from disk and prepares them for a model request.
pub struct ImageLoader {
    max_dimension: u32,
}

impl ImageLoader {
    /// `max_dimension` is the longest edge sent to the model.
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Read and encode an image for upload.
    ///
    /// Images within the size limit are sent as-is. Larger ones are decoded,
    /// shrunk to `max_dimension` on the longest edge, and re-encoded as JPEG.
    pub async fn load(&self, path: &Path) -> Result<ImageInput, PipelineError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Failed to read image: {e}"),
        })?;

        let max_dimension = self.max_dimension;
        let path_owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::prepare_sync(bytes, &path_owned, max_dimension))
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {e}"),
            })?
    }

    fn prepare_sync(
        bytes: Vec<u8>,
        path: &Path,
        max_dimension: u32,
    ) -> Result<ImageInput, PipelineError> {
        let decode_err = |message: String| PipelineError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let format = image::guess_format(&bytes).map_err(|_| PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?;

        let (width, height) = image::ImageReader::with_format(Cursor::new(&bytes), format)
            .into_dimensions()
            .map_err(|e| decode_err(format!("Cannot read dimensions: {e}")))?;

        if width.max(height) <= max_dimension {
            return Ok(ImageInput::from_bytes(&bytes, format_to_str(format)));
        }

        tracing::debug!(
            "Downscaling {:?} from {width}x{height} to fit {max_dimension}px",
            path
        );
        let image = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| decode_err(e.to_string()))?;
        let resized = DynamicImage::ImageRgb8(
            image
                .resize(max_dimension, max_dimension, FilterType::Triangle)
                .to_rgb8(),
        );

        let mut buffer = Cursor::new(Vec::new());
        resized
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .map_err(|e| decode_err(format!("JPEG re-encode failed: {e}")))?;

        Ok(ImageInput::from_bytes(&buffer.into_inner(), "jpeg"))
    }
}

/// Format identifier understood by [`ImageInput::from_bytes`].
pub fn format_to_str(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}
