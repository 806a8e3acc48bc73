//! Image decoding and encoding for the command line.

use std::path::Path;

use filmstock_core::PixelBuffer;

/// Decode any format the `image` crate understands into RGBA8.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ImageIoError> {
    let img = image::open(path).map_err(ImageIoError::Decode)?;
    let buffer = PixelBuffer::from(img.to_rgba8());
    tracing::debug!(
        "decoded {} ({}x{}, {:?})",
        path.display(),
        buffer.width(),
        buffer.height(),
        img.color()
    );
    Ok(buffer)
}

/// Encode `buffer` to `path`, choosing the format from the extension.
///
/// Formats without an alpha channel (JPEG) receive the RGB channels only.
pub fn save_image(path: &Path, buffer: PixelBuffer) -> Result<(), ImageIoError> {
    let rgba = buffer.into_rgba_image().map_err(ImageIoError::Buffer)?;
    let format = image::ImageFormat::from_path(path).map_err(ImageIoError::Encode)?;
    match format {
        image::ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(rgba)
            .to_rgb8()
            .save_with_format(path, format)
            .map_err(ImageIoError::Encode),
        _ => rgba.save_with_format(path, format).map_err(ImageIoError::Encode),
    }
}

/// Errors that can occur while reading or writing images.
#[derive(Debug, thiserror::Error)]
pub enum ImageIoError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
    #[error(transparent)]
    Buffer(filmstock_core::RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("print.png");
        let buffer = PixelBuffer::from_rgba(2, 1, vec![10, 20, 30, 255, 40, 50, 60, 128]).unwrap();
        save_image(&path, buffer.clone()).unwrap();
        assert_eq!(load_image(&path).unwrap(), buffer);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("print.jpg");
        let buffer = PixelBuffer::from_rgba(8, 8, [200u8, 100, 50, 255].repeat(64)).unwrap();
        save_image(&path, buffer).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!((back.width(), back.height()), (8, 8));
        assert!(back.pixels().iter().all(|p| p[3] == 255));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = load_image(Path::new("/nonexistent/photo.png")).unwrap_err();
        assert!(matches!(err, ImageIoError::Decode(_)));
    }

    #[test]
    fn test_unknown_extension_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = PixelBuffer::from_rgba(1, 1, vec![0, 0, 0, 255]).unwrap();
        let err = save_image(&dir.path().join("print.unknownext"), buffer).unwrap_err();
        assert!(matches!(err, ImageIoError::Encode(_)));
    }
}
