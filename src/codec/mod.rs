//! Codec Module
//!
//! Boundary to the pixel-level work the store delegates: reading an image's
//! dimensions and producing a resized encoding. The store never looks at
//! pixels itself; fit policy belongs to the implementation.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::error::{ImgfsError, Result};

/// Image decoding/transcoding used by the container
pub trait Codec: Send {
    /// `(width, height)` of an encoded image
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)>;

    /// Re-encode `bytes` to fit inside `width` x `height`
    fn transcode(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>>;
}

/// Default codec backed by the `image` crate (JPEG and PNG)
///
/// Output keeps the input's format. Aspect ratio is preserved, so one side
/// of the result may be smaller than requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    fn load(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat)> {
        let format = image::guess_format(bytes)?;
        let img = image::load_from_memory_with_format(bytes, format)?;
        Ok((img, format))
    }
}

impl Codec for ImageCodec {
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        let (img, _) = Self::load(bytes)?;
        Ok((img.width(), img.height()))
    }

    fn transcode(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        if width == 0 || height == 0 {
            return Err(ImgfsError::Codec(format!(
                "target size {}x{} is empty",
                width, height
            )));
        }

        let (img, format) = Self::load(bytes)?;
        let resized = img.thumbnail(width, height);

        // JPEG has no alpha channel
        let resized = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            _ => resized,
        };

        let mut out = Cursor::new(Vec::new());
        resized.write_to(&mut out, format)?;
        tracing::trace!(
            "Transcoded {}x{} -> {}x{} ({} bytes)",
            img.width(),
            img.height(),
            resized.width(),
            resized.height(),
            out.get_ref().len()
        );
        Ok(out.into_inner())
    }
}
