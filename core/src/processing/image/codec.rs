use std::io::Cursor;

use eyre::{eyre, Context, Result};
use image::{codecs::gif::GifDecoder, AnimationDecoder, ImageDecoder, Limits};

use crate::model::Size;

use super::ImageFormat;

/// Largest accepted width or height
const MAX_DIMENSION: u32 = 65_535;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub size: Size,
    pub format: ImageFormat,
}

/// Determines format and dimensions from the image header. Images that
/// would not fit into the decoding limits are rejected here, and GIFs must
/// also have a readable first frame.
#[tracing::instrument(skip(contents), fields(len = contents.len()), level = "debug")]
pub fn inspect(contents: &[u8]) -> Result<ImageInfo> {
    let limits = decode_limits();
    let max_alloc = limits.max_alloc;
    let mut reader = image::ImageReader::new(Cursor::new(contents))
        .with_guessed_format()
        .wrap_err("error reading image header")?;
    reader.limits(limits);
    let format: ImageFormat = reader
        .format()
        .ok_or_else(|| eyre!("unknown image format"))?
        .try_into()?;
    let decoder = reader
        .into_decoder()
        .wrap_err("error reading image header")?;
    let (width, height) = decoder.dimensions();
    if let Some(max_alloc) = max_alloc {
        if decoder.total_bytes() > max_alloc {
            return Err(eyre!(
                "decoding {}x{} image needs {} bytes, limit is {}",
                width,
                height,
                decoder.total_bytes(),
                max_alloc
            ));
        }
    }
    if format == ImageFormat::Gif {
        check_first_gif_frame(contents)?;
    }
    Ok(ImageInfo {
        size: size_from_dimensions(width, height)?,
        format,
    })
}

fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DIMENSION);
    limits.max_image_height = Some(MAX_DIMENSION);
    limits
}

/// The GIF header only holds the logical screen size, so any six byte
/// signature plus seven bytes passes as a header. Decoding the first frame
/// catches everything that is not actually a GIF.
fn check_first_gif_frame(contents: &[u8]) -> Result<()> {
    let mut decoder = GifDecoder::new(Cursor::new(contents)).wrap_err("error reading GIF header")?;
    decoder
        .set_limits(decode_limits())
        .wrap_err("GIF exceeds decoding limits")?;
    decoder
        .into_frames()
        .next()
        .ok_or_else(|| eyre!("GIF has no frames"))?
        .wrap_err("error decoding first GIF frame")?;
    Ok(())
}

pub(super) fn size_from_dimensions(width: u32, height: u32) -> Result<Size> {
    if width == 0 || height == 0 {
        return Err(eyre!("image has zero area ({}x{})", width, height));
    }
    Ok(Size {
        width: i32::try_from(width).wrap_err("image too wide")?,
        height: i32::try_from(height).wrap_err("image too high")?,
    })
}
