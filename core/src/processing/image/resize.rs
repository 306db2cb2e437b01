use std::io::Cursor;

use eyre::{Context, Result};
use image::{ColorType, DynamicImage};
use tracing::instrument;

use crate::model::Size;

use super::{codec::size_from_dimensions, ImageFormat, Resampling};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    pub contents: Vec<u8>,
    pub size: Size,
}

/// Largest size with the aspect ratio of `source` that fits into `bounds`.
/// Never larger than `source`, never smaller than 1x1.
pub fn fit_dimensions(source: Size, bounds: Size) -> Size {
    let ratio_w = bounds.width as f64 / source.width as f64;
    let ratio_h = bounds.height as f64 / source.height as f64;
    let ratio = ratio_w.min(ratio_h).min(1.0);
    let scale = |len: i32, bound: i32| {
        ((len as f64 * ratio).round() as i32)
            .min(bound)
            .min(len)
            .max(1)
    };
    Size {
        width: scale(source.width, bounds.width),
        height: scale(source.height, bounds.height),
    }
}

/// Decodes `contents`, scales it to fit into `bounds` and encodes the result
/// in the same format. Runs on the rayon pool.
#[instrument(skip(contents), fields(len = contents.len()))]
pub async fn resize(
    contents: Vec<u8>,
    format: ImageFormat,
    bounds: Size,
    resampling: Resampling,
) -> Result<ResizedImage> {
    let (tx, rx) = tokio::sync::oneshot::channel::<Result<ResizedImage>>();
    rayon::spawn(move || {
        let res = resize_blocking(&contents, format, bounds, resampling);
        // receiver gone means the request was dropped
        let _ = tx.send(res);
    });
    rx.await
        .wrap_err("image resizing task was dropped")?
        .wrap_err("error resizing image")
}

fn resize_blocking(
    contents: &[u8],
    format: ImageFormat,
    bounds: Size,
    resampling: Resampling,
) -> Result<ResizedImage> {
    let img = image::load_from_memory_with_format(contents, format.into())
        .wrap_err("error decoding image")?;
    let source = size_from_dimensions(img.width(), img.height())?;
    let target = fit_dimensions(source, bounds);
    let resized = resampling.resize_exact(&img, target.width as u32, target.height as u32);
    let encodable = to_encodable(resized, img.color(), format);
    let mut out = Cursor::new(Vec::new());
    encodable
        .write_to(&mut out, format.into())
        .wrap_err_with(|| format!("error encoding {} image", format))?;
    Ok(ResizedImage {
        contents: out.into_inner(),
        size: size_from_dimensions(encodable.width(), encodable.height())?,
    })
}

/// Converts back to the source pixel layout, restricted to what the
/// encoder for `format` accepts.
fn to_encodable(img: DynamicImage, source_color: ColorType, format: ImageFormat) -> DynamicImage {
    match format {
        ImageFormat::Jpeg => match source_color {
            ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
                DynamicImage::ImageLuma8(img.to_luma8())
            }
            _ => DynamicImage::ImageRgb8(img.to_rgb8()),
        },
        ImageFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8()),
        ImageFormat::Png => match source_color {
            ColorType::L8 => DynamicImage::ImageLuma8(img.to_luma8()),
            ColorType::La8 => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
            ColorType::Rgb8 => DynamicImage::ImageRgb8(img.to_rgb8()),
            ColorType::L16 => DynamicImage::ImageLuma16(img.to_luma16()),
            ColorType::La16 => DynamicImage::ImageLumaA16(img.to_luma_alpha16()),
            ColorType::Rgb16 => DynamicImage::ImageRgb16(img.to_rgb16()),
            ColorType::Rgba16 => DynamicImage::ImageRgba16(img.to_rgba16()),
            _ => DynamicImage::ImageRgba8(img.to_rgba8()),
        },
    }
}

#[cfg(test)]
mod test {
    use claims::{assert_err, assert_ok};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    use super::super::{codec::inspect, test::encode_test_image};
    use super::*;

    fn size(width: i32, height: i32) -> Size {
        Size { width, height }
    }

    #[test]
    fn fit_examples() {
        assert_eq!(fit_dimensions(size(200, 100), size(100, 100)), size(100, 50));
        assert_eq!(fit_dimensions(size(100, 200), size(100, 100)), size(50, 100));
        assert_eq!(fit_dimensions(size(640, 480), size(320, 320)), size(320, 240));
        // never upscales
        assert_eq!(fit_dimensions(size(50, 40), size(100, 100)), size(50, 40));
        assert_eq!(fit_dimensions(size(1000, 1), size(28, 28)), size(28, 1));
    }

    proptest! {
        #[test]
        fn fit_stays_within_bounds_and_keeps_aspect(
            sw in 1..5000i32, sh in 1..5000i32, bw in 1..5000i32, bh in 1..5000i32
        ) {
            let fit = fit_dimensions(size(sw, sh), size(bw, bh));
            prop_assert!(fit.width >= 1 && fit.height >= 1);
            prop_assert!(fit.width <= bw.max(1) && fit.height <= bh.max(1));
            prop_assert!(fit.width <= sw && fit.height <= sh);
            // height implied by the fitted width is within rounding distance
            let expected_h = fit.width as f64 * sh as f64 / sw as f64;
            let expected_w = fit.height as f64 * sw as f64 / sh as f64;
            prop_assert!(
                (fit.height as f64 - expected_h).abs() <= 1.0
                    || (fit.width as f64 - expected_w).abs() <= 1.0
            );
        }
    }

    #[tokio::test]
    async fn resize_keeps_format_for_every_kernel() {
        for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Gif] {
            let contents = encode_test_image(format, 160, 90);
            for resampling in Resampling::iter() {
                let resized = assert_ok!(resize(contents.clone(), format, size(80, 80), resampling).await);
                assert_eq!(resized.size, size(80, 45), "{} {}", format, resampling);
                let info = assert_ok!(inspect(&resized.contents));
                assert_eq!(info.format, format);
                assert_eq!(info.size, resized.size);
            }
        }
    }

    #[tokio::test]
    async fn resize_keeps_grayscale_png() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_fn(64, 64, |x, _| {
            image::Luma([(x * 4) as u8])
        }));
        let mut contents = Cursor::new(Vec::new());
        img.write_to(&mut contents, image::ImageFormat::Png).unwrap();
        let resized = assert_ok!(
            resize(
                contents.into_inner(),
                ImageFormat::Png,
                size(32, 32),
                Resampling::MitchellNetravali
            )
            .await
        );
        let decoded = image::load_from_memory(&resized.contents).unwrap();
        assert_eq!(decoded.color(), ColorType::L8);
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[tokio::test]
    async fn resize_garbage_fails() {
        let _ = assert_err!(
            resize(b"garbage".to_vec(), ImageFormat::Png, size(10, 10), Resampling::Box).await
        );
    }
}
