//! Separable Mitchell-Netravali resampling (B = C = 1/3), which the `image`
//! crate's filter set lacks.

use image::{DynamicImage, Rgba32FImage};

const B: f32 = 1.0 / 3.0;
const C: f32 = 1.0 / 3.0;
const SUPPORT: f32 = 2.0;

fn kernel(x: f32) -> f32 {
    let x = x.abs();
    if x < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * x.powi(3)
            + (-18.0 + 12.0 * B + 6.0 * C) * x.powi(2)
            + (6.0 - 2.0 * B))
            / 6.0
    } else if x < 2.0 {
        ((-B - 6.0 * C) * x.powi(3)
            + (6.0 * B + 30.0 * C) * x.powi(2)
            + (-12.0 * B - 48.0 * C) * x
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

/// For every destination index: first contributing source index and the
/// normalized weights of the contributing source pixels.
fn contributions(src_len: u32, dst_len: u32) -> Vec<(usize, Vec<f32>)> {
    let scale = src_len as f32 / dst_len as f32;
    // widen the kernel when downscaling so every source pixel contributes
    let filter_scale = scale.max(1.0);
    let support = SUPPORT * filter_scale;
    (0..dst_len)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale;
            let left = ((center - support).floor().max(0.0)) as usize;
            let right = ((center + support).ceil() as usize).min(src_len as usize);
            let mut weights: Vec<f32> = (left..right)
                .map(|j| kernel((j as f32 + 0.5 - center) / filter_scale))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum != 0.0 {
                weights.iter_mut().for_each(|w| *w /= sum);
            }
            (left, weights)
        })
        .collect()
}

fn resample_horizontal(src: &Rgba32FImage, width: u32) -> Rgba32FImage {
    let contribs = contributions(src.width(), width);
    Rgba32FImage::from_fn(width, src.height(), |x, y| {
        let (left, weights) = &contribs[x as usize];
        let mut acc = [0f32; 4];
        for (k, w) in weights.iter().enumerate() {
            let px = src.get_pixel((left + k) as u32, y);
            acc.iter_mut().zip(px.0).for_each(|(a, c)| *a += c * w);
        }
        image::Rgba(acc)
    })
}

fn resample_vertical(src: &Rgba32FImage, height: u32) -> Rgba32FImage {
    let contribs = contributions(src.height(), height);
    Rgba32FImage::from_fn(src.width(), height, |x, y| {
        let (top, weights) = &contribs[y as usize];
        let mut acc = [0f32; 4];
        for (k, w) in weights.iter().enumerate() {
            let px = src.get_pixel(x, (top + k) as u32);
            acc.iter_mut().zip(px.0).for_each(|(a, c)| *a += c * w);
        }
        image::Rgba(acc)
    })
}

pub fn resize_exact(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let src = img.to_rgba32f();
    let horizontal = resample_horizontal(&src, width);
    let mut out = resample_vertical(&horizontal, height);
    // negative lobes overshoot near edges
    out.pixels_mut()
        .for_each(|px| px.0.iter_mut().for_each(|c| *c = c.clamp(0.0, 1.0)));
    DynamicImage::ImageRgba32F(out)
}
