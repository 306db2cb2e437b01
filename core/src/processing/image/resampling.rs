use image::{imageops::FilterType, DynamicImage};

use super::mitchell;

/// Resampling kernels available for previews. Parsed from and displayed as
/// the names used in preview requests.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum Resampling {
    #[strum(serialize = "lanczos")]
    Lanczos,
    #[strum(serialize = "catmull")]
    CatmullRom,
    #[strum(serialize = "mitnet")]
    MitchellNetravali,
    #[strum(serialize = "linear")]
    Linear,
    #[strum(serialize = "box")]
    Box,
    #[strum(serialize = "nearest")]
    Nearest,
}

impl Resampling {
    /// Scales `img` to exactly `width`x`height`.
    pub(super) fn resize_exact(self, img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        match self {
            Resampling::Lanczos => img.resize_exact(width, height, FilterType::Lanczos3),
            Resampling::CatmullRom => img.resize_exact(width, height, FilterType::CatmullRom),
            Resampling::Linear => img.resize_exact(width, height, FilterType::Triangle),
            Resampling::Nearest => img.resize_exact(width, height, FilterType::Nearest),
            // area averaging: every source pixel contributes to one target pixel
            Resampling::Box => img.thumbnail_exact(width, height),
            Resampling::MitchellNetravali => mitchell::resize_exact(img, width, height),
        }
    }
}
