use eyre::{eyre, Result};

/// Encodings accepted for uploads. Previews are always stored in the
/// format of their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    /// Extension used when an upload's filename doesn't name its format
    pub fn canonical_extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn from_extension(ext: &str) -> Option<ImageFormat> {
        image::ImageFormat::from_extension(ext).and_then(|f| f.try_into().ok())
    }
}

impl TryFrom<image::ImageFormat> for ImageFormat {
    type Error = eyre::Report;

    fn try_from(value: image::ImageFormat) -> Result<Self> {
        match value {
            image::ImageFormat::Jpeg => Ok(ImageFormat::Jpeg),
            image::ImageFormat::Png => Ok(ImageFormat::Png),
            image::ImageFormat::Gif => Ok(ImageFormat::Gif),
            other => Err(eyre!("unsupported image format {:?}", other)),
        }
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(value: ImageFormat) -> Self {
        match value {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Gif => image::ImageFormat::Gif,
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn formats_from_extensions() {
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("gif"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_extension("webp"), None);
        assert_eq!(ImageFormat::from_extension(""), None);
        assert_eq!(ImageFormat::Jpeg.to_string(), "jpeg");
    }
}
