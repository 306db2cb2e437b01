/// Coarse classification of [`AssetError`], used by callers to decide how to
/// report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request itself is unacceptable. Nothing was written.
    Validation,
    /// The referenced asset does not exist.
    NotFound,
    /// The source image was accepted but could not be transformed.
    Processing,
    /// Filesystem or catalog failure.
    Infrastructure,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("malformed image")]
    MalformedImage,
    #[error("image is too big")]
    ImageIsTooBig,
    #[error("irrational preview")]
    IrrationalPreview,
    #[error("unsupported resampling")]
    UnsupportedResampling,
    #[error("preview generation failed")]
    PreviewGenerationFailed,
    #[error("image not found")]
    ImageNotFound,
    #[error("{operation} {target}: {source:#}")]
    Io {
        operation: &'static str,
        target: String,
        #[source]
        source: eyre::Report,
    },
}

impl AssetError {
    pub fn io(
        operation: &'static str,
        target: impl Into<String>,
        source: impl Into<eyre::Report>,
    ) -> Self {
        AssetError::Io {
            operation,
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AssetError::MalformedImage
            | AssetError::ImageIsTooBig
            | AssetError::IrrationalPreview
            | AssetError::UnsupportedResampling => ErrorKind::Validation,
            AssetError::ImageNotFound => ErrorKind::NotFound,
            AssetError::PreviewGenerationFailed => ErrorKind::Processing,
            AssetError::Io { .. } => ErrorKind::Infrastructure,
        }
    }
}
