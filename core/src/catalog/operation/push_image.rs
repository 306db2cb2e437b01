use tracing::{info, instrument};

use crate::{
    catalog::storage_key,
    core::{asset_manager::StoreParams, storage::Storage},
    error::AssetError,
    model::{repository::db::DbPool, Asset, CreateAsset},
    processing::image::{self, ImageFormat},
};

use super::persist;

/// An uploaded original.
#[derive(Clone)]
pub struct Upload {
    pub contents: Vec<u8>,
    /// Filename sent by the client, only used to pick the extension
    pub filename: Option<String>,
    /// Size announced by the client
    pub declared_size: u64,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("len", &self.contents.len())
            .field("filename", &self.filename)
            .field("declared_size", &self.declared_size)
            .finish()
    }
}

#[instrument(skip(pool, storage, params))]
pub async fn push_image(
    pool: &DbPool,
    storage: &Storage,
    params: &StoreParams,
    upload: Upload,
) -> Result<Asset, AssetError> {
    let size = upload.declared_size.max(upload.contents.len() as u64);
    if size > params.max_upload_size {
        return Err(AssetError::ImageIsTooBig);
    }
    let info = image::inspect(&upload.contents).map_err(|err| {
        tracing::debug!(%err, "rejecting upload");
        AssetError::MalformedImage
    })?;
    let extension = upload_extension(upload.filename.as_deref(), info.format);
    let basename = storage_key::unique_basename(&extension);
    let create_asset = CreateAsset {
        parent: None,
        uri: storage_key::public_uri(&params.base_url, &basename),
        basename,
        size: info.size,
    };
    let asset = persist(pool, storage, create_asset, upload.contents).await?;
    info!(id = %asset.id, basename = %asset.basename, "stored image");
    Ok(asset)
}

/// The extension of `filename` if it names `format`, otherwise the
/// canonical extension of `format`.
fn upload_extension(filename: Option<&str>, format: ImageFormat) -> String {
    filename
        .and_then(|name| camino::Utf8Path::new(name).extension())
        .filter(|ext| ImageFormat::from_extension(ext) == Some(format))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| format.canonical_extension().to_owned())
}
