use std::str::FromStr;

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    catalog::storage_key,
    core::{
        asset_manager::StoreParams,
        storage::{Storage, StorageProvider},
    },
    error::AssetError,
    interact,
    model::{
        repository::{self, db::DbPool},
        Asset, AssetId, CreateAsset, Size,
    },
    processing::image::{self, ImageFormat, Resampling},
};

use super::persist;

/// Smallest width and height a preview may have
pub const MIN_PREVIEW_SIZE: i32 = 28;

/// Bounds and kernel for a new preview. The preview keeps the parent's
/// aspect ratio and fits into `width`x`height`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PreviewRequest {
    pub width: i32,
    pub height: i32,
    pub resampling: String,
}

#[instrument(skip(pool, storage, params))]
pub async fn generate_preview(
    pool: &DbPool,
    storage: &Storage,
    params: &StoreParams,
    parent_id: AssetId,
    request: PreviewRequest,
) -> Result<Asset, AssetError> {
    let resampling =
        Resampling::from_str(&request.resampling).map_err(|_| AssetError::UnsupportedResampling)?;
    if request.width < MIN_PREVIEW_SIZE || request.height < MIN_PREVIEW_SIZE {
        return Err(AssetError::IrrationalPreview);
    }
    let parent = get_parent(pool, parent_id).await?;
    let bounds = Size {
        width: request.width,
        height: request.height,
    };
    let fitted = check_geometry(&parent, bounds)?;

    let contents = storage
        .read(&parent.basename)
        .await
        .map_err(|err| AssetError::io("read", parent.basename.clone(), eyre::Report::new(err)))?;
    let format = parent_format(&parent, &contents)?;
    let resized = image::resize(contents, format, bounds, resampling)
        .await
        .map_err(|err| {
            warn!(parent = %parent.id, "error generating preview: {:#}", err);
            AssetError::PreviewGenerationFailed
        })?;
    if resized.size != fitted {
        warn!(parent = %parent.id, expected = ?fitted, actual = ?resized.size, "unexpected preview size");
    }

    let extension = camino::Utf8Path::new(&parent.basename)
        .extension()
        .map(str::to_owned)
        .unwrap_or_else(|| format.canonical_extension().to_owned());
    let basename = storage_key::unique_basename(&extension);
    let create_asset = CreateAsset {
        parent: Some(parent.id),
        uri: storage_key::public_uri(&params.base_url, &basename),
        basename,
        size: resized.size,
    };
    let asset = persist(pool, storage, create_asset, resized.contents).await?;
    info!(id = %asset.id, parent = %parent.id, %resampling, "stored preview");
    Ok(asset)
}

async fn get_parent(pool: &DbPool, parent_id: AssetId) -> Result<Asset, AssetError> {
    let lookup = async {
        let conn = pool.get().await?;
        interact!(conn, move |conn| repository::asset::get_asset(conn, parent_id)).await?
    }
    .await;
    lookup
        .map_err(|err| AssetError::io("query", parent_id.to_string(), err))?
        .ok_or(AssetError::ImageNotFound)
}

/// Validates the requested bounds against the parent and returns the
/// size the preview will have.
fn check_geometry(parent: &Asset, bounds: Size) -> Result<Size, AssetError> {
    if !parent.is_root() {
        return Err(AssetError::IrrationalPreview);
    }
    if bounds.width > parent.size.width || bounds.height > parent.size.height {
        return Err(AssetError::IrrationalPreview);
    }
    let fitted = image::fit_dimensions(parent.size, bounds);
    if fitted.width < MIN_PREVIEW_SIZE || fitted.height < MIN_PREVIEW_SIZE {
        return Err(AssetError::IrrationalPreview);
    }
    Ok(fitted)
}

fn parent_format(parent: &Asset, contents: &[u8]) -> Result<ImageFormat, AssetError> {
    match image::inspect(contents) {
        Ok(info) => Ok(info.format),
        Err(err) => {
            warn!(parent = %parent.id, "stored image can not be read: {:#}", err);
            Err(AssetError::PreviewGenerationFailed)
        }
    }
}
