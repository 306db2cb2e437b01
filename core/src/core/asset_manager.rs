use std::sync::Arc;

use tracing::instrument;

use crate::{
    catalog::operation::{
        delete_asset::delete_asset,
        generate_preview::{generate_preview, PreviewRequest},
        push_image::{push_image, Upload},
    },
    error::AssetError,
    interact,
    model::{
        repository::{self, db::DbPool},
        Asset, AssetId,
    },
};

use super::storage::Storage;

/// Limits and naming used when storing new assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreParams {
    /// Uploads larger than this many bytes are rejected
    pub max_upload_size: u64,
    /// Prefix of every asset's public `uri`
    pub base_url: String,
}

/// Entry point for everything that creates, reads or removes assets.
/// Keeps the catalog and the files in storage in agreement.
#[derive(Debug, Clone)]
pub struct AssetManager {
    pool: DbPool,
    storage: Storage,
    params: Arc<StoreParams>,
}

impl AssetManager {
    pub fn new(pool: DbPool, storage: Storage, params: StoreParams) -> AssetManager {
        AssetManager {
            pool,
            storage,
            params: Arc::new(params),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn params(&self) -> &StoreParams {
        &self.params
    }

    /// Stores a new original image
    pub async fn push(&self, upload: Upload) -> Result<Asset, AssetError> {
        push_image(&self.pool, &self.storage, &self.params, upload).await
    }

    /// Stores a downscaled copy of the root asset `parent`
    pub async fn generate_preview(
        &self,
        parent: AssetId,
        request: PreviewRequest,
    ) -> Result<Asset, AssetError> {
        generate_preview(&self.pool, &self.storage, &self.params, parent, request).await
    }

    /// All assets, originals and previews, in creation order
    #[instrument(skip(self), level = "debug")]
    pub async fn list(&self) -> Result<Vec<Asset>, AssetError> {
        let result = async {
            let conn = self.pool.get().await?;
            interact!(conn, move |conn| repository::asset::get_assets(conn)).await?
        }
        .await;
        result.map_err(|err| AssetError::io("list", "catalog", err))
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, id: AssetId) -> Result<Asset, AssetError> {
        let result = async {
            let conn = self.pool.get().await?;
            interact!(conn, move |conn| repository::asset::get_asset(conn, id)).await?
        }
        .await;
        result
            .map_err(|err| AssetError::io("query", id.to_string(), err))?
            .ok_or(AssetError::ImageNotFound)
    }

    /// Removes an asset and, if it is an original, all of its previews
    pub async fn delete(&self, id: AssetId) -> Result<(), AssetError> {
        delete_asset(&self.pool, &self.storage, id).await
    }
}
