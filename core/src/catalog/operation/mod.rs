use tracing::{instrument, warn, Instrument};

use crate::{
    core::storage::{Storage, StorageProvider},
    error::AssetError,
    interact,
    model::{
        repository::{self, db::DbPool},
        Asset, CreateAsset,
    },
};

pub mod delete_asset;
pub mod generate_preview;
pub mod push_image;

/// Writes `contents` under `create_asset.basename` and records the asset.
/// Runs as its own task, so dropping the returned future does not stop the
/// rollback after a failed insert or leave files without a catalog row.
#[instrument(skip(pool, storage, contents), fields(len = contents.len()), level = "debug")]
pub(crate) async fn persist(
    pool: &DbPool,
    storage: &Storage,
    create_asset: CreateAsset,
    contents: Vec<u8>,
) -> Result<Asset, AssetError> {
    let basename = create_asset.basename.clone();
    let pool = pool.clone();
    let storage = storage.clone();
    let task = tokio::spawn(
        async move {
            storage
                .write_with_shadow(&create_asset.basename, contents)
                .await
                .map_err(|err| AssetError::io("write", create_asset.basename.clone(), err))?;
            insert_or_roll_back(&pool, &storage, create_asset).await
        }
        .in_current_span(),
    );
    task.await
        .map_err(|err| AssetError::io("store", basename, eyre::Report::new(err)))?
}

/// Records an asset whose files are already in storage. If the row can't be
/// inserted the files are removed again, so storage never holds files
/// without a catalog row.
#[instrument(skip(pool, storage), level = "debug")]
async fn insert_or_roll_back(
    pool: &DbPool,
    storage: &Storage,
    create_asset: CreateAsset,
) -> Result<Asset, AssetError> {
    let basename = create_asset.basename.clone();
    let insert_result = async {
        let conn = pool.get().await?;
        let create = create_asset.clone();
        interact!(conn, move |conn| repository::asset::insert_asset(conn, &create)).await?
    }
    .await;
    match insert_result {
        Ok(id) => Ok(create_asset.with_id(id)),
        Err(err) => {
            warn!(%basename, "could not record asset, removing its files");
            storage.remove_with_shadow(&basename).await;
            Err(AssetError::io("insert", basename, err))
        }
    }
}
