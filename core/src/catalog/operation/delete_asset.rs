use tracing::{info, instrument, Instrument};

use crate::{
    core::storage::{Storage, StorageProvider},
    error::AssetError,
    interact,
    model::{
        repository::{self, db::DbPool},
        AssetId,
    },
};

/// Removes an asset, and for root assets all of its previews, from the
/// catalog and then from storage. Files are only touched once the catalog
/// rows are gone. Runs as its own task so the files of deleted rows are
/// removed even if the returned future is dropped.
#[instrument(skip(pool, storage))]
pub async fn delete_asset(pool: &DbPool, storage: &Storage, id: AssetId) -> Result<(), AssetError> {
    let pool = pool.clone();
    let storage = storage.clone();
    let task = tokio::spawn(
        async move {
            let delete_result = async {
                let conn = pool.get().await?;
                interact!(conn, move |conn| repository::asset::delete_asset_cascade(conn, id))
                    .await?
            }
            .await;
            let deleted = delete_result
                .map_err(|err| AssetError::io("delete", id.to_string(), err))?
                .ok_or(AssetError::ImageNotFound)?;
            let num_previews = deleted.children.len();
            for asset in deleted.into_removed() {
                storage.remove_with_shadow(&asset.basename).await;
            }
            info!(%id, num_previews, "deleted image");
            Ok(())
        }
        .in_current_span(),
    );
    task.await
        .map_err(|err| AssetError::io("delete", id.to_string(), eyre::Report::new(err)))?
}
