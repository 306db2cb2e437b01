use diesel::prelude::*;
use eyre::{eyre, Context, Result};
use tracing::instrument;

use crate::model::{Asset, AssetId, CreateAsset};

use super::db::DbConn;
use super::db_entity::{DbAsset, DbInsertAsset};
use super::schema;

/// Rows removed by [`delete_asset_cascade`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeDeleted {
    pub asset: Asset,
    /// Previews removed along with a root asset, in id order.
    /// Always empty when `asset` is itself a preview.
    pub children: Vec<Asset>,
}

impl CascadeDeleted {
    /// Children first, the deleted asset last.
    pub fn into_removed(self) -> impl Iterator<Item = Asset> {
        self.children.into_iter().chain(std::iter::once(self.asset))
    }
}

#[instrument(skip(conn), level = "trace")]
pub fn insert_asset(conn: &mut DbConn, create_asset: &CreateAsset) -> Result<AssetId> {
    use schema::image;
    let id: i64 = diesel::insert_into(image::table)
        .values(DbInsertAsset::from(create_asset))
        .returning(image::id)
        .get_result(conn)
        .wrap_err("could not insert into table image")?;
    Ok(AssetId(id))
}

#[instrument(skip(conn), level = "trace")]
pub fn get_asset(conn: &mut DbConn, id: AssetId) -> Result<Option<Asset>> {
    use schema::image;
    let db_asset: Option<DbAsset> = image::table
        .find(id.0)
        .select(DbAsset::as_select())
        .first(conn)
        .optional()
        .wrap_err("could not query single row from table image")?;
    db_asset.map(|a| a.try_into()).transpose()
}

#[instrument(skip(conn), level = "trace")]
pub fn get_assets(conn: &mut DbConn) -> Result<Vec<Asset>> {
    use schema::image;
    let db_assets: Vec<DbAsset> = image::table
        .select(DbAsset::as_select())
        .order_by(image::id.asc())
        .load(conn)
        .wrap_err("could not query table image")?;
    db_assets
        .into_iter()
        .map(|a| a.try_into())
        .collect::<Result<Vec<_>>>()
}

#[instrument(skip(conn), level = "trace")]
pub fn get_children(conn: &mut DbConn, parent_id: AssetId) -> Result<Vec<Asset>> {
    use schema::image;
    let db_assets: Vec<DbAsset> = image::table
        .filter(image::parent.eq(parent_id.0))
        .select(DbAsset::as_select())
        .order_by(image::id.asc())
        .load(conn)
        .wrap_err("could not query children from table image")?;
    db_assets
        .into_iter()
        .map(|a| a.try_into())
        .collect::<Result<Vec<_>>>()
}

/// Deletes an asset and, for root assets, all of its previews in one
/// transaction. Returns `None` if no asset with this id exists.
///
/// The previews are removed by the `ON DELETE CASCADE` foreign key; they are
/// loaded inside the same transaction so the caller learns exactly which rows
/// went away and can remove their files.
#[instrument(skip(conn), level = "debug")]
pub fn delete_asset_cascade(conn: &mut DbConn, id: AssetId) -> Result<Option<CascadeDeleted>> {
    use schema::image;
    conn.immediate_transaction(|conn| {
        let asset = match get_asset(conn, id)? {
            Some(asset) => asset,
            None => return Ok(None),
        };
        let children = if asset.is_root() {
            get_children(conn, id)?
        } else {
            Vec::new()
        };
        let num_deleted = diesel::delete(image::table.find(id.0)).execute(conn)?;
        if num_deleted != 1 {
            return Err(eyre!(
                "expected to delete exactly one row from table image, deleted {}",
                num_deleted
            ));
        }
        Ok::<_, eyre::Report>(Some(CascadeDeleted { asset, children }))
    })
    .wrap_err("error deleting from table image")
}
