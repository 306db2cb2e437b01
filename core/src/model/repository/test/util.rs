use claims::assert_ok;

use crate::model::{repository, Asset, AssetId, CreateAsset, Size};

use super::db::DbConn;

pub fn create_asset(basename: &str, parent: Option<AssetId>, width: i32, height: i32) -> CreateAsset {
    CreateAsset {
        parent,
        basename: basename.to_owned(),
        uri: format!("/static/{}", basename),
        size: Size { width, height },
    }
}

/// Inserts and returns the asset with its assigned id
pub fn insert_test_asset(conn: &mut DbConn, create_asset: CreateAsset) -> Asset {
    let id = assert_ok!(repository::asset::insert_asset(conn, &create_asset));
    assert_ne!(id, AssetId(0));
    create_asset.with_id(id)
}
