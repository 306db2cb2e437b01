use claims::{assert_err, assert_none, assert_ok, assert_some};
use diesel::connection::SimpleConnection;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::model::{repository, Asset, AssetId};

use super::proptest_arb::arb_create_asset;
use super::util::{create_asset, insert_test_asset};
use super::*;

#[test]
fn prop_insert_retrieve_asset() {
    proptest!(|(create in arb_create_asset(None))| {
        let mut conn = db::open_in_memory_and_migrate();
        let insert_result = repository::asset::insert_asset(&mut conn, &create);
        prop_assert!(insert_result.is_ok(), "insert failed: {:?}", insert_result.unwrap_err());
        let id = insert_result.unwrap();
        let retrieved = repository::asset::get_asset(&mut conn, id);
        prop_assert!(retrieved.is_ok(), "retrieve failed: {:?}", retrieved.unwrap_err());
        let expected = Asset {
            id,
            parent: None,
            basename: create.basename,
            uri: create.uri,
            size: create.size,
        };
        prop_assert_eq!(Some(expected), retrieved.unwrap());
    });
}

#[test]
fn get_missing_asset_returns_none() {
    let mut conn = db::open_in_memory_and_migrate();
    let retrieved = assert_ok!(repository::asset::get_asset(&mut conn, AssetId(42)));
    assert_none!(retrieved);
}

#[test]
fn get_assets_on_empty_catalog_is_empty() {
    let mut conn = db::open_in_memory_and_migrate();
    let assets = assert_ok!(repository::asset::get_assets(&mut conn));
    assert!(assets.is_empty());
}

#[test]
fn get_assets_in_insertion_order() {
    let mut conn = db::open_in_memory_and_migrate();
    let a = insert_test_asset(&mut conn, create_asset("a.png", None, 100, 80));
    let b = insert_test_asset(&mut conn, create_asset("b.gif", None, 30, 30));
    let c = insert_test_asset(&mut conn, create_asset("c.png", Some(a.id), 50, 40));
    let assets = assert_ok!(repository::asset::get_assets(&mut conn));
    assert_eq!(assets, vec![a, b, c]);
    let again = assert_ok!(repository::asset::get_assets(&mut conn));
    assert_eq!(assets, again);
}

#[test]
fn inserting_with_non_unique_uri_fails() {
    let mut conn = db::open_in_memory_and_migrate();
    insert_test_asset(&mut conn, create_asset("dup.png", None, 10, 10));
    let _ = assert_err!(repository::asset::insert_asset(
        &mut conn,
        &create_asset("dup.png", None, 20, 20)
    ));
    let assets = assert_ok!(repository::asset::get_assets(&mut conn));
    assert_eq!(assets.len(), 1);
}

#[test]
fn inserting_preview_of_missing_parent_fails() {
    let mut conn = db::open_in_memory_and_migrate();
    let _ = assert_err!(repository::asset::insert_asset(
        &mut conn,
        &create_asset("orphan.png", Some(AssetId(7)), 30, 30)
    ));
}

#[test]
fn inserting_non_positive_dimensions_fails() {
    let mut conn = db::open_in_memory_and_migrate();
    let _ = assert_err!(repository::asset::insert_asset(
        &mut conn,
        &create_asset("empty.png", None, 0, 10)
    ));
}

#[test]
fn get_children_of_root() {
    let mut conn = db::open_in_memory_and_migrate();
    let root = insert_test_asset(&mut conn, create_asset("root.jpg", None, 640, 480));
    let other_root = insert_test_asset(&mut conn, create_asset("other.jpg", None, 640, 480));
    let p1 = insert_test_asset(&mut conn, create_asset("p1.jpg", Some(root.id), 320, 240));
    let _other_preview =
        insert_test_asset(&mut conn, create_asset("p2.jpg", Some(other_root.id), 64, 48));
    let p3 = insert_test_asset(&mut conn, create_asset("p3.jpg", Some(root.id), 64, 48));
    let children = assert_ok!(repository::asset::get_children(&mut conn, root.id));
    assert_eq!(children, vec![p1, p3]);
    let of_preview = assert_ok!(repository::asset::get_children(&mut conn, children[1].id));
    assert!(of_preview.is_empty());
}

#[test]
fn delete_root_cascades_to_previews() {
    let mut conn = db::open_in_memory_and_migrate();
    let root = insert_test_asset(&mut conn, create_asset("root.png", None, 200, 100));
    let keep = insert_test_asset(&mut conn, create_asset("keep.png", None, 200, 100));
    let p1 = insert_test_asset(&mut conn, create_asset("p1.png", Some(root.id), 100, 50));
    let p2 = insert_test_asset(&mut conn, create_asset("p2.png", Some(root.id), 56, 28));
    let deleted = assert_some!(assert_ok!(repository::asset::delete_asset_cascade(
        &mut conn, root.id
    )));
    assert_eq!(deleted.asset, root);
    assert_eq!(deleted.children, vec![p1.clone(), p2.clone()]);
    let removed: Vec<Asset> = deleted.into_removed().collect();
    assert_eq!(removed, vec![p1, p2, root]);
    let remaining = assert_ok!(repository::asset::get_assets(&mut conn));
    assert_eq!(remaining, vec![keep]);
}

#[test]
fn delete_preview_keeps_parent() {
    let mut conn = db::open_in_memory_and_migrate();
    let root = insert_test_asset(&mut conn, create_asset("root.png", None, 200, 100));
    let preview = insert_test_asset(&mut conn, create_asset("p.png", Some(root.id), 100, 50));
    let deleted = assert_some!(assert_ok!(repository::asset::delete_asset_cascade(
        &mut conn, preview.id
    )));
    assert_eq!(deleted.asset, preview);
    assert!(deleted.children.is_empty());
    let remaining = assert_ok!(repository::asset::get_assets(&mut conn));
    assert_eq!(remaining, vec![root]);
}

#[test]
fn delete_twice_returns_none_second_time() {
    let mut conn = db::open_in_memory_and_migrate();
    let root = insert_test_asset(&mut conn, create_asset("root.png", None, 200, 100));
    let _ = assert_some!(assert_ok!(repository::asset::delete_asset_cascade(
        &mut conn, root.id
    )));
    let second = assert_ok!(repository::asset::delete_asset_cascade(&mut conn, root.id));
    assert_none!(second);
}

#[test]
fn failed_delete_leaves_rows_untouched() {
    let mut conn = db::open_in_memory_and_migrate();
    let root = insert_test_asset(&mut conn, create_asset("root.png", None, 200, 100));
    let preview = insert_test_asset(&mut conn, create_asset("p.png", Some(root.id), 100, 50));
    assert_ok!(conn.batch_execute(
        r#"
CREATE TRIGGER reject_delete BEFORE DELETE ON image
BEGIN
    SELECT RAISE(ABORT, 'deletes rejected');
END;
    "#
    ));
    let _ = assert_err!(repository::asset::delete_asset_cascade(&mut conn, root.id));
    let remaining = assert_ok!(repository::asset::get_assets(&mut conn));
    assert_eq!(remaining, vec![root, preview]);
}
