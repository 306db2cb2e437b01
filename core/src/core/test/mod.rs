use camino::Utf8PathBuf as PathBuf;
use claims::assert_ok;
use diesel::connection::SimpleConnection;

use crate::{
    catalog::operation::push_image::Upload,
    core::{
        asset_manager::{AssetManager, StoreParams},
        storage::LocalFileStorage,
    },
    interact,
    model::repository::db::{self, DbPool},
    processing::image::{test::encode_test_image, ImageFormat},
};


pub const MAX_UPLOAD_SIZE: u64 = 1024 * 1024;

pub struct TestStore {
    _dir: tempfile::TempDir,
    pub root: PathBuf,
    pub pool: DbPool,
    pub manager: AssetManager,
}

impl TestStore {
    pub async fn new() -> TestStore {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let root = dir_path.join("images");
        std::fs::create_dir(&root).unwrap();
        let pool = assert_ok!(db::open_db_pool(dir_path.join("catalog.db").as_str()));
        let conn = assert_ok!(pool.get().await);
        assert_ok!(assert_ok!(interact!(conn, move |conn| db::migrate(conn)).await));
        let manager = AssetManager::new(
            pool.clone(),
            LocalFileStorage::new(root.clone()).into(),
            StoreParams {
                max_upload_size: MAX_UPLOAD_SIZE,
                base_url: "/static".to_owned(),
            },
        );
        TestStore {
            _dir: dir,
            root,
            pool,
            manager,
        }
    }

    /// Names of all files in the storage directory, sorted
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.root)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    pub async fn execute_sql(&self, sql: &'static str) {
        let conn = assert_ok!(self.pool.get().await);
        assert_ok!(assert_ok!(
            interact!(conn, move |conn| {
                conn.batch_execute(sql)?;
                Ok(())
            })
            .await
        ));
    }

    pub async fn num_rows(&self) -> usize {
        assert_ok!(self.manager.list().await).len()
    }
}

pub fn upload(format: ImageFormat, width: u32, height: u32) -> Upload {
    let contents = encode_test_image(format, width, height);
    Upload {
        declared_size: contents.len() as u64,
        filename: Some(format!("upload.{}", format.canonical_extension())),
        contents,
    }
}
