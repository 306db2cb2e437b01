use diesel::{Insertable, Queryable, Selectable};
use eyre::eyre;

use crate::model::{Asset, AssetId, CreateAsset, Size};

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = super::super::schema::image)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbAsset {
    pub id: i64,
    pub parent: Option<i64>,
    pub basename: String,
    pub uri: String,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = super::super::schema::image)]
pub struct DbInsertAsset<'a> {
    pub parent: Option<i64>,
    pub basename: &'a str,
    pub uri: &'a str,
    pub width: i32,
    pub height: i32,
}

impl TryFrom<DbAsset> for Asset {
    type Error = eyre::Report;

    fn try_from(value: DbAsset) -> Result<Self, Self::Error> {
        if value.width <= 0 || value.height <= 0 {
            return Err(eyre!(
                "image {} has invalid dimensions {}x{}",
                value.id,
                value.width,
                value.height
            ));
        }
        Ok(Asset {
            id: AssetId(value.id),
            parent: value.parent.map(AssetId),
            basename: value.basename,
            uri: value.uri,
            size: Size {
                width: value.width,
                height: value.height,
            },
        })
    }
}

impl<'a> From<&'a CreateAsset> for DbInsertAsset<'a> {
    fn from(value: &'a CreateAsset) -> Self {
        DbInsertAsset {
            parent: value.parent.map(|id| id.0),
            basename: &value.basename,
            uri: &value.uri,
            width: value.size.width,
            height: value.size.height,
        }
    }
}
