use serde::Serialize;

use super::AssetId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// A stored image: catalog record plus the `basename` and `basename.gz`
/// files in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    pub id: AssetId,
    /// None for original uploads, the source asset for previews
    pub parent: Option<AssetId>,
    pub basename: String,
    pub uri: String,
    pub size: Size,
}

impl Asset {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAsset {
    pub parent: Option<AssetId>,
    pub basename: String,
    pub uri: String,
    pub size: Size,
}

impl CreateAsset {
    pub fn with_id(self, id: AssetId) -> Asset {
        Asset {
            id,
            parent: self.parent,
            basename: self.basename,
            uri: self.uri,
            size: self.size,
        }
    }
}
