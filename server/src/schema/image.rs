use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use picstash_core::{catalog::operation::generate_preview::PreviewRequest, model};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Image {
    pub id: i64,
    /// Id of the original this image is a preview of, null for originals
    pub parent: Option<i64>,
    pub basename: String,
    pub uri: String,
    pub width: i32,
    pub height: i32,
}

impl From<model::Asset> for Image {
    fn from(value: model::Asset) -> Self {
        Image {
            id: value.id.0,
            parent: value.parent.map(|p| p.0),
            basename: value.basename,
            uri: value.uri,
            width: value.size.width,
            height: value.size.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PreviewParams {
    pub width: i32,
    pub height: i32,
    /// One of lanczos, catmull, mitnet, linear, box, nearest
    pub resampling: String,
}

impl From<PreviewParams> for PreviewRequest {
    fn from(value: PreviewParams) -> Self {
        PreviewRequest {
            width: value.width,
            height: value.height,
            resampling: value.resampling,
        }
    }
}

#[derive(Debug, Clone, ToSchema)]
pub struct ImageUpload {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
