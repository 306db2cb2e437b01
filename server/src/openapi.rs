use utoipa::OpenApi;

use crate::{routes::image, schema};

#[derive(OpenApi)]
#[openapi(
    paths(
        image::post_image,
        image::post_preview,
        image::get_images,
        image::get_image,
        image::delete_image,
    ),
    components(schemas(
        schema::Image,
        schema::PreviewParams,
        schema::ImageUpload,
        schema::ErrorBody
    )),
    tags((name = "picstash"))
)]
pub struct ApiDoc;
