use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::Instrument;

use picstash_core::{catalog::operation::push_image::Upload, model};

use crate::{
    app_state::SharedState,
    http_error::{ApiResult, HttpError},
    schema::{ErrorBody, Image, ImageUpload, PreviewParams},
};

/// Name of the multipart field holding the uploaded image
const UPLOAD_FIELD: &str = "image";

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_images).post(post_image))
        .route("/:image_id", get(get_image).delete(delete_image))
        .route("/:image_id/preview", post(post_preview))
}

fn parse_image_id(image_id: &str) -> Result<model::AssetId, HttpError> {
    image_id
        .parse::<u64>()
        .ok()
        .and_then(|id| i64::try_from(id).ok())
        .map(model::AssetId)
        .ok_or_else(|| HttpError::BadRequest(format!("invalid image id '{}'", image_id)))
}

fn multipart_error(err: MultipartError) -> HttpError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HttpError::PayloadTooLarge
    } else {
        HttpError::BadRequest(err.body_text())
    }
}

#[tracing::instrument(name = "Upload image", skip(app_state, multipart))]
#[utoipa::path(post, path = "/api/v1/images",
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = Image),
        (status = BAD_REQUEST, body = ErrorBody, description = "Not an image or missing form field"),
        (status = PAYLOAD_TOO_LARGE, description = "Image exceeds the upload limit"),
    ),
)]
pub async fn post_image(
    State(app_state): State<SharedState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Image>> {
    let max_upload_size = app_state.manager.params().max_upload_size;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let contents = field.bytes().await.map_err(multipart_error)?;
        if contents.len() as u64 > max_upload_size {
            return Err(HttpError::PayloadTooLarge);
        }
        let upload = Upload {
            declared_size: contents.len() as u64,
            filename,
            contents: contents.to_vec(),
        };
        let asset = app_state.manager.push(upload).in_current_span().await?;
        return Ok(Json(asset.into()));
    }
    Err(HttpError::BadRequest(format!(
        "missing form field '{}'",
        UPLOAD_FIELD
    )))
}

#[tracing::instrument(name = "Generate preview", skip(app_state))]
#[utoipa::path(post, path = "/api/v1/images/{image_id}/preview",
    request_body = PreviewParams,
    responses(
        (status = 200, body = Image),
        (status = BAD_REQUEST, body = ErrorBody, description = "Invalid preview parameters"),
        (status = NOT_FOUND, body = ErrorBody, description = "Image not found"),
    ),
    params(
        ("image_id" = i64, Path, description = "Id of the original image")
    )
)]
pub async fn post_preview(
    Path(image_id): Path<String>,
    State(app_state): State<SharedState>,
    Json(params): Json<PreviewParams>,
) -> ApiResult<Json<Image>> {
    let parent = parse_image_id(&image_id)?;
    let preview = app_state
        .manager
        .generate_preview(parent, params.into())
        .in_current_span()
        .await?;
    Ok(Json(preview.into()))
}

#[tracing::instrument(name = "List images", skip(app_state), level = "debug")]
#[utoipa::path(get, path = "/api/v1/images",
    responses(
        (status = 200, body = [Image])
    ),
)]
pub async fn get_images(State(app_state): State<SharedState>) -> ApiResult<Json<Vec<Image>>> {
    let images: Vec<Image> = app_state
        .manager
        .list()
        .in_current_span()
        .await?
        .into_iter()
        .map(|a| a.into())
        .collect();
    Ok(Json(images))
}

#[tracing::instrument(name = "Get image", skip(app_state), level = "debug")]
#[utoipa::path(get, path = "/api/v1/images/{image_id}",
    responses(
        (status = 200, body = Image),
        (status = NOT_FOUND, body = ErrorBody, description = "Image not found")
    ),
    params(
        ("image_id" = i64, Path, description = "Image id")
    )
)]
pub async fn get_image(
    Path(image_id): Path<String>,
    State(app_state): State<SharedState>,
) -> ApiResult<Json<Image>> {
    let id = parse_image_id(&image_id)?;
    let asset = app_state.manager.get(id).in_current_span().await?;
    Ok(Json(asset.into()))
}

#[tracing::instrument(name = "Delete image", skip(app_state))]
#[utoipa::path(delete, path = "/api/v1/images/{image_id}",
    responses(
        (status = 200, description = "Image and its previews were deleted"),
        (status = NOT_FOUND, body = ErrorBody, description = "Image not found")
    ),
    params(
        ("image_id" = i64, Path, description = "Image id")
    )
)]
pub async fn delete_image(
    Path(image_id): Path<String>,
    State(app_state): State<SharedState>,
) -> ApiResult<StatusCode> {
    let id = parse_image_id(&image_id)?;
    app_state.manager.delete(id).in_current_span().await?;
    Ok(StatusCode::OK)
}
