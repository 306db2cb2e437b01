use axum::{extract::DefaultBodyLimit, Router};
use camino::Utf8PathBuf as PathBuf;
use tower_http::services::ServeDir;
use tracing::info;

use crate::app_state::SharedState;

pub mod image;

/// Room for multipart boundaries and headers on top of the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// API routes plus the stored files, served from `images_dir` under the
/// configured base url with their gzip shadows as precompressed variants.
pub fn app(state: SharedState, images_dir: PathBuf) -> Router {
    let params = state.manager.params();
    let body_limit = usize::try_from(params.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);
    let static_route = static_files_route(&params.base_url);
    let router = Router::new()
        .nest(
            "/api/v1/images",
            image::router().layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state);
    let static_files = ServeDir::new(images_dir).precompressed_gzip();
    match static_route.as_deref() {
        Some("/") => router.fallback_service(static_files),
        Some(route) => router.nest_service(route, static_files),
        None => {
            info!("base url is not a local path, not serving image files");
            router
        }
    }
}

/// Local path to serve files under, or None if `base_url` points elsewhere
fn static_files_route(base_url: &str) -> Option<String> {
    if base_url.contains("://") || base_url.starts_with("//") {
        return None;
    }
    let trimmed = base_url.trim_matches('/');
    if trimmed.is_empty() {
        Some("/".to_owned())
    } else {
        Some(format!("/{}", trimmed))
    }
}
