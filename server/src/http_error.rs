use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use eyre;
use picstash_core::{AssetError, ErrorKind};
use tracing::error;

use crate::schema::ErrorBody;

#[derive(Debug)]
pub enum HttpError {
    Asset(AssetError),
    BadRequest(String),
    PayloadTooLarge,
    Internal(eyre::Error),
}

// Tell axum how to convert `HttpError` into a response.
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::Asset(err) => match err.kind() {
                ErrorKind::Infrastructure => {
                    error!("{:#}", err);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
                ErrorKind::NotFound => error_body(StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::Validation | ErrorKind::Processing => {
                    error_body(StatusCode::BAD_REQUEST, err.to_string())
                }
            },
            HttpError::BadRequest(message) => error_body(StatusCode::BAD_REQUEST, message),
            HttpError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE.into_response(),
            HttpError::Internal(report) => {
                error!("{:#}", report);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn error_body(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

impl From<AssetError> for HttpError {
    fn from(err: AssetError) -> Self {
        Self::Asset(err)
    }
}

macro_rules! impl_from {
    ($from:ty) => {
        impl From<$from> for HttpError {
            fn from(err: $from) -> Self {
                Self::Internal(err.into())
            }
        }
    };
}

impl_from!(std::io::Error);
impl_from!(color_eyre::Report);

pub type ApiResult<T> = Result<T, HttpError>;

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::Asset(err) => write!(f, "{}", err),
            HttpError::BadRequest(message) => write!(f, "bad request: {}", message),
            HttpError::PayloadTooLarge => write!(f, "payload too large"),
            HttpError::Internal(report) => write!(f, "{}", report),
        }
    }
}
