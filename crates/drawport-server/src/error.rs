//! HTTP error mapping.

use std::io;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

use drawport::{DrawportError, OutputFormat};

/// Errors returned by request handlers.
///
/// Every variant renders as `{"detail": "<message>"}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or invalid bearer token")]
    Unauthorized,

    #[error("Unsupported output format '{0}'")]
    UnknownFormat(String),

    #[error("Missing form field 'file'")]
    MissingFile,

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("Expected a .drawio file, got '{0}'")]
    NotDrawio(String),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{format} conversion failed: {source}")]
    Conversion {
        format: OutputFormat,
        source: DrawportError,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] DrawportError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::UnknownFormat(_) => StatusCode::NOT_FOUND,
            ApiError::MissingFile | ApiError::EmptyUpload | ApiError::NotDrawio(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Multipart(err) => err.status(),
            ApiError::Conversion { source, .. } if source.is_input_error() => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conversion { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(); "{detail}");
        } else {
            warn!(status = status.as_u16(); "{detail}");
        }

        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// Errors that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("Server error: {0}")]
    Serve(#[from] io::Error),
}
