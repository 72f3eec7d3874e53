//! Request handlers.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use log::{debug, info};

use drawport::{OutputFormat, workdir::WorkDir};

use crate::{AppState, error::ApiError};

/// Form field holding the uploaded diagram.
pub const UPLOAD_FIELD: &str = "file";

pub async fn health() -> &'static str {
    "OK"
}

/// `POST /convert/{format}` with a multipart `file` field.
pub async fn convert(
    State(state): State<AppState>,
    Path(format): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let format: OutputFormat = format.parse().map_err(|_| ApiError::UnknownFormat(format))?;
    state.authorize(&headers)?;

    let (file_name, bytes) = read_upload(multipart).await?;
    info!(file_name = file_name, size = bytes.len(), format:% = format; "Received upload");

    let workdir = WorkDir::new()?;
    let input = workdir.store_upload(&file_name, &bytes)?;
    let output = workdir.output_for(&input, format.extension());

    let written = state
        .converter
        .convert(&input, format, &output)
        .await
        .map_err(|source| ApiError::Conversion { format, source })?;

    let body = tokio::fs::read(&written)
        .await
        .map_err(|err| ApiError::Internal(err.into()))?;
    info!(format:% = format, size = body.len(); "Conversion succeeded");

    let download_name = download_name(&file_name, format);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{download_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.mime_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Pull the `file` field out of the form, validating its name and content.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!(field:? = field.name(); "Ignoring form field");
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.to_ascii_lowercase().ends_with(".drawio") {
            return Err(ApiError::NotDrawio(file_name));
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::EmptyUpload);
        }
        return Ok((file_name, bytes));
    }

    Err(ApiError::MissingFile)
}

/// `<stem>.<ext>` for the client's file name, safe to put in a header.
fn download_name(file_name: &str, format: OutputFormat) -> String {
    let sanitized = drawport::workdir::sanitize_file_name(file_name);
    let stem = match sanitized.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => "diagram",
    };
    format!("{stem}.{}", format.extension())
}
