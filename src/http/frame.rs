//! Frame extraction from upload requests.
//!
//! Two encodings are accepted: a `multipart/form-data` body with an
//! `image` file field, or a JSON body `{"image": "data:image/jpeg;base64,..."}`.

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;

use crate::util::strip_data_url;
use crate::{AppError, Result};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
struct JsonFrame {
    #[serde(default)]
    image: Option<String>,
}

/// Pull raw image bytes out of an upload request.
///
/// # Errors
///
/// Returns `AppError::Image` when the body is malformed, over the size
/// limit, or carries no image.
pub(super) async fn extract_image(request: Request) -> Result<Bytes> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if is_multipart {
        extract_multipart(request).await
    } else {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|err| AppError::Image(format!("unreadable body: {err}")))?;
        decode_json_image(&body).map(Bytes::from)
    }
}

async fn extract_multipart(request: Request) -> Result<Bytes> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|err| AppError::Image(format!("invalid multipart body: {err}")))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Image(format!("invalid multipart field: {err}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::Image(format!("failed to read image field: {err}")))?;
        if data.is_empty() {
            return Err(AppError::Image("image field is empty".into()));
        }
        return Ok(data);
    }

    Err(AppError::Image("multipart body has no image field".into()))
}

/// Decode the base64 image carried in a JSON upload body.
///
/// Any `data:<mime>;base64,` prefix is discarded and embedded whitespace is
/// ignored.
///
/// # Errors
///
/// Returns `AppError::Image` for invalid JSON, a missing or empty `image`
/// field, or invalid base64.
pub fn decode_json_image(body: &[u8]) -> Result<Vec<u8>> {
    let frame: JsonFrame = serde_json::from_slice(body)
        .map_err(|err| AppError::Image(format!("invalid JSON body: {err}")))?;
    let encoded = frame
        .image
        .ok_or_else(|| AppError::Image("missing image field".into()))?;

    let payload: String = strip_data_url(&encoded)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if payload.is_empty() {
        return Err(AppError::Image("image field is empty".into()));
    }

    let bytes = BASE64.decode(payload)?;
    if bytes.is_empty() {
        return Err(AppError::Image("image payload is empty".into()));
    }
    Ok(bytes)
}
