//! Range-aware media delivery
//!
//! Only single `bytes` ranges are honoured, the unit matched without regard
//! to case. Ranges in another unit are ignored and the whole file is sent;
//! anything else that cannot be served exactly is answered with 416,
//! including a Range header that is not visible ASCII.

use std::io::SeekFrom;
use std::path::Path as FsPath;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const CHUNK_SIZE: usize = 64 * 1024;
const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Inclusive byte window of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// How a request's Range header applies to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    Full,
    Partial(ByteRange),
    Unsatisfiable,
}

/// Interpret a Range header value against a file of `size` bytes
pub fn parse_range(header: Option<&str>, size: u64) -> RangeRequest {
    let Some((unit, ranges)) = header.and_then(|h| h.trim().split_once('=')) else {
        return RangeRequest::Full;
    };
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return RangeRequest::Full;
    }

    if ranges.contains(',') {
        return RangeRequest::Unsatisfiable;
    }
    let Some((start, end)) = ranges.split_once('-') else {
        return RangeRequest::Unsatisfiable;
    };
    let (start, end) = (start.trim(), end.trim());

    // Suffix form: the last N bytes
    if start.is_empty() {
        return match end.parse::<u64>() {
            Ok(n) if n > 0 && size > 0 => RangeRequest::Partial(ByteRange {
                start: size.saturating_sub(n),
                end: size - 1,
            }),
            _ => RangeRequest::Unsatisfiable,
        };
    }

    let Ok(start) = start.parse::<u64>() else {
        return RangeRequest::Unsatisfiable;
    };
    if start >= size {
        return RangeRequest::Unsatisfiable;
    }

    let end = if end.is_empty() {
        size - 1
    } else {
        match end.parse::<u64>() {
            Ok(end) => end,
            Err(_) => return RangeRequest::Unsatisfiable,
        }
    };

    if start > end || end >= size {
        return RangeRequest::Unsatisfiable;
    }

    RangeRequest::Partial(ByteRange { start, end })
}

/// Interpret the Range header of a request against a file of `size` bytes
pub fn range_request(headers: &HeaderMap, size: u64) -> RangeRequest {
    match headers.get(header::RANGE).map(HeaderValue::to_str) {
        None => parse_range(None, size),
        Some(Ok(value)) => parse_range(Some(value), size),
        Some(Err(_)) => RangeRequest::Unsatisfiable,
    }
}

fn content_type_for(extension: &str) -> &'static str {
    mime_guess::from_ext(extension)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

fn io_failure(path: &FsPath, err: std::io::Error) -> ApiError {
    error!("Failed to read {}: {}", path.display(), err);
    ApiError::InternalServerError
}

/// Stream a media file, honouring a single byte range
pub async fn stream_content(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let media = state.catalog.resolve_content(&filename).await?;
    let path = media.path.as_path();

    let mut file = File::open(path)
        .await
        .map_err(|e| io_failure(path, e))?;
    let size = file
        .metadata()
        .await
        .map_err(|e| io_failure(path, e))?
        .len();

    let content_type = content_type_for(&media.extension).to_string();

    match range_request(&headers, size) {
        RangeRequest::Full => {
            let body = Body::from_stream(ReaderStream::with_capacity(file, CHUNK_SIZE));
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_LENGTH, size.to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                body,
            )
                .into_response())
        }
        RangeRequest::Partial(range) => {
            debug!(
                "Serving bytes {}-{}/{} of {}",
                range.start, range.end, size, filename
            );
            file.seek(SeekFrom::Start(range.start))
                .await
                .map_err(|e| io_failure(path, e))?;
            let window = file.take(range.len());
            let body = Body::from_stream(ReaderStream::with_capacity(window, CHUNK_SIZE));
            Ok((
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_LENGTH, range.len().to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                    (
                        header::CONTENT_RANGE,
                        format!("bytes {}-{}/{}", range.start, range.end, size),
                    ),
                ],
                body,
            )
                .into_response())
        }
        RangeRequest::Unsatisfiable => {
            debug!(
                "Unsatisfiable range {:?} for {}",
                headers.get(header::RANGE),
                filename
            );
            Err(ApiError::RangeNotSatisfiable { size })
        }
    }
}
