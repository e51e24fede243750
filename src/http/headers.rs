//! Header hygiene shared by both translation directions.
//!
//! # Responsibilities
//! - Copy a header set minus an exclusion list
//! - Parse declared media types
//!
//! # Design Decisions
//! - Filtering is pure: the input map is never mutated
//! - Exclusion is case-insensitive because `HeaderName` is normalized
//! - The exclusion lists are asymmetric by direction: requests drop content
//!   framing, responses drop transfer framing

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, HOST, TRANSFER_ENCODING,
};
use mime::Mime;

/// Headers never copied from the caller's request.
///
/// `Content-Type` and `Content-Length` are re-applied from the declared values;
/// `Host` is derived from the upstream target by the transport.
pub const REQUEST_EXCLUDED: [HeaderName; 3] = [CONTENT_TYPE, CONTENT_LENGTH, HOST];

/// Headers never copied from the upstream response.
///
/// `Content-Type` is re-applied from the parsed media type; `Content-Length`
/// and `Transfer-Encoding` are decided by the host when it writes the body.
pub const RESPONSE_EXCLUDED: [HeaderName; 3] = [TRANSFER_ENCODING, CONTENT_LENGTH, CONTENT_TYPE];

/// Headers never copied from an upstream response that has no body
/// (a HEAD answer or a 304).
///
/// There `Content-Length` describes the resource, not the message, so it is kept.
pub const BODILESS_RESPONSE_EXCLUDED: [HeaderName; 2] = [TRANSFER_ENCODING, CONTENT_TYPE];

/// Returns a copy of `headers` without the `excluded` names.
///
/// Every value of a multi-valued header is kept, in its original order.
pub fn filter_headers(headers: &HeaderMap, excluded: &[HeaderName]) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if !excluded.contains(name) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// Parses a declared `Content-Type` value.
///
/// A missing or blank value yields `Ok(None)`. On failure the offending value
/// is returned, lossily decoded, for the error report.
pub fn parse_media_type(value: Option<&HeaderValue>) -> Result<Option<Mime>, String> {
    let Some(value) = value else {
        return Ok(None);
    };

    let raw = value
        .to_str()
        .map_err(|_| String::from_utf8_lossy(value.as_bytes()).into_owned())?;

    if raw.trim().is_empty() {
        return Ok(None);
    }

    raw.trim().parse::<Mime>().map(Some).map_err(|_| raw.to_string())
}

/// Converts a parsed media type back into a header value.
pub fn media_type_value(media_type: &Mime) -> Result<HeaderValue, String> {
    HeaderValue::from_str(media_type.as_ref()).map_err(|_| media_type.to_string())
}
