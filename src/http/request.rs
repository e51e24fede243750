//! Request translation.
//!
//! # Responsibilities
//! - Copy the method verbatim, including extension methods
//! - Rebuild the target (path + normalized query) relative to the upstream
//! - Copy headers minus the content framing set
//! - Re-apply `Content-Type` and `Content-Length` from the declared values
//! - Hand the inbound body over without buffering
//!
//! # Design Decisions
//! - The target stays relative; the transport resolves it against the
//!   upstream base address
//! - Query parameters are grouped by first appearance so repeated forwards
//!   of the same request produce the same bytes; the pairs themselves are
//!   never re-encoded

use axum::body::{Body, HttpBody};
use axum::http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{Method, Request, Uri};
use url::form_urlencoded;

use crate::error::ForwardError;
use crate::http::headers::{filter_headers, media_type_value, parse_media_type, REQUEST_EXCLUDED};

/// Builds the outbound request for `request`.
///
/// The returned request targets a relative URI and owns the caller's body
/// stream.
pub fn translate_request(request: Request<Body>) -> Result<Request<Body>, ForwardError> {
    let (parts, body) = request.into_parts();

    let content_type = parse_media_type(parts.headers.get(CONTENT_TYPE))
        .map_err(ForwardError::MalformedContentType)?;
    let content_length = match declared_content_length(&parts.headers)? {
        Some(length) => Some(length),
        None => implied_content_length(&parts.method, content_type.is_some(), &body),
    };
    let target = target_uri(&parts.uri)?;

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = target;
    *outbound.headers_mut() = filter_headers(&parts.headers, &REQUEST_EXCLUDED);

    if let Some(media_type) = content_type {
        let value = media_type_value(&media_type).map_err(ForwardError::MalformedContentType)?;
        outbound.headers_mut().insert(CONTENT_TYPE, value);
    }
    if let Some(length) = content_length {
        outbound
            .headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok(outbound)
}

/// Length to announce when the caller declared none.
///
/// An empty body only gets `Content-Length: 0` when the request is one that
/// carries content: it declared a content type, or its method defines a body.
fn implied_content_length(method: &Method, declares_type: bool, body: &Body) -> Option<u64> {
    let length = body.size_hint().exact()?;
    let bodiless_method =
        [Method::GET, Method::HEAD, Method::DELETE, Method::OPTIONS, Method::TRACE].contains(method);
    if length == 0 && bodiless_method && !declares_type {
        return None;
    }
    Some(length)
}

/// Reads the caller's declared `Content-Length`, if any.
fn declared_content_length(headers: &HeaderMap) -> Result<Option<u64>, ForwardError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| {
            ForwardError::MalformedContentLength(String::from_utf8_lossy(value.as_bytes()).into_owned())
        })
}

/// Builds the relative outbound target: the path followed by the normalized query.
pub fn target_uri(uri: &Uri) -> Result<Uri, ForwardError> {
    let path = match uri.path() {
        "" => "/",
        path => path,
    };

    let target = match uri.query().map(normalize_query) {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    };

    target
        .parse::<Uri>()
        .map_err(|e| ForwardError::InvalidTarget(e.into()))
}

/// Reorders a query string into a stable form.
///
/// Pairs are grouped by decoded key, keys in the order of their first
/// appearance, values of a key in their original order. Each pair is emitted
/// as the caller wrote it, so percent-escapes (including bytes that are not
/// UTF-8, as in signatures) pass through untouched. Empty pairs are dropped.
pub fn normalize_query(raw: &str) -> String {
    let mut grouped: Vec<(String, Vec<&str>)> = Vec::new();
    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let key = form_urlencoded::parse(pair.as_bytes())
            .next()
            .map(|(key, _)| key.into_owned())
            .unwrap_or_default();
        match grouped.iter_mut().find(|(k, _)| *k == key) {
            Some((_, pairs)) => pairs.push(pair),
            None => grouped.push((key, vec![pair])),
        }
    }

    grouped
        .iter()
        .flat_map(|(_, pairs)| pairs.iter().copied())
        .collect::<Vec<_>>()
        .join("&")
}
