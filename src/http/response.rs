//! Response translation.
//!
//! # Responsibilities
//! - Copy the upstream status verbatim (no remapping)
//! - Copy headers minus the transfer framing set
//! - Keep the upstream `Content-Length` on HEAD answers and 304s
//! - Apply the upstream content type when one was sent
//! - Stream the upstream body through unchanged
//!
//! # Design Decisions
//! - The caller-facing header set is built from scratch, so nothing from a
//!   previous response state can leak through
//! - Head (headers, status, content type) is complete before the body is
//!   attached; the host only polls the body after the handler returns

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Response, StatusCode};

use crate::error::ForwardError;
use crate::http::headers::{
    filter_headers, media_type_value, parse_media_type, BODILESS_RESPONSE_EXCLUDED,
    RESPONSE_EXCLUDED,
};

/// Builds the caller-facing response from an upstream response.
///
/// `method` is the method of the forwarded request; a HEAD answer carries no
/// body, so its `Content-Length` is relayed as sent.
pub fn translate_response(
    upstream: Response<Body>,
    method: &Method,
) -> Result<Response<Body>, ForwardError> {
    let (parts, body) = upstream.into_parts();

    let content_type = parse_media_type(parts.headers.get(CONTENT_TYPE))
        .map_err(ForwardError::MalformedUpstreamContentType)?;

    let headers = if is_bodiless(method, parts.status) {
        filter_headers(&parts.headers, &BODILESS_RESPONSE_EXCLUDED)
    } else {
        filter_headers(&parts.headers, &RESPONSE_EXCLUDED)
    };

    let mut response = Response::new(Body::empty());
    *response.headers_mut() = headers;
    *response.status_mut() = parts.status;
    if let Some(media_type) = content_type {
        let value =
            media_type_value(&media_type).map_err(ForwardError::MalformedUpstreamContentType)?;
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    *response.body_mut() = body;

    Ok(response)
}

fn is_bodiless(method: &Method, status: StatusCode) -> bool {
    *method == Method::HEAD || status == StatusCode::NOT_MODIFIED
}
