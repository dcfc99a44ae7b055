//! Security headers middleware.
//!
//! Adds security-related HTTP headers to all responses.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Header name and value pairs added to every response.
pub const SECURITY_HEADERS: [(&str, &str); 3] = [
    // Prevent MIME type sniffing
    ("x-content-type-options", "nosniff"),
    // Deny all framing
    ("x-frame-options", "DENY"),
    // Legacy browser XSS filter
    ("x-xss-protection", "1; mode=block"),
];

/// Middleware that adds security headers to all responses.
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}
