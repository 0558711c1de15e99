//! Security headers attached to every response, pages and views alike.

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// Rendered pages are self-contained HTML. Inline styles stay allowed because
/// Markdown output and layouts commonly carry `style` attributes.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
                                       style-src 'self' 'unsafe-inline'; \
                                       img-src 'self' data:; \
                                       frame-ancestors 'none'";

/// Header name and value pairs, applied in order.
const HEADERS: [(&str, &str); 4] = [
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "same-origin"),
];

/// Wrap `router` so every response carries the security headers.
///
/// Headers set by a handler are overridden.
pub(crate) fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}
