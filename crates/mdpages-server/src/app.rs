//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use mdpages_engine::PageEngine;

use crate::handlers;
use crate::middleware::security::with_security_headers;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `engine` - Engine with registered pages
/// * `version` - Application version, mixed into every `ETag`
/// * `verbose` - Log every rendered request
pub fn create_router(engine: Arc<PageEngine>, version: String, verbose: bool) -> Router {
    let state = Arc::new(AppState {
        engine,
        verbose,
        version,
    });

    let router = Router::new()
        .route(
            "/api/views/{name}",
            get(handlers::views::get_view).post(handlers::views::post_view),
        )
        .fallback(handlers::pages::catch_all);

    with_security_headers(router).with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{HeaderMap, Method, Request, StatusCode, header};
    use mdpages_engine::EngineConfig;
    use mdpages_storage::{MockStorage, Storage};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn site() -> MockStorage {
        MockStorage::new()
            .with_file("_layout.html", "<html><!--@body--></html>")
            .with_file("index.md", "# Home")
            .with_file("about.md", "# About")
            .with_file("docs/index.md", "# Docs")
            .with_file("views/card.md", "**{{ model.name }}**")
            .with_file("views/shared/footer.md", "footer")
    }

    fn router(storage: MockStorage) -> Router {
        let engine = PageEngine::new(Arc::new(storage) as Arc<dyn Storage>, EngineConfig::default());
        engine.register_pages().unwrap();
        create_router(Arc::new(engine), "1.0.0".to_owned(), false)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_page_rendered_in_layout() {
        let (status, headers, body) = send(router(site()), get("/about")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html><h1>About</h1>\n</html>");
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert!(headers.contains_key(header::ETAG));
        assert!(headers.contains_key(header::LAST_MODIFIED));
    }

    #[tokio::test]
    async fn test_root_and_directory_index() {
        let (_, _, root) = send(router(site()), get("/")).await;
        let (_, _, docs) = send(router(site()), get("/docs/")).await;

        assert_eq!(root, "<html><h1>Home</h1>\n</html>");
        assert_eq!(docs, "<html><h1>Docs</h1>\n</html>");
    }

    #[tokio::test]
    async fn test_security_headers() {
        let (_, headers, _) = send(router(site()), get("/about")).await;

        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["referrer-policy"], "same-origin");
        assert!(headers.contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn test_if_none_match_returns_not_modified() {
        let router = router(site());
        let (_, headers, _) = send(router.clone(), get("/about")).await;
        let etag = headers[header::ETAG].clone();

        let request = Request::builder()
            .uri("/about")
            .header(header::IF_NONE_MATCH, etag)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(router, request).await;

        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_markdown_format_is_raw() {
        let (status, headers, body) = send(router(site()), get("/about?format=markdown")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "# About");
        assert_eq!(headers[header::CONTENT_TYPE], "text/x-markdown; charset=utf-8");
    }

    #[tokio::test]
    async fn test_accept_plain_text() {
        let request = Request::builder()
            .uri("/about")
            .header(header::ACCEPT, "text/plain")
            .body(Body::empty())
            .unwrap();

        let (_, headers, body) = send(router(site()), request).await;

        assert_eq!(body, "# About");
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_markdown_source_redirects() {
        let (status, headers, _) = send(router(site()), get("/about.md")).await;

        assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(headers[header::LOCATION], "/about");
    }

    #[tokio::test]
    async fn test_encoded_backslash_never_redirects_off_site() {
        for uri in ["/%5Cevil.example/x.md", "/%5C%5Cevil.example/x.md", "/docs%5Cx.md"] {
            let (status, headers, _) = send(router(site()), get(uri)).await;

            let location = headers
                .get(header::LOCATION)
                .map(|value| value.to_str().unwrap().to_owned())
                .unwrap_or_default();
            assert!(
                !location.starts_with("//") && !location.starts_with("/\\"),
                "{uri} redirected to {location}"
            );
            assert_ne!(status, StatusCode::MOVED_PERMANENTLY, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_page_is_json_404() {
        let (status, _, body) = send(router(site()), get("/missing")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Page not found");
        assert_eq!(json["path"], "/missing");
    }

    #[tokio::test]
    async fn test_non_get_is_method_not_allowed() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/about")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(router(site()), request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[header::ALLOW], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_missing_directive_template_is_500() {
        let storage = MockStorage::new().with_file("guide.md", "@template _nowhere\n# Guide");

        let (status, _, body) = send(router(storage), get("/guide")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("_nowhere"));
    }

    #[tokio::test]
    async fn test_get_view() {
        let (status, _, body) = send(router(site()), get("/api/views/footer?format=text")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "footer");
    }

    #[tokio::test]
    async fn test_post_view_with_model() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/views/card")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "Ada"}"#))
            .unwrap();

        let (status, headers, body) = send(router(site()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html><p><strong>Ada</strong></p>\n</html>");
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_post_view_invalid_json() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/views/card")
            .body(Body::from("{oops"))
            .unwrap();

        let (status, _, _) = send(router(site()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_view_is_404() {
        let (status, _, body) = send(router(site()), get("/api/views/ghost")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("ghost"));
    }
}
