//! Integration tests for the Strivo storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p strivo-integration-tests
//! ```
//!
//! The tests drive the full router in-process (middleware, sessions and
//! templates included) with `tower::ServiceExt::oneshot`. No server or
//! network is needed.
//!
//! # Example
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_storefront_health() {
//!     let mut app = TestApp::new();
//!     let resp = app.get("/health").await;
//!     assert_eq!(resp.status, StatusCode::OK);
//! }
//! ```

use axum::{
    Router,
    body::Body,
    http::{
        HeaderMap, HeaderValue, Method, Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
};
use strivo_core::Catalog;
use strivo_storefront::{
    app, config::StorefrontConfig, middleware::session::SESSION_COOKIE_NAME,
    routes::HX_REQUEST, state::AppState,
};
use tower::ServiceExt;

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// A header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Redirect target.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header(LOCATION.as_str())
    }

    /// How many times `needle` occurs in the body.
    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        self.body.matches(needle).count()
    }
}

/// One visitor browsing the storefront.
///
/// Keeps the session cookie between requests like a browser would.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Storefront with default configuration and the bundled catalog.
    ///
    /// # Panics
    ///
    /// Panics if the bundled catalog does not parse.
    #[must_use]
    pub fn new() -> Self {
        let config = StorefrontConfig::from_lookup(|_| None).expect("default config is valid");
        let catalog = Catalog::bundled().expect("bundled catalog parses");
        Self {
            router: app(AppState::new(config, catalog)),
            cookie: None,
        }
    }

    /// Another visitor on the same server, with no session yet.
    #[must_use]
    pub fn visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Plain browser GET.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, false, None).await
    }

    /// GET issued by htmx.
    pub async fn htmx_get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, true, None).await
    }

    /// Plain browser form POST.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, uri, false, Some(fields)).await
    }

    /// Form POST issued by htmx.
    pub async fn htmx_post(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, uri, true, Some(fields)).await
    }

    /// Current value of the cart badge.
    ///
    /// # Panics
    ///
    /// Panics if the badge fragment does not hold a number.
    pub async fn cart_count(&mut self) -> u64 {
        let resp = self.htmx_get("/cart/count").await;
        assert_eq!(resp.status, StatusCode::OK);
        resp.body
            .split('>')
            .nth(1)
            .and_then(|rest| rest.split('<').next())
            .and_then(|count| count.trim().parse().ok())
            .expect("badge holds a number")
    }

    async fn send(
        &mut self,
        method: Method,
        uri: &str,
        htmx: bool,
        fields: Option<&[(&str, &str)]>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if htmx {
            builder = builder.header(HX_REQUEST, "true");
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie.as_str());
        }

        let body = match fields {
            Some(fields) => {
                builder = builder.header(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                Body::from(
                    url::form_urlencoded::Serializer::new(String::new())
                        .extend_pairs(fields)
                        .finish(),
                )
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("valid request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        for value in response.headers().get_all(SET_COOKIE) {
            let pair = value
                .to_str()
                .ok()
                .and_then(|raw| raw.split(';').next())
                .map(str::trim);
            if let Some(pair) = pair.filter(|p| p.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
