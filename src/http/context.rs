//! Per-request context handed to handlers.

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap, Method, Uri};
use url::form_urlencoded;

use crate::http::request::X_REQUEST_ID;
use crate::routing::Params;

/// Everything a handler learns about its request.
#[derive(Debug, Clone)]
pub struct Context {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    pattern: String,
    params: Params,
    body: Bytes,
}

fn lookup(encoded: &[u8], key: &str) -> Option<String> {
    form_urlencoded::parse(encoded)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

impl Context {
    pub fn new(parts: Parts, pattern: impl Into<String>, params: Params, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            pattern: pattern.into(),
            params,
            body,
        }
    }

    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The route pattern this request matched.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Captured path parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// First query-string value for `key`, percent-decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        self.uri
            .query()
            .and_then(|query| lookup(query.as_bytes(), key))
    }

    /// Form value for `key`.
    ///
    /// A url-encoded request body is searched first, then the query string.
    pub fn post_form(&self, key: &str) -> Option<String> {
        let is_form = self
            .header(header::CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        is_form
            .then(|| lookup(&self.body, key))
            .flatten()
            .or_else(|| self.query(key))
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn context(request: Request<&'static str>, params: Params) -> Context {
        let (parts, body) = request.into_parts();
        Context::new(parts, "/test", params, Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_params_and_path() {
        let request = Request::builder()
            .method("GET")
            .uri("/p/JavaScript/doc")
            .body("")
            .unwrap();
        let ctx = context(request, [("lang", "JavaScript")].into_iter().collect());

        assert_eq!(ctx.method(), "GET");
        assert_eq!(ctx.path(), "/p/JavaScript/doc");
        assert_eq!(ctx.pattern(), "/test");
        assert_eq!(ctx.param("lang"), Some("JavaScript"));
        assert_eq!(ctx.param("missing"), None);
    }

    #[test]
    fn test_query_is_decoded() {
        let request = Request::builder()
            .uri("/hello?name=gee%20ktutu&name=second")
            .body("")
            .unwrap();
        let ctx = context(request, Params::new());

        assert_eq!(ctx.query("name").as_deref(), Some("gee ktutu"));
        assert_eq!(ctx.query("other"), None);
    }

    #[test]
    fn test_post_form_prefers_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/login?username=from-query&next=/home")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("X-Request-Id", "abc")
            .body("username=geek&password=1234")
            .unwrap();
        let ctx = context(request, Params::new());

        assert_eq!(ctx.post_form("username").as_deref(), Some("geek"));
        assert_eq!(ctx.post_form("password").as_deref(), Some("1234"));
        assert_eq!(ctx.post_form("next").as_deref(), Some("/home"));
        assert_eq!(ctx.request_id(), Some("abc"));
    }

    #[test]
    fn test_post_form_ignores_non_form_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header("Content-Type", "application/json")
            .body("username=geek")
            .unwrap();
        let ctx = context(request, Params::new());

        assert_eq!(ctx.post_form("username"), None);
        assert_eq!(ctx.body().as_ref(), b"username=geek");
    }
}
