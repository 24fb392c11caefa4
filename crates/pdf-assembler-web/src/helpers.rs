//! Helper types and traits for cleaner route handlers.
//!
//! Provides extension traits for converting `Option` and `Result` types
//! into HTTP-appropriate error responses, reducing boilerplate in routes.

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode, header},
    response::Response,
};
use pdf_assembler_core::PipelineKind;

/// Standard result type for route handlers returning HTML.
pub type RouteResult<T> = Result<T, (StatusCode, String)>;

/// Extension trait for converting `Option<T>` to `RouteResult<T>`.
pub trait OptionExt<T> {
    /// Returns the contained value or a 404 Not Found error.
    fn or_not_found(self, msg: &str) -> RouteResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> RouteResult<T> {
        self.ok_or_else(|| (StatusCode::NOT_FOUND, msg.to_string()))
    }
}

/// Extension trait for converting `Result<T, E>` to `RouteResult<T>`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Converts the error to 500 Internal Server Error.
    fn or_internal_error(self) -> RouteResult<T>;

    /// Converts the error to 400 Bad Request.
    fn or_bad_request(self) -> RouteResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_internal_error(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }

    fn or_bad_request(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
    }
}

/// Parse a pipeline name from the URL.
///
/// Returns 404 Not Found for unknown names.
pub fn parse_kind(name: &str) -> RouteResult<PipelineKind> {
    PipelineKind::from_name(name).or_not_found("Unknown pipeline")
}

/// Whether the request was issued by HTMX.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}

/// Redirect after a POST (POST-Redirect-GET).
///
/// HTMX requests get an `HX-Redirect` header for a full navigation; plain
/// form submissions get 303 See Other.
pub fn redirect(headers: &HeaderMap, url: &str) -> RouteResult<Response> {
    if is_htmx(headers) {
        Response::builder()
            .status(StatusCode::OK)
            .header("HX-Redirect", url)
            .body(Body::empty())
            .or_internal_error()
    } else {
        Response::builder()
            .status(StatusCode::SEE_OTHER)
            .header(header::LOCATION, url)
            .body(Body::empty())
            .or_internal_error()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_plain_form() {
        let response = redirect(&HeaderMap::new(), "/session/abc").unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/session/abc");
    }

    #[test]
    fn test_redirect_htmx() {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", "true".parse().unwrap());

        let response = redirect(&headers, "/session/abc").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Redirect"], "/session/abc");
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("merge").unwrap(), PipelineKind::Merge);
        assert_eq!(parse_kind("zip").unwrap_err().0, StatusCode::NOT_FOUND);
    }
}
