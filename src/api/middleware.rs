/// Credential extraction helpers
///
/// Access tokens arrive in the `access_token` cookie; a bearer
/// Authorization header is accepted as a fallback for non-browser clients.
use axum::http::{header, HeaderMap};

/// Extract a named cookie value from request headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (key, value) = pair.trim().split_once('=')?;
                if key == name {
                    Some(value.to_string())
                } else {
                    None
                }
            })
        })
}

/// Extract bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(|t| t.to_string()))
}

/// Extract the access token from cookie or Authorization header
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie(headers, "access_token").or_else(|| extract_bearer_token(headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; access_token=abc123; other=x"),
        );

        assert_eq!(
            extract_cookie(&headers, "access_token").as_deref(),
            Some("abc123")
        );
        assert_eq!(extract_cookie(&headers, "refresh_token"), None);
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123token"),
        );
        assert_eq!(
            extract_bearer_token(&headers).as_deref(),
            Some("abc123token")
        );

        let mut bad = HeaderMap::new();
        bad.insert(header::AUTHORIZATION, HeaderValue::from_static("abc123token"));
        assert_eq!(extract_bearer_token(&bad), None);
    }

    #[test]
    fn test_cookie_takes_precedence_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=from-cookie"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(
            extract_access_token(&headers).as_deref(),
            Some("from-cookie")
        );
    }
}
