//! User-facing messages for failed provider calls.
//!
//! Every HTTP message embeds `HTTP <status>` so that
//! [`is_transient_error`](super::retry::is_transient_error) can classify it.

/// Describe a non-success HTTP response.
///
/// `body` is the raw response body; when it is JSON with an `error.message`
/// or `message` field, that detail is appended for statuses where it helps.
pub fn describe_http_error(status: u16, body: &str) -> String {
    let detail = error_detail(body);
    let suffix = detail.map(|d| format!(": {d}")).unwrap_or_default();

    match status {
        401 => format!("invalid API key (HTTP {status}); check your settings"),
        403 => format!("API access denied (HTTP {status}); check your API key"),
        429 => format!("API rate limit exceeded (HTTP {status}); try again shortly"),
        400 => format!("bad request (HTTP {status}){suffix}"),
        500 | 502 | 503 => {
            format!("the summarization service is having problems (HTTP {status}); try again shortly")
        }
        529 => format!("the summarization service is overloaded (HTTP {status}); try again shortly"),
        _ => format!("request failed (HTTP {status}){suffix}"),
    }
}

/// Describe a transport-level failure (no HTTP status).
pub fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("network connection failed; check your internet connection ({error})")
    } else {
        format!("request failed: {error}")
    }
}

fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::retry::{is_permanent_error, is_transient_error};

    #[test]
    fn auth_errors_are_permanent() {
        let msg = describe_http_error(401, "");
        assert!(msg.contains("invalid API key"));
        assert!(is_permanent_error(&msg));
        assert!(is_permanent_error(&describe_http_error(403, "")));
    }

    #[test]
    fn server_errors_are_transient() {
        for status in [429, 500, 502, 503, 529] {
            let msg = describe_http_error(status, "");
            assert!(is_transient_error(&msg), "{status} should be transient: {msg}");
        }
    }

    #[test]
    fn bad_request_includes_detail() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"max_tokens too large"}}"#;
        assert_eq!(
            describe_http_error(400, body),
            "bad request (HTTP 400): max_tokens too large"
        );
    }

    #[test]
    fn top_level_message_is_used_as_detail() {
        let msg = describe_http_error(418, r#"{"message":"teapot"}"#);
        assert_eq!(msg, "request failed (HTTP 418): teapot");
    }

    #[test]
    fn non_json_body_has_no_detail() {
        assert_eq!(
            describe_http_error(400, "<html>oops</html>"),
            "bad request (HTTP 400)"
        );
    }
}
