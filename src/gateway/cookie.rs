// Cookie transport for the HttpOnly session cookie.
//
// The cookie carries only the opaque sid; identity lives server-side. One
// cookie name, fixed attributes: HttpOnly, SameSite=Lax, Path=/, Max-Age =
// session TTL, Secure per deployment config.

use axum::http::{header, HeaderMap};
use cookie::{Cookie, SameSite};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Deployment-level cookie attributes.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Whether to set the Secure flag. Off for plain-HTTP development;
    /// must be on behind TLS.
    pub secure: bool,
    /// Cookie path (default: "/").
    pub path: String,
    /// SameSite policy (default: Lax).
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: false,
            path: "/".to_string(),
            same_site: SameSite::Lax,
        }
    }
}

/// Build the Set-Cookie value attaching a sid to a login response.
pub fn create_session_cookie<'a>(
    sid: &str,
    max_age_secs: u64,
    config: &CookieConfig,
) -> Cookie<'a> {
    Cookie::build((SESSION_COOKIE_NAME, sid.to_string()))
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .max_age(cookie::time::Duration::seconds(max_age_secs as i64))
        .build()
}

/// Build a cookie that clears the session cookie on logout.
pub fn create_clear_cookie<'a>(config: &CookieConfig) -> Cookie<'a> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .expires(cookie::time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Extract the sid from the request's Cookie header(s), if present.
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value.to_string()))
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookie_attributes() {
        let config = CookieConfig::default();
        let cookie = create_session_cookie("sid-value", 3600, &config);

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "sid-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(cookie::time::Duration::seconds(3600))
        );
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn secure_flag_follows_config() {
        let config = CookieConfig {
            secure: true,
            ..Default::default()
        };
        let cookie = create_session_cookie("sid-value", 60, &config);
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn clear_cookie_expires_in_the_past() {
        let config = CookieConfig::default();
        let cookie = create_clear_cookie(&config);

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(
            cookie.expires(),
            Some(cookie::Expiration::DateTime(
                cookie::time::OffsetDateTime::UNIX_EPOCH
            ))
        );
    }

    #[test]
    fn extract_finds_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );
        assert_eq!(extract_session_id(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn extract_without_cookie_header_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_id(&headers), None);
    }

    #[test]
    fn extract_ignores_unrelated_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(extract_session_id(&headers), None);
    }
}
