//! Calendar feed request construction.
//!
//! The feed lives at `<server>/home/<user>/<calendar>` and accepts an
//! optional date range as `start=`/`end=` query parameters. The separator
//! placement around those parameters is matched byte for byte with what the
//! server's query parser has always received, including the doubled `&`
//! in front of `end=` when no `start=` bound consumed it.

use reqwest::Method;
use tracing::debug;

use timetable_core::{Credentials, SyncRequestConfig, format_bound};

use crate::auth::credentials_header;

/// A fully built calendar feed request, ready for a transport.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: Method,
    url: String,
    authorization: String,
}

impl HttpRequest {
    /// Creates a GET request for `url` with the given `Authorization` value.
    pub fn get(url: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            authorization: authorization.into(),
        }
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the target URL as built, not validated.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the `Authorization` header value.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("authorization", &"<redacted>")
            .finish()
    }
}

/// Returns the calendar feed address for `username`.
pub fn calendar_address(config: &SyncRequestConfig, username: &str) -> String {
    let extra = config.extra_query_parameters();
    let mut add_and = !extra.is_empty();

    let mut address = format!(
        "{}/home/{}/{}?{}",
        config.base_server_url,
        urlencoding::encode(username),
        urlencoding::encode(&config.calendar_name),
        extra
    );

    if let Some(min) = config.min_date {
        if add_and {
            address.push('&');
            add_and = false;
        }
        address.push_str("start=");
        address.push_str(&format_bound(min));
    }

    if let Some(max) = config.max_date {
        if add_and {
            address.push('&');
        }
        address.push_str("&end=");
        address.push_str(&format_bound(max));
    }

    address
}

/// Builds the authenticated GET request for a calendar feed.
///
/// Never fails: a malformed base URL or parameter block is left for the
/// transport to reject.
pub fn build_request(config: &SyncRequestConfig, credentials: &Credentials) -> HttpRequest {
    let url = calendar_address(config, credentials.username());
    debug!(url = %url, "Built calendar request");
    HttpRequest::get(url, credentials_header(credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::decode_basic_auth;
    use chrono::NaiveDate;

    const SERVER: &str = "https://cal.example.com";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn query(url: &str) -> &str {
        &url[url.find('?').unwrap()..]
    }

    #[test]
    fn address_without_parameters_or_bounds() {
        let config = SyncRequestConfig::new(SERVER, "Work");
        assert_eq!(
            calendar_address(&config, "alice"),
            "https://cal.example.com/home/alice/Work?"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let config = SyncRequestConfig::new(SERVER, "Emploi du temps/L3");
        insta::assert_snapshot!(
            calendar_address(&config, "jean.dupont@univ.fr"),
            @"https://cal.example.com/home/jean.dupont%40univ.fr/Emploi%20du%20temps%2FL3?"
        );
    }

    #[test]
    fn server_and_extra_parameters_are_verbatim() {
        let config = SyncRequestConfig::new("http://host:8080/zimbra", "Work")
            .with_extra_query_parameters("fmt=ics&tz=Europe/Paris");
        assert_eq!(
            calendar_address(&config, "alice"),
            "http://host:8080/zimbra/home/alice/Work?fmt=ics&tz=Europe/Paris"
        );
    }

    #[test]
    fn min_bound_only() {
        let config = SyncRequestConfig::new(SERVER, "Work").with_min_date(date(2023, 1, 1));
        let url = calendar_address(&config, "alice");
        assert!(url.ends_with("start=2023/01/01"));
        assert_eq!(query(&url), "?start=2023/01/01");
    }

    #[test]
    fn both_bounds_with_extra_parameters() {
        let config = SyncRequestConfig::new(SERVER, "Work")
            .with_extra_query_parameters("foo=bar")
            .with_min_date(date(2023, 1, 1))
            .with_max_date(date(2023, 6, 30));
        let url = calendar_address(&config, "alice");
        assert_eq!(query(&url), "?foo=bar&start=2023/01/01&end=2023/06/30");
    }

    #[test]
    fn separator_placement_matrix() {
        let cases = [
            ("", None, None, "?"),
            ("", Some(date(2023, 1, 1)), None, "?start=2023/01/01"),
            ("", None, Some(date(2023, 6, 30)), "?&end=2023/06/30"),
            (
                "",
                Some(date(2023, 1, 1)),
                Some(date(2023, 6, 30)),
                "?start=2023/01/01&end=2023/06/30",
            ),
            ("foo=bar", None, None, "?foo=bar"),
            ("foo=bar", Some(date(2023, 1, 1)), None, "?foo=bar&start=2023/01/01"),
            ("foo=bar", None, Some(date(2023, 6, 30)), "?foo=bar&&end=2023/06/30"),
        ];

        for (extra, min, max, expected) in cases {
            let mut config = SyncRequestConfig::new(SERVER, "Work").with_extra_query_parameters(extra);
            config.min_date = min;
            config.max_date = max;
            let url = calendar_address(&config, "alice");
            assert_eq!(query(&url), expected, "extra={extra:?} min={min:?} max={max:?}");
        }
    }

    #[test]
    fn build_request_is_authenticated_get() {
        let config = SyncRequestConfig::new(SERVER, "Work").with_extra_query_parameters("fmt=ics");
        let creds = Credentials::new("alice", "s3cret");
        let request = build_request(&config, &creds);

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url(), "https://cal.example.com/home/alice/Work?fmt=ics");
        assert_eq!(request.authorization(), "Basic YWxpY2U6czNjcmV0");
        assert_eq!(
            decode_basic_auth(request.authorization()),
            Some(("alice".to_string(), "s3cret".to_string()))
        );
    }

    #[test]
    fn malformed_base_url_is_not_rejected_here() {
        let config = SyncRequestConfig::new("not a url", "Work");
        let request = build_request(&config, &Credentials::new("alice", "x"));
        assert_eq!(request.url(), "not a url/home/alice/Work?");
    }

    #[test]
    fn debug_redacts_authorization() {
        let request = HttpRequest::get("http://h/", "Basic c2VjcmV0");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("c2VjcmV0"));
    }
}
