//! HTTP Basic authentication (RFC 7617).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use timetable_core::Credentials;

/// Scheme prefix of a Basic `Authorization` header value.
const BASIC_PREFIX: &str = "Basic ";

/// Generates a Basic authentication header value.
pub fn basic_auth(username: &str, password: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", username, password));
    format!("{}{}", BASIC_PREFIX, encoded)
}

/// Generates the header value for a set of credentials.
pub fn credentials_header(credentials: &Credentials) -> String {
    basic_auth(credentials.username(), credentials.password())
}

/// Decodes a Basic header value back into `(username, password)`.
///
/// The password is everything after the first `:`, so it may itself contain
/// colons. Returns `None` for other schemes or undecodable payloads.
pub fn decode_basic_auth(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix(BASIC_PREFIX)?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
