//! Request signature computation.
//!
//! Every API call carries a `signature` query parameter: an HMAC-SHA256 over
//! the request's identifying parameters, keyed by the application secret. The
//! controller recomputes the same digest server-side, so the canonical string
//! layout here has to stay byte-stable.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::GwnError;

type HmacSha256 = Hmac<Sha256>;

/// Build the canonical string the signature is computed over.
///
/// `access_token=<t>&appID=<id>&timestamp=<ms>`, with the SHA-256 hex digest
/// of the JSON body appended as a fourth `&`-separated field when the request
/// has one.
pub(crate) fn canonical_string(
    access_token: &str,
    app_id: &str,
    timestamp_ms: i64,
    body: Option<&str>,
) -> String {
    let mut canonical =
        format!("access_token={access_token}&appID={app_id}&timestamp={timestamp_ms}");
    if let Some(body) = body {
        let digest = Sha256::digest(body.as_bytes());
        canonical.push('&');
        canonical.push_str(&hex::encode(digest));
    }
    canonical
}

/// Compute the lowercase-hex request signature.
///
/// The signature binds the token, application id, timestamp, and body
/// together; it must be recomputed for every call since the timestamp
/// changes.
pub fn request_signature(
    app_secret: &str,
    access_token: &str,
    app_id: &str,
    timestamp_ms: i64,
    body: Option<&str>,
) -> Result<String, GwnError> {
    let canonical = canonical_string(access_token, app_id, timestamp_ms, body);
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .map_err(|e| GwnError::Config(format!("Invalid signing key: {e}")))?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn canonical_string_without_body() {
        assert_eq!(
            canonical_string("tok", "app", 1_700_000_000_000, None),
            "access_token=tok&appID=app&timestamp=1700000000000"
        );
    }

    #[test]
    fn canonical_string_appends_body_digest() {
        let canonical = canonical_string("tok", "app", 1, Some(r#"{"mac":"AA"}"#));
        let parts: Vec<&str> = canonical.split('&').collect();
        assert_eq!(parts.len(), 4);
        // SHA-256 hex digest is always 64 lowercase hex chars.
        assert_eq!(parts[3].len(), 64);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_hex_and_deterministic() {
        let a = request_signature("secret", "tok", "app", 42, None).unwrap();
        let b = request_signature("secret", "tok", "app", 42, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_changes_with_each_input() {
        let base = request_signature("secret", "tok", "app", 42, None).unwrap();
        assert_ne!(
            base,
            request_signature("other", "tok", "app", 42, None).unwrap()
        );
        assert_ne!(
            base,
            request_signature("secret", "tok2", "app", 42, None).unwrap()
        );
        assert_ne!(
            base,
            request_signature("secret", "tok", "app", 43, None).unwrap()
        );
        assert_ne!(
            base,
            request_signature("secret", "tok", "app", 42, Some("{}")).unwrap()
        );
    }
}
