//! Signed cookie helpers.
//!
//! Session ids are signed with HMAC-SHA256 so a visitor cannot pick another
//! visitor's id.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Returns `{session_id}.{hex signature}`.
pub fn sign_session_id(session_id: &str, secret: &str) -> String {
    let mut mac = new_mac(secret);
    mac.update(session_id.as_bytes());
    format!("{}.{}", session_id, hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signed cookie value and extract the session id.
///
/// Returns `None` if the value is malformed or the signature does not match.
pub fn verify_signed_cookie(cookie_value: &str, secret: &str) -> Option<String> {
    let (session_id, signature_hex) = cookie_value.rsplit_once('.')?;
    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = new_mac(secret);
    mac.update(session_id.as_bytes());
    match mac.verify_slice(&signature) {
        Ok(()) => Some(session_id.to_owned()),
        Err(_) => {
            tracing::warn!(
                cookie_prefix = %cookie_value.chars().take(8).collect::<String>(),
                "Session cookie signature mismatch"
            );
            None
        }
    }
}

fn new_mac(secret: &str) -> HmacSha256 {
    // HMAC takes keys of any length, so this never fails.
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any size"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    #[test]
    fn test_sign_and_verify() {
        let signed = sign_session_id("visitor-1", SECRET);
        assert_eq!(verify_signed_cookie(&signed, SECRET), Some("visitor-1".to_owned()));
    }

    #[test]
    fn test_tampered_session_id() {
        let signed = sign_session_id("visitor-1", SECRET);
        let signature = signed.rsplit_once('.').unwrap().1;
        let tampered = format!("visitor-2.{signature}");
        assert!(verify_signed_cookie(&tampered, SECRET).is_none());
    }

    #[test]
    fn test_wrong_secret() {
        let signed = sign_session_id("visitor-1", SECRET);
        assert!(verify_signed_cookie(&signed, "another-secret").is_none());
    }

    #[test]
    fn test_malformed_value() {
        assert!(verify_signed_cookie("no-signature", SECRET).is_none());
        assert!(verify_signed_cookie("visitor-1.not-hex", SECRET).is_none());
    }
}
