//! Unverified bearer-token claim decoding.
//!
//! The shop API issues three-segment claims tokens
//! (`header.payload.signature`, base64url without padding) whose payload
//! carries the account id under the `id` claim. Nothing here checks the
//! signature: the decoded id only decides which controls a page renders,
//! and the backend re-authorizes every mutating call it receives.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value as JsonValue;

use wishmark_core::UserId;

/// Number of dot-separated segments in a claims token.
const TOKEN_SEGMENTS: usize = 3;

/// Name of the identity claim in the token payload.
const IDENTITY_CLAIM: &str = "id";

/// Extract the account id claim from a bearer token without verification.
///
/// Returns `None` for any malformed input: wrong segment count, invalid
/// base64url, non-UTF-8 payload, non-JSON payload, or a missing or
/// non-string `id` claim. Callers treat `None` as "no identity" and render
/// the unauthenticated affordances.
#[must_use]
pub fn decode_user_id(token: &str) -> Option<UserId> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != TOKEN_SEGMENTS {
        return None;
    }

    let payload_b64 = parts.get(1)?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    let payload_json: JsonValue = serde_json::from_slice(&payload_bytes).ok()?;

    payload_json
        .get(IDENTITY_CLAIM)
        .and_then(JsonValue::as_str)
        .map(UserId::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a syntactically valid token around the given payload JSON.
    fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decodes_the_id_claim() {
        let token = token_with_payload(r#"{"id":"64f1c0ffee","iat":1700000000}"#);
        assert_eq!(decode_user_id(&token), Some(UserId::new("64f1c0ffee")));
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        for token in ["", "only-one", "two.segments", "a.b.c.d", "...."] {
            assert_eq!(decode_user_id(token), None, "token: {token:?}");
        }
    }

    #[test]
    fn rejects_invalid_base64_payload() {
        assert_eq!(decode_user_id("header.!!invalid!!.signature"), None);
    }

    #[test]
    fn rejects_non_utf8_payload() {
        let body = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0x00, 0x01]);
        let token = format!("header.{body}.signature");
        assert_eq!(decode_user_id(&token), None);
    }

    #[test]
    fn rejects_non_json_payload() {
        let token = token_with_payload("definitely not json");
        assert_eq!(decode_user_id(&token), None);
    }

    #[test]
    fn rejects_missing_id_claim() {
        let token = token_with_payload(r#"{"sub":"someone-else"}"#);
        assert_eq!(decode_user_id(&token), None);
    }

    #[test]
    fn rejects_non_string_id_claim() {
        let token = token_with_payload(r#"{"id":42}"#);
        assert_eq!(decode_user_id(&token), None);
    }

    #[test]
    fn empty_segments_do_not_panic() {
        assert_eq!(decode_user_id(".."), None);
        assert_eq!(decode_user_id("a..c"), None);
    }
}
