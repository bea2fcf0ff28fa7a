use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "cove_session";

/// Mints an anonymous session token: `timestamp.nonce.signature` with the
/// signature covering `timestamp.nonce`.
pub fn create_session(secret: &str) -> String {
    let nonce: [u8; 16] = rand::random();
    mint_at(secret, Utc::now().timestamp_millis(), &hex::encode(nonce))
}

fn mint_at(secret: &str, issued_at_millis: i64, nonce: &str) -> String {
    let payload = format!("{}.{}", issued_at_millis, nonce);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("{}.{}", payload, signature)
}

pub fn verify_session(secret: &str, token: &str, ttl_seconds: u64) -> bool {
    verify_at(secret, token, ttl_seconds, Utc::now().timestamp_millis())
}

fn verify_at(secret: &str, token: &str, ttl_seconds: u64, now_millis: i64) -> bool {
    let mut parts = token.splitn(3, '.');
    let (Some(ts), Some(nonce), Some(sig)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let Ok(issued_at) = ts.parse::<i64>() else {
        return false;
    };
    let Ok(sig_bytes) = hex::decode(sig) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(format!("{}.{}", ts, nonce).as_bytes());
    // verify_slice compares in constant time
    if mac.verify_slice(&sig_bytes).is_err() {
        return false;
    }

    now_millis - issued_at <= (ttl_seconds as i64) * 1000
}

/// Reads a cookie out of the raw `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')))
        .map(str::to_string)
}

/// Guarantees every visitor leaves with a usable session cookie: requests
/// carrying no cookie, a tampered one, or an expired one get a fresh token
/// on the response.
pub async fn session_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let valid = cookie_value(req.headers(), SESSION_COOKIE)
        .map_or(false, |token| {
            verify_session(&state.session.secret, &token, state.session.ttl_seconds)
        });

    let mut response = next.run(req).await;

    if !valid {
        let token = create_session(&state.session.secret);
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, token, state.session.ttl_seconds
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "session-test-secret";
    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn fresh_token_verifies() {
        let token = create_session(SECRET);
        assert!(verify_session(SECRET, &token, 86_400));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let token = mint_at(SECRET, 1_751_625_000_000, "aabbccdd");
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });

        assert!(verify_at(SECRET, &token, 86_400, 1_751_625_000_500));
        assert!(!verify_at(SECRET, &tampered, 86_400, 1_751_625_000_500));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_session(SECRET);
        assert!(!verify_session("another-secret", &token, 86_400));
    }

    #[test]
    fn expiry_is_enforced_at_the_day_boundary() {
        let issued = 1_751_625_000_000;
        let token = mint_at(SECRET, issued, "aabbccdd");

        assert!(verify_at(SECRET, &token, 86_400, issued + DAY_MS));
        assert!(!verify_at(SECRET, &token, 86_400, issued + DAY_MS + 1));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        for junk in ["", "abc", "1.2", "notanumber.aa.bb", "123.aa.zz-not-hex"] {
            assert!(!verify_at(SECRET, junk, 86_400, 0), "accepted {:?}", junk);
        }
    }

    #[test]
    fn cookie_value_finds_the_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; cove_session=123.aa.bb; lang=en"),
        );

        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE).as_deref(),
            Some("123.aa.bb")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
