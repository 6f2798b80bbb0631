//! One-shot status messages carried in a signed cookie.
//!
//! A mutating handler sets the cookie on its redirect; the next rendered
//! page reads it once and clears it. The payload is base64url JSON, signed
//! with HMAC-SHA256 under the configured secret key. Cookies that fail
//! verification are ignored.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::error::FlashError;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "todo_flash";

/// `Set-Cookie` value that removes the flash cookie.
pub const CLEAR_COOKIE: &str = "todo_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

/// A status message for the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Signing key for flash cookies.
#[derive(Clone)]
pub struct FlashKey {
    secret: Arc<SecretString>,
}

impl FlashKey {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            secret: Arc::new(SecretString::from(secret.expose_secret().to_string())),
        }
    }

    fn mac(&self) -> Result<HmacSha256, FlashError> {
        keyed_mac(self.secret.expose_secret().as_bytes())
    }

    /// Encode and sign a flash as a cookie value.
    pub fn encode(&self, flash: &Flash) -> Result<String, FlashError> {
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(flash)?);
        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{body}.{signature}"))
    }

    /// Verify and decode a cookie value.
    pub fn decode(&self, value: &str) -> Option<Flash> {
        let (body, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let mut mac = self.mac().ok()?;
        mac.update(body.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            debug!("Ignoring flash cookie with bad signature");
            return None;
        }
        let json = URL_SAFE_NO_PAD.decode(body).ok()?;
        serde_json::from_slice(&json).ok()
    }

    /// Full `Set-Cookie` value carrying this flash.
    pub fn set_cookie(&self, flash: &Flash) -> Result<String, FlashError> {
        Ok(format!(
            "{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
            self.encode(flash)?
        ))
    }
}

/// The flash sent with this request, if any.
#[derive(Debug, Default)]
pub struct IncomingFlash {
    /// The verified message.
    pub flash: Option<Flash>,
    /// Whether a flash cookie was sent at all, valid or not.
    pub present: bool,
}

impl<S> FromRequestParts<S> for IncomingFlash
where
    FlashKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = cookie_value(&parts.headers, COOKIE_NAME) else {
            return Ok(Self::default());
        };
        let key = FlashKey::from_ref(state);
        Ok(Self {
            flash: key.decode(&raw),
            present: true,
        })
    }
}

/// Find a cookie by name across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

fn keyed_mac(key: &[u8]) -> Result<HmacSha256, FlashError> {
    HmacSha256::new_from_slice(key).map_err(|_| FlashError::InvalidKey)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn key(secret: &str) -> FlashKey {
        FlashKey::new(&SecretString::from(secret.to_string()))
    }

    fn hmac_hex(key: &[u8], message: &[u8]) -> String {
        let mut mac = keyed_mac(key).unwrap();
        mac.update(message);
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    #[test]
    fn hmac_matches_rfc4231_case_2() {
        assert_eq!(
            hmac_hex(b"Jefe", b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_hashes_long_keys() {
        let key = [0xaau8; 131];
        assert_eq!(
            hmac_hex(&key, b"Test Using Larger Than Block-Size Key - Hash Key First"),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn encode_then_decode() {
        let key = key("secret");
        let flash = Flash::error("Title cannot be empty.");
        let value = key.encode(&flash).unwrap();
        assert_eq!(key.decode(&value), Some(flash));
    }

    #[test]
    fn encoded_body_is_the_flash_json() {
        let flash = Flash::success("Added \"Buy milk\".");
        let value = key("secret").encode(&flash).unwrap();
        let (body, _) = value.split_once('.').unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(body).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"level": "success", "message": "Added \"Buy milk\"."})
        );
    }

    #[test]
    fn empty_secret_still_signs() {
        let key = key("");
        let value = key.encode(&Flash::error("x")).unwrap();
        assert_eq!(key.decode(&value), Some(Flash::error("x")));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let value = key("one").encode(&Flash::success("Added")).unwrap();
        assert_eq!(key("two").decode(&value), None);
    }

    #[test]
    fn tampered_body_is_rejected() {
        let key = key("secret");
        let value = key.encode(&Flash::success("Added")).unwrap();
        let (_, signature) = value.split_once('.').unwrap();
        let forged_body = URL_SAFE_NO_PAD.encode(br#"{"level":"success","message":"Hacked"}"#);
        assert_eq!(key.decode(&format!("{forged_body}.{signature}")), None);
    }

    #[test]
    fn garbage_is_rejected() {
        let key = key("secret");
        assert_eq!(key.decode(""), None);
        assert_eq!(key.decode("no-dot"), None);
        assert_eq!(key.decode("a.b.c"), None);
    }

    #[test]
    fn set_cookie_format() {
        let cookie = key("secret").set_cookie(&Flash::success("ok")).unwrap();
        assert!(cookie.starts_with("todo_flash="));
        assert!(cookie.ends_with("; Path=/; HttpOnly; SameSite=Lax"));
    }

    #[test]
    fn finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("a=1; todo_flash=abc.def; b=2"));
        assert_eq!(
            cookie_value(&headers, COOKIE_NAME).as_deref(),
            Some("abc.def")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
