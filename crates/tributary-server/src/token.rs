//! Signed tokens.
//!
//! A token binds a kind and a text (usually a login) to a signature made
//! with the user's per-user hash. Changing the hash invalidates every token
//! issued for that user.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// What a token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Cross-site request forgery protection for browser forms.
    Csrf,
}

impl TokenKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Csrf => "csrf",
        }
    }
}

/// Errors raised while signing.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// No signing secret was provided.
    #[error("signing secret is empty")]
    EmptySecret,

    /// The secret was rejected by the MAC.
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),
}

/// An unsigned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Signed text.
    pub text: String,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Signs the token with HMAC-SHA256 and returns the hex digest.
    pub fn sign(&self, secret: &str) -> Result<String, TokenError> {
        let mac = self.mac(secret)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Checks `signature` in constant time.
    pub fn verify(&self, secret: &str, signature: &str) -> bool {
        let (Ok(mac), Ok(expected)) = (self.mac(secret), hex::decode(signature)) else {
            return false;
        };
        mac.verify_slice(&expected).is_ok()
    }

    fn mac(&self, secret: &str) -> Result<HmacSha256, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| TokenError::InvalidSecret(e.to_string()))?;
        mac.update(self.kind.as_str().as_bytes());
        mac.update(b":");
        mac.update(self.text.as_bytes());
        Ok(mac)
    }
}
