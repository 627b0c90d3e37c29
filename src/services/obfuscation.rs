//! Player identifier obfuscation for admin-facing listings.

use data_encoding::BASE64URL_NOPAD;
use ring::hmac;

/// Turns a player identifier into an opaque token. Must be pure: same input, same output.
pub trait Obfuscator: Send + Sync {
    fn obfuscate(&self, player_id: &str) -> String;
}

/// Keyed HMAC-SHA256 digest of the identifier, base64url-encoded.
pub struct HmacObfuscator {
    key: hmac::Key,
}

impl HmacObfuscator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }
}

impl Obfuscator for HmacObfuscator {
    fn obfuscate(&self, player_id: &str) -> String {
        let tag = hmac::sign(&self.key, player_id.as_bytes());
        BASE64URL_NOPAD.encode(tag.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_secret() {
        let obfuscator = HmacObfuscator::new(b"secret");
        assert_eq!(obfuscator.obfuscate("alice"), obfuscator.obfuscate("alice"));
        assert_ne!(obfuscator.obfuscate("alice"), obfuscator.obfuscate("bob"));
        assert_ne!(
            obfuscator.obfuscate("alice"),
            HmacObfuscator::new(b"other").obfuscate("alice")
        );
    }

    #[test]
    fn token_hides_identifier() {
        let token = HmacObfuscator::new(b"secret").obfuscate("alice");
        assert!(!token.contains("alice"));
        // 32-byte digest, unpadded base64url.
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
