//! API key format and hashing
//!
//! Keys look like `restaurant_<uuid>_<secret>`. The embedded restaurant
//! id lets validation hit the owning row directly instead of scanning
//! hashes; only the SHA-256 of the full key is stored, so a leaked
//! database never yields usable keys.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const KEY_PREFIX: &str = "restaurant_";
const SECRET_LEN: usize = 32;

/// A syntactically valid API key, split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub restaurant_id: Uuid,
    pub raw: String,
}

impl ApiKey {
    /// Parse `restaurant_<uuid>_<secret>`; `None` on any format violation
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(KEY_PREFIX)?;
        // Uuid is exactly 36 chars in hyphenated form, then '_', then the secret
        let (id_part, secret_part) = rest.split_at_checked(36)?;
        let restaurant_id = Uuid::try_parse(id_part).ok()?;
        let secret = secret_part.strip_prefix('_')?;
        if secret.is_empty() {
            return None;
        }
        Some(Self {
            restaurant_id,
            raw: raw.to_string(),
        })
    }

    /// Hash to compare against the stored `api_key_hash`
    pub fn hash(&self) -> String {
        api_key_hash(&self.raw)
    }
}

/// SHA-256 hex digest of the full key string
pub fn api_key_hash(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Mint a fresh key for a restaurant. The caller stores the hash and
/// shows the raw key once; it is not recoverable afterwards.
pub fn generate_api_key(restaurant_id: Uuid) -> ApiKey {
    let mut rng = rand::thread_rng();
    let secret: String = (0..SECRET_LEN)
        .map(|_| {
            const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
            CHARSET[rng.gen_range(0..CHARSET.len())] as char
        })
        .collect();
    let raw = format!("{KEY_PREFIX}{restaurant_id}_{secret}");
    ApiKey { restaurant_id, raw }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_parses() {
        let restaurant_id = Uuid::new_v4();
        let key = generate_api_key(restaurant_id);
        let parsed = ApiKey::parse(&key.raw).unwrap();
        assert_eq!(parsed.restaurant_id, restaurant_id);
        assert_eq!(parsed.hash(), key.hash());
    }

    #[test]
    fn test_parse_rejects_bad_formats() {
        assert!(ApiKey::parse("").is_none());
        assert!(ApiKey::parse("restaurant_").is_none());
        assert!(ApiKey::parse("restaurant_not-a-uuid_secret").is_none());
        assert!(ApiKey::parse("apikey_5f0c3a1e-0000-0000-0000-000000000000_s").is_none());
        // Valid uuid but no secret
        let id = Uuid::new_v4();
        assert!(ApiKey::parse(&format!("restaurant_{id}")).is_none());
        assert!(ApiKey::parse(&format!("restaurant_{id}_")).is_none());
    }

    #[test]
    fn test_hash_is_stable_and_key_sensitive() {
        let id = Uuid::new_v4();
        let a = generate_api_key(id);
        let b = generate_api_key(id);
        assert_eq!(api_key_hash(&a.raw), api_key_hash(&a.raw));
        assert_ne!(api_key_hash(&a.raw), api_key_hash(&b.raw));
        assert_eq!(api_key_hash(&a.raw).len(), 64);
    }
}
