//! Idempotency primitives: validated keys, request fingerprints, and the
//! records that bind one to the other.
//!
//! A client that retries `create_remittance` with the same key and the same
//! parameters must get the same remittance back. A client that reuses a key
//! with *different* parameters must get a hard conflict. The request hash is
//! what tells those two cases apart.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{constants, RemitError, RemittanceId, Result};

// ---------------------------------------------------------------------------
// IdempotencyKey
// ---------------------------------------------------------------------------

/// A client-supplied deduplication key, validated on construction.
///
/// Keys are 1 to 255 characters from `[A-Za-z0-9_-]`. Construction goes
/// through [`IdempotencyKey::parse`]; a value of this type is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validate and wrap a raw key string.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(RemitError::InvalidIdempotencyKey {
                reason: "key is empty".to_string(),
            });
        }
        if raw.len() > constants::IDEMPOTENCY_KEY_MAX_LEN {
            return Err(RemitError::InvalidIdempotencyKey {
                reason: format!(
                    "key is {} characters, limit {}",
                    raw.len(),
                    constants::IDEMPOTENCY_KEY_MAX_LEN
                ),
            });
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(RemitError::InvalidIdempotencyKey {
                reason: format!("illegal character {bad:?}"),
            });
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Random valid key for tests.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn random() -> Self {
        Self(format!("key-{:016x}", rand::random::<u64>()))
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RequestHash
// ---------------------------------------------------------------------------

/// SHA-256 fingerprint of a create request's full parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestHash(pub [u8; 32]);

impl RequestHash {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Abbreviated hex form for log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for RequestHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// IdempotencyRecord
// ---------------------------------------------------------------------------

/// One committed admission: key, fingerprint, resulting remittance, deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// The deduplication key the client supplied.
    pub key: IdempotencyKey,
    /// Fingerprint of the parameters the key was first used with.
    pub request_hash: RequestHash,
    /// The remittance created by the original request.
    pub remittance_id: RemittanceId,
    /// When this record stops guarding the key (UNIX seconds).
    pub expires_at: u64,
}

impl IdempotencyRecord {
    /// A record guards its key through `expires_at` inclusive.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_character_set() {
        let key = IdempotencyKey::parse("Retry-42_final").unwrap();
        assert_eq!(key.as_str(), "Retry-42_final");
    }

    #[test]
    fn accepts_single_character() {
        assert!(IdempotencyKey::parse("x").is_ok());
    }

    #[test]
    fn accepts_max_length() {
        let raw = "k".repeat(255);
        assert!(IdempotencyKey::parse(&raw).is_ok());
    }

    #[test]
    fn rejects_empty() {
        let err = IdempotencyKey::parse("").unwrap_err();
        assert!(matches!(err, RemitError::InvalidIdempotencyKey { .. }));
    }

    #[test]
    fn rejects_over_length() {
        let raw = "k".repeat(256);
        let err = IdempotencyKey::parse(&raw).unwrap_err();
        assert!(matches!(err, RemitError::InvalidIdempotencyKey { .. }));
    }

    #[test]
    fn rejects_illegal_characters() {
        for raw in ["has space", "pct%20", "semi;colon", "uni·code", "tab\tkey"] {
            assert!(
                IdempotencyKey::parse(raw).is_err(),
                "accepted illegal key {raw:?}"
            );
        }
    }

    #[test]
    fn random_keys_are_valid_and_distinct() {
        let a = IdempotencyKey::random();
        let b = IdempotencyKey::random();
        assert_ne!(a, b);
        assert!(IdempotencyKey::parse(a.as_str()).is_ok());
    }

    #[test]
    fn request_hash_display_is_full_hex() {
        let hash = RequestHash([0xAB; 32]);
        assert_eq!(hash.to_string(), "ab".repeat(32));
        assert_eq!(hash.short(), "abababab");
    }

    #[test]
    fn record_expiry_boundary_is_inclusive() {
        let record = IdempotencyRecord {
            key: IdempotencyKey::parse("k1").unwrap(),
            request_hash: RequestHash([0; 32]),
            remittance_id: RemittanceId(1),
            expires_at: 500,
        };
        assert!(!record.is_expired(500));
        assert!(record.is_expired(501));
    }

    #[test]
    fn serde_roundtrip() {
        let record = IdempotencyRecord {
            key: IdempotencyKey::parse("transfer-2024-001").unwrap(),
            request_hash: RequestHash([7; 32]),
            remittance_id: RemittanceId(12),
            expires_at: 86_400,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: IdempotencyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
