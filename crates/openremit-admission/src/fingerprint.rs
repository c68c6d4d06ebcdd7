//! Canonical request fingerprinting.
//!
//! Two create requests are "the same request" exactly when their
//! fingerprints match. The fingerprint covers the full parameter set
//! (sender, agent, amount, expiry) in a fixed canonical encoding, so any
//! changed parameter produces a different hash and a reused key with a
//! different hash is a conflict rather than a replay.

use sha2::{Digest, Sha256};

use openremit_types::{AccountId, RequestHash};

/// Domain prefix for request fingerprints.
const FINGERPRINT_DOMAIN: &[u8] = b"openremit:request:v1:";

/// Compute the canonical fingerprint of a create request.
///
/// Encoding: domain prefix, sender and agent UUID bytes, amount as i128
/// little-endian, then a presence byte for the expiry (1 followed by the
/// u64 little-endian deadline, or a bare 0). The presence byte keeps
/// `expiry: None` from colliding with `expiry: Some(0)`.
#[must_use]
pub fn request_fingerprint(
    sender: AccountId,
    agent: AccountId,
    amount: i128,
    expiry: Option<u64>,
) -> RequestHash {
    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_DOMAIN);
    hasher.update(sender.0.as_bytes());
    hasher.update(agent.0.as_bytes());
    hasher.update(amount.to_le_bytes());
    match expiry {
        Some(deadline) => {
            hasher.update([1u8]);
            hasher.update(deadline.to_le_bytes());
        }
        None => hasher.update([0u8]),
    }

    let digest = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    RequestHash(hash)
}
