//! The idempotency guard — decides whether a create request runs.
//!
//! The guard is consulted *before* any state changes (admit) and written
//! *after* the remittance exists (commit). Admission is pure: a request
//! that proceeds and then fails validation leaves no record behind, so the
//! client can retry the same key with corrected parameters.
//!
//! Expired records stop guarding but are not dropped eagerly; commit
//! overwrites them in place when the key is reused.

use std::collections::BTreeMap;

use openremit_types::{
    IdempotencyKey, IdempotencyRecord, RemitError, RemittanceId, RequestHash, Result,
};

/// The guard's verdict on a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No live record for this key. Run the request.
    Proceed,
    /// Same key, same fingerprint: replay. Serve the recorded remittance
    /// without side effects.
    Duplicate { remittance_id: RemittanceId },
}

/// Keyed store of committed admissions.
///
/// Keys map to at most one record. A `BTreeMap` keeps exports in key
/// order, which the migration digest relies on.
#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    records: BTreeMap<IdempotencyKey, IdempotencyRecord>,
}

impl IdempotencyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a request may run.
    ///
    /// Keyless requests always proceed: with no key there is nothing to
    /// deduplicate against. A live record with a matching fingerprint is a
    /// replay; a live record with a different fingerprint is a conflict
    /// surfacing both hashes. A record past its TTL no longer guards.
    pub fn admit(
        &self,
        key: Option<&IdempotencyKey>,
        request_hash: &RequestHash,
        now: u64,
    ) -> Result<Admission> {
        let Some(key) = key else {
            return Ok(Admission::Proceed);
        };
        match self.records.get(key) {
            None => Ok(Admission::Proceed),
            Some(record) if record.is_expired(now) => Ok(Admission::Proceed),
            Some(record) if record.request_hash == *request_hash => Ok(Admission::Duplicate {
                remittance_id: record.remittance_id,
            }),
            Some(record) => Err(RemitError::IdempotencyConflict {
                expected_hash: record.request_hash,
                actual_hash: *request_hash,
            }),
        }
    }

    /// Record a successful create under its key.
    ///
    /// The TTL in force *now* fixes the record's deadline; later TTL
    /// changes never move it. Overwrites an expired record for the same
    /// key.
    pub fn commit(
        &mut self,
        key: IdempotencyKey,
        request_hash: RequestHash,
        remittance_id: RemittanceId,
        now: u64,
        ttl_secs: u64,
    ) {
        let record = IdempotencyRecord {
            key: key.clone(),
            request_hash,
            remittance_id,
            expires_at: now.saturating_add(ttl_secs),
        };
        self.records.insert(key, record);
    }

    /// Number of records currently held (live and expired).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in key order, for snapshot export.
    #[must_use]
    pub fn export_records(&self) -> Vec<IdempotencyRecord> {
        self.records.values().cloned().collect()
    }

    /// Replace the guard's contents from an imported snapshot.
    pub fn restore(&mut self, records: Vec<IdempotencyRecord>) {
        self.records = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key(raw: &str) -> IdempotencyKey {
        IdempotencyKey::parse(raw).unwrap()
    }

    #[test]
    fn keyless_requests_always_proceed() {
        let guard = IdempotencyGuard::new();
        let hash = RequestHash([1; 32]);
        assert_eq!(guard.admit(None, &hash, 0).unwrap(), Admission::Proceed);
        assert!(guard.is_empty());
    }

    #[test]
    fn fresh_key_proceeds() {
        let guard = IdempotencyGuard::new();
        let key = make_key("first-use");
        let hash = RequestHash([1; 32]);
        assert_eq!(
            guard.admit(Some(&key), &hash, 100).unwrap(),
            Admission::Proceed
        );
    }

    #[test]
    fn retry_with_same_fingerprint_is_a_duplicate() {
        let mut guard = IdempotencyGuard::new();
        let key = make_key("retry-me");
        let hash = RequestHash([1; 32]);
        guard.commit(key.clone(), hash, RemittanceId(7), 100, 3_600);

        let verdict = guard.admit(Some(&key), &hash, 200).unwrap();
        assert_eq!(
            verdict,
            Admission::Duplicate {
                remittance_id: RemittanceId(7)
            }
        );
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn reused_key_with_different_fingerprint_conflicts() {
        let mut guard = IdempotencyGuard::new();
        let key = make_key("reused");
        let original = RequestHash([1; 32]);
        let changed = RequestHash([2; 32]);
        guard.commit(key.clone(), original, RemittanceId(7), 100, 3_600);

        let err = guard.admit(Some(&key), &changed, 200).unwrap_err();
        assert!(
            matches!(
                err,
                RemitError::IdempotencyConflict {
                    expected_hash,
                    actual_hash,
                } if expected_hash == original && actual_hash == changed
            ),
            "Expected IdempotencyConflict, got: {err:?}"
        );
    }

    #[test]
    fn expired_record_stops_guarding() {
        let mut guard = IdempotencyGuard::new();
        let key = make_key("short-lived");
        let hash = RequestHash([1; 32]);
        guard.commit(key.clone(), hash, RemittanceId(7), 100, 50);

        // Live through the deadline itself.
        assert_eq!(
            guard.admit(Some(&key), &hash, 150).unwrap(),
            Admission::Duplicate {
                remittance_id: RemittanceId(7)
            }
        );
        // One second past: the key is free again, even with a different hash.
        assert_eq!(
            guard.admit(Some(&key), &hash, 151).unwrap(),
            Admission::Proceed
        );
        let other = RequestHash([9; 32]);
        assert_eq!(
            guard.admit(Some(&key), &other, 151).unwrap(),
            Admission::Proceed
        );
    }

    #[test]
    fn recommit_overwrites_expired_record() {
        let mut guard = IdempotencyGuard::new();
        let key = make_key("recycled");
        guard.commit(key.clone(), RequestHash([1; 32]), RemittanceId(7), 100, 50);
        guard.commit(key.clone(), RequestHash([2; 32]), RemittanceId(8), 200, 50);

        let verdict = guard.admit(Some(&key), &RequestHash([2; 32]), 210).unwrap();
        assert_eq!(
            verdict,
            Admission::Duplicate {
                remittance_id: RemittanceId(8)
            }
        );
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn ttl_is_fixed_at_commit_time() {
        let mut guard = IdempotencyGuard::new();
        let key_short = make_key("committed-under-short-ttl");
        let key_long = make_key("committed-under-long-ttl");
        let hash = RequestHash([1; 32]);
        guard.commit(key_short.clone(), hash, RemittanceId(1), 100, 10);
        guard.commit(key_long.clone(), hash, RemittanceId(2), 100, 1_000);

        // At t=200 the first record is gone, the second still guards.
        assert_eq!(
            guard.admit(Some(&key_short), &hash, 200).unwrap(),
            Admission::Proceed
        );
        assert_eq!(
            guard.admit(Some(&key_long), &hash, 200).unwrap(),
            Admission::Duplicate {
                remittance_id: RemittanceId(2)
            }
        );
    }

    #[test]
    fn export_is_key_ordered_and_restore_roundtrips() {
        let mut guard = IdempotencyGuard::new();
        let hash = RequestHash([1; 32]);
        guard.commit(make_key("zeta"), hash, RemittanceId(1), 0, 100);
        guard.commit(make_key("alpha"), hash, RemittanceId(2), 0, 100);
        guard.commit(make_key("mid"), hash, RemittanceId(3), 0, 100);

        let exported = guard.export_records();
        let keys: Vec<&str> = exported.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);

        let mut restored = IdempotencyGuard::new();
        restored.restore(exported.clone());
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.export_records(), exported);
    }
}
