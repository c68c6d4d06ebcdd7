//! Migration snapshot types.
//!
//! An instance migrates by exporting its state, carrying it across the
//! trust boundary, and importing it on the target. Every exported artifact
//! carries a SHA-256 verification hash over its canonical encoding; the
//! importer recomputes and compares before accepting anything.
//!
//! Two export shapes exist:
//! - [`StateSnapshot`]: the whole instance in one piece, for small stores.
//! - [`RemittanceBatch`]: a fixed-size slice of the record space, imported
//!   in strict sequence after a records-free snapshot established the
//!   instance-level state.

use serde::{Deserialize, Serialize};

use crate::{AccountId, IdempotencyRecord, Remittance, SnapshotId};

/// Instance-level scalars and small sets, exported as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    /// Highest remittance ID ever assigned.
    pub remittance_counter: u64,
    /// Platform fee rate in basis points.
    pub platform_fee_bps: u32,
    /// Protocol fee rate in basis points.
    pub protocol_fee_bps: u32,
    /// Destination account for protocol fees.
    pub treasury: AccountId,
    /// Idempotency record TTL in force.
    pub idempotency_ttl_secs: u64,
    /// Platform fees accrued and not yet withdrawn, minor units.
    pub accumulated_fees: i128,
    /// Registered payout agents, sorted by account ID.
    pub registered_agents: Vec<AccountId>,
}

/// A complete, verifiable export of one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Unique identifier of this export.
    pub snapshot_id: SnapshotId,
    /// Snapshot layout version.
    pub schema_version: u32,
    /// When the export was taken (UNIX seconds).
    pub exported_at: u64,
    /// Instance-level scalars and sets.
    pub instance: InstanceState,
    /// All remittance records, ordered by ID.
    pub remittances: Vec<Remittance>,
    /// All live idempotency records, ordered by key.
    pub idempotency_records: Vec<IdempotencyRecord>,
    /// IDs of remittances whose settlement record was already emitted,
    /// ascending. Carried so the target never re-emits.
    pub settlement_flags: Vec<u64>,
    /// SHA-256 over the canonical encoding of every field above.
    pub verification_hash: [u8; 32],
}

/// A verifiable slice of the remittance record space.
///
/// Batch `n` of size `s` holds the records with IDs in
/// `(n*s, (n+1)*s]` — position `n*s..(n+1)*s` of the ID-ordered export.
/// The final batch may be short; a batch past the end is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceBatch {
    /// Zero-based batch number.
    pub batch_no: u32,
    /// Nominal batch size the export was sliced with.
    pub batch_size: u32,
    /// Total records on the source at export time.
    pub remittance_total: u64,
    /// The records in this slice, ordered by ID.
    pub remittances: Vec<Remittance>,
    /// SHA-256 over the canonical encoding of every field above.
    pub verification_hash: [u8; 32],
}

/// Result of checking an artifact's hash.
///
/// `expected` is the hash the artifact carries; `actual` is recomputed
/// from its content. They match exactly or the artifact is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotVerification {
    pub valid: bool,
    pub expected_hash: [u8; 32],
    pub actual_hash: [u8; 32],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IdempotencyKey, RemitStatus, RemittanceId, RequestHash};

    fn make_snapshot() -> StateSnapshot {
        StateSnapshot {
            snapshot_id: SnapshotId::new(),
            schema_version: 1,
            exported_at: 1_700_000_000,
            instance: InstanceState {
                remittance_counter: 2,
                platform_fee_bps: 250,
                protocol_fee_bps: 100,
                treasury: AccountId::new(),
                idempotency_ttl_secs: 86_400,
                accumulated_fees: 375,
                registered_agents: vec![AccountId::new()],
            },
            remittances: vec![
                Remittance {
                    id: RemittanceId(1),
                    sender: AccountId::new(),
                    agent: AccountId::new(),
                    amount: 10_000,
                    expiry: Some(1_700_100_000),
                    status: RemitStatus::Completed,
                    created_at: 1_699_999_000,
                },
                Remittance::dummy(2, 5_000),
            ],
            idempotency_records: vec![IdempotencyRecord {
                key: IdempotencyKey::parse("jan-batch-01").unwrap(),
                request_hash: RequestHash([1; 32]),
                remittance_id: RemittanceId(1),
                expires_at: 1_700_085_400,
            }],
            settlement_flags: vec![1],
            verification_hash: [0; 32],
        }
    }

    #[test]
    fn snapshot_serde_roundtrip() {
        let snapshot = make_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: StateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn batch_serde_roundtrip() {
        let batch = RemittanceBatch {
            batch_no: 3,
            batch_size: 100,
            remittance_total: 342,
            remittances: vec![Remittance::dummy(301, 777)],
            verification_hash: [9; 32],
        };
        let json = serde_json::to_string(&batch).unwrap();
        let back: RemittanceBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(batch, back);
    }
}
