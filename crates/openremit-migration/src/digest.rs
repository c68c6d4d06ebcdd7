//! Canonical digests over migration artifacts.
//!
//! Every exported artifact is sealed: its `verification_hash` is SHA-256
//! over a canonical encoding of every other field. The importer recomputes
//! the digest and compares before accepting anything, so corruption or
//! tampering in transit is caught at the boundary.
//!
//! Canonical encoding rules:
//! - integers little-endian at their natural width
//! - every list prefixed with its length as u64
//! - strings prefixed with their byte length as u64
//! - `Option` as a presence byte (1 + value, or bare 0)
//! - enums as a single tag byte

use sha2::{Digest, Sha256};

use openremit_types::{
    constants, IdempotencyRecord, InstanceState, Remittance, RemitStatus, RemittanceBatch,
    SnapshotId, SnapshotVerification, StateSnapshot,
};

/// Domain prefix for full state snapshots.
const SNAPSHOT_DOMAIN: &[u8] = b"openremit:snapshot:v1:";

/// Domain prefix for remittance batch slices.
const BATCH_DOMAIN: &[u8] = b"openremit:batch:v1:";

// ---------------------------------------------------------------------------
// Sealing
// ---------------------------------------------------------------------------

/// Assemble and seal a full state snapshot.
#[must_use]
pub fn seal_state_snapshot(
    snapshot_id: SnapshotId,
    exported_at: u64,
    instance: InstanceState,
    remittances: Vec<Remittance>,
    idempotency_records: Vec<IdempotencyRecord>,
    settlement_flags: Vec<u64>,
) -> StateSnapshot {
    let mut snapshot = StateSnapshot {
        snapshot_id,
        schema_version: constants::SNAPSHOT_SCHEMA_VERSION,
        exported_at,
        instance,
        remittances,
        idempotency_records,
        settlement_flags,
        verification_hash: [0u8; 32],
    };
    snapshot.verification_hash = compute_state_digest(&snapshot);
    snapshot
}

/// Assemble and seal one batch slice.
#[must_use]
pub fn seal_remittance_batch(
    batch_no: u32,
    batch_size: u32,
    remittance_total: u64,
    remittances: Vec<Remittance>,
) -> RemittanceBatch {
    let mut batch = RemittanceBatch {
        batch_no,
        batch_size,
        remittance_total,
        remittances,
        verification_hash: [0u8; 32],
    };
    batch.verification_hash = compute_batch_digest(&batch);
    batch
}

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

/// SHA-256 over the canonical encoding of a snapshot's content.
///
/// Commits to the snapshot identity, export time, instance state, and
/// every record and flag — everything except `verification_hash` itself.
#[must_use]
pub fn compute_state_digest(snapshot: &StateSnapshot) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(SNAPSHOT_DOMAIN);
    hasher.update(snapshot.snapshot_id.0.as_bytes());
    hasher.update(snapshot.schema_version.to_le_bytes());
    hasher.update(snapshot.exported_at.to_le_bytes());

    hash_instance(&mut hasher, &snapshot.instance);

    hasher.update((snapshot.remittances.len() as u64).to_le_bytes());
    for remittance in &snapshot.remittances {
        hash_remittance(&mut hasher, remittance);
    }

    hasher.update((snapshot.idempotency_records.len() as u64).to_le_bytes());
    for record in &snapshot.idempotency_records {
        hash_record(&mut hasher, record);
    }

    hasher.update((snapshot.settlement_flags.len() as u64).to_le_bytes());
    for flag in &snapshot.settlement_flags {
        hasher.update(flag.to_le_bytes());
    }

    finalize(hasher)
}

/// SHA-256 over the canonical encoding of a batch slice's content.
#[must_use]
pub fn compute_batch_digest(batch: &RemittanceBatch) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(BATCH_DOMAIN);
    hasher.update(batch.batch_no.to_le_bytes());
    hasher.update(batch.batch_size.to_le_bytes());
    hasher.update(batch.remittance_total.to_le_bytes());

    hasher.update((batch.remittances.len() as u64).to_le_bytes());
    for remittance in &batch.remittances {
        hash_remittance(&mut hasher, remittance);
    }

    finalize(hasher)
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Recompute a snapshot's digest and compare against the carried hash.
#[must_use]
pub fn verify_state_snapshot(snapshot: &StateSnapshot) -> SnapshotVerification {
    let actual = compute_state_digest(snapshot);
    SnapshotVerification {
        valid: actual == snapshot.verification_hash,
        expected_hash: snapshot.verification_hash,
        actual_hash: actual,
    }
}

/// Recompute a batch's digest and compare against the carried hash.
#[must_use]
pub fn verify_remittance_batch(batch: &RemittanceBatch) -> SnapshotVerification {
    let actual = compute_batch_digest(batch);
    SnapshotVerification {
        valid: actual == batch.verification_hash,
        expected_hash: batch.verification_hash,
        actual_hash: actual,
    }
}

// ---------------------------------------------------------------------------
// Canonical field encoders
// ---------------------------------------------------------------------------

fn hash_instance(hasher: &mut Sha256, instance: &InstanceState) {
    hasher.update(instance.remittance_counter.to_le_bytes());
    hasher.update(instance.platform_fee_bps.to_le_bytes());
    hasher.update(instance.protocol_fee_bps.to_le_bytes());
    hasher.update(instance.treasury.0.as_bytes());
    hasher.update(instance.idempotency_ttl_secs.to_le_bytes());
    hasher.update(instance.accumulated_fees.to_le_bytes());
    hasher.update((instance.registered_agents.len() as u64).to_le_bytes());
    for agent in &instance.registered_agents {
        hasher.update(agent.0.as_bytes());
    }
}

fn hash_remittance(hasher: &mut Sha256, remittance: &Remittance) {
    hasher.update(remittance.id.0.to_le_bytes());
    hasher.update(remittance.sender.0.as_bytes());
    hasher.update(remittance.agent.0.as_bytes());
    hasher.update(remittance.amount.to_le_bytes());
    match remittance.expiry {
        Some(deadline) => {
            hasher.update([1u8]);
            hasher.update(deadline.to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
    hasher.update(match remittance.status {
        RemitStatus::Initiated => [0u8],
        RemitStatus::Submitted => [1u8],
        RemitStatus::PendingAnchor => [2u8],
        RemitStatus::Completed => [3u8],
        RemitStatus::Failed => [4u8],
    });
    hasher.update(remittance.created_at.to_le_bytes());
}

fn hash_record(hasher: &mut Sha256, record: &IdempotencyRecord) {
    let key = record.key.as_str().as_bytes();
    hasher.update((key.len() as u64).to_le_bytes());
    hasher.update(key);
    hasher.update(record.request_hash.as_bytes());
    hasher.update(record.remittance_id.0.to_le_bytes());
    hasher.update(record.expires_at.to_le_bytes());
}

fn finalize(hasher: Sha256) -> [u8; 32] {
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
