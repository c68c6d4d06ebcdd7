//! Batch slicing and import sequencing.
//!
//! Large stores migrate in slices: the instance-level state crosses first
//! in a records-free snapshot, then the remittance space follows as
//! numbered batches. The importer feeds batch numbers through a
//! [`BatchTracker`] so a dropped or replayed slice is caught immediately
//! instead of surfacing later as a count mismatch.

use openremit_types::{RemitError, Remittance, Result, StateSnapshot};

use crate::digest::seal_state_snapshot;

/// Select batch `batch_no` from the ID-ordered record export.
///
/// Batch `n` of size `s` covers positions `n*s .. (n+1)*s`. The final
/// batch may be short, and a batch number past the end yields an empty
/// slice so exporters can iterate until exhaustion without a count
/// round-trip. A zero batch size can never terminate and is rejected.
pub fn slice_batch(
    remittances: &[Remittance],
    batch_no: u32,
    batch_size: u32,
) -> Result<&[Remittance]> {
    if batch_size == 0 {
        return Err(RemitError::EmptyBatch);
    }
    let start = (batch_no as usize)
        .checked_mul(batch_size as usize)
        .ok_or(RemitError::Overflow)?;
    let start = start.min(remittances.len());
    let end = start
        .saturating_add(batch_size as usize)
        .min(remittances.len());
    Ok(&remittances[start..end])
}

/// Derive the records-free head snapshot from a full export.
///
/// Instance state, idempotency records, and settlement flags stay; the
/// remittance records travel separately as batches. The result is
/// re-sealed over its own content.
#[must_use]
pub fn without_remittances(snapshot: &StateSnapshot) -> StateSnapshot {
    seal_state_snapshot(
        snapshot.snapshot_id,
        snapshot.exported_at,
        snapshot.instance.clone(),
        Vec::new(),
        snapshot.idempotency_records.clone(),
        snapshot.settlement_flags.clone(),
    )
}

/// Enforces strict batch ordering on the import side.
///
/// Batches must arrive as 0, 1, 2, ... with no gaps and no repeats.
#[derive(Debug, Default)]
pub struct BatchTracker {
    next: u32,
}

impl BatchTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The batch number the tracker will accept next.
    #[must_use]
    pub fn expect_next(&self) -> u32 {
        self.next
    }

    /// Accept a batch number or reject the sequence violation.
    pub fn accept(&mut self, batch_no: u32) -> Result<()> {
        if batch_no != self.next {
            return Err(RemitError::BatchSequenceError {
                expected: self.next,
                actual: batch_no,
            });
        }
        self.next = self.next.checked_add(1).ok_or(RemitError::Overflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use openremit_types::{AccountId, InstanceState, SnapshotId};

    use super::*;
    use crate::digest::verify_state_snapshot;

    fn make_records(count: u64) -> Vec<Remittance> {
        (1..=count).map(|id| Remittance::dummy(id, 100 * i128::from(id))).collect()
    }

    #[test]
    fn slices_cover_the_space_without_overlap() {
        let records = make_records(5);
        let b0 = slice_batch(&records, 0, 2).unwrap();
        let b1 = slice_batch(&records, 1, 2).unwrap();
        let b2 = slice_batch(&records, 2, 2).unwrap();

        assert_eq!(b0.len(), 2);
        assert_eq!(b1.len(), 2);
        assert_eq!(b2.len(), 1);
        assert_eq!(b0[0].id.0, 1);
        assert_eq!(b1[0].id.0, 3);
        assert_eq!(b2[0].id.0, 5);
    }

    #[test]
    fn batch_past_the_end_is_empty() {
        let records = make_records(5);
        assert!(slice_batch(&records, 3, 2).unwrap().is_empty());
        assert!(slice_batch(&records, 1_000, 2).unwrap().is_empty());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let records = make_records(3);
        let err = slice_batch(&records, 0, 0).unwrap_err();
        assert!(matches!(err, RemitError::EmptyBatch));
    }

    #[test]
    fn single_oversized_batch_holds_everything() {
        let records = make_records(3);
        let all = slice_batch(&records, 0, 100).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn tracker_accepts_in_order() {
        let mut tracker = BatchTracker::new();
        assert_eq!(tracker.expect_next(), 0);
        tracker.accept(0).unwrap();
        tracker.accept(1).unwrap();
        tracker.accept(2).unwrap();
        assert_eq!(tracker.expect_next(), 3);
    }

    #[test]
    fn tracker_rejects_gap() {
        let mut tracker = BatchTracker::new();
        tracker.accept(0).unwrap();
        let err = tracker.accept(2).unwrap_err();
        assert!(matches!(
            err,
            RemitError::BatchSequenceError {
                expected: 1,
                actual: 2
            }
        ));
        // The failed attempt must not advance the sequence.
        assert_eq!(tracker.expect_next(), 1);
    }

    #[test]
    fn tracker_rejects_replay() {
        let mut tracker = BatchTracker::new();
        tracker.accept(0).unwrap();
        tracker.accept(1).unwrap();
        let err = tracker.accept(0).unwrap_err();
        assert!(matches!(
            err,
            RemitError::BatchSequenceError {
                expected: 2,
                actual: 0
            }
        ));
    }

    #[test]
    fn head_snapshot_drops_records_and_reseals() {
        let full = seal_state_snapshot(
            SnapshotId::new(),
            1_700_000_000,
            InstanceState {
                remittance_counter: 2,
                platform_fee_bps: 250,
                protocol_fee_bps: 100,
                treasury: AccountId::new(),
                idempotency_ttl_secs: 86_400,
                accumulated_fees: 0,
                registered_agents: vec![],
            },
            make_records(2),
            vec![],
            vec![1],
        );

        let head = without_remittances(&full);
        assert!(head.remittances.is_empty());
        assert_eq!(head.snapshot_id, full.snapshot_id);
        assert_eq!(head.instance, full.instance);
        assert_eq!(head.settlement_flags, full.settlement_flags);
        assert!(verify_state_snapshot(&head).valid);
        assert_ne!(head.verification_hash, full.verification_hash);
    }
}
