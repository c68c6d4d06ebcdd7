//! The remittance store — owns the records and the ID counter.
//!
//! IDs are dense: the counter starts at 0 and each create takes the next
//! integer, so after `n` creates exactly IDs `1..=n` exist. Migration
//! leans on this invariant twice: batches slice the record space by ID
//! range, and the post-import completeness check is a plain count.

use std::collections::BTreeMap;

use openremit_types::{
    AccountId, RemitError, RemitStatus, Remittance, RemittanceId, Result,
};

/// In-memory record store with a monotonic ID counter.
#[derive(Debug, Default)]
pub struct RemittanceStore {
    records: BTreeMap<u64, Remittance>,
    counter: u64,
}

impl RemittanceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The ID the next create will be assigned.
    pub fn next_id(&self) -> Result<RemittanceId> {
        self.counter
            .checked_add(1)
            .map(RemittanceId)
            .ok_or(RemitError::Overflow)
    }

    /// Insert a new remittance in `Initiated` status and return its ID.
    pub fn create(
        &mut self,
        sender: AccountId,
        agent: AccountId,
        amount: i128,
        expiry: Option<u64>,
        now: u64,
    ) -> Result<RemittanceId> {
        if amount <= 0 {
            return Err(RemitError::InvalidAmount(amount));
        }
        let id = self.next_id()?;
        let remittance = Remittance {
            id,
            sender,
            agent,
            amount,
            expiry,
            status: RemitStatus::Initiated,
            created_at: now,
        };
        self.records.insert(id.0, remittance);
        self.counter = id.0;
        Ok(id)
    }

    pub fn get(&self, id: RemittanceId) -> Result<&Remittance> {
        self.records
            .get(&id.0)
            .ok_or(RemitError::RemittanceNotFound(id))
    }

    pub fn get_mut(&mut self, id: RemittanceId) -> Result<&mut Remittance> {
        self.records
            .get_mut(&id.0)
            .ok_or(RemitError::RemittanceNotFound(id))
    }

    /// Highest ID ever assigned (0 before the first create).
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in ID order, for snapshot export.
    #[must_use]
    pub fn export(&self) -> Vec<Remittance> {
        self.records.values().cloned().collect()
    }

    /// Replace the store's contents from an imported snapshot.
    ///
    /// The counter is restored explicitly, not recomputed: on a target
    /// that imports the head snapshot before any batch, the counter must
    /// already reflect the source even though no records exist yet.
    pub fn restore(&mut self, records: Vec<Remittance>, counter: u64) {
        self.records = records.into_iter().map(|r| (r.id.0, r)).collect();
        self.counter = counter;
    }

    /// Add imported records, keeping their source-assigned IDs.
    pub fn insert_records(&mut self, records: Vec<Remittance>) {
        self.records.extend(records.into_iter().map(|r| (r.id.0, r)));
    }
}
