//! The settlement journal — exactly-once emission of settlement records.
//!
//! Like a UTXO set for payouts: each remittance ID can be marked emitted
//! once, ever. The flag set is what migrates between instances; the record
//! list is this instance's local feed for downstream consumers.

use std::collections::BTreeSet;

use openremit_types::{constants, AccountId, RemittanceId, SettlementRecord};

/// Flag-guarded settlement record feed.
#[derive(Debug, Default)]
pub struct SettlementJournal {
    /// IDs whose record has been emitted, here or on a source instance.
    flags: BTreeSet<u64>,
    /// Records emitted by this instance, in emission order.
    records: Vec<SettlementRecord>,
}

impl SettlementJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the settlement record for a remittance, once.
    ///
    /// Returns `true` if a record was appended, `false` if the flag was
    /// already set. The sequence number counts every flagged remittance,
    /// so it keeps ascending across a migration even though the records
    /// themselves stay behind.
    pub fn emit_once(
        &mut self,
        remittance_id: RemittanceId,
        sender: AccountId,
        agent: AccountId,
        asset: &str,
        amount: i128,
        now: u64,
    ) -> bool {
        if self.flags.contains(&remittance_id.0) {
            return false;
        }
        let sequence = self.flags.len() as u64 + 1;
        self.flags.insert(remittance_id.0);
        self.records.push(SettlementRecord {
            schema_version: constants::SETTLEMENT_SCHEMA_VERSION,
            sequence,
            remittance_id,
            sender,
            agent,
            asset: asset.to_string(),
            amount,
            emitted_at: now,
        });
        true
    }

    /// Whether a record was ever emitted for this remittance.
    #[must_use]
    pub fn is_emitted(&self, remittance_id: RemittanceId) -> bool {
        self.flags.contains(&remittance_id.0)
    }

    /// Records emitted by this instance, in order.
    #[must_use]
    pub fn records(&self) -> &[SettlementRecord] {
        &self.records
    }

    /// Number of remittances ever flagged as emitted.
    #[must_use]
    pub fn emitted_count(&self) -> usize {
        self.flags.len()
    }

    /// Flag set in ascending ID order, for snapshot export.
    #[must_use]
    pub fn export_flags(&self) -> Vec<u64> {
        self.flags.iter().copied().collect()
    }

    /// Replace the flag set from an imported snapshot. Local records are
    /// kept: they were genuinely emitted by this instance.
    pub fn restore_flags(&mut self, flags: Vec<u64>) {
        self.flags = flags.into_iter().collect();
    }
}
