//! Settlement records: the engine's outward signal that a payout completed.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, RemittanceId};

/// One completed settlement, emitted exactly once per remittance.
///
/// Downstream consumers (reconciliation, notification rails) treat these
/// as an append-only feed. The `sequence` is strictly increasing within an
/// instance; a gap means a consumer missed a record, a repeat is impossible
/// because emission is flag-guarded per remittance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Record layout version, for forward-compatible consumers.
    pub schema_version: u32,
    /// Position in the instance's emission order, starting at 1.
    pub sequence: u64,
    /// The remittance that settled.
    pub remittance_id: RemittanceId,
    /// The account that funded the transfer.
    pub sender: AccountId,
    /// The agent that received the net payout.
    pub agent: AccountId,
    /// Instance asset symbol.
    pub asset: Asset,
    /// Net amount delivered to the agent, minor units.
    pub amount: i128,
    /// When the record was emitted (UNIX seconds).
    pub emitted_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let record = SettlementRecord {
            schema_version: 1,
            sequence: 4,
            remittance_id: RemittanceId(17),
            sender: AccountId::new(),
            agent: AccountId::new(),
            asset: "USDC".to_string(),
            amount: 9_650,
            emitted_at: 1_700_000_000,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: SettlementRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
