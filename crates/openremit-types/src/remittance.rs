//! The remittance record: one cross-border transfer from sender to agent.

use serde::{Deserialize, Serialize};

use crate::{AccountId, RemitStatus, RemittanceId};

/// A single remittance held by the store.
///
/// Amounts are minor units of the instance asset (e.g. cents), stored as
/// `i128` so fee arithmetic in basis points never needs widening. The fee
/// split is not stored here: it is computed from the fee configuration in
/// force at settlement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remittance {
    /// Sequential store-assigned identifier.
    pub id: RemittanceId,
    /// The account that funded the transfer.
    pub sender: AccountId,
    /// The registered agent responsible for payout.
    pub agent: AccountId,
    /// Gross amount in minor units. Always strictly positive.
    pub amount: i128,
    /// Optional settlement deadline (UNIX seconds). `None` never expires.
    pub expiry: Option<u64>,
    /// Current lifecycle status.
    pub status: RemitStatus,
    /// When the record was created (UNIX seconds).
    pub created_at: u64,
}

impl Remittance {
    /// Returns `true` once the settlement window has closed.
    ///
    /// The window is inclusive of the deadline itself: at `now == expiry`
    /// the remittance can still settle.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiry.is_some_and(|expiry| now > expiry)
    }

    /// Test fixture with fresh random accounts.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn dummy(id: u64, amount: i128) -> Self {
        Self {
            id: RemittanceId(id),
            sender: AccountId::new(),
            agent: AccountId::new(),
            amount,
            expiry: None,
            status: RemitStatus::Initiated,
            created_at: 0,
        }
    }
}
