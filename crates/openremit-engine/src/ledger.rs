//! The settlement ledger boundary.
//!
//! The engine computes *what* should move; the host's ledger decides *how*
//! money actually moves. The contract is batch-atomic: a staged list of
//! transfers either applies in full or not at all, so the engine can
//! sequence validation, transfer, and status writes without compensation
//! logic.
//!
//! [`MemoryLedger`] is the in-process reference implementation, used by
//! every test and suitable for embedding.

use std::collections::HashMap;

use openremit_types::{AccountId, Asset, RemitError, Result};

/// One staged movement of funds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInstruction {
    pub from: AccountId,
    pub to: AccountId,
    pub asset: Asset,
    /// Minor units. Always strictly positive; zero-value legs are the
    /// caller's job to skip.
    pub amount: i128,
}

/// Host-provided ledger the engine settles against.
pub trait SettlementLedger {
    /// Apply a staged batch of transfers atomically.
    ///
    /// On any error the ledger must be left exactly as it was: no partial
    /// application, no reordering effects.
    fn execute(&mut self, transfers: &[TransferInstruction]) -> Result<()>;
}

/// In-process ledger tracking per-(account, asset) balances.
pub struct MemoryLedger {
    balances: HashMap<(AccountId, Asset), i128>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit an account out of thin air. Test and bootstrap helper.
    pub fn deposit(&mut self, account: AccountId, asset: &str, amount: i128) {
        *self
            .balances
            .entry((account, asset.to_string()))
            .or_insert(0) += amount;
    }

    /// Current balance, zero for unknown accounts.
    #[must_use]
    pub fn balance(&self, account: AccountId, asset: &str) -> i128 {
        self.balances
            .get(&(account, asset.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all balances in an asset. Transfers conserve this.
    #[must_use]
    pub fn total_supply(&self, asset: &str) -> i128 {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl SettlementLedger for MemoryLedger {
    fn execute(&mut self, transfers: &[TransferInstruction]) -> Result<()> {
        // Stage against a scratch copy; swap in only if every leg clears.
        let mut staged = self.balances.clone();
        for transfer in transfers {
            if transfer.amount <= 0 {
                return Err(RemitError::InvalidAmount(transfer.amount));
            }
            let key = (transfer.from, transfer.asset.clone());
            let available = staged.get(&key).copied().unwrap_or(0);
            if available < transfer.amount {
                return Err(RemitError::InsufficientBalance {
                    needed: transfer.amount,
                    available,
                });
            }
            staged.insert(key, available - transfer.amount);
            *staged
                .entry((transfer.to, transfer.asset.clone()))
                .or_insert(0) += transfer.amount;
        }
        self.balances = staged;
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}
