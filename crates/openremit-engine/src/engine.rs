//! The engine facade — every external operation enters here.
//!
//! `RemitEngine` owns the store, the idempotency guard, the settlement
//! journal, and the agent registry, and borrows time and money movement
//! from its injected [`Clock`] and [`SettlementLedger`].
//!
//! Every operation follows stage-then-commit: validate everything and
//! stage the ledger batch first, then write. The ledger call is the
//! pivot; once it succeeds, the remaining writes are infallible in
//! practice, so no failure can leave transfers and records disagreeing.

use std::collections::{BTreeMap, BTreeSet};

use openremit_admission::{request_fingerprint, Admission, IdempotencyGuard};
use openremit_migration::{
    seal_remittance_batch, seal_state_snapshot, slice_batch, verify_remittance_batch,
    verify_state_snapshot, BatchTracker,
};
use openremit_types::{
    constants, AccountId, FeeConfig, IdempotencyKey, InstanceConfig, InstanceState, RemitError,
    RemitStatus, Remittance, RemittanceBatch, RemittanceId, Result, SettlementRecord, SnapshotId,
    SnapshotVerification, StateSnapshot,
};

use crate::clock::Clock;
use crate::emitter::SettlementJournal;
use crate::fees::FeeBreakdown;
use crate::ledger::{SettlementLedger, TransferInstruction};
use crate::store::RemittanceStore;
use crate::transition::{apply, completion_path, validate_transition};

/// One remittance engine instance over a host ledger and clock.
pub struct RemitEngine<L, C> {
    admin: AccountId,
    escrow: AccountId,
    asset: String,
    fees: FeeConfig,
    accumulated_fees: i128,
    agents: BTreeSet<AccountId>,
    store: RemittanceStore,
    guard: IdempotencyGuard,
    journal: SettlementJournal,
    /// Armed by a state import; sequences subsequent batch imports.
    import_tracker: Option<BatchTracker>,
    ledger: L,
    clock: C,
}

impl<L: SettlementLedger, C: Clock> RemitEngine<L, C> {
    #[must_use]
    pub fn new(config: InstanceConfig, ledger: L, clock: C) -> Self {
        Self {
            admin: config.admin,
            escrow: config.escrow_account,
            asset: config.asset,
            fees: config.fee_config,
            accumulated_fees: 0,
            agents: BTreeSet::new(),
            store: RemittanceStore::new(),
            guard: IdempotencyGuard::new(),
            journal: SettlementJournal::new(),
            import_tracker: None,
            ledger,
            clock,
        }
    }

    // =====================================================================
    // Core operations
    // =====================================================================

    /// Create a remittance: admit, validate, fund escrow, record.
    ///
    /// With an idempotency key, a retry of the identical request returns
    /// the original ID with no side effects; the same key with different
    /// parameters fails `IdempotencyConflict`. A request that fails after
    /// admission leaves no idempotency record, so the client may retry
    /// the key with corrected parameters.
    pub fn create_remittance(
        &mut self,
        sender: AccountId,
        agent: AccountId,
        amount: i128,
        expiry: Option<u64>,
        idempotency_key: Option<&str>,
    ) -> Result<RemittanceId> {
        let key = match idempotency_key {
            Some(raw) => Some(IdempotencyKey::parse(raw)?),
            None => None,
        };
        let request_hash = request_fingerprint(sender, agent, amount, expiry);
        let now = self.clock.unix_time();

        if let Admission::Duplicate { remittance_id } =
            self.guard.admit(key.as_ref(), &request_hash, now)?
        {
            return Ok(remittance_id);
        }

        if amount <= 0 {
            return Err(RemitError::InvalidAmount(amount));
        }
        if !self.agents.contains(&agent) {
            return Err(RemitError::AgentNotRegistered(agent));
        }
        // Counter headroom before the ledger moves anything.
        let _ = self.store.next_id()?;

        self.ledger.execute(&[TransferInstruction {
            from: sender,
            to: self.escrow,
            asset: self.asset.clone(),
            amount,
        }])?;

        let id = self.store.create(sender, agent, amount, expiry, now)?;
        if let Some(key) = key {
            self.guard
                .commit(key, request_hash, id, now, self.fees.idempotency_ttl_secs);
        }

        tracing::info!(
            remittance = %id,
            sender = %sender,
            agent = %agent,
            amount,
            "Remittance created"
        );
        Ok(id)
    }

    /// Settle a remittance: pay the agent net of fees and complete it.
    ///
    /// Only the record's agent may confirm. The record walks every hop of
    /// the lifecycle path to `COMPLETED` inside this one call; the
    /// settlement record is emitted exactly once, after transfers and
    /// status writes have both succeeded.
    pub fn confirm_payout(&mut self, caller: AccountId, id: RemittanceId) -> Result<()> {
        let now = self.clock.unix_time();
        let remittance = self.store.get(id)?.clone();

        if caller != remittance.agent {
            return Err(RemitError::Unauthorized);
        }
        let Some(path) = completion_path(remittance.status) else {
            return Err(RemitError::InvalidStatus {
                status: remittance.status,
            });
        };
        if let Some(expiry) = remittance.expiry {
            if now > expiry {
                return Err(RemitError::SettlementExpired { expiry, now });
            }
        }

        let breakdown = FeeBreakdown::compute(remittance.amount, &self.fees)?;
        let new_accumulated = self
            .accumulated_fees
            .checked_add(breakdown.platform_fee)
            .ok_or(RemitError::Overflow)?;
        let mut status = remittance.status;
        for &hop in path {
            validate_transition(status, hop)?;
            status = hop;
        }
        let transfers = self.payout_transfers(&remittance, &breakdown);

        self.ledger.execute(&transfers)?;

        let record = self.store.get_mut(id)?;
        for &hop in path {
            apply(record, hop)?;
        }
        self.accumulated_fees = new_accumulated;
        self.journal.emit_once(
            id,
            remittance.sender,
            remittance.agent,
            &self.asset,
            breakdown.net_payout,
            now,
        );

        tracing::info!(
            remittance = %id,
            agent = %remittance.agent,
            net_payout = breakdown.net_payout,
            platform_fee = breakdown.platform_fee,
            protocol_fee = breakdown.protocol_fee,
            "Payout confirmed"
        );
        Ok(())
    }

    /// Cancel a remittance and refund the full escrowed amount.
    ///
    /// Only the sender may cancel, and only from a non-terminal status.
    /// Cancelling an expired remittance is legal: expiry closes the
    /// payout window, not the refund path. No settlement record is ever
    /// emitted here.
    pub fn cancel_remittance(&mut self, caller: AccountId, id: RemittanceId) -> Result<()> {
        let remittance = self.store.get(id)?.clone();

        if caller != remittance.sender {
            return Err(RemitError::Unauthorized);
        }
        if remittance.status.is_terminal() {
            return Err(RemitError::InvalidStatus {
                status: remittance.status,
            });
        }
        validate_transition(remittance.status, RemitStatus::Failed)?;

        self.ledger.execute(&[TransferInstruction {
            from: self.escrow,
            to: remittance.sender,
            asset: self.asset.clone(),
            amount: remittance.amount,
        }])?;

        let record = self.store.get_mut(id)?;
        apply(record, RemitStatus::Failed)?;

        tracing::info!(
            remittance = %id,
            sender = %remittance.sender,
            amount = remittance.amount,
            "Remittance cancelled and refunded"
        );
        Ok(())
    }

    /// Settle up to [`constants::MAX_SETTLEMENT_BATCH`] remittances at once.
    ///
    /// Two phases: every entry is validated and its fees staged before
    /// any state changes, then one netted ledger batch executes and each
    /// entry commits its status walk and settlement record. A failure in
    /// phase one rejects the whole batch with nothing applied.
    pub fn settle_batch(
        &mut self,
        caller: AccountId,
        ids: &[RemittanceId],
    ) -> Result<Vec<RemittanceId>> {
        self.require_admin(caller)?;
        if ids.is_empty() {
            return Err(RemitError::EmptyBatch);
        }
        if ids.len() > constants::MAX_SETTLEMENT_BATCH {
            return Err(RemitError::BatchTooLarge {
                len: ids.len(),
                max: constants::MAX_SETTLEMENT_BATCH,
            });
        }
        let now = self.clock.unix_time();

        // Phase 1: validate everything, stage fees and transfers.
        let mut seen = BTreeSet::new();
        let mut staged: Vec<(Remittance, FeeBreakdown)> = Vec::with_capacity(ids.len());
        let mut new_accumulated = self.accumulated_fees;
        for &id in ids {
            if !seen.insert(id.0) {
                return Err(RemitError::DuplicateBatchEntry(id));
            }
            let remittance = self.store.get(id)?.clone();
            let Some(path) = completion_path(remittance.status) else {
                return Err(RemitError::InvalidStatus {
                    status: remittance.status,
                });
            };
            let mut status = remittance.status;
            for &hop in path {
                validate_transition(status, hop)?;
                status = hop;
            }
            if let Some(expiry) = remittance.expiry {
                if now > expiry {
                    return Err(RemitError::SettlementExpired { expiry, now });
                }
            }
            let breakdown = FeeBreakdown::compute(remittance.amount, &self.fees)?;
            new_accumulated = new_accumulated
                .checked_add(breakdown.platform_fee)
                .ok_or(RemitError::Overflow)?;
            staged.push((remittance, breakdown));
        }

        // Net the ledger batch: one leg per agent, one treasury leg.
        let mut agent_totals: BTreeMap<AccountId, i128> = BTreeMap::new();
        let mut treasury_total: i128 = 0;
        for (remittance, breakdown) in &staged {
            if breakdown.net_payout > 0 {
                let total = agent_totals.entry(remittance.agent).or_insert(0);
                *total = total
                    .checked_add(breakdown.net_payout)
                    .ok_or(RemitError::Overflow)?;
            }
            treasury_total = treasury_total
                .checked_add(breakdown.protocol_fee)
                .ok_or(RemitError::Overflow)?;
        }
        let mut transfers: Vec<TransferInstruction> = agent_totals
            .into_iter()
            .map(|(agent, total)| TransferInstruction {
                from: self.escrow,
                to: agent,
                asset: self.asset.clone(),
                amount: total,
            })
            .collect();
        if treasury_total > 0 {
            transfers.push(TransferInstruction {
                from: self.escrow,
                to: self.fees.treasury,
                asset: self.asset.clone(),
                amount: treasury_total,
            });
        }

        // Phase 2: commit.
        self.ledger.execute(&transfers)?;
        self.accumulated_fees = new_accumulated;
        let mut settled = Vec::with_capacity(staged.len());
        for (remittance, breakdown) in staged {
            let record = self.store.get_mut(remittance.id)?;
            if let Some(path) = completion_path(record.status) {
                for &hop in path {
                    apply(record, hop)?;
                }
            }
            self.journal.emit_once(
                remittance.id,
                remittance.sender,
                remittance.agent,
                &self.asset,
                breakdown.net_payout,
                now,
            );
            settled.push(remittance.id);
        }

        tracing::info!(
            entries = settled.len(),
            treasury_total,
            "Batch settlement complete"
        );
        Ok(settled)
    }

    // =====================================================================
    // Administration
    // =====================================================================

    /// Add an agent to the payout registry. Idempotent.
    pub fn register_agent(&mut self, caller: AccountId, agent: AccountId) -> Result<()> {
        self.require_admin(caller)?;
        self.agents.insert(agent);
        Ok(())
    }

    /// Remove an agent from the payout registry. Existing remittances
    /// keep their agent reference; only new creates are affected.
    pub fn remove_agent(&mut self, caller: AccountId, agent: AccountId) -> Result<()> {
        self.require_admin(caller)?;
        self.agents.remove(&agent);
        Ok(())
    }

    /// Change the platform fee rate. Applies to settlements from now on.
    pub fn update_fee(&mut self, caller: AccountId, bps: u32) -> Result<()> {
        self.require_admin(caller)?;
        if bps > constants::MAX_PLATFORM_FEE_BPS {
            return Err(RemitError::InvalidFeeBps {
                bps,
                max: constants::MAX_PLATFORM_FEE_BPS,
            });
        }
        self.fees.platform_fee_bps = bps;
        Ok(())
    }

    /// Change the protocol fee rate. Applies to settlements from now on.
    pub fn update_protocol_fee(&mut self, caller: AccountId, bps: u32) -> Result<()> {
        self.require_admin(caller)?;
        if bps > constants::MAX_PROTOCOL_FEE_BPS {
            return Err(RemitError::InvalidFeeBps {
                bps,
                max: constants::MAX_PROTOCOL_FEE_BPS,
            });
        }
        self.fees.protocol_fee_bps = bps;
        Ok(())
    }

    /// Redirect future protocol fees to a different treasury account.
    pub fn update_treasury(&mut self, caller: AccountId, treasury: AccountId) -> Result<()> {
        self.require_admin(caller)?;
        self.fees.treasury = treasury;
        Ok(())
    }

    /// Change the idempotency TTL for records committed from now on.
    /// Existing records keep the deadline fixed at their commit.
    pub fn set_idempotency_ttl(&mut self, caller: AccountId, ttl_secs: u64) -> Result<()> {
        self.require_admin(caller)?;
        self.fees.idempotency_ttl_secs = ttl_secs;
        Ok(())
    }

    /// Withdraw the full accumulated platform fee balance to `recipient`.
    pub fn withdraw_fees(&mut self, caller: AccountId, recipient: AccountId) -> Result<i128> {
        self.require_admin(caller)?;
        if self.accumulated_fees == 0 {
            return Err(RemitError::NoFeesToWithdraw);
        }
        let amount = self.accumulated_fees;
        self.ledger.execute(&[TransferInstruction {
            from: self.escrow,
            to: recipient,
            asset: self.asset.clone(),
            amount,
        }])?;
        self.accumulated_fees = 0;

        tracing::info!(recipient = %recipient, amount, "Accumulated fees withdrawn");
        Ok(amount)
    }

    // =====================================================================
    // Queries
    // =====================================================================

    pub fn remittance(&self, id: RemittanceId) -> Result<Remittance> {
        self.store.get(id).cloned()
    }

    #[must_use]
    pub fn accumulated_fees(&self) -> i128 {
        self.accumulated_fees
    }

    #[must_use]
    pub fn platform_fee_bps(&self) -> u32 {
        self.fees.platform_fee_bps
    }

    #[must_use]
    pub fn protocol_fee_bps(&self) -> u32 {
        self.fees.protocol_fee_bps
    }

    #[must_use]
    pub fn treasury(&self) -> AccountId {
        self.fees.treasury
    }

    #[must_use]
    pub fn idempotency_ttl_secs(&self) -> u64 {
        self.fees.idempotency_ttl_secs
    }

    #[must_use]
    pub fn is_agent_registered(&self, agent: AccountId) -> bool {
        self.agents.contains(&agent)
    }

    #[must_use]
    pub fn admin(&self) -> AccountId {
        self.admin
    }

    #[must_use]
    pub fn escrow_account(&self) -> AccountId {
        self.escrow
    }

    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Number of remittance records currently stored.
    #[must_use]
    pub fn remittance_count(&self) -> u64 {
        self.store.len() as u64
    }

    /// Settlement records emitted by this instance, in emission order.
    #[must_use]
    pub fn settlement_events(&self) -> &[SettlementRecord] {
        self.journal.records()
    }

    /// The host ledger, for balance inspection.
    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    // =====================================================================
    // Migration
    // =====================================================================

    /// Export the whole instance as one sealed snapshot.
    pub fn export_migration_state(&self, caller: AccountId) -> Result<StateSnapshot> {
        self.require_admin(caller)?;
        let snapshot = seal_state_snapshot(
            SnapshotId::new(),
            self.clock.unix_time(),
            self.instance_state(),
            self.store.export(),
            self.guard.export_records(),
            self.journal.export_flags(),
        );
        tracing::info!(
            snapshot = %snapshot.snapshot_id,
            remittances = snapshot.remittances.len(),
            "State snapshot exported"
        );
        Ok(snapshot)
    }

    /// Export one sealed slice of the remittance record space.
    pub fn export_migration_batch(
        &self,
        caller: AccountId,
        batch_no: u32,
        batch_size: u32,
    ) -> Result<RemittanceBatch> {
        self.require_admin(caller)?;
        let records = self.store.export();
        let slice = slice_batch(&records, batch_no, batch_size)?;
        Ok(seal_remittance_batch(
            batch_no,
            batch_size,
            self.store.counter(),
            slice.to_vec(),
        ))
    }

    /// Recompute and compare a snapshot's digest. Pure; touches no state.
    #[allow(clippy::unused_self)]
    #[must_use]
    pub fn verify_migration_snapshot(&self, snapshot: &StateSnapshot) -> SnapshotVerification {
        verify_state_snapshot(snapshot)
    }

    /// Replace this instance's state from a verified snapshot.
    ///
    /// Fails `TamperDetected` if the digest does not match; nothing is
    /// written in that case. A successful import arms the batch tracker,
    /// so remittance batches may follow in sequence.
    pub fn import_migration_state(
        &mut self,
        caller: AccountId,
        snapshot: StateSnapshot,
    ) -> Result<()> {
        self.require_admin(caller)?;
        let verification = verify_state_snapshot(&snapshot);
        if !verification.valid {
            return Err(RemitError::TamperDetected {
                expected: hex::encode(verification.expected_hash),
                actual: hex::encode(verification.actual_hash),
            });
        }
        // Re-validate the imported schedule through the same constructor
        // a fresh instance would use.
        let mut fees = FeeConfig::new(
            snapshot.instance.platform_fee_bps,
            snapshot.instance.protocol_fee_bps,
            snapshot.instance.treasury,
        )?;
        fees.idempotency_ttl_secs = snapshot.instance.idempotency_ttl_secs;

        let StateSnapshot {
            snapshot_id,
            instance,
            remittances,
            idempotency_records,
            settlement_flags,
            ..
        } = snapshot;

        self.fees = fees;
        self.accumulated_fees = instance.accumulated_fees;
        self.agents = instance.registered_agents.into_iter().collect();
        self.store.restore(remittances, instance.remittance_counter);
        self.guard.restore(idempotency_records);
        self.journal.restore_flags(settlement_flags);
        self.import_tracker = Some(BatchTracker::new());

        tracing::info!(snapshot = %snapshot_id, "State snapshot imported");
        Ok(())
    }

    /// Import one remittance batch, in strict sequence.
    pub fn import_migration_batch(
        &mut self,
        caller: AccountId,
        batch: RemittanceBatch,
    ) -> Result<()> {
        self.require_admin(caller)?;
        let Some(tracker) = self.import_tracker.as_mut() else {
            return Err(RemitError::InstanceStateMissing);
        };
        let verification = verify_remittance_batch(&batch);
        if !verification.valid {
            return Err(RemitError::TamperDetected {
                expected: hex::encode(verification.expected_hash),
                actual: hex::encode(verification.actual_hash),
            });
        }
        tracker.accept(batch.batch_no)?;
        self.store.insert_records(batch.remittances);
        Ok(())
    }

    /// Confirm that every record the counter promises has arrived.
    ///
    /// IDs are dense, so a complete import stores exactly `counter`
    /// records. Call after the last batch; a shortfall or surplus fails
    /// `CounterMismatch`.
    pub fn verify_migration_complete(&self) -> Result<()> {
        let expected = self.store.counter();
        let actual = self.store.len() as u64;
        if actual != expected {
            return Err(RemitError::CounterMismatch { expected, actual });
        }
        Ok(())
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn require_admin(&self, caller: AccountId) -> Result<()> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(RemitError::Unauthorized)
        }
    }

    fn instance_state(&self) -> InstanceState {
        InstanceState {
            remittance_counter: self.store.counter(),
            platform_fee_bps: self.fees.platform_fee_bps,
            protocol_fee_bps: self.fees.protocol_fee_bps,
            treasury: self.fees.treasury,
            idempotency_ttl_secs: self.fees.idempotency_ttl_secs,
            accumulated_fees: self.accumulated_fees,
            registered_agents: self.agents.iter().copied().collect(),
        }
    }

    /// Stage the payout legs for one remittance. Zero-value legs are
    /// skipped; the ledger only sees money that actually moves.
    fn payout_transfers(
        &self,
        remittance: &Remittance,
        breakdown: &FeeBreakdown,
    ) -> Vec<TransferInstruction> {
        let mut transfers = Vec::with_capacity(2);
        if breakdown.net_payout > 0 {
            transfers.push(TransferInstruction {
                from: self.escrow,
                to: remittance.agent,
                asset: self.asset.clone(),
                amount: breakdown.net_payout,
            });
        }
        if breakdown.protocol_fee > 0 {
            transfers.push(TransferInstruction {
                from: self.escrow,
                to: self.fees.treasury,
                asset: self.asset.clone(),
                amount: breakdown.protocol_fee,
            });
        }
        transfers
    }
}
