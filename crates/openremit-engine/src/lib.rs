//! Remittance lifecycle engine.
//!
//! This crate assembles the full pipeline around [`RemitEngine`]:
//! escrow-funded creation, agent payout with fee routing, sender
//! refunds, netted batch settlement, and snapshot migration.
//!
//! ## Architecture
//!
//! A remittance moves through the engine in this order:
//!
//! 1. `create_remittance` admits the request through the idempotency
//!    guard, funds escrow on the injected [`SettlementLedger`], and
//!    stores the record as `INITIATED`.
//! 2. `confirm_payout` (or `settle_batch`) splits the amount with
//!    [`FeeBreakdown`], pays the agent and treasury from escrow, walks
//!    the record to `COMPLETED`, and emits one settlement record
//!    through the [`SettlementJournal`].
//! 3. `cancel_remittance` refunds escrow to the sender and parks the
//!    record at `FAILED`.
//!
//! Time comes from the injected [`Clock`]; nothing in the crate reads
//! the ambient system time directly.

pub mod clock;
pub mod emitter;
pub mod engine;
pub mod fees;
pub mod ledger;
pub mod store;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use emitter::SettlementJournal;
pub use engine::RemitEngine;
pub use fees::FeeBreakdown;
pub use ledger::{MemoryLedger, SettlementLedger, TransferInstruction};
pub use store::RemittanceStore;
pub use transition::{apply, completion_path, validate_transition};
