//! # openremit-migration
//!
//! **Migration layer**: verifiable state export and strictly sequenced
//! import for moving an engine instance across a trust boundary.
//!
//! ## Architecture
//!
//! Export produces sealed artifacts — every artifact carries a SHA-256
//! digest over its canonical encoding:
//! 1. A [`StateSnapshot`] captures the whole instance in one piece
//! 2. For large stores, [`without_remittances`] derives the records-free
//!    head and [`slice_batch`] cuts the record space into numbered slices
//! 3. The importer verifies every digest, applies the head first, and
//!    feeds batch numbers through a [`BatchTracker`]
//! 4. Completeness is confirmed by counting records against the counter
//!
//! [`StateSnapshot`]: openremit_types::StateSnapshot

pub mod batch;
pub mod digest;

pub use batch::{slice_batch, without_remittances, BatchTracker};
pub use digest::{
    compute_batch_digest, compute_state_digest, seal_remittance_batch, seal_state_snapshot,
    verify_remittance_batch, verify_state_snapshot,
};
