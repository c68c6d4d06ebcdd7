//! # openremit-types
//!
//! Shared types, errors, and configuration for the **OpenRemit** remittance
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`RemittanceId`], [`SnapshotId`]
//! - **Remittance model**: [`Remittance`], [`RemitStatus`]
//! - **Idempotency model**: [`IdempotencyKey`], [`RequestHash`], [`IdempotencyRecord`]
//! - **Settlement model**: [`SettlementRecord`]
//! - **Migration model**: [`StateSnapshot`], [`InstanceState`],
//!   [`RemittanceBatch`], [`SnapshotVerification`]
//! - **Configuration**: [`InstanceConfig`], [`FeeConfig`], [`Asset`]
//! - **Errors**: [`RemitError`] with `RMT_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod idempotency;
pub mod ids;
pub mod remittance;
pub mod settlement;
pub mod snapshot;
pub mod status;

// Re-export all primary types at crate root for ergonomic imports:
//   use openremit_types::{Remittance, RemitStatus, FeeConfig, ...};

pub use config::*;
pub use error::*;
pub use idempotency::*;
pub use ids::*;
pub use remittance::*;
pub use settlement::*;
pub use snapshot::*;
pub use status::*;

// Constants are accessed via `openremit_types::constants::FOO`
// (not re-exported to avoid name collisions).
