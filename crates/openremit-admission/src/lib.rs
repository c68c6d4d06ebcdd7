//! # openremit-admission
//!
//! **Admission layer**: request fingerprinting and the idempotency guard.
//!
//! ## Architecture
//!
//! Every `create_remittance` call passes through here before touching the
//! store or the ledger:
//! 1. The full parameter set is hashed into a canonical [`RequestHash`]
//! 2. The guard compares it against any live record for the client's key
//! 3. Replays short-circuit to the recorded remittance; conflicts reject
//! 4. Successful creates commit a TTL-bound record for future retries
//!
//! [`RequestHash`]: openremit_types::RequestHash

pub mod fingerprint;
pub mod guard;

pub use fingerprint::request_fingerprint;
pub use guard::{Admission, IdempotencyGuard};
