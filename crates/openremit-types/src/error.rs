//! Error types for the OpenRemit engine.
//!
//! All errors use the `RMT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors
//! - 2xx: Authorization errors
//! - 3xx: Remittance lifecycle errors
//! - 4xx: Idempotency errors
//! - 5xx: Arithmetic / ledger errors
//! - 6xx: Fee and batch settlement errors
//! - 7xx: Migration errors

use thiserror::Error;

use crate::{AccountId, RemitStatus, RemittanceId, RequestHash};

/// Central error enum for all OpenRemit operations.
#[derive(Debug, Error)]
pub enum RemitError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The remittance amount must be strictly positive.
    #[error("RMT_ERR_100: Invalid amount: {0}")]
    InvalidAmount(i128),

    /// A fee rate exceeds its configured cap.
    #[error("RMT_ERR_101: Invalid fee rate: {bps} bps exceeds cap of {max} bps")]
    InvalidFeeBps { bps: u32, max: u32 },

    /// The idempotency key failed structural validation.
    #[error("RMT_ERR_102: Invalid idempotency key: {reason}")]
    InvalidIdempotencyKey { reason: String },

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// The caller is not permitted to perform this operation.
    #[error("RMT_ERR_200: Caller is not authorized for this operation")]
    Unauthorized,

    /// The payout agent is not in the registered agent set.
    #[error("RMT_ERR_201: Agent not registered: {0}")]
    AgentNotRegistered(AccountId),

    // =================================================================
    // Remittance Lifecycle Errors (3xx)
    // =================================================================
    /// The requested remittance does not exist.
    #[error("RMT_ERR_300: Remittance not found: {0}")]
    RemittanceNotFound(RemittanceId),

    /// The remittance is in a status that does not permit the operation.
    #[error("RMT_ERR_301: Operation not permitted in status {status}")]
    InvalidStatus { status: RemitStatus },

    /// The requested status change is not an edge of the lifecycle graph.
    #[error("RMT_ERR_302: Illegal state transition: {from} -> {to}")]
    InvalidStateTransition { from: RemitStatus, to: RemitStatus },

    /// The settlement window has closed.
    #[error("RMT_ERR_303: Settlement expired at {expiry}, current time {now}")]
    SettlementExpired { expiry: u64, now: u64 },

    // =================================================================
    // Idempotency Errors (4xx)
    // =================================================================
    /// The key was reused with different request parameters.
    #[error("RMT_ERR_400: Idempotency conflict: recorded {expected_hash}, got {actual_hash}")]
    IdempotencyConflict {
        expected_hash: RequestHash,
        actual_hash: RequestHash,
    },

    // =================================================================
    // Arithmetic / Ledger Errors (5xx)
    // =================================================================
    /// A checked arithmetic operation overflowed.
    #[error("RMT_ERR_500: Arithmetic overflow")]
    Overflow,

    /// Not enough balance to fund the transfer.
    #[error("RMT_ERR_501: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: i128, available: i128 },

    // =================================================================
    // Fee and Batch Settlement Errors (6xx)
    // =================================================================
    /// There are no accumulated platform fees to withdraw.
    #[error("RMT_ERR_600: No accumulated fees to withdraw")]
    NoFeesToWithdraw,

    /// A batch settlement request contained no entries.
    #[error("RMT_ERR_601: Batch settlement request is empty")]
    EmptyBatch,

    /// A batch settlement request exceeded the per-batch limit.
    #[error("RMT_ERR_602: Batch too large: {len} entries, limit {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// The same remittance appeared more than once in a batch.
    #[error("RMT_ERR_603: Duplicate batch entry: {0}")]
    DuplicateBatchEntry(RemittanceId),

    // =================================================================
    // Migration Errors (7xx)
    // =================================================================
    /// A snapshot or batch hash did not match its recomputed digest.
    #[error("RMT_ERR_700: Tamper detected: recorded hash {expected}, recomputed {actual}")]
    TamperDetected { expected: String, actual: String },

    /// A migration batch arrived out of sequence.
    #[error("RMT_ERR_701: Batch out of sequence: expected {expected}, got {actual}")]
    BatchSequenceError { expected: u32, actual: u32 },

    /// The imported record count does not match the remittance counter.
    #[error("RMT_ERR_702: Migration incomplete: counter says {expected} records, found {actual}")]
    CounterMismatch { expected: u64, actual: u64 },

    /// A batch was imported before the instance-level state.
    #[error("RMT_ERR_703: Instance state must be imported before remittance batches")]
    InstanceStateMissing,
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RemitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = RemitError::RemittanceNotFound(RemittanceId(9));
        let msg = format!("{err}");
        assert!(msg.starts_with("RMT_ERR_300"), "Got: {msg}");
        assert!(msg.contains("rmt:9"));
    }

    #[test]
    fn insufficient_balance_display() {
        let err = RemitError::InsufficientBalance {
            needed: 100,
            available: 50,
        };
        let msg = format!("{err}");
        assert!(msg.contains("RMT_ERR_501"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn transition_error_display() {
        let err = RemitError::InvalidStateTransition {
            from: RemitStatus::Completed,
            to: RemitStatus::Failed,
        };
        let msg = format!("{err}");
        assert!(msg.contains("RMT_ERR_302"));
        assert!(msg.contains("COMPLETED"));
        assert!(msg.contains("FAILED"));
    }

    #[test]
    fn conflict_surfaces_both_hashes() {
        let expected = RequestHash([0xAA; 32]);
        let actual = RequestHash([0xBB; 32]);
        let err = RemitError::IdempotencyConflict {
            expected_hash: expected,
            actual_hash: actual,
        };
        let msg = format!("{err}");
        assert!(msg.contains("RMT_ERR_400"));
        assert!(msg.contains(&expected.to_string()));
        assert!(msg.contains(&actual.to_string()));
    }

    #[test]
    fn all_errors_have_rmt_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(RemitError::InvalidAmount(-5)),
            Box::new(RemitError::Unauthorized),
            Box::new(RemitError::Overflow),
            Box::new(RemitError::NoFeesToWithdraw),
            Box::new(RemitError::EmptyBatch),
            Box::new(RemitError::InstanceStateMissing),
            Box::new(RemitError::BatchSequenceError {
                expected: 2,
                actual: 4,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("RMT_ERR_"),
                "Error missing RMT_ERR_ prefix: {msg}"
            );
        }
    }
}
