//! # Remittance lifecycle state machine
//!
//! Every remittance moves through a fixed directed graph. The payout path
//! and the failure path are the only ways forward:
//!
//! ```text
//!   ┌───────────┐      ┌───────────┐      ┌────────────────┐      ┌───────────┐
//!   │ INITIATED ├─────▶│ SUBMITTED ├─────▶│ PENDING_ANCHOR ├─────▶│ COMPLETED │
//!   └─────┬─────┘      └─────┬─────┘      └───────┬────────┘      └───────────┘
//!         │                  │                    │
//!         └──────────────────┴────────────────────┴──────▶ FAILED
//! ```
//!
//! Self-transitions are permitted everywhere (retried status writes are
//! no-ops). `COMPLETED` and `FAILED` are terminal: the only edge out of a
//! terminal status is its own self-loop. Skips along the payout path
//! (e.g. `INITIATED → COMPLETED`) are rejected; settlement walks every hop.

use serde::{Deserialize, Serialize};

/// The lifecycle status of a remittance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemitStatus {
    /// Recorded and funded into escrow. Nothing has moved downstream yet.
    Initiated,
    /// Handed to the payout rail.
    Submitted,
    /// Awaiting external anchoring / finality confirmation.
    PendingAnchor,
    /// Funds delivered. **Irreversible.**
    Completed,
    /// Cancelled or rejected; escrow refunded. **Irreversible.**
    Failed,
}

impl RemitStatus {
    /// Can this status transition to the given target status?
    ///
    /// Encodes the full edge set, including self-loops. This is the single
    /// authority on legality; every status write goes through it.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Initiated, Self::Initiated | Self::Submitted | Self::Failed)
                | (Self::Submitted, Self::Submitted | Self::PendingAnchor | Self::Failed)
                | (Self::PendingAnchor, Self::PendingAnchor | Self::Completed | Self::Failed)
                | (Self::Completed, Self::Completed)
                | (Self::Failed, Self::Failed)
        )
    }

    /// Returns `true` for statuses with no outgoing edges except the self-loop.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for RemitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initiated => write!(f, "INITIATED"),
            Self::Submitted => write!(f, "SUBMITTED"),
            Self::PendingAnchor => write!(f, "PENDING_ANCHOR"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RemitStatus; 5] = [
        RemitStatus::Initiated,
        RemitStatus::Submitted,
        RemitStatus::PendingAnchor,
        RemitStatus::Completed,
        RemitStatus::Failed,
    ];

    #[test]
    fn payout_path_edges_are_legal() {
        assert!(RemitStatus::Initiated.can_transition_to(RemitStatus::Submitted));
        assert!(RemitStatus::Submitted.can_transition_to(RemitStatus::PendingAnchor));
        assert!(RemitStatus::PendingAnchor.can_transition_to(RemitStatus::Completed));
    }

    #[test]
    fn failure_edges_are_legal_from_every_non_terminal() {
        assert!(RemitStatus::Initiated.can_transition_to(RemitStatus::Failed));
        assert!(RemitStatus::Submitted.can_transition_to(RemitStatus::Failed));
        assert!(RemitStatus::PendingAnchor.can_transition_to(RemitStatus::Failed));
    }

    #[test]
    fn self_loops_are_legal_everywhere() {
        for status in ALL {
            assert!(
                status.can_transition_to(status),
                "self-loop rejected for {status}"
            );
        }
    }

    #[test]
    fn path_skips_are_rejected() {
        assert!(!RemitStatus::Initiated.can_transition_to(RemitStatus::PendingAnchor));
        assert!(!RemitStatus::Initiated.can_transition_to(RemitStatus::Completed));
        assert!(!RemitStatus::Submitted.can_transition_to(RemitStatus::Completed));
    }

    #[test]
    fn backwards_edges_are_rejected() {
        assert!(!RemitStatus::Submitted.can_transition_to(RemitStatus::Initiated));
        assert!(!RemitStatus::PendingAnchor.can_transition_to(RemitStatus::Submitted));
        assert!(!RemitStatus::Completed.can_transition_to(RemitStatus::PendingAnchor));
    }

    #[test]
    fn terminals_only_self_loop() {
        for terminal in [RemitStatus::Completed, RemitStatus::Failed] {
            for target in ALL {
                let legal = terminal.can_transition_to(target);
                assert_eq!(
                    legal,
                    target == terminal,
                    "unexpected edge {terminal} -> {target}"
                );
            }
        }
    }

    #[test]
    fn terminal_classification() {
        assert!(RemitStatus::Completed.is_terminal());
        assert!(RemitStatus::Failed.is_terminal());
        assert!(!RemitStatus::Initiated.is_terminal());
        assert!(!RemitStatus::Submitted.is_terminal());
        assert!(!RemitStatus::PendingAnchor.is_terminal());
    }

    #[test]
    fn display_is_uppercase() {
        assert_eq!(RemitStatus::PendingAnchor.to_string(), "PENDING_ANCHOR");
        assert_eq!(RemitStatus::Initiated.to_string(), "INITIATED");
    }

    #[test]
    fn serde_roundtrip() {
        for status in ALL {
            let json = serde_json::to_string(&status).unwrap();
            let back: RemitStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
        }
    }
}
