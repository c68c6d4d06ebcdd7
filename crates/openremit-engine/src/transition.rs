//! Status transition enforcement.
//!
//! [`RemitStatus::can_transition_to`] owns the edge set; this module wraps
//! it into the check-then-write primitive every status mutation uses, plus
//! the hop sequence settlement walks to reach `Completed`.

use openremit_types::{RemitError, RemitStatus, Remittance, Result};

/// Reject edges outside the lifecycle graph.
pub fn validate_transition(from: RemitStatus, to: RemitStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(RemitError::InvalidStateTransition { from, to })
    }
}

/// Validate, then write. The record is untouched on rejection.
pub fn apply(remittance: &mut Remittance, to: RemitStatus) -> Result<()> {
    validate_transition(remittance.status, to)?;
    remittance.status = to;
    Ok(())
}

/// The remaining hops from `from` to `Completed`, in order.
///
/// Settlement never skips an edge: a remittance still in `Initiated`
/// walks all three hops inside one settlement call. Terminal statuses
/// have no path.
#[must_use]
pub fn completion_path(from: RemitStatus) -> Option<&'static [RemitStatus]> {
    match from {
        RemitStatus::Initiated => Some(&[
            RemitStatus::Submitted,
            RemitStatus::PendingAnchor,
            RemitStatus::Completed,
        ]),
        RemitStatus::Submitted => Some(&[RemitStatus::PendingAnchor, RemitStatus::Completed]),
        RemitStatus::PendingAnchor => Some(&[RemitStatus::Completed]),
        RemitStatus::Completed | RemitStatus::Failed => None,
    }
}
