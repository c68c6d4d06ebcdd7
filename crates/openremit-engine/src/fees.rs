//! Fee computation.
//!
//! Both fee legs are basis points of the gross amount, floored
//! independently; the net payout takes the remainder, so the three parts
//! always sum exactly to the gross amount. All arithmetic is checked —
//! a schedule whose combined fees exceed the amount is an error, not a
//! negative payout.

use openremit_types::{constants, FeeConfig, RemitError, Result};

/// The three-way split of one gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    /// Platform share, accrued inside the engine until withdrawn.
    pub platform_fee: i128,
    /// Protocol share, paid to the treasury at settlement.
    pub protocol_fee: i128,
    /// What the agent receives.
    pub net_payout: i128,
}

impl FeeBreakdown {
    /// Split `amount` under the given schedule.
    pub fn compute(amount: i128, config: &FeeConfig) -> Result<Self> {
        let platform_fee = bps_share(amount, config.platform_fee_bps)?;
        let protocol_fee = bps_share(amount, config.protocol_fee_bps)?;
        let combined = platform_fee
            .checked_add(protocol_fee)
            .ok_or(RemitError::Overflow)?;
        if combined > amount {
            return Err(RemitError::Overflow);
        }
        Ok(Self {
            platform_fee,
            protocol_fee,
            net_payout: amount - combined,
        })
    }

    #[must_use]
    pub fn total_fees(&self) -> i128 {
        self.platform_fee + self.protocol_fee
    }
}

/// floor(amount * bps / 10_000), checked.
fn bps_share(amount: i128, bps: u32) -> Result<i128> {
    amount
        .checked_mul(i128::from(bps))
        .map(|scaled| scaled / constants::BPS_DENOMINATOR)
        .ok_or(RemitError::Overflow)
}
