//! Configuration types for an OpenRemit engine instance.

use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, RemitError, Result};

/// Asset symbol, e.g. "USDC". Minor units throughout.
pub type Asset = String;

/// Fee schedule and idempotency policy for an instance.
///
/// Both rates are basis points of the gross amount (1 bps = 0.01%) and are
/// floored on computation. The platform rate routes to accumulated fees
/// inside the engine; the protocol rate routes straight to the treasury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Platform fee rate. At most [`constants::MAX_PLATFORM_FEE_BPS`].
    pub platform_fee_bps: u32,
    /// Protocol fee rate. At most [`constants::MAX_PROTOCOL_FEE_BPS`].
    pub protocol_fee_bps: u32,
    /// Destination account for protocol fees.
    pub treasury: AccountId,
    /// How long committed idempotency records guard their key.
    pub idempotency_ttl_secs: u64,
}

impl FeeConfig {
    /// Build a fee schedule, rejecting rates above their caps.
    ///
    /// The idempotency TTL starts at
    /// [`constants::DEFAULT_IDEMPOTENCY_TTL_SECS`] and can be changed at
    /// runtime through the engine.
    pub fn new(platform_fee_bps: u32, protocol_fee_bps: u32, treasury: AccountId) -> Result<Self> {
        if platform_fee_bps > constants::MAX_PLATFORM_FEE_BPS {
            return Err(RemitError::InvalidFeeBps {
                bps: platform_fee_bps,
                max: constants::MAX_PLATFORM_FEE_BPS,
            });
        }
        if protocol_fee_bps > constants::MAX_PROTOCOL_FEE_BPS {
            return Err(RemitError::InvalidFeeBps {
                bps: protocol_fee_bps,
                max: constants::MAX_PROTOCOL_FEE_BPS,
            });
        }
        Ok(Self {
            platform_fee_bps,
            protocol_fee_bps,
            treasury,
            idempotency_ttl_secs: constants::DEFAULT_IDEMPOTENCY_TTL_SECS,
        })
    }
}

/// Full construction parameters for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// The account allowed to run administrative operations.
    pub admin: AccountId,
    /// The account holding funds between creation and settlement.
    pub escrow_account: AccountId,
    /// The single asset this instance moves.
    pub asset: Asset,
    /// Fee schedule and idempotency policy.
    pub fee_config: FeeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_config_accepts_caps_exactly() {
        let cfg = FeeConfig::new(10_000, 200, AccountId::new()).unwrap();
        assert_eq!(cfg.platform_fee_bps, 10_000);
        assert_eq!(cfg.protocol_fee_bps, 200);
        assert_eq!(cfg.idempotency_ttl_secs, 86_400);
    }

    #[test]
    fn fee_config_rejects_platform_over_cap() {
        let err = FeeConfig::new(10_001, 0, AccountId::new()).unwrap_err();
        assert!(matches!(
            err,
            RemitError::InvalidFeeBps {
                bps: 10_001,
                max: 10_000
            }
        ));
    }

    #[test]
    fn fee_config_rejects_protocol_over_cap() {
        let err = FeeConfig::new(0, 201, AccountId::new()).unwrap_err();
        assert!(matches!(err, RemitError::InvalidFeeBps { bps: 201, max: 200 }));
    }

    #[test]
    fn fee_config_serde_roundtrip() {
        let cfg = FeeConfig::new(250, 100, AccountId::new()).unwrap();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: FeeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
