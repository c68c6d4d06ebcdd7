//! System-wide constants for the OpenRemit engine.

/// Basis-point denominator: fee = floor(amount * bps / 10_000).
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Highest permitted platform fee rate (100%).
pub const MAX_PLATFORM_FEE_BPS: u32 = 10_000;

/// Highest permitted protocol fee rate (2%).
pub const MAX_PROTOCOL_FEE_BPS: u32 = 200;

/// How long a committed idempotency record guards its key (24 hours).
pub const DEFAULT_IDEMPOTENCY_TTL_SECS: u64 = 86_400;

/// Minimum idempotency key length in characters.
pub const IDEMPOTENCY_KEY_MIN_LEN: usize = 1;

/// Maximum idempotency key length in characters.
pub const IDEMPOTENCY_KEY_MAX_LEN: usize = 255;

/// Maximum entries in a single batch settlement request.
pub const MAX_SETTLEMENT_BATCH: usize = 50;

/// Settlement record layout version.
pub const SETTLEMENT_SCHEMA_VERSION: u32 = 1;

/// Migration snapshot layout version.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenRemit";
