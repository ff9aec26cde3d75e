//! Engine-wide constants for Podium.

/// Default upper bound on a single external write (upload, ledger commit,
/// status update), in milliseconds.
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 30_000;

/// Default delay between a fully successful batch and the automatic advance
/// to the next workflow step, in milliseconds.
pub const DEFAULT_AUTO_ADVANCE_DELAY_MS: u64 = 2_000;

/// Default capacity of the progress event channel.
pub const DEFAULT_PROGRESS_BUFFER: usize = 64;

/// Prefix of content pointers produced from SHA-256 digests.
pub const RECORD_POINTER_PREFIX: &str = "sha256:";

/// Largest number of finishing positions a ranking outcome may have.
pub const MAX_RANKING_POSITIONS: u16 = 1_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Podium";
