//! Constants used throughout the Mutu core crate.

/// Default listen address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default cookie carrying the session token.
pub const DEFAULT_SESSION_COOKIE: &str = "mutu_session";

/// Default PBKDF2 iteration count for stored password hashes.
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 100_000;

/// Filename of a single record inside its sharded directory.
pub const RECORD_FILENAME: &str = "record.yaml";

/// Actor name used for mutations that do not originate from a logged-in user.
pub const SYSTEM_ACTOR: &str = "system";

/// Lowest and highest values of the risk ordinal scale.
pub const ORDINAL_MIN: u8 = 1;
pub const ORDINAL_MAX: u8 = 5;

/// Minimum accepted length of a new password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Minimum length in bytes of the key that signs session tokens.
pub const MIN_SESSION_SECRET_LEN: usize = 32;
