//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Core
//! code never reads process-wide environment variables while handling a request; the
//! `*_from_env_value` helpers take the raw value so binaries decide where it comes from.

use crate::constants::{DEFAULT_PASSWORD_ITERATIONS, DEFAULT_SESSION_COOKIE};
use crate::session::SessionSecret;
use crate::validation::validate_cookie_name;
use crate::{MutuError, MutuResult};
use std::path::{Path, PathBuf};

/// Where records are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-lifetime in-memory stores.
    Memory,
    /// One YAML file per record under the given directory.
    Files(PathBuf),
}

impl StoreBackend {
    pub fn data_dir(&self) -> Option<&Path> {
        match self {
            StoreBackend::Memory => None,
            StoreBackend::Files(dir) => Some(dir),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    backend: StoreBackend,
    password_iterations: u32,
    session_cookie: String,
    session_secret: SessionSecret,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `MutuError::Validation` if the iteration count is zero or the cookie name is
    /// not a valid HTTP token.
    pub fn new(
        backend: StoreBackend,
        password_iterations: u32,
        session_cookie: impl Into<String>,
    ) -> MutuResult<Self> {
        if password_iterations == 0 {
            return Err(MutuError::Validation(
                "password iterations must be at least 1".into(),
            ));
        }

        let session_cookie = session_cookie.into();
        validate_cookie_name(&session_cookie)?;

        Ok(Self {
            backend,
            password_iterations,
            session_cookie,
            session_secret: SessionSecret::random(),
        })
    }

    /// In-memory configuration with defaults, used by tests and the CLI `--memory` mode.
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
            session_cookie: DEFAULT_SESSION_COOKIE.into(),
            session_secret: SessionSecret::random(),
        }
    }

    /// Replaces the random per-process signing key, so sessions survive restarts.
    pub fn with_session_secret(mut self, secret: SessionSecret) -> Self {
        self.session_secret = secret;
        self
    }

    pub fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    pub fn password_iterations(&self) -> u32 {
        self.password_iterations
    }

    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    pub fn session_secret(&self) -> &SessionSecret {
        &self.session_secret
    }
}

/// Select the store backend from an optional data directory value.
///
/// `None` or an empty/whitespace value selects the in-memory backend.
pub fn store_backend_from_env_value(value: Option<String>) -> StoreBackend {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| StoreBackend::Files(PathBuf::from(v)))
        .unwrap_or(StoreBackend::Memory)
}

/// Parse the PBKDF2 iteration count from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default.
pub fn password_iterations_from_env_value(value: Option<String>) -> MutuResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_PASSWORD_ITERATIONS),
        Some(v) => v.parse::<u32>().map_err(|_| {
            MutuError::Validation(format!("invalid password iteration count: '{v}'"))
        }),
    }
}

/// Resolve the session cookie name, falling back to the default for empty values.
pub fn session_cookie_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.into())
}

/// Parse the session signing key. `None` or an empty value means "generate one at startup".
pub fn session_secret_from_env_value(value: Option<String>) -> MutuResult<Option<SessionSecret>> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SessionSecret::new)
        .transpose()
}
