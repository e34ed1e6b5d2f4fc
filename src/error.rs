//! Error taxonomy for the cascade engine and container format.
//!
//! Every fatal condition a session can hit is a variant here, so callers see
//! the full failure surface in function signatures instead of relying on
//! unwinding. Wrong passphrase and tampered ciphertext both surface as
//! [`CascadeError::Authentication`]; the two are indistinguishable by
//! design, and the constant response shape is deliberate.
//!
//! Version mismatches are intentionally absent: the reader logs a warning
//! and proceeds, since the container layout is additive.

use std::io;

use thiserror::Error;

pub type Result<T, E = CascadeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CascadeError {
    /// The input does not begin with the container magic bytes.
    #[error("not a cascrypt container")]
    NotAContainer,

    /// The container parses structurally but a field is inconsistent
    /// (unknown cipher suite, truncated section, payload size mismatch).
    #[error("malformed container: {0}")]
    Malformed(&'static str),

    /// Argon2id rejected its parameters or could not allocate the requested
    /// memory. Fatal before any cipher work begins; never retried, because
    /// the cost is the point.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// An AEAD tag or the header MAC failed verification. Wrong passphrase
    /// and corrupted/tampered data are indistinguishable here.
    #[error("authentication failed: wrong passphrase or corrupted data")]
    Authentication,

    /// The source file could not be opened or read.
    #[error("source I/O error: {0}")]
    SourceIo(#[source] io::Error),

    /// The destination file could not be created or written.
    #[error("destination I/O error: {0}")]
    DestinationIo(#[source] io::Error),

    /// The cooperative cancel flag was observed between chunks. Not a
    /// defect; the caller removes any partial destination artifact.
    #[error("operation aborted")]
    Aborted,

    /// The system entropy source failed.
    #[error("entropy source failed: {0}")]
    Entropy(String),

    /// Invalid caller-supplied input (empty passphrase, oversized filename,
    /// out-of-order container operations).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CascadeError {
    /// Convenience constructor for [`CascadeError::InvalidInput`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
