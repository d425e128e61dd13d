//! Error types shared across the crypto engine and the handshake/session
//! layers built on top of it.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while negotiating or running a secure
/// channel. Cryptographic and framing errors are fatal to the current
/// session; the caller is expected to tear the connection down rather than
/// retry (see spec.md SS7).
#[derive(Debug, Error)]
pub enum Error {
    /// Plaintext was too large for the PKC modulus in use.
    #[error("message of {got} bytes exceeds the {max}-byte limit for this key size")]
    SizeError { got: usize, max: usize },

    /// A public/private context pair was registered under mismatched names.
    #[error("PKC context names '{public}' and '{private}' must match")]
    NameMismatch { public: String, private: String },

    /// The handshake found no mutually supported PKC, symmetric cipher, or
    /// MAC/nonce combination.
    #[error("no common cipher suite with peer")]
    NoSuiteMatch,

    /// The MAC recovered from a `SecureContext::decrypt` did not match the
    /// MAC recomputed over the decrypted payload.
    #[error("MAC {actual} does not match expected MAC {expected}")]
    MacMismatch { expected: String, actual: String },

    /// The nonce verifier rejected a decrypted nonce (replay or reordering).
    #[error("nonce {0} is invalid")]
    NonceInvalid(String),

    /// A decrypted challenge/response value did not match what was sent.
    #[error("challenge failed: expected {expected}, got {actual}")]
    ChallengeFailed { expected: String, actual: String },

    /// The 6-digit length prefix of a wire frame could not be parsed, or the
    /// frame was truncated before `length` bytes arrived.
    #[error("frame too short: {0}")]
    FrameTooShort(String),

    /// The frame body was not valid JSON, or lacked an expected field.
    #[error("malformed frame: {0}")]
    FrameMalformed(String),

    /// The peer closed the connection in an orderly fashion.
    #[error("peer disconnected")]
    PeerDisconnected,

    /// An internal invariant was violated (e.g. a `mod_inverse` that should
    /// always exist for a freshly generated coprime pair did not).
    #[error("crypto invariant violated: {0}")]
    CryptoInvariant(String),

    /// Underlying socket I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure at the wire boundary.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
