//! A two-party secure channel: cipher-suite negotiation, a public-key
//! handshake, and an authenticated symmetric session.
//!
//! This is an academic cryptosystem. It does not claim IND-CCA security,
//! forward secrecy, constant-time execution, or TLS interoperability -- see
//! DESIGN.md for the full list of things deliberately left out of scope.

pub mod bigint;
pub mod cipher;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod hash;
pub mod manager;
pub mod nonce;
pub mod server;
pub mod transport;
pub mod wire;

pub use client::Client;
pub use config::{PkcConfig, SuiteBuilder, SymmetricConfig};
pub use context::SecureContext;
pub use error::{Error, Result};
pub use manager::CryptoManager;
pub use server::Server;
