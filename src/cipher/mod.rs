//! Symmetric and public-key cryptosystem capability traits.
//!
//! Ground truth: `examples/original_source/final/crypto/cryptosystem.py`.
//! Every cipher implemented here (RC4, 3DES, RSA, SSRSA, Goldwasser-Micali,
//! Blum-Goldwasser) picks up one of the two traits below; `CryptoManager`
//! only ever talks to ciphers through them.

pub mod blum_goldwasser;
pub mod des;
pub mod goldwasser_micali;
pub mod rc4;
pub mod rsa;
pub mod ssrsa;
pub mod triple_des;

use crate::error::Result;

/// Properties shared by every cryptosystem: a name for negotiation and a
/// priority for breaking ties between mutually supported ones.
pub trait Cryptosystem {
    /// A unique name for this cryptosystem.
    fn name(&self) -> &'static str;
    /// Higher priority wins when more than one algorithm is supported by
    /// both parties of a handshake.
    fn priority(&self) -> u32;
}

/// A symmetric cryptosystem: one key encrypts and decrypts.
pub trait Symmetric: Cryptosystem {
    /// Encrypts `message` under the current key.
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>>;
    /// Decrypts `message` under the current key.
    fn decrypt(&self, message: &[u8]) -> Result<Vec<u8>>;
    /// Generates and installs a new random key, returning it.
    fn gen_key(&mut self) -> Vec<u8>;
    /// Returns the key currently in use.
    fn get_key(&self) -> Vec<u8>;
    /// Installs `key` as the current key.
    fn set_key(&mut self, key: Vec<u8>);
}

/// A public-key cryptosystem.
pub trait Pkc: Cryptosystem {
    /// Encrypts `message` under the public key.
    fn encrypt_public(&self, message: &[u8]) -> Result<Vec<u8>>;
    /// Encrypts `message` under the private key (used for signing-style
    /// challenge responses, not confidentiality).
    fn encrypt_private(&self, message: &[u8]) -> Result<Vec<u8>>;
    /// Decrypts `message` using the public key.
    fn decrypt_public(&self, message: &[u8]) -> Result<Vec<u8>>;
    /// Decrypts `message` using the private key.
    fn decrypt_private(&self, message: &[u8]) -> Result<Vec<u8>>;
    /// Generates and installs a new random key pair, returning
    /// `(public, private)` as opaque serialized blobs.
    fn gen_key_pair(&mut self) -> (Vec<u8>, Vec<u8>);
    /// Returns the currently set `(public, private)` key pair.
    fn get_key_pair(&self) -> (Vec<u8>, Vec<u8>);
    /// Installs a new key pair. The caller is responsible for the keys
    /// being a valid pair.
    fn set_key_pair(&mut self, public_key: &[u8], private_key: &[u8]);
    /// Creates a copy of this cryptosystem configured with a peer's public
    /// key; what the copy's private key is left unspecified.
    fn copy_with_public_key(&self, public_key: &[u8]) -> Box<dyn Pkc>;
}
