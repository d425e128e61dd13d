//! `SecureContext`: wraps a cipher with a nonce and MAC envelope.
//!
//! Ground truth: `examples/original_source/final/crypto/secure_context.py`.
//! The three Python subclasses (`SymmetricContext`, `PublicKeyContext`,
//! `PrivateKeyContext`) differ only in which cipher method `_pad`'s output
//! is run through; that maps naturally onto a Rust enum over which
//! capability the context was built from.

use crate::cipher::{Pkc, Symmetric};
use crate::error::{Error, Result};
use crate::hash::{HmacSha1, Mac};
use crate::nonce::{Nonce, NonceGenerator, NonceVerifier, SequentialNonceGenerator, SequentialNonceVerifier};

enum Backing {
    Symmetric(Box<dyn Symmetric>),
    PublicKey(Box<dyn Pkc>),
    PrivateKey(Box<dyn Pkc>),
}

/// A cipher plus the nonce/MAC machinery that turns it into authenticated,
/// replay-resistant encryption.
pub struct SecureContext {
    backing: Backing,
    nonce_gen: SequentialNonceGenerator,
    nonce_ver: SequentialNonceVerifier,
    mac: HmacSha1,
}

impl SecureContext {
    /// Wraps a symmetric cipher.
    pub fn new_symmetric(
        algorithm: Box<dyn Symmetric>,
        nonce_gen: SequentialNonceGenerator,
        nonce_ver: SequentialNonceVerifier,
        mac: HmacSha1,
    ) -> Self {
        SecureContext {
            backing: Backing::Symmetric(algorithm),
            nonce_gen,
            nonce_ver,
            mac,
        }
    }

    /// Wraps a PKC's public-key operations.
    pub fn new_public_key(
        algorithm: Box<dyn Pkc>,
        nonce_gen: SequentialNonceGenerator,
        nonce_ver: SequentialNonceVerifier,
        mac: HmacSha1,
    ) -> Self {
        SecureContext {
            backing: Backing::PublicKey(algorithm),
            nonce_gen,
            nonce_ver,
            mac,
        }
    }

    /// Wraps a PKC's private-key operations.
    pub fn new_private_key(
        algorithm: Box<dyn Pkc>,
        nonce_gen: SequentialNonceGenerator,
        nonce_ver: SequentialNonceVerifier,
        mac: HmacSha1,
    ) -> Self {
        SecureContext {
            backing: Backing::PrivateKey(algorithm),
            nonce_gen,
            nonce_ver,
            mac,
        }
    }

    fn algorithm_name(&self) -> &'static str {
        match &self.backing {
            Backing::Symmetric(a) => a.name(),
            Backing::PublicKey(a) | Backing::PrivateKey(a) => a.name(),
        }
    }

    /// `"<cipher>_<nonce>_<mac>"`, the name used for suite negotiation.
    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.algorithm_name(),
            self.nonce_gen.name(),
            self.mac.name()
        )
    }

    /// Priority inherited from the underlying cipher.
    pub fn priority(&self) -> u32 {
        match &self.backing {
            Backing::Symmetric(a) => a.priority(),
            Backing::PublicKey(a) | Backing::PrivateKey(a) => a.priority(),
        }
    }

    /// Installs a new MAC key.
    pub fn set_mac_key(&mut self, key: Vec<u8>) {
        self.mac.set_key(key);
    }

    /// For a `Symmetric` context: generates and installs a fresh session key.
    pub fn gen_key(&mut self) -> Result<Vec<u8>> {
        match &mut self.backing {
            Backing::Symmetric(a) => Ok(a.gen_key()),
            _ => Err(Error::CryptoInvariant(
                "gen_key is only defined for symmetric contexts".into(),
            )),
        }
    }

    /// For a `Symmetric` context: installs `key` as the session key.
    pub fn set_key(&mut self, key: Vec<u8>) -> Result<()> {
        match &mut self.backing {
            Backing::Symmetric(a) => {
                a.set_key(key);
                Ok(())
            }
            _ => Err(Error::CryptoInvariant(
                "set_key is only defined for symmetric contexts".into(),
            )),
        }
    }

    /// The key (or key half) currently in use, as an opaque blob.
    pub fn get_key(&self) -> Vec<u8> {
        match &self.backing {
            Backing::Symmetric(a) => a.get_key(),
            Backing::PublicKey(a) => a.get_key_pair().0,
            Backing::PrivateKey(a) => a.get_key_pair().1,
        }
    }

    /// For a `PublicKey` context: returns a new context configured with a
    /// peer's public key, leaving the nonce/MAC state cloned from this one.
    pub fn copy_with_key(&self, pub_key: &[u8]) -> Result<SecureContext> {
        match &self.backing {
            Backing::PublicKey(a) => Ok(SecureContext {
                backing: Backing::PublicKey(a.copy_with_public_key(pub_key)),
                nonce_gen: self.nonce_gen.clone(),
                nonce_ver: self.nonce_ver.clone(),
                mac: self.mac.clone(),
            }),
            _ => Err(Error::CryptoInvariant(
                "copy_with_key is only defined for public-key contexts".into(),
            )),
        }
    }

    fn pad(&mut self, data: &[u8]) -> Vec<u8> {
        let nonce = self.nonce_gen.generate();
        let mut with_nonce = data.to_vec();
        with_nonce.extend_from_slice(nonce.as_bytes());

        let mac = self.mac.generate(&with_nonce);
        let mut framed = with_nonce;
        framed.extend_from_slice(&mac);
        framed
    }

    fn verify(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mac_len = self.mac.length();
        let nonce_len = self.nonce_gen.length();
        if data.len() < mac_len + nonce_len {
            return Err(Error::FrameMalformed(
                "decrypted frame shorter than nonce + MAC".into(),
            ));
        }

        let (field_and_nonce, expected_mac) = data.split_at(data.len() - mac_len);
        let actual_mac = self.mac.generate(field_and_nonce);
        if expected_mac != actual_mac.as_slice() {
            return Err(Error::MacMismatch {
                expected: hex::encode(expected_mac),
                actual: hex::encode(actual_mac),
            });
        }

        let (field, nonce_bytes) = field_and_nonce.split_at(field_and_nonce.len() - nonce_len);
        let nonce = std::str::from_utf8(nonce_bytes)
            .map_err(|e| Error::FrameMalformed(e.to_string()))?;
        if !self.nonce_ver.verify(nonce) {
            return Err(Error::NonceInvalid(nonce.to_string()));
        }
        self.nonce_ver.advance();

        Ok(field.to_vec())
    }

    /// Pads `data` with a nonce and MAC, then encrypts the whole envelope.
    pub fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let framed = self.pad(data);
        match &self.backing {
            Backing::Symmetric(a) => a.encrypt(&framed),
            Backing::PublicKey(a) => a.encrypt_public(&framed),
            Backing::PrivateKey(a) => a.encrypt_private(&framed),
        }
    }

    /// Decrypts `data`, then checks and strips its nonce and MAC.
    pub fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let framed = match &self.backing {
            Backing::Symmetric(a) => a.decrypt(data)?,
            Backing::PublicKey(a) => a.decrypt_public(data)?,
            Backing::PrivateKey(a) => a.decrypt_private(data)?,
        };
        self.verify(&framed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::rc4::Rc4;

    fn symmetric_context() -> SecureContext {
        let mut cipher = Rc4::default();
        cipher.gen_key();
        SecureContext::new_symmetric(
            Box::new(cipher),
            SequentialNonceGenerator::new(16),
            SequentialNonceVerifier::new(16),
            HmacSha1::new(b"mac_secret".to_vec()),
        )
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let mut ctx = symmetric_context();
        let ciphertext = ctx.encrypt(b"hello").unwrap();
        let plaintext = ctx.decrypt(&ciphertext).unwrap();
        assert_eq!(plaintext, b"hello");
    }

    #[test]
    fn tampered_ciphertext_fails_mac_or_nonce_check() {
        let mut ctx = symmetric_context();
        let mut ciphertext = ctx.encrypt(b"hello").unwrap();
        ciphertext[0] ^= 0xFF;
        assert!(ctx.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn replayed_message_is_rejected_by_nonce_verifier() {
        let mut ctx = symmetric_context();
        let first = ctx.encrypt(b"one").unwrap();
        assert!(ctx.decrypt(&first).is_ok());
        assert!(ctx.decrypt(&first).is_err());
    }

    #[test]
    fn name_composes_algorithm_nonce_and_mac() {
        let ctx = symmetric_context();
        assert_eq!(ctx.name(), "RC4_SequentialNonce_HMAC");
    }
}
