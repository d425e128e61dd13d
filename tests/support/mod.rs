//! Identity/no-op cryptosystem test doubles, so `SecureContext` and
//! `CryptoManager` plumbing can be exercised without paying for real crypto.
//!
//! Ground truth: `examples/original_source/final/crypto/stupid_symmetric.py`
//! and `stupid_pkc.py`. The source also has `StupidMAC`/`StupidNonce`
//! doubles, but this crate's `SecureContext` holds its nonce generator,
//! nonce verifier, and MAC concretely rather than behind a trait object (see
//! DESIGN.md), so only the cipher half is swappable here.

#![allow(dead_code)]

use securechan::cipher::{Cryptosystem, Pkc, Symmetric};
use securechan::error::Result;

/// A symmetric "cipher" that returns its input unchanged.
#[derive(Debug, Clone, Default)]
pub struct StupidSymmetric {
    key: Vec<u8>,
}

impl Cryptosystem for StupidSymmetric {
    fn name(&self) -> &'static str {
        "Stupid"
    }

    fn priority(&self) -> u32 {
        0
    }
}

impl Symmetric for StupidSymmetric {
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(message.to_vec())
    }

    fn decrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(message.to_vec())
    }

    fn gen_key(&mut self) -> Vec<u8> {
        self.key = b"stupid-key".to_vec();
        self.key.clone()
    }

    fn get_key(&self) -> Vec<u8> {
        self.key.clone()
    }

    fn set_key(&mut self, key: Vec<u8>) {
        self.key = key;
    }
}

/// A PKC "cipher" that returns its input unchanged under every operation.
#[derive(Debug, Clone, Default)]
pub struct StupidPkc {
    public_key: Vec<u8>,
    private_key: Vec<u8>,
}

impl Cryptosystem for StupidPkc {
    fn name(&self) -> &'static str {
        "Stupid"
    }

    fn priority(&self) -> u32 {
        0
    }
}

impl Pkc for StupidPkc {
    fn encrypt_public(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(message.to_vec())
    }

    fn encrypt_private(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(message.to_vec())
    }

    fn decrypt_public(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(message.to_vec())
    }

    fn decrypt_private(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(message.to_vec())
    }

    fn gen_key_pair(&mut self) -> (Vec<u8>, Vec<u8>) {
        self.public_key = b"stupid-public".to_vec();
        self.private_key = b"stupid-private".to_vec();
        (self.public_key.clone(), self.private_key.clone())
    }

    fn get_key_pair(&self) -> (Vec<u8>, Vec<u8>) {
        (self.public_key.clone(), self.private_key.clone())
    }

    fn set_key_pair(&mut self, public_key: &[u8], private_key: &[u8]) {
        self.public_key = public_key.to_vec();
        self.private_key = private_key.to_vec();
    }

    fn copy_with_public_key(&self, public_key: &[u8]) -> Box<dyn Pkc> {
        Box::new(StupidPkc {
            public_key: public_key.to_vec(),
            private_key: Vec::new(),
        })
    }
}
