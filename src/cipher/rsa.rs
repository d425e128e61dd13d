//! Textbook RSA.
//!
//! Ground truth: `examples/original_source/final/crypto/RSA.py`. Messages
//! are treated as little-endian byte strings converted to integers (see
//! `bigint::bytes_to_uint_le`), encrypted with modular exponentiation, and
//! converted back.

use super::{Cryptosystem, Pkc};
use crate::bigint::{bytes_to_uint_le, mod_inverse, pow_mod, random_prime, uint_to_bytes_le};
use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_traits::Zero;
use rand::RngCore;

/// RSA keyed by `(e, n)` public and `d` private.
#[derive(Debug, Clone)]
pub struct Rsa {
    keysize: u64,
    pub(super) p: BigInt,
    pub(super) q: BigInt,
    pub(super) e: BigInt,
    pub(super) d: BigInt,
    pub(super) n: BigInt,
    has_private: bool,
}

impl Rsa {
    /// Creates a key-less instance sized for `keysize`-bit moduli. Call
    /// `gen_key_pair` or `set_key_pair` before use.
    pub fn new(keysize: u64) -> Self {
        Rsa {
            keysize,
            p: BigInt::zero(),
            q: BigInt::zero(),
            e: BigInt::zero(),
            d: BigInt::zero(),
            n: BigInt::zero(),
            has_private: false,
        }
    }

    pub(super) fn require_private(&self) -> Result<()> {
        if !self.has_private {
            return Err(Error::CryptoInvariant(
                "private key material absent on this context".into(),
            ));
        }
        Ok(())
    }

    fn modulus_bytes(&self) -> usize {
        (self.n.bits() as usize) / 8
    }

    /// Largest message this key can carry per call, after reserving two
    /// bytes of modulus width for `frame_plaintext`'s length suffix.
    fn max_bytes(&self) -> usize {
        self.modulus_bytes().saturating_sub(2)
    }

    fn check_size(&self, message: &[u8]) -> Result<()> {
        let max = self.max_bytes();
        if message.len() > max {
            return Err(Error::SizeError {
                got: message.len(),
                max,
            });
        }
        Ok(())
    }

    /// Zero-pads `message` out to the full modulus width and appends its
    /// true length in the last two bytes. `uint_to_bytes_le` drops
    /// trailing zero bytes when converting the decrypted value back, which
    /// would otherwise silently truncate any plaintext (such as a framed
    /// MAC) whose high-order byte happens to be zero; recording the exact
    /// length here lets `unframe_plaintext` undo that.
    fn frame_plaintext(&self, message: &[u8]) -> Vec<u8> {
        let width = self.modulus_bytes();
        let mut framed = vec![0u8; width];
        framed[..message.len()].copy_from_slice(message);
        framed[width - 2..].copy_from_slice(&(message.len() as u16).to_le_bytes());
        framed
    }

    fn unframe_plaintext(&self, decrypted: &[u8]) -> Result<Vec<u8>> {
        let width = self.modulus_bytes();
        let mut framed = decrypted.to_vec();
        framed.resize(width, 0);
        let len = u16::from_le_bytes([framed[width - 2], framed[width - 1]]) as usize;
        if len > width - 2 {
            return Err(Error::FrameMalformed(
                "RSA plaintext length suffix out of range".into(),
            ));
        }
        Ok(framed[..len].to_vec())
    }

    fn random_exponent(&self) -> BigInt {
        let mut rng = rand::thread_rng();
        let bytes = ((self.keysize + 7) / 8) as usize;
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        bytes_to_uint_le(&buf)
    }
}

impl Cryptosystem for Rsa {
    fn name(&self) -> &'static str {
        "RSA"
    }

    fn priority(&self) -> u32 {
        1
    }
}

impl Pkc for Rsa {
    fn encrypt_public(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.check_size(message)?;
        let m = bytes_to_uint_le(&self.frame_plaintext(message));
        Ok(uint_to_bytes_le(&pow_mod(&m, &self.e, &self.n)))
    }

    fn encrypt_private(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.require_private()?;
        self.check_size(message)?;
        let m = bytes_to_uint_le(&self.frame_plaintext(message));
        Ok(uint_to_bytes_le(&pow_mod(&m, &self.d, &self.n)))
    }

    fn decrypt_public(&self, message: &[u8]) -> Result<Vec<u8>> {
        let c = bytes_to_uint_le(message);
        self.unframe_plaintext(&uint_to_bytes_le(&pow_mod(&c, &self.e, &self.n)))
    }

    fn decrypt_private(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.require_private()?;
        let c = bytes_to_uint_le(message);
        self.unframe_plaintext(&uint_to_bytes_le(&pow_mod(&c, &self.d, &self.n)))
    }

    fn gen_key_pair(&mut self) -> (Vec<u8>, Vec<u8>) {
        let half = self.keysize / 2 + 1;
        loop {
            self.p = random_prime(half);
            self.q = random_prime(half);
            self.e = self.random_exponent();
            let phi = (&self.p - 1) * (&self.q - 1);
            match mod_inverse(&self.e, &phi) {
                Some(d) => {
                    self.d = d;
                    break;
                }
                None => continue,
            }
        }
        self.n = &self.p * &self.q;
        self.has_private = true;
        self.get_key_pair()
    }

    fn get_key_pair(&self) -> (Vec<u8>, Vec<u8>) {
        let mut public = uint_to_bytes_le(&self.e);
        public.push(0xFF); // separator: (e, n) are variable width
        public.extend(uint_to_bytes_le(&self.n));
        (public, uint_to_bytes_le(&self.d))
    }

    fn set_key_pair(&mut self, public_key: &[u8], private_key: &[u8]) {
        let sep = public_key
            .iter()
            .position(|&b| b == 0xFF)
            .unwrap_or(public_key.len());
        self.e = bytes_to_uint_le(&public_key[..sep]);
        self.n = bytes_to_uint_le(&public_key[sep + 1..]);
        self.has_private = !private_key.is_empty();
        self.d = bytes_to_uint_le(private_key);
    }

    fn copy_with_public_key(&self, public_key: &[u8]) -> Box<dyn Pkc> {
        let mut copy = Rsa::new(self.keysize);
        copy.set_key_pair(public_key, &[]);
        Box::new(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_public_decrypt_private_round_trips() {
        let mut rsa = Rsa::new(256);
        rsa.gen_key_pair();
        let message = b"hello rsa";
        let ciphertext = rsa.encrypt_public(message).unwrap();
        let recovered = rsa.decrypt_private(&ciphertext).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn encrypt_private_decrypt_public_round_trips() {
        let mut rsa = Rsa::new(256);
        rsa.gen_key_pair();
        let message = b"challenge-response";
        let ciphertext = rsa.encrypt_private(message).unwrap();
        let recovered = rsa.decrypt_public(&ciphertext).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn a_trailing_zero_byte_survives_the_round_trip() {
        // uint_to_bytes_le drops trailing zero bytes from the decrypted
        // value; a message ending in 0x00 is exactly the case that would
        // come back one byte short without the length suffix.
        let mut rsa = Rsa::new(256);
        rsa.gen_key_pair();
        let message = [b'x', b'y', b'z', 0x00];
        let ciphertext = rsa.encrypt_public(&message).unwrap();
        let recovered = rsa.decrypt_private(&ciphertext).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn oversized_message_is_rejected() {
        let mut rsa = Rsa::new(64);
        rsa.gen_key_pair();
        let big = vec![0xFFu8; 64];
        assert!(matches!(
            rsa.encrypt_public(&big),
            Err(Error::SizeError { .. })
        ));
    }

    #[test]
    fn key_pair_round_trips_through_set_key_pair() {
        let mut rsa = Rsa::new(256);
        let (pub_key, priv_key) = rsa.gen_key_pair();
        let mut other = Rsa::new(256);
        other.set_key_pair(&pub_key, &priv_key);
        assert_eq!(other.n, rsa.n);
        assert_eq!(other.e, rsa.e);
        assert_eq!(other.d, rsa.d);
    }
}
