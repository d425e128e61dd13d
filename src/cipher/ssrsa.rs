//! SSRSA: RSA where the message is masked with a SHA-1-derived keystream
//! rather than encrypted directly, trading the semantic weaknesses of raw
//! textbook RSA for a second random value whose encryption carries the mask.
//!
//! Ground truth: `examples/original_source/final/crypto/SSRSA.py`. The
//! source hashes `hex(r)` (Python's `0x`-prefixed, minimal-width lowercase
//! hex rendering of the integer `r`) and repeats the 20-byte digest as an
//! XOR mask over the message, which is itself zero-padded on the left to a
//! multiple of 20 bytes.

use super::rsa::Rsa;
use super::{Cryptosystem, Pkc};
use crate::bigint::{bytes_to_uint_le, pow_mod, uint_to_bytes_le};
use crate::error::Result;
use crate::hash::sha1;
use num_bigint::{BigInt, RandBigInt};
use num_traits::Zero;
use rand::thread_rng;

const DIGEST_LEN: usize = 20;

fn python_hex(n: &BigInt) -> String {
    format!("0x{}", n.to_str_radix(16))
}

fn mask_with_digest(message: &[u8], digest: &[u8; DIGEST_LEN]) -> Vec<u8> {
    let remainder = message.len() % DIGEST_LEN;
    let pad = if remainder == 0 { 0 } else { DIGEST_LEN - remainder };
    let mut padded = vec![0u8; pad];
    padded.extend_from_slice(message);

    padded
        .iter()
        .enumerate()
        .map(|(i, b)| b ^ digest[i % DIGEST_LEN])
        .collect()
}

fn strip_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    bytes[skip..].to_vec()
}

/// RSA augmented with a SHA-1 masking scheme. Wraps a plain `Rsa` for key
/// management and the two raw modular-exponentiation primitives.
#[derive(Debug, Clone)]
pub struct Ssrsa {
    rsa: Rsa,
}

impl Ssrsa {
    /// Creates a key-less instance sized for `keysize`-bit moduli.
    pub fn new(keysize: u64) -> Self {
        Ssrsa { rsa: Rsa::new(keysize) }
    }

    fn random_r(&self) -> BigInt {
        let mut rng = thread_rng();
        rng.gen_bigint_range(&BigInt::zero(), &self.rsa.n)
    }
}

impl Cryptosystem for Ssrsa {
    fn name(&self) -> &'static str {
        "SSRSA"
    }

    fn priority(&self) -> u32 {
        1
    }
}

impl Pkc for Ssrsa {
    fn encrypt_public(&self, message: &[u8]) -> Result<Vec<u8>> {
        let r = self.random_r();
        let en1 = pow_mod(&r, &self.rsa.e, &self.rsa.n);
        let digest = sha1(python_hex(&r).as_bytes());
        let masked = mask_with_digest(message, &digest);

        let mut out = uint_to_bytes_le(&en1);
        out.push(0xFF);
        out.extend(masked);
        Ok(out)
    }

    fn encrypt_private(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.rsa.require_private()?;
        let r = self.random_r();
        let en1 = pow_mod(&r, &self.rsa.d, &self.rsa.n);
        let digest = sha1(python_hex(&r).as_bytes());
        let masked = mask_with_digest(message, &digest);

        let mut out = uint_to_bytes_le(&en1);
        out.push(0xFF);
        out.extend(masked);
        Ok(out)
    }

    fn decrypt_public(&self, message: &[u8]) -> Result<Vec<u8>> {
        let sep = message.iter().position(|&b| b == 0xFF).unwrap_or(0);
        let en1 = bytes_to_uint_le(&message[..sep]);
        let masked = &message[sep + 1..];

        let r = pow_mod(&en1, &self.rsa.e, &self.rsa.n);
        let digest = sha1(python_hex(&r).as_bytes());
        let unmasked = mask_with_digest(masked, &digest);
        Ok(strip_leading_zeros(&unmasked))
    }

    fn decrypt_private(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.rsa.require_private()?;
        let sep = message.iter().position(|&b| b == 0xFF).unwrap_or(0);
        let en1 = bytes_to_uint_le(&message[..sep]);
        let masked = &message[sep + 1..];

        let r = pow_mod(&en1, &self.rsa.d, &self.rsa.n);
        let digest = sha1(python_hex(&r).as_bytes());
        let unmasked = mask_with_digest(masked, &digest);
        Ok(strip_leading_zeros(&unmasked))
    }

    fn gen_key_pair(&mut self) -> (Vec<u8>, Vec<u8>) {
        self.rsa.gen_key_pair()
    }

    fn get_key_pair(&self) -> (Vec<u8>, Vec<u8>) {
        self.rsa.get_key_pair()
    }

    fn set_key_pair(&mut self, public_key: &[u8], private_key: &[u8]) {
        self.rsa.set_key_pair(public_key, private_key)
    }

    fn copy_with_public_key(&self, public_key: &[u8]) -> Box<dyn Pkc> {
        let mut copy = Ssrsa::new(0);
        copy.set_key_pair(public_key, &[]);
        Box::new(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_is_its_own_inverse() {
        let digest = sha1(b"whatever");
        let message = b"exactly twenty bytes";
        let masked = mask_with_digest(message, &digest);
        let unmasked = mask_with_digest(&masked, &digest);
        assert_eq!(strip_leading_zeros(&unmasked), message);
    }

    #[test]
    fn public_encrypt_private_decrypt_round_trips() {
        let mut ssrsa = Ssrsa::new(256);
        ssrsa.gen_key_pair();
        let message = b"ssrsa payload";
        let ciphertext = ssrsa.encrypt_public(message).unwrap();
        let recovered = ssrsa.decrypt_private(&ciphertext).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn private_encrypt_public_decrypt_round_trips() {
        let mut ssrsa = Ssrsa::new(256);
        ssrsa.gen_key_pair();
        let message = b"signed challenge";
        let ciphertext = ssrsa.encrypt_private(message).unwrap();
        let recovered = ssrsa.decrypt_public(&ciphertext).unwrap();
        assert_eq!(recovered, message);
    }
}
