//! Goldwasser-Micali probabilistic encryption.
//!
//! Ground truth:
//! `examples/original_source/final/crypto/GoldwasserMicali.py`. Encrypts
//! bit by bit: each ciphertext integer is a random quadratic residue times
//! `x^bit mod n`, where `x` is a quadratic non-residue modulo both `p` and
//! `q`. The source has no `encrypt_private`/`decrypt_public` direction; this
//! crate reports `CryptoInvariant` for those, same as a `copy_with_public_key`
//! clone reports it for `decrypt_private`.

use super::{Cryptosystem, Pkc};
use crate::bigint::{pow_mod, random_prime};
use crate::error::{Error, Result};
use num_bigint::{BigInt, RandBigInt};
use num_traits::{One, Zero};
use rand::thread_rng;

/// Goldwasser-Micali keyed by public `(x, n)` and private `(p, q)`.
#[derive(Debug, Clone)]
pub struct GoldwasserMicali {
    keysize: u64,
    p: BigInt,
    q: BigInt,
    n: BigInt,
    x: BigInt,
    has_private: bool,
}

fn legendre_symbol(a: &BigInt, p: &BigInt) -> i8 {
    let exp = (p - 1) / 2;
    let result = pow_mod(a, &exp, p);
    if result == p - 1 {
        -1
    } else if result.is_zero() {
        0
    } else {
        1
    }
}

fn is_residue_mod(x: &BigInt, p: &BigInt) -> bool {
    let exp = (p - 1) / 2;
    pow_mod(&(x % p), &exp, p) == BigInt::one()
}

impl GoldwasserMicali {
    /// Creates a key-less instance sized for `keysize`-bit moduli.
    pub fn new(keysize: u64) -> Self {
        GoldwasserMicali {
            keysize,
            p: BigInt::zero(),
            q: BigInt::zero(),
            n: BigInt::zero(),
            x: BigInt::zero(),
            has_private: false,
        }
    }

    fn require_private(&self) -> Result<()> {
        if !self.has_private {
            return Err(Error::CryptoInvariant(
                "private key material absent on this context".into(),
            ));
        }
        Ok(())
    }

    fn random_below_n_excluding_factors(&self) -> BigInt {
        let mut rng = thread_rng();
        loop {
            let candidate = rng.gen_bigint_range(&BigInt::zero(), &self.n);
            if candidate != self.p && candidate != self.q {
                return candidate;
            }
        }
    }
}

impl Cryptosystem for GoldwasserMicali {
    fn name(&self) -> &'static str {
        "GoldwasserMicali"
    }

    fn priority(&self) -> u32 {
        3
    }
}

impl Pkc for GoldwasserMicali {
    fn encrypt_public(&self, message: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for byte in message {
            for shift in (0..8).rev() {
                let bit = (byte >> shift) & 1;
                let r = self.random_below_n_excluding_factors();
                let r_squared = (&r * &r) % &self.n;
                let cipher_num = if bit == 0 {
                    r_squared
                } else {
                    (&r_squared * &self.x) % &self.n
                };
                out.extend_from_slice(cipher_num.to_str_radix(10).as_bytes());
                out.push(b',');
            }
        }
        out.pop();
        Ok(out)
    }

    fn encrypt_private(&self, _message: &[u8]) -> Result<Vec<u8>> {
        Err(Error::CryptoInvariant(
            "GoldwasserMicali does not support private-key encryption".into(),
        ))
    }

    fn decrypt_public(&self, _message: &[u8]) -> Result<Vec<u8>> {
        Err(Error::CryptoInvariant(
            "GoldwasserMicali does not support public-key decryption".into(),
        ))
    }

    fn decrypt_private(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.require_private()?;
        let text = std::str::from_utf8(message)
            .map_err(|e| Error::FrameMalformed(e.to_string()))?;

        let mut bits = Vec::new();
        for token in text.split(',') {
            let num: BigInt = token
                .parse()
                .map_err(|_| Error::FrameMalformed(format!("not an integer: {token}")))?;
            let is_qr = is_residue_mod(&num, &self.p) && is_residue_mod(&num, &self.q);
            bits.push(if is_qr { 0u8 } else { 1u8 });
        }

        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, bit) in bits.iter().enumerate() {
            if *bit == 1 {
                bytes[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        Ok(bytes)
    }

    fn gen_key_pair(&mut self) -> (Vec<u8>, Vec<u8>) {
        let half = self.keysize / 2 + 1;
        loop {
            self.p = random_prime(half);
            self.q = random_prime(half);
            let smaller = if self.p < self.q { &self.p } else { &self.q };
            let mut rng = thread_rng();
            self.x = rng.gen_bigint_range(&BigInt::zero(), smaller);
            if legendre_symbol(&self.x, &self.p) == -1 && legendre_symbol(&self.x, &self.q) == -1 {
                break;
            }
        }
        self.n = &self.p * &self.q;
        self.has_private = true;
        self.get_key_pair()
    }

    fn get_key_pair(&self) -> (Vec<u8>, Vec<u8>) {
        let public = format!("{},{}", self.x, self.n).into_bytes();
        let private = format!("{},{}", self.p, self.q).into_bytes();
        (public, private)
    }

    fn set_key_pair(&mut self, public_key: &[u8], private_key: &[u8]) {
        let public = String::from_utf8_lossy(public_key);
        let mut parts = public.splitn(2, ',');
        self.x = parts.next().unwrap_or("0").parse().unwrap_or_else(|_| BigInt::zero());
        self.n = parts.next().unwrap_or("0").parse().unwrap_or_else(|_| BigInt::zero());

        if private_key.is_empty() {
            self.has_private = false;
            return;
        }
        let private = String::from_utf8_lossy(private_key);
        let mut parts = private.splitn(2, ',');
        self.p = parts.next().unwrap_or("0").parse().unwrap_or_else(|_| BigInt::zero());
        self.q = parts.next().unwrap_or("0").parse().unwrap_or_else(|_| BigInt::zero());
        self.has_private = true;
    }

    fn copy_with_public_key(&self, public_key: &[u8]) -> Box<dyn Pkc> {
        let mut copy = GoldwasserMicali::new(self.keysize);
        copy.set_key_pair(public_key, &[]);
        Box::new(copy)
    }
}
