//! RC4 stream cipher.
//!
//! Ground truth: `examples/original_source/final/crypto/RC4.py`. The source
//! works key and stream bits through a `bitarray`; standard RC4's KSA/PRGA
//! over a 256-byte permutation table produces the identical keystream byte
//! for byte, so we implement it directly against `u8` state.

use super::{Cryptosystem, Symmetric};
use crate::error::Result;
use rand::RngCore;

const DEFAULT_KEY_BITS: usize = 56;

fn bits_to_bytes(bits: usize) -> usize {
    (bits + 7) / 8
}

/// RC4 keyed with a (by default 56-bit, i.e. 7-byte) key.
#[derive(Debug, Clone)]
pub struct Rc4 {
    key_bits: usize,
    key: Vec<u8>,
}

impl Rc4 {
    /// Creates an instance with an all-zero key of `key_bits` bits.
    pub fn new(key_bits: usize) -> Self {
        Rc4 {
            key_bits,
            key: vec![0u8; bits_to_bytes(key_bits)],
        }
    }

    fn ksa(&self) -> [u8; 256] {
        let mut s: [u8; 256] = {
            let mut arr = [0u8; 256];
            for (i, slot) in arr.iter_mut().enumerate() {
                *slot = i as u8;
            }
            arr
        };
        let mut j: usize = 0;
        for i in 0..256 {
            j = (j + s[i] as usize + self.key[i % self.key.len()] as usize) % 256;
            s.swap(i, j);
        }
        s
    }

    fn keystream(&self, len: usize) -> Vec<u8> {
        let mut s = self.ksa();
        let mut i: usize = 0;
        let mut j: usize = 0;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            i = (i + 1) % 256;
            j = (j + s[i] as usize) % 256;
            s.swap(i, j);
            out.push(s[(s[i] as usize + s[j] as usize) % 256]);
        }
        out
    }
}

impl Default for Rc4 {
    fn default() -> Self {
        Rc4::new(DEFAULT_KEY_BITS)
    }
}

impl Cryptosystem for Rc4 {
    fn name(&self) -> &'static str {
        "RC4"
    }

    fn priority(&self) -> u32 {
        1
    }
}

impl Symmetric for Rc4 {
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        let ks = self.keystream(message.len());
        Ok(message.iter().zip(ks.iter()).map(|(m, k)| m ^ k).collect())
    }

    fn decrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        // RC4 is an XOR stream cipher: decryption is the same operation.
        self.encrypt(message)
    }

    fn gen_key(&mut self) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        let mut key = vec![0u8; bits_to_bytes(self.key_bits)];
        rng.fill_bytes(&mut key);
        self.key = key.clone();
        key
    }

    fn get_key(&self) -> Vec<u8> {
        self.key.clone()
    }

    fn set_key(&mut self, key: Vec<u8>) {
        self.key_bits = key.len() * 8;
        self.key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypt_undoes_encrypt() {
        let mut cipher = Rc4::default();
        cipher.set_key(b"secretkey".to_vec());
        let plaintext = b"Attack at dawn";
        let ciphertext = cipher.encrypt(plaintext).unwrap();
        assert_ne!(ciphertext, plaintext);
        let recovered = cipher.decrypt(&ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn matches_known_test_vector() {
        // RFC 6229, key "Key", plaintext "Plaintext".
        let mut cipher = Rc4::default();
        cipher.set_key(b"Key".to_vec());
        let ciphertext = cipher.encrypt(b"Plaintext").unwrap();
        assert_eq!(hex::encode(ciphertext), "bbf316e8d940af0ad3");
    }

    #[test]
    fn gen_key_changes_state() {
        let mut cipher = Rc4::default();
        let k1 = cipher.gen_key();
        let k2 = cipher.gen_key();
        assert_ne!(k1, k2);
        assert_eq!(cipher.get_key(), k2);
    }
}
