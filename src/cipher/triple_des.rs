//! 3DES-EDE in chained-ECB mode, with the source's "ENDMESS" sentinel
//! padding scheme.
//!
//! Ground truth: `examples/original_source/final/crypto/DES.py`
//! (`TripleDES`, `blockChainTripleDES`, `tripleDES`).

use super::des::{bits_to_bytes, bytes_to_bits, des};
use super::{Cryptosystem, Symmetric};
use crate::error::{Error, Result};
use rand::RngCore;

const BLOCK_BYTES: usize = 8;
const END_SENTINEL: &[u8] = b"ENDMESS";

/// Three independent 64-bit DES keys applied as encrypt-decrypt-encrypt.
#[derive(Debug, Clone, Default)]
pub struct TripleDes {
    key1: Vec<u8>,
    key2: Vec<u8>,
    key3: Vec<u8>,
}

fn triple_des_block(block: &[u8], key1: &[u8], key2: &[u8], key3: &[u8], decrypt: bool) -> Vec<u8> {
    if decrypt {
        let a = des(block, key3, true);
        let b = des(&a, key2, false);
        des(&b, key1, true)
    } else {
        let a = des(block, key1, false);
        let b = des(&a, key2, true);
        des(&b, key3, false)
    }
}

fn block_chain(bits: &[u8], key1: &[u8], key2: &[u8], key3: &[u8], decrypt: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(bits.len());
    for block in bits.chunks_exact(64) {
        out.extend(triple_des_block(block, key1, key2, key3, decrypt));
    }
    out
}

impl TripleDes {
    /// Creates an instance with no key material set; call `gen_key` or
    /// `set_key` before use.
    pub fn new() -> Self {
        TripleDes::default()
    }

    fn random_key() -> Vec<u8> {
        let mut rng = rand::thread_rng();
        let mut key = vec![0u8; BLOCK_BYTES];
        rng.fill_bytes(&mut key);
        key
    }
}

impl Cryptosystem for TripleDes {
    fn name(&self) -> &'static str {
        "TripleDES"
    }

    fn priority(&self) -> u32 {
        1
    }
}

impl Symmetric for TripleDes {
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        let mut padded = message.to_vec();
        padded.extend_from_slice(END_SENTINEL);
        let mut bits = bytes_to_bits(&padded);
        while bits.len() % 64 != 0 {
            bits.push(0);
        }

        let key1 = bytes_to_bits(&self.key1);
        let key2 = bytes_to_bits(&self.key2);
        let key3 = bytes_to_bits(&self.key3);
        let cipher_bits = block_chain(&bits, &key1, &key2, &key3, false);
        Ok(bits_to_bytes(&cipher_bits))
    }

    fn decrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        let bits = bytes_to_bits(message);
        if bits.len() % 64 != 0 {
            return Err(Error::FrameMalformed(
                "ciphertext is not a multiple of the DES block size".into(),
            ));
        }

        let key1 = bytes_to_bits(&self.key1);
        let key2 = bytes_to_bits(&self.key2);
        let key3 = bytes_to_bits(&self.key3);
        let plain_bits = block_chain(&bits, &key1, &key2, &key3, true);
        let plain_bytes = bits_to_bytes(&plain_bits);

        let end = find_subslice(&plain_bytes, END_SENTINEL).unwrap_or(plain_bytes.len());
        Ok(plain_bytes[..end].to_vec())
    }

    fn gen_key(&mut self) -> Vec<u8> {
        self.key1 = Self::random_key();
        self.key2 = Self::random_key();
        self.key3 = Self::random_key();
        self.get_key()
    }

    fn get_key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(BLOCK_BYTES * 3);
        key.extend_from_slice(&self.key1);
        key.extend_from_slice(&self.key2);
        key.extend_from_slice(&self.key3);
        key
    }

    fn set_key(&mut self, key: Vec<u8>) {
        self.key1 = key[0..BLOCK_BYTES].to_vec();
        self.key2 = key[BLOCK_BYTES..BLOCK_BYTES * 2].to_vec();
        self.key3 = key[BLOCK_BYTES * 2..BLOCK_BYTES * 3].to_vec();
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypt_undoes_encrypt() {
        let mut cipher = TripleDes::new();
        cipher.gen_key();
        let plaintext = b"The quick brown fox jumps over the lazy dog";
        let ciphertext = cipher.encrypt(plaintext).unwrap();
        let recovered = cipher.decrypt(&ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn ciphertext_length_is_block_aligned() {
        let mut cipher = TripleDes::new();
        cipher.gen_key();
        let ciphertext = cipher.encrypt(b"short").unwrap();
        assert_eq!(ciphertext.len() % 8, 0);
    }

    #[test]
    fn get_key_round_trips_through_set_key() {
        let mut cipher = TripleDes::new();
        let key = cipher.gen_key();
        let mut other = TripleDes::new();
        other.set_key(key.clone());
        assert_eq!(other.get_key(), key);
    }
}
