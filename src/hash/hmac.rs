//! HMAC-SHA1, and the `Mac` trait that `SecureContext` authenticates frames
//! with.
//!
//! Ground truth: `examples/original_source/final/crypto/HMAC.py`. This
//! crate represents a MAC tag as raw bytes end-to-end (spec.md SS4.3 leaves
//! the choice between a 20-byte and a 40-hex-char representation to the
//! implementation, as long as it's used consistently) -- see DESIGN.md.

use super::sha1::sha1;

const BLOCK_BYTES: usize = 64; // 512 bits
const OPAD: u8 = 0x5C;
const IPAD: u8 = 0x36;

/// Common interface for all MAC algorithms (spec.md SS3).
pub trait Mac {
    /// A unique name for this MAC algorithm.
    fn name(&self) -> &'static str;
    /// Tag size in bytes.
    fn length(&self) -> usize;
    /// Generates a MAC tag over `data` under the currently set key.
    fn generate(&self, data: &[u8]) -> Vec<u8>;
    /// Sets a new key for the MAC.
    fn set_key(&mut self, key: Vec<u8>);
}

/// HMAC with a SHA-1 compression function and a 512-bit block size.
#[derive(Debug, Clone)]
pub struct HmacSha1 {
    key: Vec<u8>,
}

impl HmacSha1 {
    /// Creates a new instance keyed with `key`.
    pub fn new(key: Vec<u8>) -> Self {
        HmacSha1 { key }
    }
}

impl Mac for HmacSha1 {
    fn name(&self) -> &'static str {
        "HMAC"
    }

    fn length(&self) -> usize {
        20
    }

    fn generate(&self, data: &[u8]) -> Vec<u8> {
        hmac_sha1(&self.key, data).to_vec()
    }

    fn set_key(&mut self, key: Vec<u8>) {
        self.key = key;
    }
}

/// Computes `SHA1((key XOR opad) || SHA1((key XOR ipad) || message))`.
pub fn hmac_sha1(key: &[u8], message: &[u8]) -> [u8; 20] {
    let block = {
        let mut block = [0u8; BLOCK_BYTES];
        if key.len() > BLOCK_BYTES {
            let hashed = sha1(key);
            block[..hashed.len()].copy_from_slice(&hashed);
        } else {
            block[..key.len()].copy_from_slice(key);
        }
        block
    };

    let mut inner = Vec::with_capacity(BLOCK_BYTES + message.len());
    inner.extend(block.iter().map(|b| b ^ IPAD));
    inner.extend_from_slice(message);
    let inner_hash = sha1(&inner);

    let mut outer = Vec::with_capacity(BLOCK_BYTES + inner_hash.len());
    outer.extend(block.iter().map(|b| b ^ OPAD));
    outer.extend_from_slice(&inner_hash);
    sha1(&outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 2202 test vectors.
    #[test]
    fn rfc2202_vector_1() {
        let key = [0x0bu8; 20];
        let tag = hmac_sha1(&key, b"Hi There");
        assert_eq!(hex::encode(tag), "b617318655057264e28bc0b6fb378c8ef146be00");
    }

    #[test]
    fn rfc2202_vector_2() {
        let tag = hmac_sha1(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(hex::encode(tag), "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
    }

    #[test]
    fn rfc2202_vector_empty() {
        let tag = hmac_sha1(b"", b"");
        assert_eq!(hex::encode(tag), "fbdb1d1b18aa6c08324b7d64b71fb76370690e1d");
    }

    #[test]
    fn mac_trait_round_trips_key_change() {
        let mut mac = HmacSha1::new(b"key-one".to_vec());
        let first = mac.generate(b"payload");
        mac.set_key(b"key-two".to_vec());
        let second = mac.generate(b"payload");
        assert_ne!(first, second);
        assert_eq!(mac.length(), 20);
        assert_eq!(mac.name(), "HMAC");
    }
}
