//! SHA-1 (FIPS 180-4 / the hash this protocol was specified against).
//!
//! Ported from the bit-level description in `examples/original_source/
//! final/crypto/SHA1.py`: pad with a single `1` bit, zero-pad to 448 mod
//! 512, append the 64-bit big-endian original bit length, then run 80
//! rounds per 512-bit block over the standard `f`/round-constant schedule.

const H0: [u32; 5] = [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];

/// Computes the 160-bit SHA-1 digest of `message`.
pub fn sha1(message: &[u8]) -> [u8; 20] {
    let padded = pad(message);

    let mut h = H0;
    for block in padded.chunks_exact(64) {
        process_block(block, &mut h);
    }

    let mut out = [0u8; 20];
    for (i, word) in h.iter().enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
    }
    out
}

/// Computes the SHA-1 digest and renders it as a lowercase `0x`-prefixed hex
/// string, matching the source's string representation of hash output.
pub fn sha1_hex(message: &[u8]) -> String {
    format!("0x{}", hex::encode(sha1(message)))
}

fn pad(message: &[u8]) -> Vec<u8> {
    let bit_len = (message.len() as u64) * 8;
    let mut padded = message.to_vec();
    padded.push(0x80);
    while padded.len() % 64 != 56 {
        padded.push(0);
    }
    padded.extend_from_slice(&bit_len.to_be_bytes());
    padded
}

fn process_block(block: &[u8], h: &mut [u32; 5]) {
    let mut w = [0u32; 80];
    for (i, word) in w.iter_mut().take(16).enumerate() {
        *word = u32::from_be_bytes(block[i * 4..i * 4 + 4].try_into().unwrap());
    }
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let (mut a, mut b, mut c, mut d, mut e) = (h[0], h[1], h[2], h[3], h[4]);

    for (i, &word) in w.iter().enumerate() {
        let (f, k) = match i {
            0..=19 => ((b & c) | ((!b) & d), 0x5A827999u32),
            20..=39 => (b ^ c ^ d, 0x6ED9EBA1),
            40..=59 => ((b & c) | (b & d) | (c & d), 0x8F1BBCDC),
            _ => (b ^ c ^ d, 0xCA62C1D6),
        };

        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(word);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    h[0] = h[0].wrapping_add(a);
    h[1] = h[1].wrapping_add(b);
    h[2] = h[2].wrapping_add(c);
    h[3] = h[3].wrapping_add(d);
    h[4] = h[4].wrapping_add(e);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message() {
        assert_eq!(sha1_hex(b""), "0xda39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn abc() {
        assert_eq!(sha1_hex(b"abc"), "0xa9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn multi_block_message() {
        let msg = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
        assert_eq!(
            sha1_hex(msg),
            "0x84983e441c3bd26ebaae4aa1f95129e5e54670f1"
        );
    }
}
