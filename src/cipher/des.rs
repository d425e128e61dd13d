//! Single-round DES primitives shared by `triple_des`.
//!
//! Ground truth: `examples/original_source/final/crypto/DES.py`. The
//! source builds its permutation tables and key schedule directly against
//! bit arrays rather than packed words; this module keeps that same
//! bit-vector representation (`Vec<u8>` of `0`/`1`) so the table indices
//! below can be copied straight out of the Python source without
//! reinterpretation.

/// Converts a byte slice into a big-endian bit vector (bit 0 is the MSB of
/// the first byte), matching `bitarray`'s default packing.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Packs a bit vector (length a multiple of 8) back into bytes.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
        .collect()
}

fn permute_1indexed(bits: &[u8], map: &[usize]) -> Vec<u8> {
    map.iter().map(|&i| bits[i - 1]).collect()
}

fn permute_0indexed(bits: &[u8], map: &[usize]) -> Vec<u8> {
    map.iter().map(|&i| bits[i]).collect()
}

fn rol(bits: &mut Vec<u8>, num: usize) {
    for _ in 0..num {
        let front = bits.remove(0);
        bits.push(front);
    }
}

const IP_MAP: [usize; 64] = [
    58, 50, 42, 34, 26, 18, 10, 2, 60, 52, 44, 36, 28, 20, 12, 4, 62, 54, 46, 38, 30, 22, 14, 6,
    64, 56, 48, 40, 32, 24, 16, 8, 57, 49, 41, 33, 25, 17, 9, 1, 59, 51, 43, 35, 27, 19, 11, 3,
    61, 53, 45, 37, 29, 21, 13, 5, 63, 55, 47, 39, 31, 23, 15, 7,
];

const INV_IP_MAP: [usize; 64] = [
    40, 8, 48, 16, 56, 24, 64, 32, 39, 7, 47, 15, 55, 23, 63, 31, 38, 6, 46, 14, 54, 22, 62, 30,
    37, 5, 45, 13, 53, 21, 61, 29, 36, 4, 44, 12, 52, 20, 60, 28, 35, 3, 43, 11, 51, 19, 59, 27,
    34, 2, 42, 10, 50, 18, 58, 26, 33, 1, 41, 9, 49, 17, 57, 25,
];

const PC1_MAP: [usize; 56] = [
    56, 48, 40, 32, 24, 16, 8, 0, 57, 49, 41, 33, 25, 17, 9, 1, 58, 50, 42, 34, 26, 18, 10, 2, 59,
    51, 43, 35, 62, 54, 46, 38, 30, 22, 14, 6, 61, 53, 45, 37, 29, 21, 13, 5, 60, 52, 44, 36, 28,
    20, 12, 4, 27, 19, 11, 3,
];

const PC2_MAP: [usize; 48] = [
    13, 16, 10, 23, 0, 4, 2, 27, 14, 5, 20, 9, 22, 18, 11, 3, 25, 7, 15, 6, 26, 19, 12, 1, 40, 51,
    30, 36, 46, 54, 29, 39, 50, 44, 32, 47, 43, 48, 38, 55, 33, 53, 45, 41, 49, 35, 28, 31,
];

const EXPANSION_MAP: [usize; 48] = [
    32, 1, 2, 3, 4, 5, 4, 5, 6, 7, 8, 9, 8, 9, 10, 11, 12, 13, 12, 13, 14, 15, 16, 17, 16, 17, 18,
    19, 20, 21, 20, 21, 22, 23, 24, 25, 24, 25, 26, 27, 28, 29, 28, 29, 30, 31, 32, 1,
];

const P_MAP: [usize; 32] = [
    16, 7, 20, 21, 29, 12, 28, 17, 1, 15, 23, 26, 5, 18, 31, 10, 2, 8, 24, 14, 32, 27, 3, 9, 19,
    13, 30, 6, 22, 11, 4, 25,
];

/// Left shifts applied to each 28-bit key half before deriving round keys
/// `K1..K16`.
const ROTATION_SCHEDULE: [usize; 16] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

const S_BOXES: [[[u8; 16]; 4]; 8] = [
    [
        [14, 4, 13, 1, 2, 15, 11, 8, 3, 10, 6, 12, 5, 9, 0, 7],
        [0, 15, 7, 4, 14, 2, 13, 1, 10, 6, 12, 11, 9, 5, 3, 8],
        [4, 1, 14, 8, 13, 6, 2, 11, 15, 12, 9, 7, 3, 10, 5, 0],
        [15, 12, 8, 2, 4, 9, 1, 7, 5, 11, 3, 14, 10, 0, 6, 13],
    ],
    [
        [15, 1, 8, 14, 6, 11, 3, 4, 9, 7, 2, 13, 12, 0, 5, 10],
        [3, 13, 4, 7, 15, 2, 8, 14, 12, 0, 1, 10, 6, 9, 11, 5],
        [0, 14, 7, 11, 10, 4, 13, 1, 5, 8, 12, 6, 9, 3, 2, 15],
        [13, 8, 10, 1, 3, 15, 4, 2, 11, 6, 7, 12, 0, 5, 14, 9],
    ],
    [
        [10, 0, 9, 14, 6, 3, 15, 5, 1, 13, 12, 7, 11, 4, 2, 8],
        [13, 7, 0, 9, 3, 4, 6, 10, 2, 8, 5, 14, 12, 11, 15, 1],
        [13, 6, 4, 9, 8, 15, 3, 0, 11, 1, 2, 12, 5, 10, 14, 7],
        [1, 10, 13, 0, 6, 9, 8, 7, 4, 15, 14, 3, 11, 5, 2, 12],
    ],
    [
        [7, 13, 14, 3, 0, 6, 9, 10, 1, 2, 8, 5, 11, 12, 4, 15],
        [13, 8, 11, 5, 6, 15, 0, 3, 4, 7, 2, 12, 1, 10, 14, 9],
        [10, 6, 9, 0, 12, 11, 7, 13, 15, 1, 3, 14, 5, 2, 8, 4],
        [3, 15, 0, 6, 10, 1, 13, 8, 9, 4, 5, 11, 12, 7, 2, 14],
    ],
    [
        [2, 12, 4, 1, 7, 10, 11, 6, 8, 5, 3, 15, 13, 0, 14, 9],
        [14, 11, 2, 12, 4, 7, 13, 1, 5, 0, 15, 10, 3, 9, 8, 6],
        [4, 2, 1, 11, 10, 13, 7, 8, 15, 9, 12, 5, 6, 3, 0, 14],
        [11, 8, 12, 7, 1, 14, 2, 13, 6, 15, 0, 9, 10, 4, 5, 3],
    ],
    [
        [12, 1, 10, 15, 9, 2, 6, 8, 0, 13, 3, 4, 14, 7, 5, 11],
        [10, 15, 4, 2, 7, 12, 9, 5, 6, 1, 13, 14, 0, 11, 3, 8],
        [9, 14, 15, 5, 2, 8, 12, 3, 7, 0, 4, 10, 1, 13, 11, 6],
        [4, 3, 2, 12, 9, 5, 15, 10, 11, 14, 1, 7, 6, 0, 8, 13],
    ],
    [
        [4, 11, 2, 14, 15, 0, 8, 13, 3, 12, 9, 7, 5, 10, 6, 1],
        [13, 0, 11, 7, 4, 9, 1, 10, 14, 3, 5, 12, 2, 15, 8, 6],
        [1, 4, 11, 13, 12, 3, 7, 14, 10, 15, 6, 8, 0, 5, 9, 2],
        [6, 11, 13, 8, 1, 4, 10, 7, 9, 5, 0, 15, 14, 2, 3, 12],
    ],
    [
        [13, 2, 8, 4, 6, 15, 11, 1, 10, 9, 3, 14, 5, 0, 12, 7],
        [1, 15, 13, 8, 10, 3, 7, 4, 12, 5, 6, 11, 0, 14, 9, 2],
        [7, 11, 4, 1, 9, 12, 14, 2, 0, 6, 10, 13, 15, 3, 5, 8],
        [2, 1, 14, 7, 4, 10, 8, 13, 15, 12, 9, 0, 3, 5, 6, 11],
    ],
];

fn to_u8(bits: &[u8]) -> u8 {
    bits.iter().fold(0u8, |acc, &b| (acc << 1) | b)
}

fn to_bits4(value: u8) -> [u8; 4] {
    [
        (value >> 3) & 1,
        (value >> 2) & 1,
        (value >> 1) & 1,
        value & 1,
    ]
}

/// Derives the 16 round keys `K1..K16` from a 64-bit key.
pub fn key_schedule(key: &[u8]) -> [Vec<u8>; 16] {
    let p56 = permute_0indexed(key, &PC1_MAP);
    let mut l = p56[28..].to_vec();
    let mut r = p56[..28].to_vec();

    let mut keys: Vec<Vec<u8>> = Vec::with_capacity(16);
    for &shift in ROTATION_SCHEDULE.iter() {
        rol(&mut l, shift);
        rol(&mut r, shift);
        let mut combined = l.clone();
        combined.extend_from_slice(&r);
        keys.push(permute_0indexed(&combined, &PC2_MAP));
    }
    keys.try_into().unwrap()
}

/// The DES round function: expands `text` to 48 bits, mixes in the round
/// key, runs it through the 8 S-boxes, and applies the final permutation.
fn f(text: &[u8], key: &[u8]) -> Vec<u8> {
    let expanded = permute_1indexed(text, &EXPANSION_MAP);
    let mixed: Vec<u8> = expanded.iter().zip(key.iter()).map(|(a, b)| a ^ b).collect();

    let mut combined = Vec::with_capacity(32);
    for (i, sbox) in S_BOXES.iter().enumerate() {
        let chunk = &mixed[i * 6..i * 6 + 6];
        let row = (chunk[0] << 1) | chunk[5];
        let col = to_u8(&chunk[1..5]);
        let value = sbox[row as usize][col as usize];
        combined.extend_from_slice(&to_bits4(value));
    }

    permute_1indexed(&combined, &P_MAP)
}

/// Runs the 16-round Feistel network over a single 64-bit block. `keys` is
/// assumed already reversed by the caller for decryption.
pub fn des_block(plaintext: &[u8], keys: &[Vec<u8>; 16]) -> Vec<u8> {
    let permuted = permute_1indexed(plaintext, &IP_MAP);
    let mut l = permuted[32..].to_vec();
    let mut r = permuted[..32].to_vec();

    let (mut l_final, mut r_final) = (l.clone(), r.clone());
    for key in keys.iter() {
        let l_next = r.clone();
        let f_out = f(&r, key);
        let r_next: Vec<u8> = l.iter().zip(f_out.iter()).map(|(a, b)| a ^ b).collect();
        l = l_next;
        r = r_next;
        l_final = l.clone();
        r_final = r.clone();
    }

    let mut combined = l_final;
    combined.extend_from_slice(&r_final);
    permute_1indexed(&combined, &INV_IP_MAP)
}

/// Encrypts (`reverse = false`) or decrypts (`reverse = true`) a single
/// 64-bit block under `key` (64 bits, 8 parity bits included but unchecked).
pub fn des(plaintext: &[u8], key: &[u8], reverse: bool) -> Vec<u8> {
    let keys = key_schedule(key);
    if reverse {
        let mut reversed = keys;
        reversed.reverse();
        des_block(plaintext, &reversed)
    } else {
        des_block(plaintext, &keys)
    }
}
