//! Nonce generation and verification.
//!
//! Ground truth: `examples/original_source/final/crypto/nonce.py` and
//! `sequential_nonce.py`. A generator and its matching verifier are
//! initialized with the same bit length; the verifier accepts whatever value
//! it sees first (to pick up the peer's randomly chosen starting point) and
//! from then on requires exact agreement with its own counter, which the
//! caller advances once per accepted message.

use rand::RngCore;

/// Common interface implemented by every nonce scheme.
pub trait Nonce {
    /// A unique name for this nonce type.
    fn name(&self) -> &'static str;
}

/// Produces a stream of nonce values.
pub trait NonceGenerator: Nonce {
    /// Length of the nonces this generator produces, in hex characters.
    fn length(&self) -> usize;
    /// Advances and returns the next nonce value.
    fn generate(&mut self) -> String;
}

/// Verifies a stream of nonce values from a single peer. Stateful: one
/// instance per peer connection.
pub trait NonceVerifier: Nonce {
    /// Checks `nonce` against the expected value. Does not by itself advance
    /// the expected value -- call `advance` once the surrounding message has
    /// otherwise been accepted.
    fn verify(&mut self, nonce: &str) -> bool;
    /// Moves the expected value forward by one step.
    fn advance(&mut self);
}

fn hex_length(bits: u32) -> usize {
    ((bits + 3) / 4) as usize
}

fn format_nonce(value: u64, width: usize) -> String {
    let hex = format!("{:x}", value);
    format!("{}{}", "0".repeat(width.saturating_sub(hex.len())), hex)
}

/// A nonce that starts at a random value and increments forever, wrapping at
/// `2^(bits+1) - 1`.
#[derive(Debug, Clone)]
pub struct SequentialNonceGenerator {
    bits: u32,
    hex_length: usize,
    value: u64,
    max_value: u64,
}

impl SequentialNonceGenerator {
    /// Creates a generator producing `bits`-wide nonces, seeded with a
    /// random starting value.
    pub fn new(bits: u32) -> Self {
        let mut rng = rand::thread_rng();
        let seed = if bits >= 64 {
            rng.next_u64()
        } else {
            rng.next_u64() % (1u64 << bits)
        };
        SequentialNonceGenerator {
            bits,
            hex_length: hex_length(bits),
            value: seed,
            max_value: (1u64 << (bits + 1)) - 1,
        }
    }

    /// Returns the current nonce value without advancing it.
    pub fn get(&self) -> String {
        format_nonce(self.value, self.hex_length)
    }

    /// Overwrites the internal counter, e.g. to synchronize a verifier's
    /// generator with a peer's first observed nonce.
    pub fn set_state(&mut self, value: u64) {
        self.value = value;
    }
}

impl Nonce for SequentialNonceGenerator {
    fn name(&self) -> &'static str {
        "SequentialNonce"
    }
}

impl NonceGenerator for SequentialNonceGenerator {
    fn length(&self) -> usize {
        self.hex_length
    }

    fn generate(&mut self) -> String {
        self.value = (self.value + 1) % self.max_value;
        self.get()
    }
}

/// Verifies a stream of sequential nonces from one peer.
#[derive(Debug, Clone)]
pub struct SequentialNonceVerifier {
    generator: SequentialNonceGenerator,
    initialized: bool,
}

impl SequentialNonceVerifier {
    /// Creates a verifier expecting `bits`-wide nonces.
    pub fn new(bits: u32) -> Self {
        SequentialNonceVerifier {
            generator: SequentialNonceGenerator::new(bits),
            initialized: false,
        }
    }
}

impl Nonce for SequentialNonceVerifier {
    fn name(&self) -> &'static str {
        "SequentialNonce"
    }
}

impl NonceVerifier for SequentialNonceVerifier {
    fn verify(&mut self, nonce: &str) -> bool {
        let Ok(value) = u64::from_str_radix(nonce, 16) else {
            return false;
        };

        if !self.initialized {
            self.generator.set_state(value);
            self.initialized = true;
            return true;
        }

        nonce == self.generator.get()
    }

    fn advance(&mut self) {
        if !self.initialized {
            return;
        }
        self.generator.generate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_wraps_at_max_value() {
        let mut gen = SequentialNonceGenerator::new(4);
        gen.set_state(30); // max_value = 2^5 - 1 = 31
        assert_eq!(gen.generate(), "0");
    }

    #[test]
    fn generator_pads_to_fixed_width() {
        let mut gen = SequentialNonceGenerator::new(16);
        gen.set_state(0);
        assert_eq!(gen.generate(), "0001");
    }

    #[test]
    fn verifier_accepts_first_value_unconditionally() {
        let mut verifier = SequentialNonceVerifier::new(16);
        assert!(verifier.verify("abcd"));
    }

    #[test]
    fn verifier_tracks_the_peers_sequence() {
        let mut verifier = SequentialNonceVerifier::new(16);
        assert!(verifier.verify("00ff"));
        verifier.advance();
        assert!(verifier.verify("0100"));
        verifier.advance();
        assert!(!verifier.verify("0100"));
    }
}
