//! Arbitrary-precision modular arithmetic and primality testing.
//!
//! Every PKC primitive in this crate (RSA, SSRSA, Goldwasser-Micali,
//! Blum-Goldwasser) is built on top of these few operations. Keeping them in
//! one place means the Miller-Rabin witness count and the prime search
//! strategy only need to be gotten right once.

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_traits::{One, Zero};
use rand::thread_rng;

/// Fast modular exponentiation: `base^exp mod modulus`.
///
/// `num-bigint` already implements repeated squaring under the hood via
/// `modpow`; this wrapper exists so call sites read in the vocabulary of the
/// protocol (`pow_mod`) rather than the library's.
pub fn pow_mod(base: &BigInt, exp: &BigInt, modulus: &BigInt) -> BigInt {
    base.modpow(exp, modulus)
}

/// Extended Euclidean algorithm. Returns `(g, x, y)` such that
/// `a*x + b*y == g == gcd(a, b)`.
pub fn egcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if a.is_zero() {
        return (b.clone(), BigInt::zero(), BigInt::one());
    }
    let (g, x1, y1) = egcd(&(b % a), a);
    let x = &y1 - (b / a) * &x1;
    (g, x, x1)
}

/// Computes `a^-1 mod m`, i.e. the `x` in `[0, m)` with `a*x ≡ 1 (mod m)`.
/// Returns `None` if `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    let (g, x, _) = egcd(a, m);
    if g != BigInt::one() && g != -BigInt::one() {
        return None;
    }
    let x = ((x % m) + m) % m;
    Some(x)
}

/// Miller-Rabin probabilistic primality test with `k` independent witnesses
/// drawn uniformly from `[1, n-2]`. Composites slip through with probability
/// at most `4^-k`; this never rejects a true prime.
pub fn miller_rabin(n: &BigInt, k: u32) -> bool {
    let zero = BigInt::zero();
    let one = BigInt::one();
    let two = &one + &one;

    if n < &two {
        return false;
    }
    if n == &two || n == &BigInt::from(3) {
        return true;
    }
    if (n % &two) == zero {
        return false;
    }

    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut r: u32 = 0;
    while (&d % &two) == zero {
        d /= &two;
        r += 1;
    }

    let mut rng = thread_rng();
    let lower = &one;
    let upper = n - &two;

    'witness: for _ in 0..k {
        if upper <= *lower {
            // n is tiny enough that there's no witness range left to sample;
            // we already handled n < 4 above, so this shouldn't trigger.
            break;
        }
        let a = rng.gen_bigint_range(lower, &upper);
        let mut x = pow_mod(&a, &d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..r.saturating_sub(1) {
            x = pow_mod(&x, &two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Draws a random odd `bits`-wide integer with the top bit set, then scans
/// forward by 2 until a Miller-Rabin-passing candidate is found.
pub fn random_prime(bits: u64) -> BigInt {
    let mut rng = thread_rng();
    let mut candidate: BigUint = rng.gen_biguint(bits);
    // Set the top bit so the result is genuinely `bits` wide, and the low
    // bit so it's odd.
    candidate.set_bit(bits - 1, true);
    candidate.set_bit(0, true);
    let mut candidate = BigInt::from(candidate);

    while !miller_rabin(&candidate, 20) {
        candidate += 2;
    }
    candidate
}

/// Converts a byte string to an unsigned integer, little-endian
/// (spec.md SS6: "RSA messages serialize as little-endian bytes").
pub fn bytes_to_uint_le(bytes: &[u8]) -> BigInt {
    BigInt::from_bytes_le(Sign::Plus, bytes)
}

/// Converts an unsigned integer back to its little-endian byte string.
pub fn uint_to_bytes_le(n: &BigInt) -> Vec<u8> {
    n.to_bytes_le().1
}
