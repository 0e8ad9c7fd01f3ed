use num_bigint::{BigInt, BigUint, ModInverse, RandBigInt, Sign, ToBigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

/// Return `2^bits`.
pub fn pow2(bits: usize) -> BigUint {
    BigUint::one() << bits
}

/// Sample an integer uniformly from `[0, 2^bits)`.
pub fn sample_bits(rng: &mut impl CryptoRngCore, bits: usize) -> BigUint {
    rng.gen_biguint(bits)
}

/// Sample an integer uniformly from `[0, bound)`.
pub fn sample_below(rng: &mut impl CryptoRngCore, bound: &BigUint) -> BigUint {
    rng.gen_biguint_below(bound)
}

/// Sample a uniform unit of `Z_n`.
///
/// Draws that share a factor with `n` are rejected and redrawn.
pub fn sample_unit(rng: &mut impl CryptoRngCore, n: &BigUint) -> BigUint {
    loop {
        let r = rng.gen_biguint_below(n);
        if is_unit(&r, n) {
            return r;
        }
    }
}

/// Check whether `x` is a canonical representative of a unit of `Z_n`.
pub fn is_unit(x: &BigUint, n: &BigUint) -> bool {
    !x.is_zero() && x < n && x.gcd(n).is_one()
}

/// Compute the inverse of `a` modulo `m`, if it exists.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let inv = a.clone().mod_inverse(m)?;
    let m = BigInt::from_biguint(Sign::Plus, m.clone());
    (((inv % &m) + &m) % &m).to_biguint()
}

/// Compute the Jacobi symbol `(a / n)`, for an odd `n`.
///
/// With `n` prime, this is the Legendre symbol, telling whether `a` is a square mod `n`.
pub fn jacobi(a: &BigUint, n: &BigUint) -> i8 {
    let low = |x: &BigUint| x.to_bytes_le()[0];

    let mut a = a % n;
    let mut n = n.clone();
    let mut symbol = 1;
    while !a.is_zero() {
        while a.is_even() {
            a = a >> 1usize;
            if matches!(low(&n) & 7, 3 | 5) {
                symbol = -symbol;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if low(&a) & 3 == 3 && low(&n) & 3 == 3 {
            symbol = -symbol;
        }
        a = &a % &n;
    }
    if n.is_one() {
        symbol
    } else {
        0
    }
}

/// Arithmetic modulo a fixed modulus.
///
/// Each verifier owns the contexts for the moduli it works under, and they
/// live exactly as long as the verifier.
#[derive(Debug, Clone)]
pub struct ModulusContext {
    modulus: BigUint,
}

impl ModulusContext {
    pub fn new(modulus: BigUint) -> Self {
        Self { modulus }
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    pub fn pow(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        base.modpow(exponent, &self.modulus)
    }

    pub fn inv(&self, a: &BigUint) -> Option<BigUint> {
        mod_inverse(a, &self.modulus)
    }
}

#[cfg(test)]
mod test {
    use rand_core::OsRng;

    use super::*;

    #[test]
    fn test_mod_inverse() {
        let m = BigUint::from(101u32);
        for a in 1u32..101 {
            let a = BigUint::from(a);
            let inv = mod_inverse(&a, &m).unwrap();
            assert!(inv < m);
            assert_eq!((a * inv) % &m, BigUint::one());
        }
        assert!(mod_inverse(&BigUint::from(6u32), &BigUint::from(9u32)).is_none());
    }

    #[test]
    fn test_sample_unit_is_coprime() {
        let n = BigUint::from(3u32 * 5 * 7 * 11 * 13);
        for _ in 0..100 {
            let r = sample_unit(&mut OsRng, &n);
            assert!(is_unit(&r, &n));
        }
    }

    #[test]
    fn test_sample_bits_respects_bound() {
        for _ in 0..100 {
            assert!(sample_bits(&mut OsRng, 70) < pow2(70));
        }
    }

    #[test]
    fn test_jacobi_matches_euler_criterion() {
        let p = BigUint::from(1019u32);
        let half = BigUint::from(509u32);
        for a in 1u32..200 {
            let a = BigUint::from(a);
            let expected = if a.modpow(&half, &p).is_one() { 1 } else { -1 };
            assert_eq!(jacobi(&a, &p), expected);
        }
        assert_eq!(jacobi(&(&p - BigUint::one()), &p), -1);
        assert_eq!(jacobi(&BigUint::from(3u32), &BigUint::from(9u32)), 0);
    }

    #[test]
    fn test_context_arithmetic() {
        let ctx = ModulusContext::new(BigUint::from(97u32));
        let a = BigUint::from(45u32);
        let b = BigUint::from(77u32);
        assert_eq!(ctx.mul(&a, &b), BigUint::from((45u32 * 77) % 97));
        assert_eq!(ctx.pow(&a, &BigUint::from(96u32)), BigUint::one());
        assert_eq!(ctx.mul(&a, &ctx.inv(&a).unwrap()), BigUint::one());
    }
}
