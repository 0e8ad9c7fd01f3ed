//! Ring-Pedersen commitments over an RSA modulus `N = p q`.
//!
//! A commitment to `x` with randomness `r` is `s^x t^r mod N`, where `s = t^lambda`.
//! The owner of the parameters knows `lambda` and `phi(N)`, which lets them
//! collapse any commitment check into a single power of `t`.
use num_bigint::{BigUint, RandPrime};
use num_integer::Integer;
use num_traits::One;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{
    errors::MtaError,
    math::{is_unit, jacobi, sample_below, sample_unit},
};

/// The number of Miller-Rabin rounds used when testing safe prime candidates.
const SAFE_PRIME_ROUNDS: usize = 20;

/// The public Ring-Pedersen parameters `(N, s, t)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingPedersenPublic {
    n: BigUint,
    s: BigUint,
    t: BigUint,
}

impl RingPedersenPublic {
    /// Create public parameters, checking that both generators are units.
    pub fn from_parts(n: BigUint, s: BigUint, t: BigUint) -> Result<Self, MtaError> {
        if !is_unit(&s, &n) || !is_unit(&t, &n) {
            return Err(MtaError::KeyError(
                "ring pedersen generators must be units".to_owned(),
            ));
        }
        Ok(Self { n, s, t })
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    pub fn t(&self) -> &BigUint {
        &self.t
    }

    /// Commit to `x` with randomness `r`.
    pub fn commit(&self, x: &BigUint, r: &BigUint) -> BigUint {
        (self.s.modpow(x, &self.n) * self.t.modpow(r, &self.n)) % &self.n
    }
}

/// Ring-Pedersen parameters together with their trapdoor.
#[derive(Debug, Clone)]
pub struct RingPedersenPrivate {
    public: RingPedersenPublic,
    p: BigUint,
    q: BigUint,
    phi: BigUint,
    lambda: BigUint,
}

impl RingPedersenPrivate {
    /// Set up parameters over the modulus `p q`.
    ///
    /// The primes should be safe primes, so that `t` generates a large subgroup.
    pub fn from_primes(
        rng: &mut impl CryptoRngCore,
        p: &BigUint,
        q: &BigUint,
    ) -> Result<Self, MtaError> {
        if p == q {
            return Err(MtaError::KeyError(
                "ring pedersen primes must be distinct".to_owned(),
            ));
        }
        let n = p * q;
        let phi = (p - BigUint::one()) * (q - BigUint::one());

        let r = sample_unit(rng, &n);
        let t = r.modpow(&BigUint::from(2u32), &n);
        let lambda = sample_below(rng, &phi);
        let s = t.modpow(&lambda, &n);

        let public = RingPedersenPublic::from_parts(n, s, t)?;
        Ok(Self {
            public,
            p: p.clone(),
            q: q.clone(),
            phi,
            lambda,
        })
    }

    /// Generate fresh parameters over a modulus made of two safe primes of `bits / 2` bits.
    pub fn generate(rng: &mut impl CryptoRngCore, bits: usize) -> Self {
        loop {
            let p = gen_safe_prime(rng, bits / 2);
            let q = gen_safe_prime(rng, bits - bits / 2);
            if let Ok(sk) = Self::from_primes(rng, &p, &q) {
                return sk;
            }
        }
    }

    pub fn public(&self) -> &RingPedersenPublic {
        &self.public
    }

    pub fn phi(&self) -> &BigUint {
        &self.phi
    }

    /// The exponent `e` such that `t^e = s^a t^b`, namely `lambda a + b mod phi(N)`.
    pub fn exponent(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (&self.lambda * a + b) % &self.phi
    }

    /// Check whether `x` is a square modulo `N`.
    ///
    /// Honest commitments always are, since `s` and `t` are. With safe primes,
    /// the squares form a subgroup of odd order, which has no elements of order 2.
    pub fn is_square(&self, x: &BigUint) -> bool {
        jacobi(x, &self.p) == 1 && jacobi(x, &self.q) == 1
    }

    /// Compute `t^e mod N`, reducing the exponent first.
    pub fn pow_t(&self, e: &BigUint) -> BigUint {
        self.public.t.modpow(&(e % &self.phi), &self.public.n)
    }
}

fn gen_safe_prime(rng: &mut impl CryptoRngCore, bits: usize) -> BigUint {
    loop {
        let p_prime = rng.gen_prime(bits - 1);
        let p: BigUint = (p_prime << 1) + BigUint::one();
        if p.bits() == bits && num_bigint::prime::probably_prime(&p, SAFE_PRIME_ROUNDS) {
            return p;
        }
    }
}
