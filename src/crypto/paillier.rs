//! The Paillier cryptosystem, with generator `1 + N`.
//!
//! Ciphertexts live in `Z*_{N^2}`, and are additively homomorphic:
//! multiplying ciphertexts adds plaintexts, and exponentiating a ciphertext
//! scales its plaintext.
use num_bigint::{BigUint, RandPrime};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{
    errors::MtaError,
    math::{is_unit, mod_inverse, sample_unit},
};

/// The public half of a Paillier key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BigUint", try_from = "BigUint")]
pub struct PaillierPublicKey {
    n: BigUint,
    n2: BigUint,
}

impl PaillierPublicKey {
    /// Create a public key from its modulus.
    pub fn from_modulus(n: BigUint) -> Result<Self, MtaError> {
        if n.is_even() || n <= BigUint::one() {
            return Err(MtaError::KeyError(
                "paillier modulus must be odd and greater than 1".to_owned(),
            ));
        }
        let n2 = &n * &n;
        Ok(Self { n, n2 })
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn n2(&self) -> &BigUint {
        &self.n2
    }

    /// Compute `(1 + N)^m mod N^2`, which is just `1 + m * N`.
    pub fn one_plus_n_pow(&self, m: &BigUint) -> BigUint {
        (BigUint::one() + (m % &self.n) * &self.n) % &self.n2
    }

    /// Compute `(1 + N)^-m mod N^2`.
    pub fn one_plus_n_pow_neg(&self, m: &BigUint) -> BigUint {
        let m = m % &self.n;
        if m.is_zero() {
            return BigUint::one();
        }
        self.one_plus_n_pow(&(&self.n - m))
    }

    /// Encrypt a plaintext with chosen randomness `r`, which should be a unit mod N.
    pub fn encrypt_with(&self, m: &BigUint, r: &BigUint) -> BigUint {
        let blind = r.modpow(&self.n, &self.n2);
        (self.one_plus_n_pow(m) * blind) % &self.n2
    }

    /// Encrypt a plaintext, returning the ciphertext and the randomness used.
    pub fn encrypt(&self, rng: &mut impl CryptoRngCore, m: &BigUint) -> (BigUint, BigUint) {
        let r = sample_unit(rng, &self.n);
        (self.encrypt_with(m, &r), r)
    }

    /// Homomorphically add the plaintexts of two ciphertexts.
    pub fn add(&self, c0: &BigUint, c1: &BigUint) -> BigUint {
        (c0 * c1) % &self.n2
    }

    /// Homomorphically multiply the plaintext of a ciphertext by a constant.
    pub fn mul(&self, c: &BigUint, k: &BigUint) -> BigUint {
        c.modpow(k, &self.n2)
    }

    /// Check that a ciphertext is a canonical unit of `Z_{N^2}`.
    pub fn is_valid_ciphertext(&self, c: &BigUint) -> bool {
        is_unit(c, &self.n2)
    }

    /// Parse a ciphertext from big-endian bytes, rejecting non-units.
    pub fn parse_ciphertext(&self, data: &[u8]) -> Option<BigUint> {
        let c = BigUint::from_bytes_be(data);
        self.is_valid_ciphertext(&c).then_some(c)
    }
}

impl From<PaillierPublicKey> for BigUint {
    fn from(pk: PaillierPublicKey) -> Self {
        pk.n
    }
}

impl TryFrom<BigUint> for PaillierPublicKey {
    type Error = MtaError;

    fn try_from(n: BigUint) -> Result<Self, Self::Error> {
        Self::from_modulus(n)
    }
}

/// The private half of a Paillier key pair.
///
/// Besides decryption, knowing the factorization lets us exponentiate modulo
/// `N^2` by working modulo `p^2` and `q^2` separately, with reduced exponents.
#[derive(Debug, Clone)]
pub struct PaillierPrivateKey {
    public: PaillierPublicKey,
    phi: BigUint,
    mu: BigUint,
    p2: BigUint,
    q2: BigUint,
    phi_p2: BigUint,
    phi_q2: BigUint,
    q2_inv: BigUint,
}

impl PaillierPrivateKey {
    /// Create a key pair from the two prime factors of the modulus.
    pub fn from_primes(p: BigUint, q: BigUint) -> Result<Self, MtaError> {
        if p == q {
            return Err(MtaError::KeyError(
                "paillier primes must be distinct".to_owned(),
            ));
        }
        let public = PaillierPublicKey::from_modulus(&p * &q)?;
        let one = BigUint::one();
        let p_minus_1 = &p - &one;
        let q_minus_1 = &q - &one;
        let phi = &p_minus_1 * &q_minus_1;
        let mu = mod_inverse(&phi, public.n())
            .ok_or_else(|| MtaError::KeyError("gcd(N, phi(N)) must be 1".to_owned()))?;

        let p2 = &p * &p;
        let q2 = &q * &q;
        let q2_inv = mod_inverse(&q2, &p2)
            .ok_or_else(|| MtaError::KeyError("paillier primes must be coprime".to_owned()))?;

        Ok(Self {
            public,
            phi,
            mu,
            phi_p2: &p * p_minus_1,
            phi_q2: &q * q_minus_1,
            p2,
            q2,
            q2_inv,
        })
    }

    /// Generate a new key pair with a modulus of `bits` bits.
    pub fn generate(rng: &mut impl CryptoRngCore, bits: usize) -> Self {
        loop {
            let p = rng.gen_prime(bits / 2);
            let q = rng.gen_prime(bits - bits / 2);
            if let Ok(sk) = Self::from_primes(p, q) {
                if sk.public.n().bits() == bits {
                    return sk;
                }
            }
        }
    }

    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.public
    }

    /// Decrypt a ciphertext, returning `None` if it isn't a valid ciphertext.
    ///
    /// The plaintext is the canonical representative in `[0, N)`.
    pub fn decrypt(&self, c: &BigUint) -> Option<BigUint> {
        if !self.public.is_valid_ciphertext(c) {
            return None;
        }
        let n = self.public.n();
        let u = self.pow_mod_n2(c, &self.phi);
        let l = (u - BigUint::one()) / n;
        Some((l * &self.mu) % n)
    }

    /// Compute `base^exponent mod N^2` through the Chinese remainder theorem.
    ///
    /// `base` must be a unit, which holds for every valid ciphertext.
    pub fn pow_mod_n2(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        let r_p = (base % &self.p2).modpow(&(exponent % &self.phi_p2), &self.p2);
        let r_q = (base % &self.q2).modpow(&(exponent % &self.phi_q2), &self.q2);
        // x = r_q + q^2 * ((r_p - r_q) * q^-2 mod p^2)
        let diff = (&r_p + &self.p2 - (&r_q % &self.p2)) % &self.p2;
        let h = (diff * &self.q2_inv) % &self.p2;
        r_q + h * &self.q2
    }
}
