//! Proof that a Paillier ciphertext encrypts a value below `2^l`.
//!
//! The requester attaches one of these to each of its ciphertexts, for each
//! other participant, built against that participant's Ring-Pedersen parameters.
use elliptic_curve::Field;
use magikitten::Transcript;
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{
    compat::{scalar_to_biguint, MtaCurve},
    constants::{epsilon, l},
    crypto::{message_integer, paillier::PaillierPublicKey, ring_pedersen::RingPedersenPublic},
    math::{is_unit, pow2, sample_below, sample_bits, sample_unit},
};

/// The label we use for hashing the statement.
const STATEMENT_LABEL: &[u8] = b"enc proof statement";
/// The label we use for hashing the first prover message.
const COMMITMENT_LABEL: &[u8] = b"enc proof commitment";
/// The label we use for generating the challenge.
const CHALLENGE_LABEL: &[u8] = b"enc proof challenge";

/// The public statement for this proof.
///
/// This statement claims that `ciphertext` encrypts a small value under `paillier`.
#[derive(Debug, Clone, Copy)]
pub struct Statement<'a> {
    pub paillier: &'a PaillierPublicKey,
    pub ciphertext: &'a BigUint,
}

/// The private witness for this proof.
///
/// This holds the plaintext, and the randomness used to encrypt it.
#[derive(Clone, Copy)]
pub struct Witness<'a> {
    pub k: &'a BigUint,
    pub rho: &'a BigUint,
}

/// Represents a proof of the statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    big_s: BigUint,
    big_a: BigUint,
    big_c: BigUint,
    z1: BigUint,
    z2: BigUint,
    z3: BigUint,
}

fn absorb_statement(
    transcript: &mut Transcript,
    setup: &RingPedersenPublic,
    statement: &Statement<'_>,
) {
    message_integer(transcript, STATEMENT_LABEL, statement.paillier.n());
    message_integer(transcript, STATEMENT_LABEL, statement.ciphertext);
    message_integer(transcript, STATEMENT_LABEL, setup.n());
    message_integer(transcript, STATEMENT_LABEL, setup.s());
    message_integer(transcript, STATEMENT_LABEL, setup.t());
}

fn challenge<C: MtaCurve>(
    transcript: &mut Transcript,
    big_s: &BigUint,
    big_a: &BigUint,
    big_c: &BigUint,
) -> BigUint {
    message_integer(transcript, COMMITMENT_LABEL, big_s);
    message_integer(transcript, COMMITMENT_LABEL, big_a);
    message_integer(transcript, COMMITMENT_LABEL, big_c);
    let e = C::Scalar::random(&mut transcript.challenge(CHALLENGE_LABEL));
    scalar_to_biguint::<C>(&e)
}

/// Prove that a witness satisfies a given statement.
///
/// We need some randomness for the proof, and also a transcript, which is
/// used for the Fiat-Shamir transform.
pub fn prove<C: MtaCurve>(
    rng: &mut impl CryptoRngCore,
    transcript: &mut Transcript,
    setup: &RingPedersenPublic,
    statement: Statement<'_>,
    witness: Witness<'_>,
) -> Proof {
    absorb_statement(transcript, setup, &statement);

    let l = l(C::BITS);
    let eps = epsilon(C::BITS);
    let pk = statement.paillier;

    let alpha = sample_bits(rng, l + eps);
    let mu = sample_below(rng, &(pow2(l) * setup.n()));
    let r = sample_unit(rng, pk.n());
    let gamma = sample_below(rng, &(pow2(l + eps) * setup.n()));

    let big_s = setup.commit(witness.k, &mu);
    let big_a = pk.encrypt_with(&alpha, &r);
    let big_c = setup.commit(&alpha, &gamma);

    let e = challenge::<C>(transcript, &big_s, &big_a, &big_c);

    let z1 = alpha + &e * witness.k;
    let z2 = (r * witness.rho.modpow(&e, pk.n())) % pk.n();
    let z3 = gamma + &e * mu;

    Proof {
        big_s,
        big_a,
        big_c,
        z1,
        z2,
        z3,
    }
}

/// Verify that a proof attesting to the validity of some statement.
///
/// We use a transcript in order to verify the Fiat-Shamir transformation.
#[must_use]
pub fn verify<C: MtaCurve>(
    transcript: &mut Transcript,
    setup: &RingPedersenPublic,
    statement: Statement<'_>,
    proof: &Proof,
) -> bool {
    let pk = statement.paillier;
    if !pk.is_valid_ciphertext(statement.ciphertext)
        || !pk.is_valid_ciphertext(&proof.big_a)
        || !is_unit(&proof.z2, pk.n())
        || !is_unit(&proof.big_s, setup.n())
        || !is_unit(&proof.big_c, setup.n())
    {
        return false;
    }

    if proof.z1.bits() > l(C::BITS) + epsilon(C::BITS) + 1 {
        return false;
    }

    absorb_statement(transcript, setup, &statement);
    let e = challenge::<C>(transcript, &proof.big_s, &proof.big_a, &proof.big_c);

    let lhs = pk.encrypt_with(&proof.z1, &proof.z2);
    let rhs = (&proof.big_a * pk.mul(statement.ciphertext, &e)) % pk.n2();
    if lhs != rhs {
        return false;
    }

    let lhs = setup.commit(&proof.z1, &proof.z3);
    let rhs = (&proof.big_c * proof.big_s.modpow(&e, setup.n())) % setup.n();
    lhs == rhs
}
