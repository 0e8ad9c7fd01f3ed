//! The range proof attached to an MtA response.
//!
//! The responder proves that the response `D = C^x (1 + N0)^y rho^N0` was built
//! from the requester's ciphertext `C` with a secret `x` matching the public
//! point `X = x * G`, and a blinding term `y` which it also encrypted under its
//! own key as `Y`. Both `x` and `y` are shown to be small, so the affine
//! operation can't wrap around the requester's modulus.
use elliptic_curve::{Field, Group};
use magikitten::Transcript;
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{
    compat::{biguint_to_scalar, scalar_to_biguint, MtaCurve, SerializablePoint},
    constants::{epsilon, l, l_prime},
    crypto::{message_integer, paillier::PaillierPublicKey, ring_pedersen::RingPedersenPublic},
    errors::MtaError,
    math::{pow2, sample_below, sample_bits, sample_unit},
    serde::encode,
};

/// The label we use for hashing the statement.
const STATEMENT_LABEL: &[u8] = b"mta range proof statement";
/// The label we use for hashing the first prover message.
const COMMITMENT_LABEL: &[u8] = b"mta range proof commitment";
/// The label we use for generating the challenge.
const CHALLENGE_LABEL: &[u8] = b"mta range proof challenge";

/// The public statement for this proof.
#[derive(Debug, Clone, Copy)]
pub struct Statement<'a, C: MtaCurve> {
    /// The requester's key, under which `request` and `response` are encrypted.
    pub paillier0: &'a PaillierPublicKey,
    /// The responder's key, under which `commitment` is encrypted.
    pub paillier1: &'a PaillierPublicKey,
    /// The requester's ciphertext, `C`.
    pub request: &'a BigUint,
    /// The result of the affine operation, `D`.
    pub response: &'a BigUint,
    /// The responder's encryption of its blinding term, `Y`.
    pub commitment: &'a BigUint,
    /// The responder's secret, moved onto the curve, `X`.
    pub public: &'a C::ProjectivePoint,
}

/// The private witness for this proof.
#[derive(Clone, Copy)]
pub struct Witness<'a> {
    pub x: &'a BigUint,
    pub y: &'a BigUint,
    pub rho: &'a BigUint,
    pub rho_y: &'a BigUint,
}

/// A proof that an MtA response was computed honestly, with values in range.
///
/// Beyond being sent over the wire, the verifiers look at these fields
/// directly, evaluating the verification equations in their own way.
#[derive(Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MtaRangeZkp<C: MtaCurve> {
    pub(crate) big_a: BigUint,
    pub(crate) big_b_x: SerializablePoint<C>,
    pub(crate) big_b_y: BigUint,
    pub(crate) big_e: BigUint,
    pub(crate) big_s: BigUint,
    pub(crate) big_f: BigUint,
    pub(crate) big_t: BigUint,
    pub(crate) z1: BigUint,
    pub(crate) z2: BigUint,
    pub(crate) z3: BigUint,
    pub(crate) z4: BigUint,
    pub(crate) w: BigUint,
    pub(crate) w_y: BigUint,
}

/// The largest bit length `z1` may have.
pub(crate) fn z1_max_bits<C: MtaCurve>() -> usize {
    l(C::BITS) + epsilon(C::BITS) + 1
}

/// The largest bit length `z2` may have.
pub(crate) fn z2_max_bits<C: MtaCurve>() -> usize {
    l_prime(C::BITS) + epsilon(C::BITS) + 1
}

fn absorb_statement<C: MtaCurve>(
    transcript: &mut Transcript,
    setup: &RingPedersenPublic,
    statement: &Statement<'_, C>,
) {
    message_integer(transcript, STATEMENT_LABEL, statement.paillier0.n());
    message_integer(transcript, STATEMENT_LABEL, statement.paillier1.n());
    message_integer(transcript, STATEMENT_LABEL, setup.n());
    message_integer(transcript, STATEMENT_LABEL, setup.s());
    message_integer(transcript, STATEMENT_LABEL, setup.t());
    message_integer(transcript, STATEMENT_LABEL, statement.request);
    message_integer(transcript, STATEMENT_LABEL, statement.response);
    message_integer(transcript, STATEMENT_LABEL, statement.commitment);
    transcript.message(
        STATEMENT_LABEL,
        &encode(&SerializablePoint::<C>::from_projective(statement.public)),
    );
}

/// Derive the Fiat-Shamir challenge of a proof.
///
/// The transcript should already be bound to the session, through the
/// additional authenticated data.
pub(crate) fn challenge<C: MtaCurve>(
    transcript: &mut Transcript,
    setup: &RingPedersenPublic,
    statement: &Statement<'_, C>,
    proof: &MtaRangeZkp<C>,
) -> BigUint {
    absorb_statement(transcript, setup, statement);

    message_integer(transcript, COMMITMENT_LABEL, &proof.big_a);
    transcript.message(COMMITMENT_LABEL, &encode(&proof.big_b_x));
    message_integer(transcript, COMMITMENT_LABEL, &proof.big_b_y);
    message_integer(transcript, COMMITMENT_LABEL, &proof.big_e);
    message_integer(transcript, COMMITMENT_LABEL, &proof.big_s);
    message_integer(transcript, COMMITMENT_LABEL, &proof.big_f);
    message_integer(transcript, COMMITMENT_LABEL, &proof.big_t);

    let e = C::Scalar::random(&mut transcript.challenge(CHALLENGE_LABEL));
    scalar_to_biguint::<C>(&e)
}

/// Check the group equation `z1 * G = B_x + e * X`.
pub(crate) fn check_group_commitment<C: MtaCurve>(
    e: &BigUint,
    public: &C::ProjectivePoint,
    proof: &MtaRangeZkp<C>,
) -> Result<bool, MtaError> {
    let z1 = biguint_to_scalar::<C>(&proof.z1)?;
    let e = biguint_to_scalar::<C>(e)?;
    let lhs = C::ProjectivePoint::generator() * z1;
    let rhs = proof.big_b_x.to_projective() + *public * e;
    Ok(lhs == rhs)
}

/// Prove that a witness satisfies a given statement.
///
/// The proof is built against the verifier's Ring-Pedersen parameters.
pub fn prove<C: MtaCurve>(
    rng: &mut impl CryptoRngCore,
    transcript: &mut Transcript,
    setup: &RingPedersenPublic,
    statement: Statement<'_, C>,
    witness: Witness<'_>,
) -> Result<MtaRangeZkp<C>, MtaError> {
    let l = l(C::BITS);
    let l_prime = l_prime(C::BITS);
    let eps = epsilon(C::BITS);
    let pk0 = statement.paillier0;
    let pk1 = statement.paillier1;

    let alpha = sample_bits(rng, l + eps);
    let beta = sample_bits(rng, l_prime + eps);
    let r = sample_unit(rng, pk0.n());
    let r_y = sample_unit(rng, pk1.n());
    let gamma = sample_below(rng, &(pow2(l + eps) * setup.n()));
    let delta = sample_below(rng, &(pow2(l + eps) * setup.n()));
    let m = sample_below(rng, &(pow2(l) * setup.n()));
    let mu = sample_below(rng, &(pow2(l) * setup.n()));

    let big_a = pk0.add(
        &pk0.mul(statement.request, &alpha),
        &pk0.encrypt_with(&beta, &r),
    );
    let big_b_x = C::ProjectivePoint::generator() * biguint_to_scalar::<C>(&alpha)?;
    let big_b_y = pk1.encrypt_with(&beta, &r_y);
    let big_e = setup.commit(&alpha, &gamma);
    let big_s = setup.commit(witness.x, &m);
    let big_f = setup.commit(&beta, &delta);
    let big_t = setup.commit(witness.y, &mu);

    let mut proof = MtaRangeZkp {
        big_a,
        big_b_x: SerializablePoint::from_projective(&big_b_x),
        big_b_y,
        big_e,
        big_s,
        big_f,
        big_t,
        z1: BigUint::default(),
        z2: BigUint::default(),
        z3: BigUint::default(),
        z4: BigUint::default(),
        w: BigUint::default(),
        w_y: BigUint::default(),
    };

    let e = challenge(transcript, setup, &statement, &proof);

    proof.z1 = alpha + &e * witness.x;
    proof.z2 = beta + &e * witness.y;
    proof.z3 = gamma + &e * m;
    proof.z4 = delta + &e * mu;
    proof.w = (r * witness.rho.modpow(&e, pk0.n())) % pk0.n();
    proof.w_y = (r_y * witness.rho_y.modpow(&e, pk1.n())) % pk1.n();

    Ok(proof)
}

#[cfg(test)]
mod test {
    use k256::{ProjectivePoint, Scalar, Secp256k1};
    use rand_core::OsRng;

    use super::*;
    use crate::test::{paillier_fixture, ring_pedersen_fixture};

    #[test]
    fn test_group_commitment_holds_for_honest_proof() {
        let pk0 = paillier_fixture(0).public_key().clone();
        let pk1 = paillier_fixture(1).public_key().clone();
        let setup = ring_pedersen_fixture(0).public().clone();

        let k = scalar_to_biguint::<Secp256k1>(&Scalar::random(&mut OsRng));
        let x_scalar = Scalar::random(&mut OsRng);
        let x = scalar_to_biguint::<Secp256k1>(&x_scalar);
        let y = sample_bits(&mut OsRng, l_prime(Secp256k1::BITS));

        let (request, _) = pk0.encrypt(&mut OsRng, &k);
        let (enc_y, rho) = pk0.encrypt(&mut OsRng, &y);
        let response = pk0.add(&pk0.mul(&request, &x), &enc_y);
        let (commitment, rho_y) = pk1.encrypt(&mut OsRng, &y);
        let public = ProjectivePoint::GENERATOR * x_scalar;

        let statement = Statement::<Secp256k1> {
            paillier0: &pk0,
            paillier1: &pk1,
            request: &request,
            response: &response,
            commitment: &commitment,
            public: &public,
        };
        let witness = Witness {
            x: &x,
            y: &y,
            rho: &rho,
            rho_y: &rho_y,
        };

        let transcript = Transcript::new(b"protocol");
        let proof = prove(
            &mut OsRng,
            &mut transcript.forked(b"session", &[1]),
            &setup,
            statement,
            witness,
        )
        .unwrap();

        assert!(proof.z1.bits() <= z1_max_bits::<Secp256k1>());
        assert!(proof.z2.bits() <= z2_max_bits::<Secp256k1>());

        let e = challenge(
            &mut transcript.forked(b"session", &[1]),
            &setup,
            &statement,
            &proof,
        );
        assert!(check_group_commitment(&e, &public, &proof).unwrap());

        let e = challenge(
            &mut transcript.forked(b"session", &[2]),
            &setup,
            &statement,
            &proof,
        );
        assert!(!check_group_commitment(&e, &public, &proof).unwrap());

        let encoded = encode(&proof);
        let decoded: MtaRangeZkp<Secp256k1> = crate::serde::decode(&encoded).unwrap();
        assert_eq!(decoded.z3, proof.z3);
        assert_eq!(decoded.big_b_x.to_projective(), proof.big_b_x.to_projective());
    }
}
