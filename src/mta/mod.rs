//! Multiplicative to additive conversion over Paillier.
//!
//! Two parties hold secrets `k` and `x`. The requester encrypts `k` under its
//! own Paillier key; the responder computes `D = x * Enc(k) + Enc(beta)` and
//! keeps `-beta`; the requester decrypts `D` to obtain `k x + beta`. Reduced
//! modulo the curve order, the two shares add up to `k x`.
//!
//! Each response carries an [`MtaRangeZkp`](crate::proofs::affg::MtaRangeZkp),
//! which the requester checks with a [`ResponseVerifier`] before trusting the
//! decrypted share.
mod batch;
mod verifier;

use std::collections::BTreeMap;

use elliptic_curve::Group;
use magikitten::Transcript;
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{
    compat::{biguint_to_scalar, scalar_to_biguint, secret_to_biguint, MtaCurve},
    constants::{l, l_prime, ENC_RANGE_ZKP_LABEL, MTA_RANGE_ZKP_LABEL},
    crypto::{
        paillier::{PaillierPrivateKey, PaillierPublicKey},
        ring_pedersen::RingPedersenPublic,
    },
    errors::MtaError,
    math::sample_bits,
    participants::{lookup, others, Participant, PlayerDirectory},
    proofs::{affg, enc},
    serde::{decode, encode},
};

pub use batch::BatchResponseVerifier;
pub use verifier::{
    new_response_verifier, ResponseVerifier, SingleResponseVerifier, VerifierKind,
};

/// The envelope exchanged by the two sides of an MtA conversion.
///
/// In a request, `message` encrypts `k` and `commitment` encrypts `gamma`, both
/// under the requester's key, and `proof` is empty: the request proofs travel
/// separately, one per verifying party.
///
/// In a response, `message` is the affine combination `D` under the requester's
/// key, `commitment` encrypts the blinding term under the responder's key,
/// and `proof` is an encoded range proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtaMessage {
    pub message: Vec<u8>,
    pub commitment: Vec<u8>,
    pub proof: Vec<u8>,
}

/// The output of [`request`].
#[derive(Debug, Clone)]
pub struct MtaRequest {
    /// The request to broadcast.
    pub message: MtaMessage,
    /// For each other party, a proof that `message.message` encrypts a small value.
    pub proofs: BTreeMap<Participant, Vec<u8>>,
    /// For each other party, a proof that `message.commitment` encrypts a small value.
    pub g_proofs: BTreeMap<Participant, Vec<u8>>,
}

/// Which of the two ciphertexts of a request a proof is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCiphertext {
    /// The encryption of `k`, proven in `proofs`.
    Message,
    /// The encryption of `gamma`, proven in `g_proofs`.
    Commitment,
}

impl RequestCiphertext {
    fn label(self) -> &'static [u8] {
        match self {
            RequestCiphertext::Message => b"message",
            RequestCiphertext::Commitment => b"commitment",
        }
    }
}

fn request_transcript<C: MtaCurve>(
    aad: &[u8],
    prover: Participant,
    verifier: Participant,
    which: RequestCiphertext,
) -> Transcript {
    let mut transcript = Transcript::new(ENC_RANGE_ZKP_LABEL);
    transcript.message(b"group", C::NAME);
    transcript.message(b"aad", aad);
    transcript.message(b"prover", &prover.bytes());
    transcript.message(b"verifier", &verifier.bytes());
    transcript.forked(b"ciphertext", which.label())
}

pub(crate) fn response_transcript<C: MtaCurve>(aad: &[u8]) -> Transcript {
    let mut transcript = Transcript::new(MTA_RANGE_ZKP_LABEL);
    transcript.message(b"group", C::NAME);
    transcript.message(b"aad", aad);
    transcript
}

/// Check that a requester's modulus leaves room for the affine operation.
///
/// `k x + beta` must stay below `N`, or decryption would wrap around.
fn check_modulus_size<C: MtaCurve>(paillier: &PaillierPublicKey) -> Result<(), MtaError> {
    let needed = l_prime(C::BITS) + 2 * l(C::BITS);
    if paillier.n().bits() <= needed {
        return Err(MtaError::KeyError(format!(
            "paillier modulus of {} bits is too small, need more than {needed}",
            paillier.n().bits()
        )));
    }
    Ok(())
}

/// Create an MtA request for the secrets `k` and `gamma`.
///
/// Both are encrypted under `paillier`, our own public key, which must match
/// our entry in the directory. Every other player gets a pair of range proofs,
/// built against their Ring-Pedersen parameters, so that they can check our
/// ciphertexts before answering.
pub fn request<C: MtaCurve>(
    rng: &mut impl CryptoRngCore,
    my_id: Participant,
    k: &C::Scalar,
    gamma: &C::Scalar,
    aad: &[u8],
    paillier: &PaillierPublicKey,
    players: &PlayerDirectory,
) -> Result<MtaRequest, MtaError> {
    let me = lookup(players, my_id)?;
    if me.paillier.as_ref() != paillier {
        return Err(MtaError::KeyError(format!(
            "paillier key of {my_id:?} does not match the directory"
        )));
    }
    check_modulus_size::<C>(paillier)?;

    let k = scalar_to_biguint::<C>(k);
    let gamma = scalar_to_biguint::<C>(gamma);
    let (big_k, rho_k) = paillier.encrypt(rng, &k);
    let (big_g, rho_g) = paillier.encrypt(rng, &gamma);

    let mut proofs = BTreeMap::new();
    let mut g_proofs = BTreeMap::new();
    for (other, info) in others(players, my_id) {
        for (which, ciphertext, witness, out) in [
            (
                RequestCiphertext::Message,
                &big_k,
                enc::Witness { k: &k, rho: &rho_k },
                &mut proofs,
            ),
            (
                RequestCiphertext::Commitment,
                &big_g,
                enc::Witness {
                    k: &gamma,
                    rho: &rho_g,
                },
                &mut g_proofs,
            ),
        ] {
            let statement = enc::Statement {
                paillier,
                ciphertext,
            };
            let proof = enc::prove::<C>(
                rng,
                &mut request_transcript::<C>(aad, my_id, other, which),
                &info.ring_pedersen,
                statement,
                witness,
            );
            out.insert(other, encode(&proof));
        }
    }

    tracing::trace!(me = ?my_id, proofs = proofs.len(), "created mta request");

    Ok(MtaRequest {
        message: MtaMessage {
            message: big_k.to_bytes_be(),
            commitment: big_g.to_bytes_be(),
            proof: Vec::new(),
        },
        proofs,
        g_proofs,
    })
}

/// Check one of the range proofs a requester addressed to us.
///
/// `paillier` is the requester's key, and `ring_pedersen` our own parameters.
#[allow(clippy::too_many_arguments)]
pub fn verify_request_proof<C: MtaCurve>(
    my_id: Participant,
    other_id: Participant,
    aad: &[u8],
    request: &MtaMessage,
    which: RequestCiphertext,
    proof: &[u8],
    paillier: &PaillierPublicKey,
    ring_pedersen: &RingPedersenPublic,
) -> Result<(), MtaError> {
    let data = match which {
        RequestCiphertext::Message => &request.message,
        RequestCiphertext::Commitment => &request.commitment,
    };
    let ciphertext = paillier.parse_ciphertext(data).ok_or_else(|| {
        MtaError::CryptographicInvariantViolation(format!(
            "malformed request ciphertext from {other_id:?}"
        ))
    })?;
    let proof: enc::Proof = decode(proof)?;

    let statement = enc::Statement {
        paillier,
        ciphertext: &ciphertext,
    };
    let ok = enc::verify::<C>(
        &mut request_transcript::<C>(aad, other_id, my_id, which),
        ring_pedersen,
        statement,
        &proof,
    );
    if !ok {
        return Err(MtaError::proof_failure(
            other_id,
            "request ciphertext is not in range",
        ));
    }
    Ok(())
}

/// Answer an MtA request with our secret.
///
/// `secret` is the big-endian encoding of a value below the curve order.
/// `my_key` is our own key pair, under which the blinding term gets committed;
/// `paillier` and `ring_pedersen` belong to the requester.
///
/// This returns our additive share, `-beta`, along with the response to send back.
pub fn answer_mta_request<C: MtaCurve>(
    rng: &mut impl CryptoRngCore,
    request: &MtaMessage,
    secret: &[u8],
    aad: &[u8],
    my_key: &PaillierPrivateKey,
    paillier: &PaillierPublicKey,
    ring_pedersen: &RingPedersenPublic,
) -> Result<(C::Scalar, MtaMessage), MtaError> {
    check_modulus_size::<C>(paillier)?;
    let x = secret_to_biguint::<C>(secret)?;
    let big_k = paillier
        .parse_ciphertext(&request.message)
        .ok_or_else(|| MtaError::DecryptionError("malformed request ciphertext".to_owned()))?;
    let my_public = my_key.public_key();

    let beta = sample_bits(rng, l_prime(C::BITS));
    let (enc_beta, rho) = paillier.encrypt(rng, &beta);
    let big_d = paillier.add(&paillier.mul(&big_k, &x), &enc_beta);
    let (big_y, rho_y) = my_public.encrypt(rng, &beta);
    let public = C::ProjectivePoint::generator() * biguint_to_scalar::<C>(&x)?;

    let statement = affg::Statement::<C> {
        paillier0: paillier,
        paillier1: my_public,
        request: &big_k,
        response: &big_d,
        commitment: &big_y,
        public: &public,
    };
    let witness = affg::Witness {
        x: &x,
        y: &beta,
        rho: &rho,
        rho_y: &rho_y,
    };
    let proof = affg::prove::<C>(
        rng,
        &mut response_transcript::<C>(aad),
        ring_pedersen,
        statement,
        witness,
    )?;

    let share = -biguint_to_scalar::<C>(&beta)?;
    let response = MtaMessage {
        message: big_d.to_bytes_be(),
        commitment: big_y.to_bytes_be(),
        proof: encode(&proof),
    };
    Ok((share, response))
}

/// Decrypt the response to one of our requests, producing our additive share.
///
/// The share is only trustworthy once the response's proof has been verified.
pub fn decrypt_mta_response<C: MtaCurve>(
    other_id: Participant,
    response: MtaMessage,
    my_key: &PaillierPrivateKey,
) -> Result<C::Scalar, MtaError> {
    let big_d = BigUint::from_bytes_be(&response.message);
    let alpha = my_key.decrypt(&big_d).ok_or_else(|| {
        MtaError::DecryptionError(format!("malformed response ciphertext from {other_id:?}"))
    })?;
    biguint_to_scalar::<C>(&alpha)
}
