//! Multiplicative to additive share conversion, based on Paillier encryption.
//!
//! Two parties, holding secrets `k` and `x` respectively, end up with additive
//! shares `alpha + beta = k x` modulo the order of an elliptic curve, without
//! learning anything about each other's secret.
//!
//! # Warning
//!
//! This is experimental cryptographic software, use it with caution.
//!
//! - The protocol does not have a formal proof of security.
//! - This library has not undergone any form of audit.
//!
//! # Design
//!
//! The requester encrypts `k` under its own Paillier key, and attaches proofs,
//! one for every other party, that the ciphertext holds a small value:
//! ```ignore
//! let req = request::<Secp256k1>(&mut rng, me, &k, &gamma, aad, &my_paillier, &players)?;
//! ```
//! The responder folds its secret into the ciphertext homomorphically,
//! blinds it, and proves that it did so honestly:
//! ```ignore
//! let (beta, response) = answer_mta_request::<Secp256k1>(
//!     &mut rng, &req.message, &x_bytes, aad, &my_key, &their_paillier, &their_ring_pedersen,
//! )?;
//! ```
//! Before decrypting its share, the requester checks the response's proof
//! with a [`ResponseVerifier`]:
//! ```ignore
//! let mut verifier = new_response_verifier::<Secp256k1>(
//!     responses.len(), other, aad, my_key, their_paillier, my_ring_pedersen, MIN_BATCH_SIZE,
//! );
//! for (request, response, x_point) in &responses {
//!     verifier.process(request, response, x_point)?;
//! }
//! verifier.verify()?;
//! let alpha = decrypt_mta_response::<Secp256k1>(other, response, &my_key)?;
//! ```
//!
//! ## Batch Verification
//!
//! Checking a proof takes a handful of exponentiations modulo large numbers.
//! When many responses come in from the same party, the verifier produced by
//! [`new_response_verifier`] instead accumulates randomized products of the
//! verification equations, and checks them all at once at the end.
//! A failure then says that *some* response was bad, but not which one.
//!
//! # Generic Curves
//!
//! The support for generic curves is done through the [`MtaCurve`] trait,
//! which can be easily implemented for any curve from the
//! RustCrypto [elliptic-curves](https://github.com/RustCrypto/elliptic-curves)
//! suite of libraries.
//!
//! This crate also provides implementations of some existing curves behind features,
//! as per the following table:
//!
//! | Curve | Feature |
//! |-------|---------|
//! |Secp256k1|`k256`|
//! |P-256|`p256`|
mod compat;
mod config;
pub mod constants;
pub mod crypto;
mod errors;
mod math;
mod mta;
mod participants;
mod proofs;
mod serde;

pub use compat::MtaCurve;
pub use config::VerifierConfig;
pub use errors::MtaError;
pub use mta::{
    answer_mta_request, decrypt_mta_response, new_response_verifier, request,
    verify_request_proof, BatchResponseVerifier, MtaMessage, MtaRequest, RequestCiphertext,
    ResponseVerifier, SingleResponseVerifier, VerifierKind,
};
pub use participants::{Participant, PlayerDirectory, PlayerInfo};
pub use proofs::affg::MtaRangeZkp;
