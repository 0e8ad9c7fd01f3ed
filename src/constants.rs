//! Parameters shared by the proofs and the verifiers.
//!
//! The range proof bounds are expressed relative to the bit size `l` of the
//! curve's scalar field: secrets live below `2^l`, the responder's blinding term
//! below `2^l'`, and the proof masks carry an extra `epsilon` bits of slack.

/// The multiple of `l` giving the size, in bits, of the responder's blinding term.
pub const L_PRIME_FACTOR: usize = 5;

/// The multiple of `l` giving the statistical slack of the proof masks.
pub const EPSILON_FACTOR: usize = 2;

/// How many independent random subsets the batch verifier checks.
///
/// Each slot catches a single invalid proof with probability 1/2, so a batch
/// containing one invalid proof slips through with probability `2^-5`.
pub const BATCH_STATISTICAL_SECURITY: usize = 5;

/// The minimal number of MtA responses worth verifying as a batch.
///
/// Note that this counts MtA responses, not signing blocks: an ECDSA signature
/// runs two MtA conversions with each counterparty.
pub const MIN_BATCH_SIZE: usize = BATCH_STATISTICAL_SECURITY + 1;

/// The size of the random coefficients folding Ring-Pedersen equations together.
pub const PEDERSEN_COEFFICIENT_BITS: usize = 64;

/// Domain separation for the MtA response range proof.
pub const MTA_RANGE_ZKP_LABEL: &[u8] = b"paillier-mta v0.1.0 mta range zkp";
/// Domain separation for the encryption in range proof attached to requests.
pub const ENC_RANGE_ZKP_LABEL: &[u8] = b"paillier-mta v0.1.0 encryption range zkp";

/// The bit size `l` of secrets.
pub fn l(bits: usize) -> usize {
    bits
}

/// The bit size `l'` of the responder's blinding term.
pub fn l_prime(bits: usize) -> usize {
    L_PRIME_FACTOR * bits
}

/// The statistical slack `epsilon` of proof masks.
pub fn epsilon(bits: usize) -> usize {
    EPSILON_FACTOR * bits
}
