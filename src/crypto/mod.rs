//! The public-key primitives the MtA conversion is built on.
//!
//! These are deliberately minimal: just the operations the conversion and its
//! proofs need, over arbitrary precision integers.
pub mod paillier;
pub mod ring_pedersen;

use magikitten::Transcript;
use num_bigint::BigUint;

/// Absorb an integer into a transcript, as its big-endian encoding.
pub(crate) fn message_integer(transcript: &mut Transcript, label: &'static [u8], x: &BigUint) {
    transcript.message(label, &x.to_bytes_be());
}
