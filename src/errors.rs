use thiserror::Error;

use crate::participants::Participant;

/// Represents an error which can happen while running an MtA conversion.
///
/// None of these are recoverable within the enclosing signing round: shares
/// computed from the offending messages must be discarded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MtaError {
    /// A scalar, ciphertext or proof field had an invalid encoding or value.
    #[error("cryptographic invariant violated: {0}")]
    CryptographicInvariantViolation(String),

    /// Key material is missing or unusable.
    #[error("key error: {0}")]
    KeyError(String),

    /// A ciphertext cannot be decrypted under the expected private key.
    #[error("decryption failed: {0}")]
    DecryptionError(String),

    /// A range proof did not satisfy its verification equations.
    #[error("range proof from {party:?} failed verification: {reason}")]
    ProofVerificationFailure {
        party: Participant,
        reason: String,
    },

    /// An operation was attempted in the wrong phase of a two phase protocol.
    #[error("illegal state transition: {0}")]
    IllegalState(String),

    /// A wire value could not be encoded or decoded.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl MtaError {
    pub(crate) fn proof_failure(party: Participant, reason: impl Into<String>) -> Self {
        Self::ProofVerificationFailure {
            party,
            reason: reason.into(),
        }
    }
}
