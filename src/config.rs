use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    compat::MtaCurve,
    constants::MIN_BATCH_SIZE,
    crypto::{
        paillier::{PaillierPrivateKey, PaillierPublicKey},
        ring_pedersen::RingPedersenPrivate,
    },
    mta::{new_response_verifier, ResponseVerifier},
    participants::Participant,
};

/// Settings for verifying MtA responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// The number of responses from which batch verification kicks in.
    pub min_batch_threshold: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            min_batch_threshold: MIN_BATCH_SIZE,
        }
    }
}

impl VerifierConfig {
    /// Create a verifier for `num_of_blocks` responses, following this configuration.
    pub fn new_response_verifier<C: MtaCurve>(
        &self,
        num_of_blocks: usize,
        other_id: Participant,
        aad: &[u8],
        my_key: Arc<PaillierPrivateKey>,
        paillier: Arc<PaillierPublicKey>,
        ring_pedersen: Arc<RingPedersenPrivate>,
    ) -> Box<dyn ResponseVerifier<C> + Send> {
        new_response_verifier(
            num_of_blocks,
            other_id,
            aad,
            my_key,
            paillier,
            ring_pedersen,
            self.min_batch_threshold,
        )
    }
}
