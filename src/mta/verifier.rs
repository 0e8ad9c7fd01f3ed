use std::sync::Arc;

use num_bigint::BigUint;
use rand_core::OsRng;

use crate::{
    compat::MtaCurve,
    crypto::{
        paillier::{PaillierPrivateKey, PaillierPublicKey},
        ring_pedersen::RingPedersenPrivate,
    },
    errors::MtaError,
    math::{is_unit, ModulusContext},
    participants::Participant,
    proofs::affg::{self, z1_max_bits, z2_max_bits, MtaRangeZkp},
    serde::decode,
};

use super::{batch::BatchResponseVerifier, response_transcript, MtaMessage};

/// Which verification strategy a verifier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierKind {
    Single,
    Batch,
}

/// Verifies the range proofs attached to MtA responses from one counterparty.
///
/// This is a two phase protocol: call [`process`](Self::process) once for each
/// response, then [`verify`](Self::verify) exactly once. Responses shouldn't be
/// trusted until `verify` succeeds, and once it has been called, the verifier
/// refuses further work.
pub trait ResponseVerifier<C: MtaCurve> {
    /// Process a single response.
    ///
    /// `request` is the ciphertext we sent, `public_point` the counterparty's
    /// public commitment to the secret it answered with.
    fn process(
        &mut self,
        request: &[u8],
        response: &MtaMessage,
        public_point: &C::ProjectivePoint,
    ) -> Result<(), MtaError>;

    /// Finish verification of every response processed so far.
    fn verify(&mut self) -> Result<(), MtaError>;

    fn kind(&self) -> VerifierKind;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Accumulating { processed: usize },
    /// Some response was rejected, so verification can no longer succeed.
    Failed(MtaError),
    Finalized,
}

/// A response whose encoding, ranges, and group equation have been checked.
pub(super) struct ParsedResponse<C: MtaCurve> {
    pub request: BigUint,
    pub response: BigUint,
    pub commitment: BigUint,
    pub proof: MtaRangeZkp<C>,
    pub e: BigUint,
}

/// The state shared by both verification strategies.
///
/// `my_paillier` and `my_ring_pedersen` are ours: the requests were encrypted
/// under our key, and the proofs built against our Ring-Pedersen parameters.
/// `other_paillier` is the counterparty's, under which it committed to its
/// blinding terms.
pub(super) struct VerifierBase<C: MtaCurve> {
    pub other_id: Participant,
    aad: Vec<u8>,
    pub my_paillier: Arc<PaillierPrivateKey>,
    pub my_ring_pedersen: Arc<RingPedersenPrivate>,
    pub other_paillier: Arc<PaillierPublicKey>,
    pub my_ctx: ModulusContext,
    pub other_ctx: ModulusContext,
    pub pedersen_ctx: ModulusContext,
    state: State,
    _curve: std::marker::PhantomData<C>,
}

impl<C: MtaCurve> VerifierBase<C> {
    pub fn new(
        other_id: Participant,
        aad: &[u8],
        my_key: Arc<PaillierPrivateKey>,
        paillier: Arc<PaillierPublicKey>,
        ring_pedersen: Arc<RingPedersenPrivate>,
    ) -> Self {
        let my_ctx = ModulusContext::new(my_key.public_key().n2().clone());
        let other_ctx = ModulusContext::new(paillier.n2().clone());
        let pedersen_ctx = ModulusContext::new(ring_pedersen.public().n().clone());
        Self {
            other_id,
            aad: aad.to_vec(),
            my_paillier: my_key,
            my_ring_pedersen: ring_pedersen,
            other_paillier: paillier,
            my_ctx,
            other_ctx,
            pedersen_ctx,
            state: State::Accumulating { processed: 0 },
            _curve: std::marker::PhantomData,
        }
    }

    pub fn fail(&self, reason: impl Into<String>) -> MtaError {
        MtaError::proof_failure(self.other_id, reason)
    }

    fn already_finalized(&self) -> MtaError {
        MtaError::IllegalState(format!(
            "verifier for {:?} was already finalized",
            self.other_id
        ))
    }

    fn earlier_failure(&self, err: &MtaError) -> MtaError {
        match err {
            MtaError::ProofVerificationFailure { .. } => err.clone(),
            _ => self.fail(format!("an earlier response was rejected: {err}")),
        }
    }

    /// Begin processing a response, which is only allowed before verification.
    ///
    /// Once a response has been rejected, every later one is too.
    pub fn start_process(&mut self) -> Result<(), MtaError> {
        match &mut self.state {
            State::Accumulating { processed } => {
                *processed += 1;
                Ok(())
            }
            State::Failed(err) => {
                let err = err.clone();
                Err(self.earlier_failure(&err))
            }
            State::Finalized => Err(self.already_finalized()),
        }
    }

    /// Remember the outcome of processing a response.
    pub fn record<T>(&mut self, result: Result<T, MtaError>) -> Result<T, MtaError> {
        if let Err(err) = &result {
            if matches!(self.state, State::Accumulating { .. }) {
                self.state = State::Failed(err.clone());
            }
        }
        result
    }

    /// Move to the terminal state, which can only happen once.
    ///
    /// This fails if any processed response was rejected.
    pub fn finalize(&mut self) -> Result<usize, MtaError> {
        match std::mem::replace(&mut self.state, State::Finalized) {
            State::Accumulating { processed } => Ok(processed),
            State::Failed(err) => Err(self.earlier_failure(&err)),
            State::Finalized => Err(self.already_finalized()),
        }
    }

    /// Decode a response, and run the checks that don't need exponentiations
    /// modulo the Paillier or Ring-Pedersen moduli.
    pub fn parse(
        &self,
        request: &[u8],
        response: &MtaMessage,
        public_point: &C::ProjectivePoint,
    ) -> Result<ParsedResponse<C>, MtaError> {
        let my_public = self.my_paillier.public_key();
        let other_public = self.other_paillier.as_ref();
        let setup = self.my_ring_pedersen.public();

        let parse = |pk: &PaillierPublicKey, data: &[u8], what: &str| {
            pk.parse_ciphertext(data).ok_or_else(|| {
                MtaError::CryptographicInvariantViolation(format!(
                    "malformed {what} ciphertext from {:?}",
                    self.other_id
                ))
            })
        };
        let request = parse(my_public, request, "request")?;
        let response_ct = parse(my_public, &response.message, "response")?;
        let commitment = parse(other_public, &response.commitment, "commitment")?;
        let proof: MtaRangeZkp<C> = decode(&response.proof)?;

        if proof.z1.bits() > z1_max_bits::<C>() {
            return Err(self.fail("z1 is out of range"));
        }
        if proof.z2.bits() > z2_max_bits::<C>() {
            return Err(self.fail("z2 is out of range"));
        }
        if !my_public.is_valid_ciphertext(&proof.big_a)
            || !is_unit(&proof.w, my_public.n())
            || !other_public.is_valid_ciphertext(&proof.big_b_y)
            || !is_unit(&proof.w_y, other_public.n())
        {
            return Err(self.fail("paillier proof elements are not units"));
        }
        if [&proof.big_e, &proof.big_s, &proof.big_f, &proof.big_t]
            .into_iter()
            .any(|x| !is_unit(x, setup.n()))
        {
            return Err(self.fail("ring pedersen proof elements are not units"));
        }
        if [&proof.big_e, &proof.big_s, &proof.big_f, &proof.big_t]
            .into_iter()
            .any(|x| !self.my_ring_pedersen.is_square(x))
        {
            return Err(self.fail("ring pedersen proof elements are not squares"));
        }

        let statement = affg::Statement::<C> {
            paillier0: my_public,
            paillier1: other_public,
            request: &request,
            response: &response_ct,
            commitment: &commitment,
            public: public_point,
        };
        let e = affg::challenge(
            &mut response_transcript::<C>(&self.aad),
            setup,
            &statement,
            &proof,
        );

        if !affg::check_group_commitment(&e, public_point, &proof)? {
            return Err(self.fail("group commitment mismatch"));
        }

        Ok(ParsedResponse {
            request,
            response: response_ct,
            commitment,
            proof,
            e,
        })
    }
}

/// Verifies each response on its own, as soon as it's processed.
pub struct SingleResponseVerifier<C: MtaCurve> {
    base: VerifierBase<C>,
}

impl<C: MtaCurve> SingleResponseVerifier<C> {
    pub fn new(
        other_id: Participant,
        aad: &[u8],
        my_key: Arc<PaillierPrivateKey>,
        paillier: Arc<PaillierPublicKey>,
        ring_pedersen: Arc<RingPedersenPrivate>,
    ) -> Self {
        Self {
            base: VerifierBase::new(other_id, aad, my_key, paillier, ring_pedersen),
        }
    }

    fn check(
        &self,
        request: &[u8],
        response: &MtaMessage,
        public_point: &C::ProjectivePoint,
    ) -> Result<(), MtaError> {
        let parsed = self.base.parse(request, response, public_point)?;
        self.process_paillier(&parsed)?;
        self.process_ring_pedersen(&parsed)
    }

    /// Check `C^z1 (1 + N0)^z2 w^N0 = A D^e mod N0^2` and
    /// `(1 + N1)^z2 w_y^N1 = B_y Y^e mod N1^2`.
    fn process_paillier(&self, parsed: &ParsedResponse<C>) -> Result<(), MtaError> {
        let base = &self.base;
        let sk = &base.my_paillier;
        let my_public = sk.public_key();
        let proof = &parsed.proof;

        let lhs = base.my_ctx.mul(
            &base.my_ctx.mul(
                &sk.pow_mod_n2(&parsed.request, &proof.z1),
                &my_public.one_plus_n_pow(&proof.z2),
            ),
            &sk.pow_mod_n2(&proof.w, my_public.n()),
        );
        let rhs = base
            .my_ctx
            .mul(&proof.big_a, &sk.pow_mod_n2(&parsed.response, &parsed.e));
        if lhs != rhs {
            return Err(base.fail("paillier affine equation mismatch"));
        }

        let other_public = base.other_paillier.as_ref();
        let lhs = other_public.encrypt_with(&proof.z2, &proof.w_y);
        let rhs = base.other_ctx.mul(
            &proof.big_b_y,
            &base.other_ctx.pow(&parsed.commitment, &parsed.e),
        );
        if lhs != rhs {
            return Err(base.fail("paillier commitment equation mismatch"));
        }
        Ok(())
    }

    /// Check `s^z1 t^z3 = E S^e` and `s^z2 t^z4 = F T^e mod N`, using our trapdoor.
    fn process_ring_pedersen(&self, parsed: &ParsedResponse<C>) -> Result<(), MtaError> {
        let base = &self.base;
        let rp = &base.my_ring_pedersen;
        let ctx = &base.pedersen_ctx;
        let proof = &parsed.proof;

        let checks = [
            (&proof.z1, &proof.z3, &proof.big_e, &proof.big_s),
            (&proof.z2, &proof.z4, &proof.big_f, &proof.big_t),
        ];
        for (a, b, mask, commitment) in checks {
            let lhs = rp.pow_t(&rp.exponent(a, b));
            let rhs = ctx.mul(mask, &ctx.pow(commitment, &parsed.e));
            if lhs != rhs {
                return Err(base.fail("ring pedersen equation mismatch"));
            }
        }
        Ok(())
    }
}

impl<C: MtaCurve> ResponseVerifier<C> for SingleResponseVerifier<C> {
    fn process(
        &mut self,
        request: &[u8],
        response: &MtaMessage,
        public_point: &C::ProjectivePoint,
    ) -> Result<(), MtaError> {
        self.base.start_process()?;
        let result = self.check(request, response, public_point);
        self.base.record(result)?;
        tracing::trace!(other = ?self.base.other_id, "verified mta response");
        Ok(())
    }

    fn verify(&mut self) -> Result<(), MtaError> {
        // Every response was already checked in `process`, and failures recorded.
        let processed = self.base.finalize()?;
        tracing::debug!(other = ?self.base.other_id, processed, "mta responses verified");
        Ok(())
    }

    fn kind(&self) -> VerifierKind {
        VerifierKind::Single
    }
}

/// Create a verifier for `num_of_blocks` responses from `other_id`.
///
/// Batching only pays off with enough responses to amortize over, so below
/// `min_batch_threshold` each response gets verified on its own.
/// [`MIN_BATCH_SIZE`](crate::constants::MIN_BATCH_SIZE) is a sensible threshold.
pub fn new_response_verifier<C: MtaCurve>(
    num_of_blocks: usize,
    other_id: Participant,
    aad: &[u8],
    my_key: Arc<PaillierPrivateKey>,
    paillier: Arc<PaillierPublicKey>,
    ring_pedersen: Arc<RingPedersenPrivate>,
    min_batch_threshold: usize,
) -> Box<dyn ResponseVerifier<C> + Send> {
    if num_of_blocks >= min_batch_threshold {
        tracing::debug!(other = ?other_id, num_of_blocks, "using batch mta verification");
        Box::new(BatchResponseVerifier::new(
            other_id,
            aad,
            my_key,
            paillier,
            ring_pedersen,
            OsRng,
        ))
    } else {
        tracing::debug!(other = ?other_id, num_of_blocks, "using single mta verification");
        Box::new(SingleResponseVerifier::new(
            other_id,
            aad,
            my_key,
            paillier,
            ring_pedersen,
        ))
    }
}
