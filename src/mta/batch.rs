use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::One;
use rand_core::{CryptoRngCore, OsRng, RngCore};

use crate::{
    compat::MtaCurve,
    constants::{BATCH_STATISTICAL_SECURITY, PEDERSEN_COEFFICIENT_BITS},
    crypto::{
        paillier::{PaillierPrivateKey, PaillierPublicKey},
        ring_pedersen::RingPedersenPrivate,
    },
    errors::MtaError,
    math::sample_bits,
    participants::Participant,
};

use super::{
    verifier::{ParsedResponse, ResponseVerifier, VerifierBase, VerifierKind},
    MtaMessage,
};

type Accumulator = [BigUint; BATCH_STATISTICAL_SECURITY];

fn ones() -> Accumulator {
    std::array::from_fn(|_| BigUint::one())
}

/// Verifies many responses at once, through random linear combinations.
///
/// Each Paillier equation has the shape `ro^N = B`, where only `ro` differs
/// between responses and the exponent `N` is full size. For every slot, we pick
/// a random subset of the responses, and multiply their `ro` and `B` values
/// together, leaving one full size exponentiation per slot in [`verify`], no
/// matter how many responses were processed.
///
/// An invalid response lands in each slot's subset with probability 1/2, and
/// whenever it does, that slot's equation fails. Across all the slots, an invalid
/// response gets past verification with probability `2^-BATCH_STATISTICAL_SECURITY`.
///
/// The Ring-Pedersen equations collapse into powers of `t` thanks to our
/// trapdoor, so we fold them together with random coefficients, and check them
/// with a single exponentiation at the end.
///
/// [`verify`]: ResponseVerifier::verify
pub struct BatchResponseVerifier<C: MtaCurve, R = OsRng> {
    base: VerifierBase<C>,
    rng: R,
    mta_ro: Accumulator,
    mta_b: Accumulator,
    commitment_ro: Accumulator,
    commitment_b: Accumulator,
    pedersen_t_exp: BigUint,
    pedersen_b: BigUint,
}

impl<C: MtaCurve, R: CryptoRngCore> BatchResponseVerifier<C, R> {
    /// Create a verifier, drawing its random subsets and coefficients from `rng`.
    pub fn new(
        other_id: Participant,
        aad: &[u8],
        my_key: Arc<PaillierPrivateKey>,
        paillier: Arc<PaillierPublicKey>,
        ring_pedersen: Arc<RingPedersenPrivate>,
        rng: R,
    ) -> Self {
        Self {
            base: VerifierBase::new(other_id, aad, my_key, paillier, ring_pedersen),
            rng,
            mta_ro: ones(),
            mta_b: ones(),
            commitment_ro: ones(),
            commitment_b: ones(),
            pedersen_t_exp: BigUint::default(),
            pedersen_b: BigUint::one(),
        }
    }

    /// Fold `w` and `A D^e C^-z1 (1 + N0)^-z2` into the slots picked by `selection`,
    /// and likewise `w_y` and `B_y Y^e (1 + N1)^-z2`.
    fn process_paillier(
        &mut self,
        parsed: &ParsedResponse<C>,
        selection: u32,
    ) -> Result<(), MtaError> {
        let base = &self.base;
        let sk = &base.my_paillier;
        let my_public = sk.public_key();
        let other_public = base.other_paillier.as_ref();
        let proof = &parsed.proof;

        let c_z1_inv = base
            .my_ctx
            .inv(&sk.pow_mod_n2(&parsed.request, &proof.z1))
            .ok_or_else(|| {
                MtaError::CryptographicInvariantViolation(
                    "request ciphertext is not invertible".to_owned(),
                )
            })?;
        let mta_term = base.my_ctx.mul(
            &base.my_ctx.mul(
                &proof.big_a,
                &sk.pow_mod_n2(&parsed.response, &parsed.e),
            ),
            &base
                .my_ctx
                .mul(&c_z1_inv, &my_public.one_plus_n_pow_neg(&proof.z2)),
        );

        let commitment_term = base.other_ctx.mul(
            &base.other_ctx.mul(
                &proof.big_b_y,
                &base.other_ctx.pow(&parsed.commitment, &parsed.e),
            ),
            &other_public.one_plus_n_pow_neg(&proof.z2),
        );

        for j in 0..BATCH_STATISTICAL_SECURITY {
            if (selection >> j) & 1 == 0 {
                continue;
            }
            self.mta_ro[j] = self.base.my_ctx.mul(&self.mta_ro[j], &proof.w);
            self.mta_b[j] = self.base.my_ctx.mul(&self.mta_b[j], &mta_term);
            self.commitment_ro[j] = self.base.other_ctx.mul(&self.commitment_ro[j], &proof.w_y);
            self.commitment_b[j] = self.base.other_ctx.mul(&self.commitment_b[j], &commitment_term);
        }
        Ok(())
    }

    /// Fold `t^(lambda z1 + z3) = E S^e` and `t^(lambda z2 + z4) = F T^e`
    /// into the running exponent and product, with random coefficients.
    ///
    /// Parsing already rejected non-squares, so the difference between the
    /// two sides of an invalid equation has large odd order, and survives
    /// being raised to any of our coefficients.
    fn process_ring_pedersen(&mut self, parsed: &ParsedResponse<C>) {
        let rp = &self.base.my_ring_pedersen;
        let ctx = &self.base.pedersen_ctx;
        let proof = &parsed.proof;

        let checks = [
            (&proof.z1, &proof.z3, &proof.big_e, &proof.big_s),
            (&proof.z2, &proof.z4, &proof.big_f, &proof.big_t),
        ];
        for (a, b, mask, commitment) in checks {
            // Odd, hence never zero.
            let coefficient = (sample_bits(&mut self.rng, PEDERSEN_COEFFICIENT_BITS - 1)
                << 1usize)
                + BigUint::one();
            let exponent = rp.exponent(a, b) * &coefficient;
            self.pedersen_t_exp = (&self.pedersen_t_exp + exponent) % rp.phi();

            let term = ctx.mul(mask, &ctx.pow(commitment, &parsed.e));
            self.pedersen_b = ctx.mul(&self.pedersen_b, &ctx.pow(&term, &coefficient));
        }
    }

    fn accumulate(
        &mut self,
        request: &[u8],
        response: &MtaMessage,
        public_point: &C::ProjectivePoint,
    ) -> Result<(), MtaError> {
        let parsed = self.base.parse(request, response, public_point)?;
        let selection = self.rng.next_u32();
        self.process_paillier(&parsed, selection)?;
        self.process_ring_pedersen(&parsed);
        Ok(())
    }
}

impl<C: MtaCurve, R: CryptoRngCore> ResponseVerifier<C> for BatchResponseVerifier<C, R> {
    fn process(
        &mut self,
        request: &[u8],
        response: &MtaMessage,
        public_point: &C::ProjectivePoint,
    ) -> Result<(), MtaError> {
        self.base.start_process()?;
        let result = self.accumulate(request, response, public_point);
        self.base.record(result)?;
        tracing::trace!(other = ?self.base.other_id, "accumulated mta response");
        Ok(())
    }

    fn verify(&mut self) -> Result<(), MtaError> {
        let processed = self.base.finalize()?;
        let base = &self.base;
        let sk = &base.my_paillier;
        let my_n = sk.public_key().n();
        let other_n = base.other_paillier.n();

        for j in 0..BATCH_STATISTICAL_SECURITY {
            if sk.pow_mod_n2(&self.mta_ro[j], my_n) != self.mta_b[j] {
                return Err(base.fail(format!("batched paillier affine equation {j} mismatch")));
            }
            if base.other_ctx.pow(&self.commitment_ro[j], other_n) != self.commitment_b[j] {
                return Err(base.fail(format!(
                    "batched paillier commitment equation {j} mismatch"
                )));
            }
        }

        if base.my_ring_pedersen.pow_t(&self.pedersen_t_exp) != self.pedersen_b {
            return Err(base.fail("batched ring pedersen equation mismatch"));
        }

        tracing::debug!(other = ?base.other_id, processed, "mta responses verified in batch");
        Ok(())
    }

    fn kind(&self) -> VerifierKind {
        VerifierKind::Batch
    }
}
