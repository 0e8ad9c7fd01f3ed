use elliptic_curve::{ff::PrimeField, CurveArithmetic, Field, PrimeCurve};
use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::MtaError;

#[cfg(any(feature = "k256", test))]
mod k256_impl;
#[cfg(any(feature = "p256", test))]
mod p256_impl;

/// Represents a curve whose scalars can be converted with this library.
///
/// This is the algebra the MtA conversion works over: the secrets being
/// multiplied, and the additive shares that come out, are scalars of this curve.
/// The range proofs also commit to the responder's secret with a point on this curve.
///
/// The bulk of the trait are the bounds requiring a curve according
/// to RustCrypto's traits.
///
/// Beyond that, we also require that curves have a name, for domain separation,
/// and a way to serialize points with serde.
pub trait MtaCurve: PrimeCurve + CurveArithmetic {
    const NAME: &'static [u8];

    /// The size of the scalar field in bits, which drives the range proof bounds.
    const BITS: usize;

    /// Serialize a point with serde.
    fn serialize_point<S: Serializer>(
        point: &Self::AffinePoint,
        serializer: S,
    ) -> Result<S::Ok, S::Error>;

    /// Deserialize a point with serde.
    fn deserialize_point<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self::AffinePoint, D::Error>;
}

#[derive(Clone, Copy)]
pub(crate) struct SerializablePoint<C: MtaCurve>(C::AffinePoint);

impl<C: MtaCurve> SerializablePoint<C> {
    pub fn to_projective(&self) -> C::ProjectivePoint {
        self.0.into()
    }

    pub fn from_projective(point: &C::ProjectivePoint) -> Self {
        Self((*point).into())
    }
}

impl<C: MtaCurve> Serialize for SerializablePoint<C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        C::serialize_point(&self.0, serializer)
    }
}

impl<'de, C: MtaCurve> Deserialize<'de> for SerializablePoint<C> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let affine = C::deserialize_point(deserializer)?;
        Ok(Self(affine))
    }
}

/// The order of the curve's scalar field, as a big integer.
pub(crate) fn curve_order<C: MtaCurve>() -> BigUint {
    scalar_to_biguint::<C>(&-C::Scalar::ONE) + BigUint::one()
}

/// Interpret a scalar as a non-negative integer below the curve order.
pub(crate) fn scalar_to_biguint<C: MtaCurve>(x: &C::Scalar) -> BigUint {
    BigUint::from_bytes_be(x.to_repr().as_ref())
}

/// Reduce an arbitrary integer modulo the curve order, producing a scalar.
pub(crate) fn biguint_to_scalar<C: MtaCurve>(x: &BigUint) -> Result<C::Scalar, MtaError> {
    let reduced = x % curve_order::<C>();
    let bytes = reduced.to_bytes_be();

    let mut repr = <C::Scalar as PrimeField>::Repr::default();
    let len = repr.as_ref().len();
    if bytes.len() > len {
        return Err(MtaError::CryptographicInvariantViolation(
            "reduced value does not fit in a field element".to_owned(),
        ));
    }
    repr.as_mut()[len - bytes.len()..].copy_from_slice(&bytes);

    Option::from(C::Scalar::from_repr(repr)).ok_or_else(|| {
        MtaError::CryptographicInvariantViolation("non canonical scalar encoding".to_owned())
    })
}

/// Parse a big-endian secret, which must already lie below the curve order.
///
/// Secrets may be shorter than a full field element, but never longer.
pub(crate) fn secret_to_biguint<C: MtaCurve>(secret: &[u8]) -> Result<BigUint, MtaError> {
    let x = BigUint::from_bytes_be(secret);
    if x >= curve_order::<C>() {
        return Err(MtaError::CryptographicInvariantViolation(format!(
            "secret of {} bytes is not below the curve order",
            secret.len()
        )));
    }
    Ok(x)
}
