use serde::{de::DeserializeOwned, Serialize};

use crate::errors::MtaError;

/// Encode an arbitrary serializable value into a vec.
pub fn encode<T: Serialize + ?Sized>(val: &T) -> Vec<u8> {
    rmp_serde::encode::to_vec(val).expect("failed to encode value")
}

/// Decode a value received from another party.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, MtaError> {
    rmp_serde::decode::from_slice(data).map_err(|e| MtaError::Encoding(e.to_string()))
}
