//! Zero-knowledge range proofs over Paillier ciphertexts.
pub mod affg;
pub mod enc;
