//! This module holds the directory of public key material for each participant.
//!
//! Requests are built against every other participant's Ring-Pedersen parameters,
//! so the requester needs a read-only view of the whole session.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    crypto::{paillier::PaillierPublicKey, ring_pedersen::RingPedersenPublic},
    errors::MtaError,
};

/// Represents a participant in the protocol.
///
/// Each participant should be uniquely identified by some number, which this
/// struct holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash,
)]
pub struct Participant(u64);

impl Participant {
    /// Return this participant as little endian bytes.
    pub fn bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl From<Participant> for u64 {
    fn from(p: Participant) -> Self {
        p.0
    }
}

impl From<u64> for Participant {
    fn from(x: u64) -> Self {
        Participant(x)
    }
}

/// The public key material of one participant.
///
/// Keys are immutable and shared between every MtA instance of a session.
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub paillier: Arc<PaillierPublicKey>,
    pub ring_pedersen: Arc<RingPedersenPublic>,
}

/// The public key material of every participant in a session.
pub type PlayerDirectory = BTreeMap<Participant, PlayerInfo>;

/// Look up a participant's public material, failing if they're unknown.
pub(crate) fn lookup(players: &PlayerDirectory, p: Participant) -> Result<&PlayerInfo, MtaError> {
    players
        .get(&p)
        .ok_or_else(|| MtaError::KeyError(format!("no public key material for {p:?}")))
}

/// Iterate over every participant in the directory except `me`.
pub(crate) fn others(
    players: &PlayerDirectory,
    me: Participant,
) -> impl Iterator<Item = (Participant, &PlayerInfo)> + '_ {
    players
        .iter()
        .filter(move |(p, _)| **p != me)
        .map(|(p, info)| (*p, info))
}
