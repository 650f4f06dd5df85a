//! Error types for the exchange protocol.

use std::fmt;

use talus_core::{RankId, StepId};

/// Errors from the rank-to-rank communication round.
///
/// All variants are fatal: the physics requires perfect boundary
/// consistency every step, so there is no partial-consistency recovery
/// mode. A rank that cannot complete its round aborts the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// The channel to a neighbor is disconnected; the peer is gone.
    PeerUnavailable {
        /// The unreachable neighbor.
        peer: RankId,
    },
    /// An expected packet did not arrive within the configured window.
    Timeout {
        /// The silent neighbor.
        peer: RankId,
        /// How long this rank waited, in milliseconds.
        waited_ms: u64,
    },
    /// A packet arrived stamped with the wrong step.
    ///
    /// The lockstep protocol admits exactly one packet per neighbor per
    /// round; a skewed stamp means a rank has desynchronized and the
    /// ghost sets can no longer be trusted.
    StepSkew {
        /// The neighbor whose packet was skewed.
        peer: RankId,
        /// The step this rank is exchanging for.
        expected: StepId,
        /// The step stamped on the packet.
        got: StepId,
    },
    /// No link exists to the named rank.
    ///
    /// Indicates topology wiring that disagrees with the domain
    /// decomposition; a startup bug, not a runtime condition.
    NoLink {
        /// The rank with no link.
        peer: RankId,
    },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerUnavailable { peer } => {
                write!(f, "peer rank {peer} is unavailable (channel disconnected)")
            }
            Self::Timeout { peer, waited_ms } => {
                write!(f, "timed out after {waited_ms}ms waiting for rank {peer}")
            }
            Self::StepSkew {
                peer,
                expected,
                got,
            } => write!(
                f,
                "rank {peer} sent a packet for step {got}, expected step {expected}"
            ),
            Self::NoLink { peer } => write!(f, "no link to rank {peer}"),
        }
    }
}

impl std::error::Error for ExchangeError {}
