//! Channel plumbing between slab neighbors.
//!
//! Each adjacent rank pair is joined by a pair of bounded
//! crossbeam channels, one per direction. [`RankLinks::chain`] wires a
//! full slab chain for in-process multi-threaded runs; a distributed
//! transport would construct [`NeighborLink`]s over sockets instead.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use talus_core::RankId;

use crate::error::ExchangeError;
use crate::wire::Packet;

/// Bidirectional link to one slab neighbor.
#[derive(Debug)]
pub struct NeighborLink {
    /// The rank at the other end.
    pub peer: RankId,
    tx: Sender<Packet>,
    rx: Receiver<Packet>,
}

impl NeighborLink {
    /// Wrap raw channel endpoints to `peer`.
    pub fn new(peer: RankId, tx: Sender<Packet>, rx: Receiver<Packet>) -> Self {
        Self { peer, tx, rx }
    }

    /// Send one packet, blocking if the channel is at capacity.
    ///
    /// # Errors
    ///
    /// [`ExchangeError::PeerUnavailable`] if the peer has hung up.
    pub fn send(&self, packet: Packet) -> Result<(), ExchangeError> {
        self.tx
            .send(packet)
            .map_err(|_| ExchangeError::PeerUnavailable { peer: self.peer })
    }

    /// Receive one packet, waiting up to `timeout`.
    ///
    /// # Errors
    ///
    /// [`ExchangeError::Timeout`] if nothing arrives in time,
    /// [`ExchangeError::PeerUnavailable`] if the peer has hung up.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Packet, ExchangeError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => ExchangeError::Timeout {
                peer: self.peer,
                waited_ms: timeout.as_millis() as u64,
            },
            RecvTimeoutError::Disconnected => ExchangeError::PeerUnavailable { peer: self.peer },
        })
    }
}

/// All of one rank's neighbor links.
///
/// A slab decomposition gives each rank at most two.
#[derive(Debug, Default)]
pub struct RankLinks {
    links: Vec<NeighborLink>,
}

impl RankLinks {
    /// No links; the single-rank case.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a link. Call once per neighbor during wiring.
    pub fn add(&mut self, link: NeighborLink) {
        self.links.push(link);
    }

    /// The link to `peer`, if wired.
    pub fn to(&self, peer: RankId) -> Option<&NeighborLink> {
        self.links.iter().find(|l| l.peer == peer)
    }

    /// Peers this rank is wired to.
    pub fn peers(&self) -> impl Iterator<Item = RankId> + '_ {
        self.links.iter().map(|l| l.peer)
    }

    /// Wire a complete slab chain of `num_ranks` ranks in-process.
    ///
    /// Returns one `RankLinks` per rank, index `r` belonging to rank `r`.
    /// Each adjacent pair gets a bounded channel of `capacity` in each
    /// direction. One packet per neighbor per round means a capacity of 1
    /// already avoids deadlock; larger capacities just reduce send
    /// blocking when ranks drift within a round.
    pub fn chain(num_ranks: u32, capacity: usize) -> Vec<RankLinks> {
        let mut all: Vec<RankLinks> = (0..num_ranks).map(|_| RankLinks::none()).collect();
        for lower in 0..num_ranks.saturating_sub(1) {
            let upper = lower + 1;
            let (to_upper_tx, to_upper_rx) = bounded(capacity);
            let (to_lower_tx, to_lower_rx) = bounded(capacity);
            all[lower as usize].add(NeighborLink::new(RankId(upper), to_upper_tx, to_lower_rx));
            all[upper as usize].add(NeighborLink::new(RankId(lower), to_lower_tx, to_upper_rx));
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_core::StepId;

    #[test]
    fn chain_wires_each_adjacent_pair_both_ways() {
        let links = RankLinks::chain(3, 1);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].peers().collect::<Vec<_>>(), vec![RankId(1)]);
        assert_eq!(
            links[1].peers().collect::<Vec<_>>(),
            vec![RankId(0), RankId(2)]
        );
        assert_eq!(links[2].peers().collect::<Vec<_>>(), vec![RankId(1)]);
    }

    #[test]
    fn packet_travels_between_chain_neighbors() {
        let links = RankLinks::chain(2, 1);
        let packet = Packet::empty(RankId(0), StepId(7));
        links[0].to(RankId(1)).unwrap().send(packet.clone()).unwrap();
        let got = links[1]
            .to(RankId(0))
            .unwrap()
            .recv_timeout(Duration::from_millis(100))
            .unwrap();
        assert_eq!(got, packet);
    }

    #[test]
    fn recv_times_out_on_a_silent_peer() {
        let links = RankLinks::chain(2, 1);
        let err = links[0]
            .to(RankId(1))
            .unwrap()
            .recv_timeout(Duration::from_millis(5))
            .unwrap_err();
        assert_eq!(
            err,
            ExchangeError::Timeout {
                peer: RankId(1),
                waited_ms: 5
            }
        );
    }

    #[test]
    fn dropped_peer_is_reported_unavailable() {
        let mut links = RankLinks::chain(2, 1);
        let rank1 = links.pop().unwrap();
        drop(rank1);
        let err = links[0]
            .to(RankId(1))
            .unwrap()
            .recv_timeout(Duration::from_millis(100))
            .unwrap_err();
        assert_eq!(err, ExchangeError::PeerUnavailable { peer: RankId(1) });
    }

    #[test]
    fn single_rank_chain_has_no_links() {
        let links = RankLinks::chain(1, 1);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].peers().count(), 0);
    }
}
