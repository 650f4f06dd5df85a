//! The synchronous boundary exchange round.
//!
//! [`exchange_round`] runs once per rank per timestep, after integration:
//!
//! 1. Re-classify authoritative bodies against the halo margin
//!    (`Owned` ↔ `Shared`).
//! 2. Detect migrations: bodies whose position now maps to a neighbor
//!    slab become `Migrate` records and are marked for removal; bodies
//!    that escaped the global box (or went non-finite) are quarantined.
//! 3. Assemble this round's complete ghost set for each neighbor from
//!    the `Shared` bodies within the halo of that neighbor's face.
//! 4. Send exactly one packet per neighbor (empty if need be), then
//!    block until one packet has arrived from each neighbor, and apply
//!    them with [`apply_packet`].
//! 5. Clear the slots of bodies that migrated out.
//!
//! Sends complete before any receive, so the round cannot deadlock on a
//! full channel as long as link capacity is at least one packet. Removal
//! happening last means a crash between send and apply never destroys
//! the only authoritative copy of a body.

use std::time::Duration;

use indexmap::IndexMap;

use talus_core::{RankId, StepId};
use talus_domain::SimulationDomain;
use talus_registry::BodyRegistry;

use crate::error::ExchangeError;
use crate::links::RankLinks;
use crate::wire::{Packet, RecordKind, WireRecord};

/// Telemetry from one exchange round on one rank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExchangeReport {
    /// Bodies handed to a neighbor this round.
    pub migrations_out: usize,
    /// Bodies received from neighbors and now authoritative here.
    pub migrations_in: usize,
    /// Ghost records sent across all neighbors.
    pub ghosts_sent: usize,
    /// Ghost records installed from all neighbors.
    pub ghosts_received: usize,
    /// Encoded size of everything sent, headers included.
    pub bytes_sent: usize,
    /// Encoded size of everything received, headers included.
    pub bytes_received: usize,
    /// Bodies quarantined by the out-of-domain policy this round.
    pub quarantined: usize,
}

/// Apply one neighbor packet to the local registry.
///
/// Migration records are applied first, keyed by id and idempotent; the
/// ghost records then replace the entire ghost set previously attributed
/// to the sender, even when there are none. Returns
/// `(migrations_in, ghosts_installed)`.
pub fn apply_packet(registry: &mut BodyRegistry, packet: &Packet) -> (usize, usize) {
    let mut migrations_in = 0;
    let mut ghosts = Vec::new();
    for record in &packet.records {
        match record.kind {
            RecordKind::Migrate => {
                registry.apply_migration(record.into_body());
                migrations_in += 1;
            }
            RecordKind::Ghost => ghosts.push(record.into_body()),
        }
    }
    let installed = registry.replace_ghosts_from(packet.from, ghosts);
    (migrations_in, installed)
}

/// Run one complete exchange round for `rank`.
///
/// Blocking collective: returns only once a packet from every slab
/// neighbor has been received and applied, so all ranks must call this
/// for the same `step` concurrently.
///
/// # Errors
///
/// [`ExchangeError`] when a neighbor link is missing, a peer is gone or
/// silent past `timeout`, or a packet arrives stamped with a different
/// step. All are fatal to the run.
pub fn exchange_round(
    domain: &SimulationDomain,
    rank: RankId,
    registry: &mut BodyRegistry,
    links: &RankLinks,
    halo_margin: f64,
    step: StepId,
    timeout: Duration,
) -> Result<ExchangeReport, ExchangeError> {
    let neighbors = domain.neighbors(rank);
    let mut report = ExchangeReport::default();

    // Phase 1 + 2: one scan classifies every authoritative body.
    let mut reclassify = Vec::new();
    let mut quarantine = Vec::new();
    let mut pending_removal = Vec::new();
    let mut outgoing: IndexMap<RankId, Vec<WireRecord>> =
        neighbors.iter().map(|&n| (n, Vec::new())).collect();

    for (idx, slot) in registry.iter() {
        if !slot.is_authoritative() {
            continue;
        }
        let body = match slot.body() {
            Some(b) => *b,
            None => continue,
        };
        if !body.is_finite() {
            quarantine.push(idx);
            continue;
        }
        match domain.rank_for(&body.position) {
            Some(home) if home == rank => {
                let shared = neighbors.iter().any(|&n| {
                    domain
                        .distance_to_shared_face(rank, n, &body.position)
                        .is_some_and(|d| d <= halo_margin)
                });
                reclassify.push((idx, shared));
            }
            Some(dest) if outgoing.contains_key(&dest) => {
                outgoing[&dest].push(WireRecord::migrate(&body));
                pending_removal.push(idx);
                report.migrations_out += 1;
            }
            // Escaped the box, or skipped clean over a whole slab in one
            // step. Neither can be handed to an adjacent neighbor.
            _ => quarantine.push(idx),
        }
    }
    for (idx, shared) in reclassify {
        registry.reclassify(idx, shared);
    }
    for idx in quarantine {
        if registry.quarantine(idx).is_some() {
            report.quarantined += 1;
        }
    }

    // Phase 3: the complete ghost set for each neighbor, rebuilt from
    // scratch every round.
    for &neighbor in &neighbors {
        let records = &mut outgoing[&neighbor];
        for (idx, slot) in registry.iter() {
            if pending_removal.contains(&idx) || !slot.is_shared() {
                continue;
            }
            let body = match slot.body() {
                Some(b) => b,
                None => continue,
            };
            let within = domain
                .distance_to_shared_face(rank, neighbor, &body.position)
                .is_some_and(|d| d <= halo_margin);
            if within {
                records.push(WireRecord::ghost(body));
                report.ghosts_sent += 1;
            }
        }
    }

    // Phase 4a: all sends before any receive.
    for &neighbor in &neighbors {
        let link = links
            .to(neighbor)
            .ok_or(ExchangeError::NoLink { peer: neighbor })?;
        let packet = Packet {
            from: rank,
            step,
            records: outgoing.shift_remove(&neighbor).unwrap_or_default(),
        };
        report.bytes_sent += packet.encoded_len();
        link.send(packet)?;
    }

    // Phase 4b: exactly one packet per neighbor, applied as it arrives.
    for &neighbor in &neighbors {
        let link = links
            .to(neighbor)
            .ok_or(ExchangeError::NoLink { peer: neighbor })?;
        let packet = link.recv_timeout(timeout)?;
        if packet.step != step {
            return Err(ExchangeError::StepSkew {
                peer: neighbor,
                expected: step,
                got: packet.step,
            });
        }
        report.bytes_received += packet.encoded_len();
        let (migrations_in, ghosts_received) = apply_packet(registry, &packet);
        report.migrations_in += migrations_in;
        report.ghosts_received += ghosts_received;
    }

    // Phase 5: only now is it safe to drop the migrated-out copies.
    for idx in pending_removal {
        registry.clear_slot(idx);
    }

    Ok(report)
}
