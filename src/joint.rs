//! Joint tours: individual tours of household members who travel together
//! for the whole tour.
//!
//! A person's tour qualifies when every one of its trips is a joint trip,
//! it has at least two trips, and the people present on all of its joint
//! trips (its stable group) number two or more. Qualifying tours of
//! different people are linked when they share a joint trip and each person
//! belongs to the other's stable group. Every linked component gets one
//! joint tour id.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::info;
use petgraph::unionfind::UnionFind;

use crate::error::TourError;
use crate::ids;
use crate::model::{Tour, Trip};

struct Candidate {
    tour_idx: usize,
    person_id: i64,
    stable_group: BTreeSet<i64>,
    joint_trip_ids: Vec<i64>,
}

fn participants(trips: &[Trip]) -> HashMap<i64, BTreeSet<i64>> {
    let mut out: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    for trip in trips {
        if let Some(joint_id) = trip.joint_trip_id {
            out.entry(joint_id).or_default().insert(trip.person_id);
        }
    }
    out
}

fn candidate(
    tour_idx: usize,
    tour: &Tour,
    trips_by_id: &HashMap<i64, &Trip>,
    participants: &HashMap<i64, BTreeSet<i64>>,
) -> Option<Candidate> {
    if tour.trip_ids.len() < 2 {
        return None;
    }
    let joint_trip_ids = tour
        .trip_ids
        .iter()
        .map(|id| trips_by_id.get(id).and_then(|t| t.joint_trip_id))
        .collect::<Option<Vec<i64>>>()?;

    let mut groups = joint_trip_ids.iter().filter_map(|id| participants.get(id));
    let mut stable_group = groups.next()?.clone();
    for group in groups {
        stable_group.retain(|p| group.contains(p));
    }
    if stable_group.len() < 2 {
        return None;
    }

    Some(Candidate {
        tour_idx,
        person_id: tour.person_id,
        stable_group,
        joint_trip_ids,
    })
}

/// Joint tour id per tour (parallel to `tours`).
pub fn identify_joint_tours(tours: &[Tour], trips: &[Trip]) -> Result<Vec<Option<i64>>, TourError> {
    info!("Identifying joint tours from joint trips...");

    let mut joint_ids = vec![None; tours.len()];
    let participants = participants(trips);
    if participants.is_empty() {
        info!("No joint trips found, skipping joint tour identification");
        return Ok(joint_ids);
    }

    let trips_by_id: HashMap<i64, &Trip> = trips.iter().map(|t| (t.trip_id, t)).collect();
    let candidates: Vec<Candidate> = tours
        .iter()
        .enumerate()
        .filter_map(|(idx, tour)| candidate(idx, tour, &trips_by_id, &participants))
        .collect();
    if candidates.is_empty() {
        info!("No stable joint tour groups found");
        return Ok(joint_ids);
    }

    let mut by_joint_trip: HashMap<i64, Vec<usize>> = HashMap::new();
    for (c_idx, c) in candidates.iter().enumerate() {
        for joint_id in &c.joint_trip_ids {
            by_joint_trip.entry(*joint_id).or_default().push(c_idx);
        }
    }

    let mut uf = UnionFind::<usize>::new(candidates.len());
    for members in by_joint_trip.values() {
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                let (ca, cb) = (&candidates[a], &candidates[b]);
                if ca.person_id != cb.person_id
                    && ca.stable_group.contains(&cb.person_id)
                    && cb.stable_group.contains(&ca.person_id)
                {
                    uf.union(a, b);
                }
            }
        }
    }

    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for c_idx in 0..candidates.len() {
        components.entry(uf.find(c_idx)).or_default().push(c_idx);
    }

    // hh_id -> (smallest member tour id, member tour indices)
    let mut per_household: BTreeMap<i64, Vec<(i64, Vec<usize>)>> = BTreeMap::new();
    for members in components.into_values().filter(|m| m.len() >= 2) {
        let tour_idxs: Vec<usize> = members.iter().map(|&c| candidates[c].tour_idx).collect();
        let first_tour_id = tour_idxs
            .iter()
            .map(|&t| tours[t].tour_id)
            .min()
            .unwrap_or_default();
        let hh_id = tours[tour_idxs[0]].hh_id;
        per_household
            .entry(hh_id)
            .or_default()
            .push((first_tour_id, tour_idxs));
    }

    let mut groups = 0usize;
    let mut linked = 0usize;
    for (hh_id, mut components) in per_household {
        components.sort_by_key(|(first_tour_id, _)| *first_tour_id);
        for (n, (_, tour_idxs)) in components.into_iter().enumerate() {
            let joint_tour_id = ids::joint_tour_id(hh_id, n as u32 + 1)?;
            for idx in tour_idxs {
                joint_ids[idx] = Some(joint_tour_id);
                linked += 1;
            }
            groups += 1;
        }
    }

    info!("Identified {linked} individual tours as joint ({groups} unique joint tour groups)");
    Ok(joint_ids)
}
