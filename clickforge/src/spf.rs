// Clickforge: Compiling Click Forwarding Pipelines from Flooded Routing State
// Copyright (C) 2022  The Clickforge Developers
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Auxiliary Shortest-Path Resolver (experimental)
//!
//! Breadth-first hop-distance computation, and a per-router assignment of destinations to the
//! first directly connected neighbor on a strictly shortest path. This yields a globally optimal
//! alternative to the flood-fill's first-heard-wins attribution. It is kept as an independently
//! testable utility and is deliberately NOT wired into the convergence engine or the compiler:
//! doing so would change determinism and tie-breaking of the emitted programs.

use crate::topology::Topology;
use crate::types::{NetworkError, NodeId};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Hop distance from `source` to every reachable node. Hosts terminate traffic, so the search
/// never expands through a host (a host that is not the source contributes its distance but no
/// further neighbors).
pub fn bfs(topo: &Topology, source: NodeId) -> Result<HashMap<NodeId, usize>, NetworkError> {
    let mut dist: HashMap<NodeId, usize> = HashMap::new();
    dist.insert(source, 0);
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    queue.push_back(source);
    while let Some(node) = queue.pop_front() {
        if node != source && !topo.is_router(node) {
            continue;
        }
        let d = dist[&node];
        for link in topo.links_touching(node) {
            let (next, _) = topo.opposite(link, node)?;
            if !dist.contains_key(&next) {
                dist.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    Ok(dist)
}

/// For every router, assign each reachable destination to one directly connected neighbor lying
/// on a strictly shortest path. Neighbors are enumerated in interface order and ties go to the
/// first one, so the assignment is deterministic. The inner vector pairs each neighbor (one per
/// link, in interface order) with its set of destinations.
#[allow(clippy::type_complexity)]
pub fn shortest_path_map(
    topo: &Topology,
) -> Result<HashMap<NodeId, Vec<(NodeId, BTreeSet<NodeId>)>>, NetworkError> {
    let mut all_dist: HashMap<NodeId, HashMap<NodeId, usize>> = HashMap::new();
    for node in topo.nodes() {
        all_dist.insert(node, bfs(topo, node)?);
    }
    let mut map = HashMap::new();
    for router in topo.routers() {
        let dist_r = &all_dist[&router];
        let mut neighbors: Vec<NodeId> = Vec::new();
        for link in topo.links_touching(router) {
            neighbors.push(topo.opposite(link, router)?.0);
        }
        let mut assignment: Vec<(NodeId, BTreeSet<NodeId>)> =
            neighbors.iter().map(|n| (*n, BTreeSet::new())).collect();
        let mut dests: Vec<NodeId> = dist_r.keys().copied().filter(|d| *d != router).collect();
        dests.sort();
        for dest in dests {
            let d = dist_r[&dest];
            for (i, neighbor) in neighbors.iter().enumerate() {
                let on_shortest = all_dist[neighbor]
                    .get(&dest)
                    .map(|dn| dn + 1 == d)
                    .unwrap_or(false);
                if on_shortest {
                    assignment[i].1.insert(dest);
                    break;
                }
            }
        }
        map.insert(router, assignment);
    }
    Ok(map)
}
