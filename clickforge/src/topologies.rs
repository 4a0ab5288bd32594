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

//! # Canned Topologies
//!
//! Builders for the topology shapes used by the binary and the tests: a chain of routers, a star
//! around one hub, a single router, and a random connected topology (random spanning tree plus
//! sparsity-sampled extra edges). Every builder attaches `hosts_per_router` hosts to each router
//! (except the hub of the star) and assigns deterministic `10.0.x.y` host addresses.

use crate::topology::Topology;
use crate::types::NodeId;
use rand::prelude::*;
use std::net::Ipv4Addr;

/// Deterministic host address for the k-th host (10.0.0.1, 10.0.0.2, ...)
fn host_addr(k: usize) -> Ipv4Addr {
    Ipv4Addr::from(0x0a00_0001_u32 + k as u32)
}

/// Attach `hosts_per_router` hosts to each of the given routers
fn attach_hosts(topo: &mut Topology, routers: &[NodeId], hosts_per_router: usize) {
    let mut k = 0;
    for &router in routers {
        for _ in 0..hosts_per_router {
            let host = topo.add_host(format!("h{}", k), host_addr(k));
            topo.add_link(host, router);
            k += 1;
        }
    }
}

/// A chain of `num_routers` routers: r0 - r1 - ... - r(n-1)
pub fn chain(num_routers: usize, hosts_per_router: usize) -> Topology {
    let mut topo = Topology::new();
    let routers: Vec<NodeId> =
        (0..num_routers).map(|i| topo.add_router(format!("r{}", i))).collect();
    for pair in routers.windows(2) {
        topo.add_link(pair[0], pair[1]);
    }
    attach_hosts(&mut topo, &routers, hosts_per_router);
    topo
}

/// A star of `num_leaves` leaf routers around one hub router. The hub connects no hosts.
pub fn star(num_leaves: usize, hosts_per_router: usize) -> Topology {
    let mut topo = Topology::new();
    let leaves: Vec<NodeId> =
        (0..num_leaves).map(|i| topo.add_router(format!("r{}", i))).collect();
    let hub = topo.add_router("hub");
    for &leaf in leaves.iter() {
        topo.add_link(leaf, hub);
    }
    attach_hosts(&mut topo, &leaves, hosts_per_router);
    topo
}

/// A single router with `num_hosts` hosts
pub fn single(num_hosts: usize) -> Topology {
    let mut topo = Topology::new();
    let router = topo.add_router("r0");
    attach_hosts(&mut topo, &[router], num_hosts);
    topo
}

/// A random connected topology of `num_routers` routers. A random spanning tree guarantees
/// connectivity; on top of it, every remaining router pair becomes a link with probability
/// `sparsity`. The same seed always yields the same topology.
pub fn random(num_routers: usize, hosts_per_router: usize, sparsity: f64, seed: u64) -> Topology {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut topo = Topology::new();
    let routers: Vec<NodeId> =
        (0..num_routers).map(|i| topo.add_router(format!("r{}", i))).collect();

    // sample a random spanning tree: repeatedly connect a random exterior router to a random
    // router of the already-connected frontier
    let mut linked: Vec<(usize, usize)> = Vec::new();
    if num_routers > 0 {
        let mut frontier: Vec<usize> = vec![0];
        let mut exterior: Vec<usize> = (1..num_routers).collect();
        while !exterior.is_empty() {
            let e = exterior.remove(rng.gen_range(0, exterior.len()));
            let f = frontier[rng.gen_range(0, frontier.len())];
            let (lo, hi) = if e < f { (e, f) } else { (f, e) };
            linked.push((lo, hi));
            topo.add_link(routers[f], routers[e]);
            frontier.push(e);
        }
    }

    // extra edges on top of the tree
    let p = sparsity.max(0.0).min(1.0);
    for i in 0..num_routers {
        for j in (i + 1)..num_routers {
            if !linked.contains(&(i, j)) && rng.gen_bool(p) {
                topo.add_link(routers[i], routers[j]);
            }
        }
    }

    attach_hosts(&mut topo, &routers, hosts_per_router);
    topo
}
