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

use crate::spf::{bfs, shortest_path_map};
use crate::topologies;
use crate::topology::Topology;
use maplit::btreeset;
use std::net::Ipv4Addr;

#[test]
fn test_bfs_distances_on_chain() {
    let t = topologies::chain(4, 0);
    let r0 = t.get_node_id("r0").unwrap();
    let dist = bfs(&t, r0).unwrap();
    for (i, expected) in (0..4).enumerate() {
        let r = t.get_node_id(&format!("r{}", i)).unwrap();
        assert_eq!(dist[&r], expected);
    }
}

#[test]
fn test_bfs_does_not_expand_through_hosts() {
    // r0 -- h -- r1: h is reachable from r0, r1 is not
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let r1 = t.add_router("r1");
    let h = t.add_host("h", Ipv4Addr::new(10, 0, 0, 1));
    t.add_link(r0, h);
    t.add_link(h, r1);

    let dist = bfs(&t, r0).unwrap();
    assert_eq!(dist.get(&h), Some(&1));
    assert_eq!(dist.get(&r1), None);

    // unless the host is the source itself
    let dist = bfs(&t, h).unwrap();
    assert_eq!(dist.get(&r0), Some(&1));
    assert_eq!(dist.get(&r1), Some(&1));
}

#[test]
fn test_shortest_path_map_tie_break() {
    // 4-cycle: both r1 and r2 lie on a shortest path from r0 to r3; the tie goes to the neighbor
    // enumerated first (r1, via the link created first)
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let r1 = t.add_router("r1");
    let r2 = t.add_router("r2");
    let r3 = t.add_router("r3");
    t.add_link(r0, r1);
    t.add_link(r0, r2);
    t.add_link(r1, r3);
    t.add_link(r2, r3);

    let map = shortest_path_map(&t).unwrap();
    let assignment = &map[&r0];
    assert_eq!(assignment.len(), 2);
    assert_eq!(assignment[0].0, r1);
    assert_eq!(assignment[1].0, r2);
    assert_eq!(assignment[0].1, btreeset! {r1, r3});
    assert_eq!(assignment[1].1, btreeset! {r2});
}

#[test]
fn test_shortest_path_map_covers_all_destinations() {
    let t = topologies::star(3, 1);
    let map = shortest_path_map(&t).unwrap();
    for router in t.routers() {
        let assigned: usize = map[&router].iter().map(|(_, dests)| dests.len()).sum();
        // every other node is reachable and assigned to exactly one neighbor
        assert_eq!(assigned, t.num_nodes() - 1);
    }
}
