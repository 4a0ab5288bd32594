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

use crate::compiler::{ProgramCompiler, ProgramStyle};
use crate::control_plane::ControlPlane;
use crate::topologies;
use crate::topology::Topology;

fn num_links(t: &Topology) -> usize {
    t.nodes().iter().map(|n| t.links_touching(*n).len()).sum::<usize>() / 2
}

#[test]
fn test_chain_shape() {
    let t = topologies::chain(4, 2);
    assert_eq!(t.routers().len(), 4);
    assert_eq!(t.hosts().len(), 8);
    assert_eq!(num_links(&t), 3 + 8);
    // end routers have one router link plus their hosts, middle routers two
    let r0 = t.get_node_id("r0").unwrap();
    let r1 = t.get_node_id("r1").unwrap();
    assert_eq!(t.links_touching(r0).len(), 3);
    assert_eq!(t.links_touching(r1).len(), 4);
}

#[test]
fn test_star_shape() {
    let t = topologies::star(4, 1);
    assert_eq!(t.routers().len(), 5);
    assert_eq!(t.hosts().len(), 4);
    let hub = t.get_node_id("hub").unwrap();
    // the hub links to every leaf and carries no host
    assert_eq!(t.links_touching(hub).len(), 4);
    assert_eq!(t.get_node(hub).unwrap().interfaces().len(), 4);
}

#[test]
fn test_single_shape() {
    let t = topologies::single(3);
    assert_eq!(t.routers().len(), 1);
    assert_eq!(t.hosts().len(), 3);
    assert_eq!(num_links(&t), 3);
}

#[test]
fn test_random_is_connected() {
    // the spanning tree guarantees full reachability even at sparsity 0
    let t = topologies::random(8, 1, 0.0, 42);
    assert_eq!(num_links(&t), 7 + 8);
    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    for router in state.routers() {
        assert_eq!(state.table(router).unwrap().len(), t.num_nodes() - 1);
    }
}

#[test]
fn test_random_sparsity_adds_links() {
    let sparse = topologies::random(8, 0, 0.0, 7);
    let dense = topologies::random(8, 0, 1.0, 7);
    assert_eq!(num_links(&sparse), 7);
    // sparsity 1.0 links every router pair
    assert_eq!(num_links(&dense), 8 * 7 / 2);
}

#[test]
fn test_random_is_deterministic() {
    let t1 = topologies::random(10, 2, 0.3, 1234);
    let t2 = topologies::random(10, 2, 0.3, 1234);
    assert_eq!(num_links(&t1), num_links(&t2));
    let s1 = ControlPlane::new(&t1).unwrap().converge().unwrap();
    let s2 = ControlPlane::new(&t2).unwrap().converge().unwrap();
    let p1 = ProgramCompiler::new(&s1, ProgramStyle::Router).compile_all().unwrap();
    let p2 = ProgramCompiler::new(&s2, ProgramStyle::Router).compile_all().unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn test_different_seeds_differ() {
    // not guaranteed for every seed pair, but stable for these two
    let t1 = topologies::random(10, 0, 0.5, 1);
    let t2 = topologies::random(10, 0, 0.5, 2);
    let same_shape = num_links(&t1) == num_links(&t2);
    if same_shape {
        let s1 = ControlPlane::new(&t1).unwrap().converge().unwrap();
        let s2 = ControlPlane::new(&t2).unwrap().converge().unwrap();
        let p1 = ProgramCompiler::new(&s1, ProgramStyle::Router).compile_all().unwrap();
        let p2 = ProgramCompiler::new(&s2, ProgramStyle::Router).compile_all().unwrap();
        assert_ne!(p1, p2);
    }
}

#[test]
fn test_host_addresses_are_unique() {
    let t = topologies::chain(4, 3);
    assert!(t.audit().is_empty());
}
