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

use crate::control_plane::ControlPlane;
use crate::topologies;
use crate::topology::Topology;
use crate::types::NetworkError;
use std::net::Ipv4Addr;

#[test]
fn test_direct_neighbors() {
    // r0 -- r1, plus one host on r1
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let r1 = t.add_router("r1");
    let h0 = t.add_host("h0", Ipv4Addr::new(10, 0, 0, 1));
    let l01 = t.add_link(r0, r1);
    let l1h = t.add_link(r1, h0);

    let plane = ControlPlane::new(&t).unwrap();
    let table = plane.table(r0).unwrap();
    assert_eq!(table.len(), 1);
    let route = table.route(r1).entry().unwrap();
    assert_eq!(route.local_iface, t.local_interface(l01, r0).unwrap());
    assert_eq!(route.destination_iface, t.local_interface(l01, r1).unwrap());

    let table = plane.table(r1).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.route(h0).entry().unwrap().destination_iface,
        t.local_interface(l1h, h0).unwrap()
    );
}

#[test]
fn test_chain_route_attribution() {
    // r0 -- r1 -- r2: r0 reaches r2 via the interface facing r1, and the learned entry records
    // r2's interface on the r1--r2 link as the destination side.
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let r1 = t.add_router("r1");
    let r2 = t.add_router("r2");
    let l01 = t.add_link(r0, r1);
    let l12 = t.add_link(r1, r2);

    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    let route = state.table(r0).unwrap().route(r2).entry().unwrap();
    assert_eq!(route.local_iface, t.local_interface(l01, r0).unwrap());
    assert_eq!(route.destination_iface, t.local_interface(l12, r2).unwrap());

    // and symmetrically for r2 towards r0
    let route = state.table(r2).unwrap().route(r0).entry().unwrap();
    assert_eq!(route.local_iface, t.local_interface(l12, r2).unwrap());
    assert_eq!(route.destination_iface, t.local_interface(l01, r0).unwrap());
}

#[test]
fn test_full_reachability_on_chain() {
    let t = topologies::chain(5, 2);
    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    // every router knows every other node
    for router in state.routers() {
        assert_eq!(state.table(router).unwrap().len(), t.num_nodes() - 1);
    }
}

#[test]
fn test_star_converges_in_two_sweeps() {
    // all leaves are two hops apart, so the second sweep already adds nothing new on top of what
    // the first sweep flooded through the hub
    let t = topologies::star(4, 1);
    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    assert_eq!(state.sweeps(), 2);
    for router in state.routers() {
        assert_eq!(state.table(router).unwrap().len(), t.num_nodes() - 1);
    }
}

#[test]
fn test_sweep_count_bounded_by_chain_length() {
    // worst case: information travels one router hop per sweep
    let t = topologies::chain(6, 0);
    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    assert!(state.sweeps() <= t.num_nodes());
}

#[test]
fn test_disconnected_components_stay_separate() {
    // two disjoint chains: no router learns anything across the gap
    let mut t = Topology::new();
    let a0 = t.add_router("a0");
    let a1 = t.add_router("a1");
    let b0 = t.add_router("b0");
    let b1 = t.add_router("b1");
    t.add_link(a0, a1);
    t.add_link(b0, b1);

    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    assert!(state.table(a0).unwrap().contains(a1));
    assert!(!state.table(a0).unwrap().contains(b0));
    assert!(!state.table(a0).unwrap().contains(b1));
    assert_eq!(state.table(b1).unwrap().len(), 1);
}

#[test]
fn test_hosts_do_not_transit() {
    // r0 -- h -- r1: the host terminates flooding, so the routers never learn each other
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let r1 = t.add_router("r1");
    let h = t.add_host("h", Ipv4Addr::new(10, 0, 0, 1));
    t.add_link(r0, h);
    t.add_link(h, r1);

    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    assert!(state.table(r0).unwrap().contains(h));
    assert!(!state.table(r0).unwrap().contains(r1));
    assert!(!state.table(r1).unwrap().contains(r0));
}

#[test]
fn test_init_neighbors_is_idempotent() {
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let r1 = t.add_router("r1");
    t.add_link(r0, r1);

    let mut plane = ControlPlane::new(&t).unwrap();
    let before = plane.table(r0).unwrap().clone();
    plane.init_neighbors(r0).unwrap();
    assert_eq!(plane.table(r0).unwrap(), &before);
}

#[test]
fn test_update_converges_to_fixpoint() {
    let t = topologies::chain(4, 1);
    let mut plane = ControlPlane::new(&t).unwrap();
    while plane.sweep().unwrap() {}
    // one more sweep must be a no-op
    assert!(!plane.sweep().unwrap());
}

#[test]
fn test_host_owns_no_table() {
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let h0 = t.add_host("h0", Ipv4Addr::new(10, 0, 0, 1));
    t.add_link(h0, r0);

    let plane = ControlPlane::new(&t).unwrap();
    assert_eq!(plane.table(h0).unwrap_err(), NetworkError::NotARouter(h0));
    let state = plane.converge().unwrap();
    assert_eq!(state.table(h0).unwrap_err(), NetworkError::NotARouter(h0));
}

#[test]
fn test_isolated_router_converges_empty() {
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    assert!(state.table(r0).unwrap().is_empty());
    assert_eq!(state.sweeps(), 0);
}

#[test]
fn test_parallel_links_keep_first_route() {
    let mut t = Topology::new();
    let r0 = t.add_router("r0");
    let r1 = t.add_router("r1");
    let first = t.add_link(r0, r1);
    t.add_link(r0, r1);

    let state = ControlPlane::new(&t).unwrap().converge().unwrap();
    let route = state.table(r0).unwrap().route(r1).entry().unwrap();
    assert_eq!(route.local_iface, t.local_interface(first, r0).unwrap());
}
