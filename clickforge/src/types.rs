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

//! Module containing all type definitions

use petgraph::prelude::*;
use petgraph::stable_graph::StableGraph;
use petgraph::Undirected;
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

type IndexType = u32;
/// Node identification (and index into the topology graph)
pub type NodeId = NodeIndex<IndexType>;
/// Link identification (and index of the edge in the topology graph)
pub type LinkId = EdgeIndex<IndexType>;
/// Topology graph. Node and edge payloads live outside the graph, so the graph only encodes
/// connectivity.
pub(crate) type TopologyGraph = StableGraph<(), (), Undirected, IndexType>;

/// Identifier of one interface: the owning node, and the position of the interface in the node's
/// interface list. Interfaces are never removed, so the identifier stays valid for the lifetime
/// of the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterfaceId {
    /// The node owning the interface
    pub node: NodeId,
    /// Index into the owning node's interface list
    pub index: usize,
}

/// Hardware (link-layer) address of an interface.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Network Errors
#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    /// Device is not present in the topology
    #[error("Network device was not found in topology: {0:?}")]
    DeviceNotFound(NodeId),
    /// Device name is not present in the topology
    #[error("Network device name was not found in topology: {0}")]
    DeviceNameNotFound(String),
    /// The device exists, but is a host and owns no neighbor table
    #[error("Network device is not a router: {0:?}")]
    NotARouter(NodeId),
    /// Link is not present in the topology
    #[error("Network link was not found in topology: {0:?}")]
    LinkNotFound(LinkId),
    /// The given node is not an endpoint of the given link
    #[error("Node {1:?} is not an endpoint of link {0:?}")]
    NotAnEndpoint(LinkId, NodeId),
    /// The interface identifier does not resolve to an interface
    #[error("Interface was not found in topology: {0:?}")]
    InterfaceNotFound(InterfaceId),
    /// Convergence Problem: the sweep ceiling was exceeded while tables were still growing. On a
    /// valid topology this cannot happen, so it signals an internal-consistency fault.
    #[error("Control plane did not converge within {0} sweeps!")]
    NoConvergence(usize),
}

/// Non-fatal topology faults. These are reported by [`crate::topology::Topology::audit`] and never
/// abort anything: an isolated router compiles to a degenerate (empty) program, and duplicate
/// addresses resolve last-wins in the compiled lookup stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyWarning {
    /// A router without any link. Legal, but its compiled program will be empty.
    #[error("Router {0} has no links")]
    IsolatedRouter(String),
    /// Two hosts carry the same network address.
    #[error("Hosts {first} and {second} both carry address {addr}")]
    DuplicateAddress {
        /// The shared address
        addr: Ipv4Addr,
        /// Name of the host declared first
        first: String,
        /// Name of the host declared second
        second: String,
    },
}
