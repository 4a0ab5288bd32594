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

//! # Topology Model
//!
//! This module represents the emulated network: routers and hosts (nodes), their interfaces, and
//! the undirected point-to-point links connecting pairs of interfaces. The topology is built once
//! and then only read — the control plane and the compiler never mutate it.

use crate::types::{
    InterfaceId, LinkId, MacAddr, NetworkError, NodeId, TopologyGraph, TopologyWarning,
};
use log::*;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// The kind of a node. Hosts carry a network address and originate/terminate traffic; routers
/// carry no address of their own and only forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Addressed endpoint, non-forwarding
    Host(Ipv4Addr),
    /// Forwarding node without an address of its own
    Router,
}

/// A named attachment point of a node to exactly one link. Interfaces are created by
/// [`Topology::add_link`] and are owned by their node; they reference their link by id.
#[derive(Debug, Clone)]
pub struct Interface {
    pub(crate) name: String,
    pub(crate) mac: MacAddr,
    pub(crate) addr: Option<Ipv4Addr>,
    pub(crate) link: LinkId,
}

impl Interface {
    /// Name of the interface (`<node>-eth<k>`)
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Hardware address of the interface
    pub fn mac(&self) -> MacAddr {
        self.mac
    }

    /// Network address of the interface. Set for host interfaces, `None` on routers.
    pub fn addr(&self) -> Option<Ipv4Addr> {
        self.addr
    }

    /// The link this interface is attached to
    pub fn link(&self) -> LinkId {
        self.link
    }
}

/// A node of the topology: a router or a host, together with its interfaces.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    kind: NodeKind,
    interfaces: Vec<Interface>,
}

impl Node {
    /// Name of the node
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Kind of the node
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// All interfaces of the node, in creation order
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// Network address of the node (`Some` for hosts, `None` for routers)
    pub fn addr(&self) -> Option<Ipv4Addr> {
        match self.kind {
            NodeKind::Host(addr) => Some(addr),
            NodeKind::Router => None,
        }
    }

    /// Returns true if the node is a router
    pub fn is_router(&self) -> bool {
        matches!(self.kind, NodeKind::Router)
    }
}

/// # Topology
///
/// Graph of routers and hosts connected by undirected point-to-point links. Each endpoint of a
/// link gets its own [`Interface`] with an auto-assigned name (`<node>-eth<k>`) and a
/// deterministic, locally administered hardware address, so repeated construction of the same
/// topology yields byte-identical compiled programs.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    graph: TopologyGraph,
    nodes: HashMap<NodeId, Node>,
    mac_counter: u32,
}

impl Topology {
    /// Generate an empty topology
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new router to the topology. Routers carry no network address; they learn routes via
    /// the control plane and only forward traffic.
    pub fn add_router<S: Into<String>>(&mut self, name: S) -> NodeId {
        let id = self.graph.add_node(());
        self.nodes
            .insert(id, Node { name: name.into(), kind: NodeKind::Router, interfaces: Vec::new() });
        id
    }

    /// Add a new host to the topology. The address is applied to every interface the host gets
    /// when links are added.
    pub fn add_host<S: Into<String>>(&mut self, name: S, addr: Ipv4Addr) -> NodeId {
        let id = self.graph.add_node(());
        self.nodes.insert(
            id,
            Node { name: name.into(), kind: NodeKind::Host(addr), interfaces: Vec::new() },
        );
        id
    }

    /// Create an undirected link between two nodes. One interface is created on each endpoint.
    ///
    /// # Panics
    /// Panics if `a` or `b` were not created by [`Topology::add_router`] / [`Topology::add_host`]
    /// on this topology.
    pub fn add_link(&mut self, a: NodeId, b: NodeId) -> LinkId {
        let link = self.graph.add_edge(a, b, ());
        for node in &[a, b] {
            let mac = self.next_mac();
            // every graph node has a matching entry in self.nodes
            if let Some(n) = self.nodes.get_mut(node) {
                let name = format!("{}-eth{}", n.name, n.interfaces.len());
                let addr = n.addr();
                n.interfaces.push(Interface { name, mac, addr, link });
            }
        }
        link
    }

    /// Get a reference to a node
    pub fn get_node(&self, id: NodeId) -> Result<&Node, NetworkError> {
        self.nodes.get(&id).ok_or(NetworkError::DeviceNotFound(id))
    }

    /// Get the id of a node by its name
    pub fn get_node_id(&self, name: &str) -> Result<NodeId, NetworkError> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
            .ok_or_else(|| NetworkError::DeviceNameNotFound(name.to_string()))
    }

    /// Get the name of a node
    pub fn get_name(&self, id: NodeId) -> Result<&str, NetworkError> {
        self.get_node(id).map(|n| n.name())
    }

    /// Returns true if the node exists and is a router
    pub fn is_router(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|n| n.is_router()).unwrap_or(false)
    }

    /// All node ids, in increasing id order
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.nodes.keys().copied().collect();
        nodes.sort();
        nodes
    }

    /// All router ids, in increasing id order
    pub fn routers(&self) -> Vec<NodeId> {
        let mut routers: Vec<NodeId> =
            self.nodes.iter().filter(|(_, n)| n.is_router()).map(|(id, _)| *id).collect();
        routers.sort();
        routers
    }

    /// All host ids, in increasing id order
    pub fn hosts(&self) -> Vec<NodeId> {
        let mut hosts: Vec<NodeId> =
            self.nodes.iter().filter(|(_, n)| !n.is_router()).map(|(id, _)| *id).collect();
        hosts.sort();
        hosts
    }

    /// Number of nodes (routers and hosts)
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// All links touching the given node, in increasing link id order. The model has no loopback
    /// interfaces, so every returned link leads to another node.
    pub fn links_touching(&self, node: NodeId) -> Vec<LinkId> {
        let mut links: Vec<LinkId> = self.graph.edges(node).map(|e| e.id()).collect();
        links.sort();
        links
    }

    /// Both endpoints of a link, in the order the link was created
    pub fn endpoints(&self, link: LinkId) -> Result<(NodeId, NodeId), NetworkError> {
        self.graph.edge_endpoints(link).ok_or(NetworkError::LinkNotFound(link))
    }

    /// Resolve the interface by which `node` attaches to `link`
    pub fn local_interface(
        &self,
        link: LinkId,
        node: NodeId,
    ) -> Result<InterfaceId, NetworkError> {
        let n = self.get_node(node)?;
        n.interfaces
            .iter()
            .position(|i| i.link == link)
            .map(|index| InterfaceId { node, index })
            .ok_or(NetworkError::NotAnEndpoint(link, node))
    }

    /// Given a link and "this" endpoint, resolve the opposite (node, interface)
    pub fn opposite(
        &self,
        link: LinkId,
        node: NodeId,
    ) -> Result<(NodeId, InterfaceId), NetworkError> {
        let (a, b) = self.endpoints(link)?;
        let other = if a == node {
            b
        } else if b == node {
            a
        } else {
            return Err(NetworkError::NotAnEndpoint(link, node));
        };
        Ok((other, self.local_interface(link, other)?))
    }

    /// Resolve an interface identifier
    pub fn iface(&self, id: InterfaceId) -> Result<&Interface, NetworkError> {
        self.get_node(id.node)?
            .interfaces
            .get(id.index)
            .ok_or(NetworkError::InterfaceNotFound(id))
    }

    /// Check the topology for non-fatal configuration faults: isolated routers (legal, but they
    /// compile to empty programs) and duplicate host addresses (legal, resolved last-wins by the
    /// compiler). Every warning is also logged.
    pub fn audit(&self) -> Vec<TopologyWarning> {
        let mut warnings = Vec::new();
        for router in self.routers() {
            if self.links_touching(router).is_empty() {
                // `router` comes from self.routers(), so the node exists
                if let Some(n) = self.nodes.get(&router) {
                    warnings.push(TopologyWarning::IsolatedRouter(n.name.clone()));
                }
            }
        }
        let mut seen: HashMap<Ipv4Addr, String> = HashMap::new();
        for host in self.hosts() {
            if let Some(n) = self.nodes.get(&host) {
                if let Some(addr) = n.addr() {
                    if let Some(first) = seen.get(&addr) {
                        warnings.push(TopologyWarning::DuplicateAddress {
                            addr,
                            first: first.clone(),
                            second: n.name.clone(),
                        });
                    } else {
                        seen.insert(addr, n.name.clone());
                    }
                }
            }
        }
        for w in warnings.iter() {
            warn!("{}", w);
        }
        warnings
    }

    /// Next deterministic, locally administered hardware address
    fn next_mac(&mut self) -> MacAddr {
        self.mac_counter += 1;
        let c = self.mac_counter;
        MacAddr([0x02, 0x00, (c >> 24) as u8, (c >> 16) as u8, (c >> 8) as u8, c as u8])
    }
}
