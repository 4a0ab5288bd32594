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

//! # Neighbor Tables
//!
//! Module defining the per-router neighbor table: for every reachable node, the route by which
//! the router reaches it. Tables are monotone-additive: once a destination is learned, the route
//! is never retracted or overwritten ("first-learned wins"). The merge rule is expressed by
//! [`RouteState`], so the invariant is enforced by type rather than by convention.

use crate::types::{InterfaceId, NodeId};
use std::collections::HashMap;

/// One route of a neighbor table: the destination node, the interface on the destination's side,
/// and the local interface through which the destination is reached. For multi-hop routes the
/// local interface is the first-hop outgoing interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborEntry {
    /// The destination node
    pub destination: NodeId,
    /// The interface on the destination's side
    pub destination_iface: InterfaceId,
    /// The local interface through which the destination is reached
    pub local_iface: InterfaceId,
}

/// Route knowledge of one router about one destination. `Unknown + Learned -> Learned` is the
/// only transition; a learned route is never replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// Nothing is known about the destination
    Unknown,
    /// A route was learned, attributed to a local interface
    Learned(NeighborEntry),
}

impl RouteState {
    /// Merge a candidate route into the state. Returns true if the state transitioned from
    /// `Unknown` to `Learned`; a state that is already `Learned` is left untouched.
    pub fn merge(&mut self, candidate: NeighborEntry) -> bool {
        match self {
            RouteState::Unknown => {
                *self = RouteState::Learned(candidate);
                true
            }
            RouteState::Learned(_) => false,
        }
    }

    /// Returns true if a route was learned
    pub fn is_learned(&self) -> bool {
        matches!(self, RouteState::Learned(_))
    }

    /// The learned entry, if any
    pub fn entry(&self) -> Option<NeighborEntry> {
        match self {
            RouteState::Unknown => None,
            RouteState::Learned(e) => Some(*e),
        }
    }
}

/// # Neighbor Table
///
/// Per-router map from destination to the route used to reach it. A table is written only by its
/// owning router; neighbors only read already-committed entries during convergence.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborTable {
    owner: NodeId,
    routes: HashMap<NodeId, NeighborEntry>,
}

impl NeighborTable {
    /// Create an empty table for the given owner
    pub fn new(owner: NodeId) -> Self {
        Self { owner, routes: HashMap::new() }
    }

    /// The router owning this table
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Route knowledge about a destination
    pub fn route(&self, destination: NodeId) -> RouteState {
        match self.routes.get(&destination) {
            Some(e) => RouteState::Learned(*e),
            None => RouteState::Unknown,
        }
    }

    /// Returns true if the destination was learned
    pub fn contains(&self, destination: NodeId) -> bool {
        self.routes.contains_key(&destination)
    }

    /// Merge a candidate route. Self-entries are rejected, and a destination that was already
    /// learned keeps its first route. Returns true if the table grew.
    pub fn merge(&mut self, entry: NeighborEntry) -> bool {
        if entry.destination == self.owner {
            return false;
        }
        let mut state = self.route(entry.destination);
        if state.merge(entry) {
            self.routes.insert(entry.destination, entry);
            true
        } else {
            false
        }
    }

    /// All entries, sorted by destination id (deterministic iteration order)
    pub fn entries(&self) -> Vec<NeighborEntry> {
        let mut entries: Vec<NeighborEntry> = self.routes.values().copied().collect();
        entries.sort_by_key(|e| e.destination);
        entries
    }

    /// Number of learned destinations
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if nothing was learned yet
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
