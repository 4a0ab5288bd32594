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

//! # Flood-Fill Convergence Engine
//!
//! The control plane holds one [`NeighborTable`] per router and floods routes between directly
//! connected routers until a full sweep learns nothing new. The lifecycle is gated by ownership:
//! [`ControlPlane::new`] initializes direct neighbors on a frozen topology, and
//! [`ControlPlane::converge`] consumes the control plane and yields a [`ConvergedState`] — the
//! only thing the compiler accepts — so a program can never be compiled from a table that may
//! still mutate.
//!
//! Flooding is path-vector advertisement without metric comparison: the first route heard for a
//! destination wins. This builds a spanning forwarding tree but does not guarantee shortest paths
//! when multiple paths exist; see [`crate::spf`] for the experimental shortest-path alternative.

use crate::neighbors::{NeighborEntry, NeighborTable};
use crate::topology::Topology;
use crate::types::{NetworkError, NodeId};
use log::*;
use std::collections::HashMap;

/// # Control Plane
///
/// Owns the (still mutating) neighbor tables of all routers of one topology. Call
/// [`ControlPlane::converge`] to run flooding to the fixpoint, or drive the sweeps manually with
/// [`ControlPlane::update`] / [`ControlPlane::sweep`].
#[derive(Debug, Clone)]
pub struct ControlPlane<'a> {
    topo: &'a Topology,
    tables: HashMap<NodeId, NeighborTable>,
}

impl<'a> ControlPlane<'a> {
    /// Create the control plane for a topology and initialize every router's table with its
    /// directly connected neighbors.
    pub fn new(topo: &'a Topology) -> Result<Self, NetworkError> {
        let mut plane = Self { topo, tables: HashMap::new() };
        for router in topo.routers() {
            plane.init_neighbors(router)?;
        }
        Ok(plane)
    }

    /// (Re)initialize the table of one router from the physically adjacent neighbors: one entry
    /// per link, recording the remote node as directly reachable via the local interface. The
    /// rebuild is from scratch, so the call is idempotent.
    pub fn init_neighbors(&mut self, router: NodeId) -> Result<(), NetworkError> {
        if !self.topo.get_node(router)?.is_router() {
            return Err(NetworkError::NotARouter(router));
        }
        let mut table = NeighborTable::new(router);
        for link in self.topo.links_touching(router) {
            let local_iface = self.topo.local_interface(link, router)?;
            let (neighbor, neighbor_iface) = self.topo.opposite(link, router)?;
            let added = table.merge(NeighborEntry {
                destination: neighbor,
                destination_iface: neighbor_iface,
                local_iface,
            });
            if !added {
                // parallel link: the first link keeps the route
                debug!(
                    "ignoring parallel link {:?} between {:?} and {:?}",
                    link, router, neighbor
                );
            }
        }
        self.tables.insert(router, table);
        Ok(())
    }

    /// Flood one router: learn, from every directly connected neighbor that owns a table (pure
    /// hosts own none and are skipped), all destinations not yet known and not the router itself.
    /// The learned entry copies the neighbor's (destination, destination-side interface) and
    /// rewrites the local interface to the one by which this router reaches that neighbor, so
    /// every multi-hop route is attributed to its first-hop outgoing interface. Returns whether
    /// anything was added.
    pub fn update(&mut self, router: NodeId) -> Result<bool, NetworkError> {
        let mut candidates: Vec<NeighborEntry> = Vec::new();
        for link in self.topo.links_touching(router) {
            let local_iface = self.topo.local_interface(link, router)?;
            let (neighbor, _) = self.topo.opposite(link, router)?;
            let neighbor_table = match self.tables.get(&neighbor) {
                Some(t) => t,
                None => continue,
            };
            for entry in neighbor_table.entries() {
                if entry.destination == router {
                    continue;
                }
                candidates.push(NeighborEntry {
                    destination: entry.destination,
                    destination_iface: entry.destination_iface,
                    local_iface,
                });
            }
        }
        let table = self.tables.get_mut(&router).ok_or(NetworkError::NotARouter(router))?;
        let mut changed = false;
        for candidate in candidates {
            changed |= table.merge(candidate);
        }
        Ok(changed)
    }

    /// One full sweep: [`ControlPlane::update`] over all routers in increasing id order (the
    /// result is order-independent; the order only fixes which of several equal-length routes is
    /// heard first). Returns whether any router learned something.
    pub fn sweep(&mut self) -> Result<bool, NetworkError> {
        let mut changed = false;
        for router in self.topo.routers() {
            changed |= self.update(router)?;
        }
        Ok(changed)
    }

    /// Run sweeps until a full sweep adds nothing anywhere, then freeze the tables. Tables grow
    /// monotonically over finitely many (router, destination) pairs, so this terminates; as a
    /// safety ceiling, N sweeps (N nodes) still reporting changes is reported as
    /// [`NetworkError::NoConvergence`].
    pub fn converge(mut self) -> Result<ConvergedState<'a>, NetworkError> {
        let ceiling = self.topo.num_nodes().max(1);
        let mut sweeps = 0;
        while self.sweep()? {
            sweeps += 1;
            if sweeps >= ceiling {
                error!("tables still growing after {} sweeps", sweeps);
                return Err(NetworkError::NoConvergence(sweeps));
            }
        }
        info!("control plane converged after {} sweeps", sweeps);
        Ok(ConvergedState { topo: self.topo, tables: self.tables, sweeps })
    }

    /// The (possibly still growing) table of one router
    pub fn table(&self, router: NodeId) -> Result<&NeighborTable, NetworkError> {
        self.topo.get_node(router)?;
        self.tables.get(&router).ok_or(NetworkError::NotARouter(router))
    }
}

/// # Converged State
///
/// Frozen snapshot of all neighbor tables after convergence. This is the only input the
/// [`crate::compiler::ProgramCompiler`] accepts.
#[derive(Debug, Clone)]
pub struct ConvergedState<'a> {
    topo: &'a Topology,
    tables: HashMap<NodeId, NeighborTable>,
    sweeps: usize,
}

impl<'a> ConvergedState<'a> {
    /// The topology the state was computed on
    pub fn topology(&self) -> &'a Topology {
        self.topo
    }

    /// The converged table of one router
    pub fn table(&self, router: NodeId) -> Result<&NeighborTable, NetworkError> {
        self.topo.get_node(router)?;
        self.tables.get(&router).ok_or(NetworkError::NotARouter(router))
    }

    /// Number of full sweeps that added at least one entry somewhere. The final sweep that
    /// verifies the fixpoint is not counted.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// All routers with a table, in increasing id order
    pub fn routers(&self) -> Vec<NodeId> {
        self.topo.routers()
    }
}
