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

//! # Helper (printer) functions
//! Module containing helper functions to get formatted strings and print information about
//! neighbor tables, with all node and interface names resolved.

use crate::neighbors::{NeighborEntry, NeighborTable};
use crate::topology::Topology;
use crate::types::NetworkError;

/// Returns the formatted string for a single neighbor entry, with all names inserted.
pub fn neighbor_entry(topo: &Topology, entry: &NeighborEntry) -> Result<String, NetworkError> {
    Ok(format!(
        "{dest} via {local} (remote {remote})",
        dest = topo.get_name(entry.destination)?,
        local = topo.iface(entry.local_iface)?.name(),
        remote = topo.iface(entry.destination_iface)?.name(),
    ))
}

/// Get a vector of strings representing the neighbor table, one line per learned destination,
/// sorted by destination id.
pub fn neighbor_table(
    topo: &Topology,
    table: &NeighborTable,
) -> Result<Vec<String>, NetworkError> {
    let mut result = Vec::with_capacity(table.len());
    for entry in table.entries() {
        result.push(neighbor_entry(topo, &entry)?);
    }
    Ok(result)
}

/// Print the neighbor table of a given router to stdout.
pub fn print_neighbor_table(
    topo: &Topology,
    table: &NeighborTable,
) -> Result<(), NetworkError> {
    println!("Neighbor table of {}", topo.get_name(table.owner())?);
    for line in neighbor_table(topo, table)? {
        println!("    {}", line);
    }
    Ok(())
}
