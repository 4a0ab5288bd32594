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

//! # Clickforge
//!
//! Clickforge builds static forwarding-plane programs for emulated networks. It models a topology
//! of routers and hosts, floods reachability between directly connected routers until every
//! router knows by which local interface it reaches every node ([`control_plane`]), and then
//! compiles each converged neighbor table into a textual program in the Click configuration
//! language ([`compiler`]): ingress classification, proxy ARP, exact-match host-route lookup, and
//! per-hop re-encapsulation.
//!
//! The two phases are separated by ownership: [`control_plane::ControlPlane::converge`] consumes
//! the mutable control plane and returns a frozen [`control_plane::ConvergedState`], the only
//! input the [`compiler::ProgramCompiler`] accepts.
//!
//! ## Example
//!
//! ```
//! use clickforge::compiler::{ProgramCompiler, ProgramStyle};
//! use clickforge::control_plane::ControlPlane;
//! use clickforge::topology::Topology;
//! use std::net::Ipv4Addr;
//!
//! fn main() -> Result<(), clickforge::NetworkError> {
//!     // h0 -- r1 -- r0
//!     let mut topo = Topology::new();
//!     let r0 = topo.add_router("r0");
//!     let r1 = topo.add_router("r1");
//!     let h0 = topo.add_host("h0", Ipv4Addr::new(10, 0, 0, 1));
//!     topo.add_link(r0, r1);
//!     topo.add_link(h0, r1);
//!
//!     // flood until every router knows every node
//!     let state = ControlPlane::new(&topo)?.converge()?;
//!
//!     // compile r0's forwarding program; h0 is two hops away but routed via r0's only interface
//!     let program = ProgramCompiler::new(&state, ProgramStyle::Router).compile(r0)?;
//!     assert!(program.text().contains("dst host 10.0.0.1"));
//!     Ok(())
//! }
//! ```

#![deny(missing_docs, missing_debug_implementations)]

pub mod compiler;
pub mod control_plane;
pub mod neighbors;
pub mod printer;
pub mod spf;
pub mod topologies;
pub mod topology;
mod types;

#[cfg(test)]
mod test;

pub use types::{InterfaceId, LinkId, MacAddr, NetworkError, NodeId, TopologyWarning};
