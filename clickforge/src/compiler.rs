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

//! # Pipeline Compiler
//!
//! Pure function from one router's converged neighbor table to a textual forwarding-plane
//! program in the Click configuration language. Compilation is deterministic: the same converged
//! table always yields byte-identical text. The compiler guarantees syntactic well-formedness of
//! the emitted text; execution semantics belong to the external Click dataplane.
//!
//! The program is organized around the set of distinct local interfaces the table uses. Each
//! interface is assigned a zero-based index by sorting the interface names, and that index is the
//! authoritative identity threaded through all element names (`cl<i>`, `out<i>`, `arp<i>`,
//! `encap<i>`).

use crate::control_plane::ConvergedState;
use crate::neighbors::NeighborTable;
use crate::types::{InterfaceId, MacAddr, NetworkError, NodeId};
use itertools::Itertools;
use log::*;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// The closed set of program strategies. Selected at compiler construction; both strategies
/// implement the same "converged table in, program text out" contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStyle {
    /// Full forwarding pipeline: classification, proxy ARP, host-route lookup, re-encapsulation.
    Router,
    /// Degenerate ring forwarder: every ingress is chained to the egress of the next interface in
    /// name order. Useful as a dataplane smoke test; performs no routing.
    RoundRobin,
}

/// A compiled forwarding-plane program for one router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    router: String,
    text: String,
}

impl Program {
    /// Name of the router the program was compiled for
    pub fn router(&self) -> &str {
        self.router.as_ref()
    }

    /// The program text
    pub fn text(&self) -> &str {
        self.text.as_ref()
    }

    /// Deterministic artifact name for the program (`<router>.click`)
    pub fn file_name(&self) -> String {
        format!("{}.click", self.router)
    }
}

/// Per-interface facts needed during emission.
struct IfaceInfo {
    id: InterfaceId,
    name: String,
    mac: MacAddr,
    /// hardware address of the interface on the far side of the link (the first-hop neighbor)
    remote_mac: MacAddr,
}

/// One entry of the compiled lookup stage.
struct HostRoute {
    addr: Ipv4Addr,
    iface_idx: usize,
    dest_name: String,
}

/// # Program Compiler
///
/// Compiles converged neighbor tables into Click programs. Only a [`ConvergedState`] is accepted,
/// so compilation can never race with table mutation.
#[derive(Debug)]
pub struct ProgramCompiler<'a, 'b> {
    state: &'a ConvergedState<'b>,
    style: ProgramStyle,
}

impl<'a, 'b> ProgramCompiler<'a, 'b> {
    /// Create a compiler for the given converged state and strategy
    pub fn new(state: &'a ConvergedState<'b>, style: ProgramStyle) -> Self {
        Self { state, style }
    }

    /// Compile the program of one router. An empty table (isolated router) compiles to an
    /// empty-but-valid program.
    pub fn compile(&self, router: NodeId) -> Result<Program, NetworkError> {
        let table = self.state.table(router)?;
        let name = self.state.topology().get_name(router)?.to_string();
        let ifaces = self.used_interfaces(router, table)?;
        let text = match self.style {
            ProgramStyle::Router => self.emit_router(&name, table, &ifaces)?,
            ProgramStyle::RoundRobin => emit_round_robin(&name, &ifaces),
        };
        Ok(Program { router: name, text })
    }

    /// Compile the programs of all routers, sorted by router name
    pub fn compile_all(&self) -> Result<Vec<Program>, NetworkError> {
        let mut programs = Vec::new();
        for router in self.state.routers() {
            programs.push(self.compile(router)?);
        }
        programs.sort_by(|a, b| a.router.cmp(&b.router));
        Ok(programs)
    }

    /// The distinct local interfaces the table uses, sorted by interface name and annotated with
    /// the facts emission needs. The position in the returned vector is the interface index.
    fn used_interfaces(
        &self,
        router: NodeId,
        table: &NeighborTable,
    ) -> Result<Vec<IfaceInfo>, NetworkError> {
        let topo = self.state.topology();
        let ids: Vec<InterfaceId> =
            table.entries().iter().map(|e| e.local_iface).unique().collect();
        let mut ifaces = Vec::with_capacity(ids.len());
        for id in ids {
            let iface = topo.iface(id)?;
            let (_, peer_iface) = topo.opposite(iface.link(), router)?;
            ifaces.push(IfaceInfo {
                id,
                name: iface.name().to_string(),
                mac: iface.mac(),
                remote_mac: topo.iface(peer_iface)?.mac(),
            });
        }
        ifaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ifaces)
    }

    /// The lookup entries: every addressed destination of the table, mapped to the index of the
    /// local interface it is reached through. Sorted by (interface index, address); duplicate
    /// addresses resolve last-wins with a warning.
    fn host_routes(
        &self,
        table: &NeighborTable,
        ifaces: &[IfaceInfo],
    ) -> Result<Vec<HostRoute>, NetworkError> {
        let topo = self.state.topology();
        let index_of: HashMap<InterfaceId, usize> =
            ifaces.iter().enumerate().map(|(i, f)| (f.id, i)).collect();
        let mut routes: Vec<HostRoute> = Vec::new();
        for entry in table.entries() {
            let dest = topo.get_node(entry.destination)?;
            let addr = match dest.addr() {
                Some(addr) => addr,
                // routers carry no address and appear in neither lookup nor ARP stage
                None => continue,
            };
            // the local interface is one of `ifaces` by construction
            let iface_idx = index_of[&entry.local_iface];
            routes.push(HostRoute { addr, iface_idx, dest_name: dest.name().to_string() });
        }
        routes.sort_by(|a, b| (a.iface_idx, a.addr).cmp(&(b.iface_idx, b.addr)));
        let mut dedup: Vec<HostRoute> = Vec::new();
        for route in routes {
            if let Some(prev) = dedup.iter_mut().find(|r| r.addr == route.addr) {
                warn!(
                    "duplicate destination address {}: {} replaces {}",
                    route.addr, route.dest_name, prev.dest_name
                );
                *prev = route;
            } else {
                dedup.push(route);
            }
        }
        Ok(dedup)
    }

    /// Emit the full forwarding pipeline
    fn emit_router(
        &self,
        router: &str,
        table: &NeighborTable,
        ifaces: &[IfaceInfo],
    ) -> Result<String, NetworkError> {
        let mut text = header(router, "static forwarding program");
        if ifaces.is_empty() {
            text.push_str("// no interfaces in use; empty program\n");
            return Ok(text);
        }
        let routes = self.host_routes(table, ifaces)?;

        // ingress classification, tagged with the source-interface index
        text.push_str("\n// ingress classification: ARP request / ARP response / IP / other\n");
        for (i, iface) in ifaces.iter().enumerate() {
            text.push_str(&format!(
                "cl{} :: Classifier(12/0806 20/0001, 12/0806 20/0002, 12/0800, -);\n",
                i
            ));
            text.push_str(&format!(
                "FromDevice('{}', SNIFFER false) -> cl{};\n",
                iface.name, i
            ));
        }

        // egress stages
        text.push_str("\n// egress queues\n");
        for (i, iface) in ifaces.iter().enumerate() {
            text.push_str(&format!("out{} :: Queue(8) -> ToDevice('{}');\n", i, iface.name));
        }

        // proxy ARP: the response always carries the hardware address of the asking interface,
        // for every destination address known to the router
        text.push_str("\n// proxy ARP on behalf of everything reachable through this router\n");
        for (i, iface) in ifaces.iter().enumerate() {
            if routes.is_empty() {
                text.push_str(&format!("cl{}[0] -> Discard;\n", i));
            } else {
                let pairs = routes
                    .iter()
                    .map(|r| format!("{} {}", r.addr, iface.mac))
                    .join(", ");
                text.push_str(&format!("arp{} :: ARPResponder({});\n", i, pairs));
                text.push_str(&format!("cl{}[0] -> arp{} -> out{};\n", i, i, i));
            }
            // ARP responses are never sent by this router itself; other frames are unknown
            text.push_str(&format!("cl{}[1] -> Discard;\n", i));
            text.push_str(&format!("cl{}[3] -> Discard;\n", i));
        }

        // exact-match host-route lookup
        text.push_str("\n// exact-match host routes\n");
        let patterns = routes
            .iter()
            .map(|r| format!("dst host {}", r.addr))
            .chain(std::iter::once("-".to_string()))
            .join(", ");
        text.push_str(&format!("lookup :: IPClassifier({});\n", patterns));
        for i in 0..ifaces.len() {
            text.push_str(&format!("cl{}[2] -> Strip(14) -> CheckIPHeader -> lookup;\n", i));
        }

        // re-encapsulation: the link-layer header is rewritten on every hop
        text.push_str("\n// re-encapsulation towards the first-hop neighbor\n");
        for (i, iface) in ifaces.iter().enumerate() {
            if routes.iter().any(|r| r.iface_idx == i) {
                text.push_str(&format!(
                    "encap{} :: EtherEncap(0x0800, {}, {});\n",
                    i, iface.mac, iface.remote_mac
                ));
                text.push_str(&format!("encap{} -> out{};\n", i, i));
            }
        }
        for (k, route) in routes.iter().enumerate() {
            text.push_str(&format!("lookup[{}] -> encap{};\n", k, route.iface_idx));
        }
        text.push_str(&format!("lookup[{}] -> Discard;\n", routes.len()));

        Ok(text)
    }
}

/// Emit the degenerate ring forwarder
fn emit_round_robin(router: &str, ifaces: &[IfaceInfo]) -> String {
    let mut text = header(router, "round-robin forwarder");
    if ifaces.is_empty() {
        text.push_str("// no interfaces in use; empty program\n");
        return text;
    }
    text.push('\n');
    for (i, iface) in ifaces.iter().enumerate() {
        let next = &ifaces[(i + 1) % ifaces.len()];
        text.push_str(&format!(
            "FromDevice('{}', SNIFFER false) -> Queue(8) -> ToDevice('{}');\n",
            iface.name, next.name
        ));
    }
    text
}

fn header(router: &str, kind: &str) -> String {
    format!(
        "// {}.click: {} for router {}\n// generated from a converged neighbor table; do not edit\n",
        router, kind, router
    )
}
