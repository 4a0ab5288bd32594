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

//! Clickforge command line: build a canned topology, converge the control plane, and compile one
//! forwarding program per router. Programs go to stdout, to a directory, or straight into a local
//! Click dataplane.

use clap::{Parser, ValueEnum};
use clickforge::compiler::{ProgramCompiler, ProgramStyle};
use clickforge::control_plane::ControlPlane;
use clickforge::printer;
use clickforge::topologies;
use clickforge::topology::Topology;
use clickforge_runtime::{DataplaneMode, Deployment};
use log::*;
use std::io::BufRead;
use std::path::PathBuf;

/// The topology to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TopologyKind {
    /// A chain of routers
    Chain,
    /// Leaf routers around one hub
    Star,
    /// One router with hosts only
    Single,
    /// A random connected topology (spanning tree plus extra links)
    Random,
}

/// The program strategy to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Style {
    /// Full forwarding pipeline
    Router,
    /// Ring forwarder, for dataplane smoke tests
    RoundRobin,
}

/// Compile Click forwarding programs for an emulated topology.
#[derive(Debug, Parser)]
struct Cli {
    /// Topology to build
    #[clap(long = "topology", short = 't', value_enum, default_value = "chain")]
    topology: TopologyKind,
    /// Number of routers (leaves for the star topology)
    #[clap(long = "num-routers", short = 'n', default_value_t = 3)]
    num_routers: usize,
    /// Number of hosts attached to each router
    #[clap(long = "hosts-per-router", short = 'H', default_value_t = 1)]
    hosts_per_router: usize,
    /// Probability of extra links in the random topology
    #[clap(long = "sparsity", default_value_t = 0.3)]
    sparsity: f64,
    /// Seed for the random topology
    #[clap(long = "seed", default_value_t = 0)]
    seed: u64,
    /// Program strategy
    #[clap(long = "style", short = 's', value_enum, default_value = "router")]
    style: Style,
    /// Write the programs into this directory instead of stdout
    #[clap(long = "output-dir", short = 'o')]
    output_dir: Option<PathBuf>,
    /// Install the programs into a local Click dataplane (implies --output-dir)
    #[clap(long = "deploy")]
    deploy: bool,
    /// Drive the kernel module instead of userlevel processes when deploying
    #[clap(long = "kernel")]
    kernel: bool,
    /// Print the converged neighbor table of every router
    #[clap(long = "print-tables")]
    print_tables: bool,
}

fn build_topology(args: &Cli) -> Topology {
    match args.topology {
        TopologyKind::Chain => topologies::chain(args.num_routers, args.hosts_per_router),
        TopologyKind::Star => topologies::star(args.num_routers, args.hosts_per_router),
        TopologyKind::Single => topologies::single(args.hosts_per_router),
        TopologyKind::Random => topologies::random(
            args.num_routers,
            args.hosts_per_router,
            args.sparsity,
            args.seed,
        ),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let args = Cli::parse();

    let topo = build_topology(&args);
    topo.audit();

    let state = ControlPlane::new(&topo)?.converge()?;
    info!("converged after {} sweeps", state.sweeps());

    if args.print_tables {
        for router in state.routers() {
            printer::print_neighbor_table(&topo, state.table(router)?)?;
        }
    }

    let style = match args.style {
        Style::Router => ProgramStyle::Router,
        Style::RoundRobin => ProgramStyle::RoundRobin,
    };
    let programs = ProgramCompiler::new(&state, style).compile_all()?;

    if args.deploy {
        let dir = args.output_dir.unwrap_or_else(|| PathBuf::from("out"));
        let mode = if args.kernel { DataplaneMode::Kernel } else { DataplaneMode::User };
        let deployment = Deployment::new(&dir, mode)?;
        let mut handles = Vec::with_capacity(programs.len());
        for program in &programs {
            handles.push(deployment.install(program)?);
        }
        println!("{} programs installed; press enter to uninstall", handles.len());
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        for handle in handles {
            handle.uninstall()?;
        }
    } else if let Some(dir) = args.output_dir {
        let deployment = Deployment::new(&dir, DataplaneMode::User)?;
        for path in deployment.write_all(&programs)? {
            println!("{}", path.display());
        }
    } else {
        for program in &programs {
            println!("{}", program.text());
        }
    }

    Ok(())
}
