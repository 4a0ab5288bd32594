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

//! # Runtime System
//!
//! This system deploys compiled forwarding programs onto a machine running the Click modular
//! router: it writes each program to a deployment directory and drives the external Click
//! dataplane, either as a userlevel process per router or via the kernel module. The core library
//! only produces program text; everything that touches the operating system lives here.

#![deny(missing_docs, missing_debug_implementations)]

use clickforge::compiler::Program;

use log::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use thiserror::Error;

/// Errors raised while deploying programs
#[derive(Error, Debug)]
pub enum DeployError {
    /// Writing a program or spawning the dataplane failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The external Click command exited unsuccessfully
    #[error("Command {0} exited with {1}")]
    CommandFailed(String, std::process::ExitStatus),
}

/// How the external Click dataplane is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataplaneMode {
    /// One userlevel `click` process per router
    User,
    /// The program is loaded into the kernel module via `click-install`
    Kernel,
}

impl DataplaneMode {
    /// The command that loads a program in this mode
    pub fn install_cmd(&self) -> &'static str {
        match self {
            DataplaneMode::User => "click",
            DataplaneMode::Kernel => "click-install",
        }
    }
}

/// # Deployment
///
/// A deployment directory plus the dataplane mode. Programs are written as `<router>.click`;
/// userlevel dataplane output is captured in `<router>.log` next to the program.
#[derive(Debug)]
pub struct Deployment {
    dir: PathBuf,
    mode: DataplaneMode,
}

impl Deployment {
    /// Create a deployment rooted at the given directory, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P, mode: DataplaneMode) -> Result<Self, DeployError> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self { dir: dir.as_ref().to_path_buf(), mode })
    }

    /// The deployment directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The dataplane mode
    pub fn mode(&self) -> DataplaneMode {
        self.mode
    }

    /// Write one program into the deployment directory and return its path
    pub fn write_program(&self, program: &Program) -> Result<PathBuf, DeployError> {
        let path = self.dir.join(program.file_name());
        fs::write(&path, program.text())?;
        debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Write all programs into the deployment directory
    pub fn write_all(&self, programs: &[Program]) -> Result<Vec<PathBuf>, DeployError> {
        programs.iter().map(|p| self.write_program(p)).collect()
    }

    /// Write one program and load it into the dataplane. In userlevel mode this spawns a `click`
    /// process that keeps running until [`DataplaneHandle::uninstall`]; in kernel mode
    /// `click-install` loads the program and exits.
    pub fn install(&self, program: &Program) -> Result<DataplaneHandle, DeployError> {
        let path = self.write_program(program)?;
        let cmd = self.mode.install_cmd();
        info!("installing {} with {}", program.router(), cmd);
        match self.mode {
            DataplaneMode::User => {
                let log = File::create(self.dir.join(format!("{}.log", program.router())))?;
                let child = Command::new(cmd)
                    .arg(&path)
                    .stdout(Stdio::from(log.try_clone()?))
                    .stderr(Stdio::from(log))
                    .spawn()?;
                Ok(DataplaneHandle {
                    router: program.router().to_string(),
                    mode: self.mode,
                    child: Some(child),
                })
            }
            DataplaneMode::Kernel => {
                let status = Command::new(cmd).arg(&path).status()?;
                if !status.success() {
                    return Err(DeployError::CommandFailed(cmd.to_string(), status));
                }
                Ok(DataplaneHandle {
                    router: program.router().to_string(),
                    mode: self.mode,
                    child: None,
                })
            }
        }
    }
}

/// Handle on one installed program. Dropping the handle kills a userlevel dataplane best-effort;
/// call [`DataplaneHandle::uninstall`] for checked teardown.
#[derive(Debug)]
pub struct DataplaneHandle {
    router: String,
    mode: DataplaneMode,
    child: Option<Child>,
}

impl DataplaneHandle {
    /// Name of the router the handle belongs to
    pub fn router(&self) -> &str {
        &self.router
    }

    /// Unload the program: kill the userlevel process, or run `click-uninstall` for the kernel
    /// module.
    pub fn uninstall(mut self) -> Result<(), DeployError> {
        info!("uninstalling {}", self.router);
        match self.mode {
            DataplaneMode::User => {
                if let Some(mut child) = self.child.take() {
                    child.kill()?;
                    child.wait()?;
                }
                Ok(())
            }
            DataplaneMode::Kernel => {
                let status = Command::new("click-uninstall").status()?;
                if status.success() {
                    Ok(())
                } else {
                    Err(DeployError::CommandFailed("click-uninstall".to_string(), status))
                }
            }
        }
    }
}

impl Drop for DataplaneHandle {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            if child.kill().is_err() {
                warn!("dataplane of {} was already gone", self.router);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clickforge::compiler::{ProgramCompiler, ProgramStyle};
    use clickforge::control_plane::ControlPlane;
    use clickforge::topologies;

    fn tmp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("clickforge-test-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_write_programs() {
        let t = topologies::chain(3, 1);
        let state = ControlPlane::new(&t).unwrap().converge().unwrap();
        let programs =
            ProgramCompiler::new(&state, ProgramStyle::Router).compile_all().unwrap();

        let dir = tmp_dir("write");
        let deployment = Deployment::new(&dir, DataplaneMode::User).unwrap();
        let paths = deployment.write_all(&programs).unwrap();

        assert_eq!(paths.len(), 3);
        for (path, program) in paths.iter().zip(programs.iter()) {
            assert_eq!(path, &dir.join(format!("{}.click", program.router())));
            assert_eq!(&fs::read_to_string(path).unwrap(), program.text());
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_install_commands() {
        assert_eq!(DataplaneMode::User.install_cmd(), "click");
        assert_eq!(DataplaneMode::Kernel.install_cmd(), "click-install");
    }
}
