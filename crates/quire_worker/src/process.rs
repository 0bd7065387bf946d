//! Child-process boundaries.
//!
//! Each boundary is a launcher process started with the job's dependencies as
//! its class path, a cleared environment, and the job's working directory as
//! cwd. The launcher's stderr goes to `worker.log` in that directory.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use quire_adapter::{Resolution, Symbol};
use quire_common::DependencySet;

use crate::boundary::{Boundary, BoundaryFactory};
use crate::error::BoundaryError;
use crate::protocol::{read_message, write_message, CompileRequest, Request, Response};
use crate::repository::LocalRepository;

/// Argument placeholder replaced by the joined class path.
pub const CLASSPATH_PLACEHOLDER: &str = "{classpath}";

/// Name of the launcher's stderr log inside the job directory.
const WORKER_LOG: &str = "worker.log";

/// Spawns one launcher process per boundary.
#[derive(Debug, Clone)]
pub struct ProcessBoundaryFactory {
    program: String,
    args: Vec<String>,
    repository: LocalRepository,
    env_allow: Vec<String>,
}

impl ProcessBoundaryFactory {
    /// Creates a factory for `program` with `args`, where any argument equal
    /// to or containing [`CLASSPATH_PLACEHOLDER`] gets the class path.
    pub fn new(program: impl Into<String>, args: Vec<String>, repository: LocalRepository) -> Self {
        Self {
            program: program.into(),
            args,
            repository,
            env_allow: Vec::new(),
        }
    }

    /// Environment variables passed through to the launcher. Everything else
    /// is cleared.
    pub fn with_env_allow(mut self, names: Vec<String>) -> Self {
        self.env_allow = names;
        self
    }

    fn command(&self, class_path: &OsString, working_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            if arg == CLASSPATH_PLACEHOLDER {
                cmd.arg(class_path);
            } else if arg.contains(CLASSPATH_PLACEHOLDER) {
                cmd.arg(arg.replace(CLASSPATH_PLACEHOLDER, &class_path.to_string_lossy()));
            } else {
                cmd.arg(arg);
            }
        }
        cmd.env_clear();
        for name in &self.env_allow {
            if let Some(value) = std::env::var_os(name) {
                cmd.env(name, value);
            }
        }
        cmd.current_dir(working_dir);
        cmd
    }
}

impl BoundaryFactory for ProcessBoundaryFactory {
    fn open(
        &self,
        dependencies: &DependencySet,
        working_dir: &Path,
    ) -> Result<Box<dyn Boundary>, BoundaryError> {
        let class_path = self.repository.class_path(dependencies)?;
        let log = File::create(working_dir.join(WORKER_LOG))?;

        let mut child = self
            .command(&class_path, working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(log))
            .spawn()
            .map_err(|source| BoundaryError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        tracing::debug!(program = %self.program, pid = child.id(), dir = %working_dir.display(), "boundary started");

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BoundaryError::Protocol("launcher pipes unavailable".to_string()));
        };

        Ok(Box::new(ProcessBoundary {
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
        }))
    }
}

/// A running launcher process.
pub struct ProcessBoundary {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
}

impl ProcessBoundary {
    fn round_trip(&mut self, request: &Request) -> Result<Response, BoundaryError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| BoundaryError::Protocol("boundary already closed".to_string()))?;
        write_message(stdin, request)?;
        match read_message(&mut self.stdout)? {
            Some(response) => Ok(response),
            None => {
                let status = self.child.wait()?;
                self.stdin = None;
                Err(BoundaryError::Protocol(format!("launcher exited unexpectedly ({status})")))
            }
        }
    }
}

impl Boundary for ProcessBoundary {
    fn probe(&mut self, symbols: &[Symbol]) -> Result<Vec<Resolution>, BoundaryError> {
        let response = self.round_trip(&Request::Probe {
            symbols: symbols.to_vec(),
        })?;
        let resolutions = response.into_result()?;
        if resolutions.len() != symbols.len() {
            return Err(BoundaryError::Protocol(format!(
                "asked for {} symbols, got {} answers",
                symbols.len(),
                resolutions.len()
            )));
        }
        Ok(resolutions)
    }

    fn compile(&mut self, request: &CompileRequest) -> Result<(), BoundaryError> {
        self.round_trip(&Request::Compile(request.clone()))?
            .into_result()
            .map(|_| ())
    }

    fn close(&mut self) -> Result<(), BoundaryError> {
        if self.stdin.is_none() {
            return Ok(());
        }
        let response = self.round_trip(&Request::Shutdown);
        // Dropping stdin closes the pipe, which also ends a launcher that
        // ignored the shutdown request.
        self.stdin = None;
        let status = self.child.wait()?;
        tracing::debug!(pid = self.child.id(), %status, "boundary closed");
        response?.into_result().map(|_| ())
    }
}

impl Drop for ProcessBoundary {
    fn drop(&mut self) {
        if self.stdin.is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(args: &[&str]) -> ProcessBoundaryFactory {
        ProcessBoundaryFactory::new(
            "launcher",
            args.iter().map(|s| s.to_string()).collect(),
            LocalRepository::new("/repo"),
        )
    }

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn classpath_placeholder_is_substituted() {
        let cp = OsString::from("/repo/a.jar");
        let cmd = factory(&["-cp", "{classpath}", "Main"]).command(&cp, Path::new("/work"));
        assert_eq!(args_of(&cmd), vec!["-cp", "/repo/a.jar", "Main"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/work")));
    }

    #[test]
    fn embedded_placeholder_is_substituted() {
        let cp = OsString::from("/repo/a.jar");
        let cmd = factory(&["--class-path={classpath}"]).command(&cp, Path::new("/work"));
        assert_eq!(args_of(&cmd), vec!["--class-path=/repo/a.jar"]);
    }

    #[test]
    fn environment_is_allow_listed() {
        let cp = OsString::from("x");
        let cmd = factory(&[])
            .with_env_allow(vec!["PATH".to_string(), "QUIRE_SURELY_UNSET_VAR".to_string()])
            .command(&cp, Path::new("/work"));
        let names: Vec<String> = cmd
            .get_envs()
            .filter(|(_, v)| v.is_some())
            .map(|(k, _)| k.to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| n == "PATH"));
    }

    #[test]
    fn missing_dependency_fails_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let deps = DependencySet::parse_all(["com.lowagie:itext:2.1.7.js10"]).unwrap();
        let err = factory(&[]).open(&deps, dir.path()).err().unwrap();
        assert!(matches!(err, BoundaryError::MissingArchive { .. }));
    }
}
