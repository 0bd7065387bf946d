//! A stand-in compiler that needs no JVM.
//!
//! [`StubCompiler`] answers probes from a [`SymbolTable`] and "compiles" a
//! design by checking its root element and writing a deterministic artifact.
//! The `quire-stub-worker` launcher serves it over the process protocol, and
//! [`InProcessFactory`] serves it without a process for tests and dry runs.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use quire_adapter::{Resolution, Symbol, SymbolTable};
use quire_common::{ContentHash, DependencySet};

use crate::boundary::{Boundary, BoundaryFactory};
use crate::error::BoundaryError;
use crate::protocol::{CompileRequest, ErrorKind, Request, Response};

/// Root element every design must have.
const DESIGN_ROOT: &str = "<jasperReport";

/// Source marker that makes in-process boundaries panic during compile.
pub const PANIC_MARKER: &str = "quire:panic";

/// Symbol-table-backed fake compiler.
#[derive(Debug, Clone, Default)]
pub struct StubCompiler {
    symbols: SymbolTable,
}

impl StubCompiler {
    /// A compiler seeing exactly `symbols`.
    pub fn new(symbols: SymbolTable) -> Self {
        Self { symbols }
    }

    /// Loads every class-path entry as a symbol manifest and merges them.
    pub fn from_class_path(class_path: &OsStr) -> Result<Self, String> {
        let mut symbols = SymbolTable::new();
        for entry in std::env::split_paths(class_path) {
            if entry.as_os_str().is_empty() {
                continue;
            }
            let text = std::fs::read_to_string(&entry)
                .map_err(|e| format!("cannot read {}: {e}", entry.display()))?;
            let table = SymbolTable::parse_manifest(&text)
                .map_err(|e| format!("{}: {e}", entry.display()))?;
            symbols.extend(table);
        }
        Ok(Self { symbols })
    }

    /// Answers a probe.
    pub fn probe(&self, symbols: &[Symbol]) -> Vec<Resolution> {
        symbols.iter().map(|s| self.symbols.lookup(s)).collect()
    }

    /// Compiles `request.source` into `request.destination`.
    pub fn compile(&self, request: &CompileRequest) -> Result<(), BoundaryError> {
        if self.symbols.lookup(&Symbol::class(&request.compiler)).value().is_none() {
            return Err(BoundaryError::Worker {
                message: format!("compiler class {} not found", request.compiler),
            });
        }
        let text = std::fs::read_to_string(&request.source).map_err(|e| BoundaryError::Worker {
            message: format!("cannot read {}: {e}", request.source.display()),
        })?;
        if !text.contains(DESIGN_ROOT) {
            return Err(BoundaryError::Rejected {
                message: format!(
                    "{}: document root element is not jasperReport",
                    request.source.display()
                ),
            });
        }

        if property(&request.properties, "keep.java.file") == Some("true") {
            if let Some(temp_dir) = property(&request.properties, "temp.dir") {
                let stem = request
                    .source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                std::fs::write(
                    Path::new(temp_dir).join(format!("{stem}.java")),
                    format!("// generated from {}\n", request.source.display()),
                )?;
            }
        }

        let artifact = format!(
            "QUIRE-STUB-ARTIFACT\ncompiler={}\nsource={}\n",
            request.compiler,
            ContentHash::from_bytes(text.as_bytes())
        );
        std::fs::write(&request.destination, artifact)?;
        Ok(())
    }

    /// Serves one protocol request. The flag is `false` once the launcher
    /// should exit.
    pub fn handle(&self, request: Request) -> (Response, bool) {
        match request {
            Request::Probe { symbols } => (
                Response::Ok {
                    resolutions: self.probe(&symbols),
                },
                true,
            ),
            Request::Compile(req) => match self.compile(&req) {
                Ok(()) => (Response::ok(), true),
                Err(BoundaryError::Rejected { message }) => {
                    (Response::error(ErrorKind::Compile, message), true)
                }
                Err(e) => (Response::error(ErrorKind::Internal, e.to_string()), true),
            },
            Request::Shutdown => (Response::ok(), false),
        }
    }
}

fn property<'a>(properties: &'a BTreeMap<String, String>, suffix: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|(k, _)| k.ends_with(suffix))
        .map(|(_, v)| v.as_str())
}

/// Opens in-process boundaries backed by [`StubCompiler`].
///
/// The symbol table is chosen per dependency set by the major version of its
/// `jasperreports` artifact, so one factory can model several library
/// versions.
#[derive(Debug, Default)]
pub struct InProcessFactory {
    default: SymbolTable,
    by_major: BTreeMap<u32, SymbolTable>,
    opened: AtomicUsize,
}

impl InProcessFactory {
    /// Every boundary sees `symbols` unless a version-specific table applies.
    pub fn new(symbols: SymbolTable) -> Self {
        Self {
            default: symbols,
            ..Self::default()
        }
    }

    /// Uses `symbols` for dependency sets carrying jasperreports `major`.x.
    pub fn with_major_version(mut self, major: u32, symbols: SymbolTable) -> Self {
        self.by_major.insert(major, symbols);
        self
    }

    /// Number of boundaries opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn table_for(&self, dependencies: &DependencySet) -> &SymbolTable {
        dependencies
            .iter()
            .find(|l| l.name == "jasperreports")
            .and_then(|l| l.major_version())
            .and_then(|major| self.by_major.get(&major))
            .unwrap_or(&self.default)
    }
}

impl BoundaryFactory for InProcessFactory {
    fn open(
        &self,
        dependencies: &DependencySet,
        _working_dir: &Path,
    ) -> Result<Box<dyn Boundary>, BoundaryError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InProcessBoundary {
            compiler: StubCompiler::new(self.table_for(dependencies).clone()),
            closed: false,
        }))
    }
}

struct InProcessBoundary {
    compiler: StubCompiler,
    closed: bool,
}

impl Boundary for InProcessBoundary {
    fn probe(&mut self, symbols: &[Symbol]) -> Result<Vec<Resolution>, BoundaryError> {
        Ok(self.compiler.probe(symbols))
    }

    fn compile(&mut self, request: &CompileRequest) -> Result<(), BoundaryError> {
        if self.closed {
            return Err(BoundaryError::Protocol("boundary already closed".to_string()));
        }
        let text = std::fs::read_to_string(&request.source).unwrap_or_default();
        if text.contains(PANIC_MARKER) {
            panic!("compiler crashed on {}", request.source.display());
        }
        self.compiler.compile(request)
    }

    fn close(&mut self) -> Result<(), BoundaryError> {
        self.closed = true;
        Ok(())
    }
}
