//! The isolation boundary seam.

use std::path::Path;

use quire_adapter::{ProbeError, Resolution, Symbol, SymbolProbe};
use quire_common::DependencySet;

use crate::error::BoundaryError;
use crate::protocol::CompileRequest;

/// An execution context whose visible symbols are exactly one dependency set.
///
/// A boundary serves a single job. Library configuration applied during
/// [`Boundary::compile`] stays inside it.
pub trait Boundary: Send {
    /// Resolves symbols, one answer per symbol in request order.
    fn probe(&mut self, symbols: &[Symbol]) -> Result<Vec<Resolution>, BoundaryError>;

    /// Compiles one design to `request.destination`.
    fn compile(&mut self, request: &CompileRequest) -> Result<(), BoundaryError>;

    /// Releases the boundary. Calling it twice is harmless.
    fn close(&mut self) -> Result<(), BoundaryError>;
}

/// Opens fresh boundaries. Every call must return a new, unshared instance.
pub trait BoundaryFactory: Send + Sync {
    /// Opens a boundary seeing `dependencies`, working in `working_dir`.
    fn open(
        &self,
        dependencies: &DependencySet,
        working_dir: &Path,
    ) -> Result<Box<dyn Boundary>, BoundaryError>;
}

/// Lets the version adapter probe through a boundary.
pub struct BoundaryProbe<'a>(pub &'a mut dyn Boundary);

impl SymbolProbe for BoundaryProbe<'_> {
    fn resolve(&mut self, symbols: &[Symbol]) -> Result<Vec<Resolution>, ProbeError> {
        self.0.probe(symbols).map_err(ProbeError::from)
    }
}
