//! Version adapter for the report compiler library.
//!
//! The compiler lives in a foreign library whose entry points moved between
//! major versions. Instead of depending on any one version, this crate asks
//! an isolation boundary which symbols it can resolve and derives from the
//! answers the compiler class and configuration properties to use.
//!
//! Resolution is a fixed priority list of [`Symbol`] candidates, each coming
//! back as a [`Resolution`]. See [`plan_invocation`] for the full procedure.

#![warn(missing_docs)]

pub mod compiler;
pub mod error;
pub mod keys;
pub mod plan;
pub mod symbol;

pub use compiler::{fallback_identifier, CompilerResolver, LEGACY_JDT_COMPILER, RENAMED_JDT_COMPILER};
pub use error::{AdapterError, ProbeError};
pub use keys::{KeyRole, PropertyKey, PROPERTY_KEYS};
pub use plan::{plan_invocation, CompilerConfig, InvocationPlan};
pub use symbol::{Resolution, Symbol, SymbolProbe, SymbolTable};
