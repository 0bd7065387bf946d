//! Isolated execution of compilation jobs.
//!
//! Every job runs the foreign compiler inside its own [`Boundary`], opened
//! fresh from a [`BoundaryFactory`] with exactly the job's dependency set
//! visible. The production factory spawns a launcher process per job and talks
//! to it over the line-delimited JSON [`protocol`]. Jobs are scheduled on a
//! bounded [`WorkerPool`]; any failure, including a panic, stays in that job's
//! [`JobResult`].

#![warn(missing_docs)]

pub mod boundary;
pub mod error;
pub mod job;
pub mod pool;
pub mod process;
pub mod protocol;
pub mod repository;
pub mod stub;

pub use boundary::{Boundary, BoundaryFactory, BoundaryProbe};
pub use error::{BoundaryError, JobError, WorkerError};
pub use job::{CompilationJob, JobId, JobOutcome, JobResult};
pub use pool::{CancelFlag, JobHandle, WorkerPool};
pub use process::{ProcessBoundary, ProcessBoundaryFactory, CLASSPATH_PLACEHOLDER};
pub use protocol::CompileRequest;
pub use repository::LocalRepository;
pub use stub::{InProcessFactory, StubCompiler, PANIC_MARKER};
