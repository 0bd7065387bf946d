//! Line-delimited JSON protocol between the pool and a launcher process.
//!
//! The parent writes one [`Request`] per line to the launcher's stdin and
//! reads exactly one [`Response`] line back from its stdout:
//!
//! ```text
//! > {"op":"probe","symbols":["class:net.sf.jasperreports.jdt.JRJdtCompiler"]}
//! < {"status":"ok","resolutions":[{"status":"resolved","value":"net.sf.jasperreports.jdt.JRJdtCompiler"}]}
//! > {"op":"compile","source":"/src/a.jrxml","destination":"/work/job-0/a.jasper","compiler":"...","properties":{}}
//! < {"status":"ok"}
//! > {"op":"shutdown"}
//! < {"status":"ok"}
//! ```

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use quire_adapter::{Resolution, Symbol};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BoundaryError;

/// A single compile call inside a boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Design file to compile.
    pub source: PathBuf,
    /// Where the launcher writes the artifact.
    pub destination: PathBuf,
    /// Compiler class to instantiate.
    pub compiler: String,
    /// Library properties to set before compiling.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Parent-to-launcher message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Resolve a batch of symbols.
    Probe {
        /// Symbols in the order answers are expected.
        symbols: Vec<Symbol>,
    },
    /// Compile one design.
    Compile(CompileRequest),
    /// Finish and exit.
    Shutdown,
}

/// Category of a launcher-reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The compiler rejected the design.
    Compile,
    /// The request could not be understood.
    Protocol,
    /// Anything else that went wrong inside the launcher.
    Internal,
}

/// Launcher-to-parent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// The request succeeded. `resolutions` is filled for probes only.
    Ok {
        /// One answer per probed symbol, in request order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        resolutions: Vec<Resolution>,
    },
    /// The request failed.
    Error {
        /// Who is at fault.
        kind: ErrorKind,
        /// Human-readable cause, shown next to the design path.
        message: String,
    },
}

impl Response {
    /// An empty success.
    pub fn ok() -> Self {
        Response::Ok {
            resolutions: Vec::new(),
        }
    }

    /// A failure of the given kind.
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error {
            kind,
            message: message.into(),
        }
    }

    /// Converts an error response into the matching [`BoundaryError`].
    pub fn into_result(self) -> Result<Vec<Resolution>, BoundaryError> {
        match self {
            Response::Ok { resolutions } => Ok(resolutions),
            Response::Error {
                kind: ErrorKind::Compile,
                message,
            } => Err(BoundaryError::Rejected { message }),
            Response::Error {
                kind: ErrorKind::Protocol,
                message,
            } => Err(BoundaryError::Protocol(message)),
            Response::Error {
                kind: ErrorKind::Internal,
                message,
            } => Err(BoundaryError::Worker { message }),
        }
    }
}

/// Writes one message as a single line and flushes.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), BoundaryError> {
    let line = serde_json::to_string(message)
        .map_err(|e| BoundaryError::Protocol(format!("cannot encode message: {e}")))?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads the next message. Returns `None` at end of stream.
///
/// Blank lines are skipped.
pub fn read_message<R: BufRead, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>, BoundaryError> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    serde_json::from_str(line.trim_end())
        .map(Some)
        .map_err(|e| BoundaryError::Protocol(format!("malformed message: {e}")))
}
