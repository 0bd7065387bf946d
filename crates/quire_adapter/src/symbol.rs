//! Symbols, their resolutions, and the probing seam.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProbeError;

/// Something a boundary may or may not be able to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// A class by fully qualified name.
    Class(String),
    /// A static string constant declared by a class.
    Field {
        /// Fully qualified name of the declaring class.
        owner: String,
        /// Constant name.
        name: String,
    },
}

impl Symbol {
    /// Shorthand for [`Symbol::Class`].
    pub fn class(name: impl Into<String>) -> Self {
        Symbol::Class(name.into())
    }

    /// Shorthand for [`Symbol::Field`].
    pub fn field(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Symbol::Field {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Renders as `class:<name>` or `field:<owner>#<name>`, the wire form.
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Class(name) => write!(f, "class:{name}"),
            Symbol::Field { owner, name } => write!(f, "field:{owner}#{name}"),
        }
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("class:") {
            if !name.is_empty() {
                return Ok(Symbol::class(name));
            }
        } else if let Some(rest) = s.strip_prefix("field:") {
            if let Some((owner, name)) = rest.split_once('#') {
                if !owner.is_empty() && !name.is_empty() {
                    return Ok(Symbol::field(owner, name));
                }
            }
        }
        Err(format!("malformed symbol '{s}'"))
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of resolving one symbol.
///
/// A resolved class carries its own name; a resolved field carries the
/// constant's value, which for configuration keys is the property name. An
/// unresolved answer carries the symbol that was asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Resolution {
    /// The symbol exists; the payload is its resolved value.
    Resolved(String),
    /// The symbol does not exist in this boundary.
    Unresolved(Symbol),
}

impl Resolution {
    /// The resolved value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(v) => Some(v),
            Resolution::Unresolved(_) => None,
        }
    }
}

/// Anything that can answer "does this boundary see these symbols?".
///
/// Implementations answer with exactly one [`Resolution`] per requested
/// symbol, in request order.
pub trait SymbolProbe {
    /// Resolves a batch of symbols.
    fn resolve(&mut self, symbols: &[Symbol]) -> Result<Vec<Resolution>, ProbeError>;
}

/// An in-memory set of visible classes and constants.
///
/// Serves in-process boundaries and reads symbol manifests, the line format
/// used by the stub launcher:
///
/// ```text
/// # comment
/// class net.sf.jasperreports.engine.design.JRJdtCompiler
/// field net.sf.jasperreports.engine.design.JRCompiler#COMPILER_TEMP_DIR = net.sf.jasperreports.compiler.temp.dir
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    classes: BTreeSet<String>,
    fields: BTreeMap<(String, String), String>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visible class.
    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.classes.insert(name.into());
        self
    }

    /// Adds a visible constant. Its owner class becomes visible too.
    pub fn with_field(
        mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let owner = owner.into();
        self.classes.insert(owner.clone());
        self.fields.insert((owner, name.into()), value.into());
        self
    }

    /// Merges another table into this one; later definitions win.
    pub fn extend(&mut self, other: SymbolTable) {
        self.classes.extend(other.classes);
        self.fields.extend(other.fields);
    }

    /// Parses a symbol manifest.
    pub fn parse_manifest(text: &str) -> Result<Self, String> {
        let mut table = Self::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let bad = || format!("line {}: cannot parse '{line}'", lineno + 1);
            if let Some(name) = line.strip_prefix("class ") {
                table = table.with_class(name.trim());
            } else if let Some(rest) = line.strip_prefix("field ") {
                let (decl, value) = rest.split_once('=').ok_or_else(bad)?;
                let (owner, name) = decl.trim().split_once('#').ok_or_else(bad)?;
                table = table.with_field(owner, name, value.trim());
            } else {
                return Err(bad());
            }
        }
        Ok(table)
    }

    /// Resolves a single symbol.
    pub fn lookup(&self, symbol: &Symbol) -> Resolution {
        match symbol {
            Symbol::Class(name) if self.classes.contains(name) => Resolution::Resolved(name.clone()),
            Symbol::Field { owner, name } => self
                .fields
                .get(&(owner.clone(), name.clone()))
                .map(|v| Resolution::Resolved(v.clone()))
                .unwrap_or_else(|| Resolution::Unresolved(symbol.clone())),
            Symbol::Class(_) => Resolution::Unresolved(symbol.clone()),
        }
    }
}

impl SymbolProbe for SymbolTable {
    fn resolve(&mut self, symbols: &[Symbol]) -> Result<Vec<Resolution>, ProbeError> {
        Ok(symbols.iter().map(|s| self.lookup(s)).collect())
    }
}
