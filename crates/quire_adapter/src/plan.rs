//! Effective compiler invocation for one boundary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quire_common::{ContentHash, DependencySet};

use crate::compiler::CompilerResolver;
use crate::error::{AdapterError, ProbeError};
use crate::keys::{KeyRole, PROPERTY_KEYS};
use crate::symbol::{Resolution, SymbolProbe};

/// Compiler options fixed for a whole build and shared by every job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Configured compiler class; the renamed form is tried if it is missing.
    pub compiler_identifier: String,
    /// Validate design XML against the schema, when the library supports it.
    pub validate_input: bool,
    /// Keep each job's working directory and generated sources.
    pub retain_intermediate_artifacts: bool,
    /// Parent of every job's private working directory.
    pub working_directory: PathBuf,
}

impl CompilerConfig {
    /// Hash of everything that influences compiled output.
    ///
    /// The working directory is left out; moving the scratch area does not
    /// invalidate earlier artifacts.
    pub fn fingerprint(&self, dependencies: &DependencySet) -> ContentHash {
        let deps = dependencies.fingerprint().to_string();
        ContentHash::from_parts([
            self.compiler_identifier.as_bytes(),
            if self.validate_input { "validate" } else { "no-validate" }.as_bytes(),
            if self.retain_intermediate_artifacts { "keep" } else { "drop" }.as_bytes(),
            deps.as_bytes(),
        ])
    }
}

/// What the boundary should be asked to do for one compile call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvocationPlan {
    /// Compiler class that resolved in the boundary.
    pub compiler: String,
    /// Library properties to set inside the boundary before compiling.
    pub properties: BTreeMap<String, String>,
}

/// Resolves the compiler and configuration keys against `probe`.
///
/// All candidates are sent in a single batch. Keys whose constant is absent
/// fall back to their literal name, or are skipped when they have none.
/// `scratch_dir` becomes the compiler's temporary directory.
pub fn plan_invocation(
    probe: &mut dyn SymbolProbe,
    config: &CompilerConfig,
    scratch_dir: &Path,
) -> Result<InvocationPlan, AdapterError> {
    let resolver = CompilerResolver::for_identifier(&config.compiler_identifier);
    let mut symbols = resolver.symbols();
    let compiler_count = symbols.len();
    symbols.extend(PROPERTY_KEYS.iter().map(|k| k.symbol()));

    let answers = probe.resolve(&symbols)?;
    if answers.len() != symbols.len() {
        return Err(ProbeError::new(format!(
            "expected {} answers, got {}",
            symbols.len(),
            answers.len()
        ))
        .into());
    }
    let (compiler_answers, key_answers) = answers.split_at(compiler_count);
    let compiler = resolver.choose(compiler_answers)?;

    let mut properties = BTreeMap::new();
    for (key, answer) in PROPERTY_KEYS.iter().zip(key_answers) {
        let name = match answer {
            Resolution::Resolved(name) => name.clone(),
            Resolution::Unresolved(_) => match key.literal {
                Some(literal) => literal.to_string(),
                None => {
                    tracing::debug!(key = %key.role, "option not supported by this library version, skipping");
                    continue;
                }
            },
        };
        let value = match key.role {
            KeyRole::XmlValidation => config.validate_input.to_string(),
            KeyRole::KeepJavaFile => config.retain_intermediate_artifacts.to_string(),
            KeyRole::TempDir => scratch_dir.display().to_string(),
        };
        tracing::debug!(key = %key.role, property = %name, %value, "configured");
        properties.insert(name, value);
    }

    Ok(InvocationPlan {
        compiler,
        properties,
    })
}
