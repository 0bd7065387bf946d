//! Compiler entry-point resolution across the library's package rename.

use crate::error::{AdapterError, ProbeError};
use crate::symbol::{Resolution, Symbol, SymbolProbe};

/// JDT compiler class as shipped up to 6.x.
pub const LEGACY_JDT_COMPILER: &str = "net.sf.jasperreports.engine.design.JRJdtCompiler";

/// JDT compiler class after the 7.x module split.
pub const RENAMED_JDT_COMPILER: &str = "net.sf.jasperreports.jdt.JRJdtCompiler";

const LEGACY_DESIGN_PACKAGE: &str = "net.sf.jasperreports.engine.design.";
const RENAMED_JDT_PACKAGE: &str = "net.sf.jasperreports.jdt.";

/// Known renames, checked before the package rule.
const RENAMES: &[(&str, &str)] = &[(LEGACY_JDT_COMPILER, RENAMED_JDT_COMPILER)];

/// The identifier a compiler class carries under the other package layout.
///
/// Explicit renames are consulted first in either direction. Otherwise a
/// `*Compiler` class in the legacy design package maps into the JDT package.
/// Returns `None` when no alternative is known.
pub fn fallback_identifier(identifier: &str) -> Option<String> {
    for (legacy, renamed) in RENAMES {
        if identifier == *legacy {
            return Some(renamed.to_string());
        }
        if identifier == *renamed {
            return Some(legacy.to_string());
        }
    }
    let simple = identifier.strip_prefix(LEGACY_DESIGN_PACKAGE)?;
    if simple.contains('.') || !simple.ends_with("Compiler") {
        return None;
    }
    Some(format!("{RENAMED_JDT_PACKAGE}{simple}"))
}

/// Ordered candidate list for the compiler class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerResolver {
    candidates: Vec<String>,
}

impl CompilerResolver {
    /// Candidates for a configured identifier: the identifier itself, then
    /// its renamed form if one is known.
    pub fn for_identifier(configured: &str) -> Self {
        let mut candidates = vec![configured.to_string()];
        if let Some(alt) = fallback_identifier(configured) {
            candidates.push(alt);
        }
        Self { candidates }
    }

    /// Candidates in priority order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The probe symbols for the candidates, in priority order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.candidates.iter().map(Symbol::class).collect()
    }

    /// Picks the first resolved candidate from answers to [`Self::symbols`].
    pub fn choose(&self, answers: &[Resolution]) -> Result<String, AdapterError> {
        for (candidate, answer) in self.candidates.iter().zip(answers) {
            match answer {
                Resolution::Resolved(_) => {
                    tracing::debug!(compiler = %candidate, "compiler resolved");
                    return Ok(candidate.clone());
                }
                Resolution::Unresolved(symbol) => {
                    tracing::debug!(%symbol, "compiler candidate unresolved");
                }
            }
        }
        Err(AdapterError::CompilerNotResolved {
            attempted: self.candidates.clone(),
        })
    }

    /// Probes the boundary and picks the first resolved candidate.
    pub fn resolve(&self, probe: &mut dyn SymbolProbe) -> Result<String, AdapterError> {
        let answers = probe.resolve(&self.symbols())?;
        if answers.len() != self.candidates.len() {
            return Err(ProbeError::new(format!(
                "expected {} answers, got {}",
                self.candidates.len(),
                answers.len()
            ))
            .into());
        }
        self.choose(&answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolTable;

    #[test]
    fn jdt_compiler_renames_both_ways() {
        assert_eq!(
            fallback_identifier(LEGACY_JDT_COMPILER).as_deref(),
            Some(RENAMED_JDT_COMPILER)
        );
        assert_eq!(
            fallback_identifier(RENAMED_JDT_COMPILER).as_deref(),
            Some(LEGACY_JDT_COMPILER)
        );
    }

    #[test]
    fn package_rule_covers_other_design_compilers() {
        assert_eq!(
            fallback_identifier("net.sf.jasperreports.engine.design.JRJavacCompiler").as_deref(),
            Some("net.sf.jasperreports.jdt.JRJavacCompiler")
        );
        assert_eq!(fallback_identifier("net.sf.jasperreports.engine.design.JasperDesign"), None);
        assert_eq!(fallback_identifier("com.example.MyCompiler"), None);
    }

    #[test]
    fn legacy_only_boundary_resolves_legacy() {
        let mut table = SymbolTable::new().with_class(LEGACY_JDT_COMPILER);
        let chosen = CompilerResolver::for_identifier(LEGACY_JDT_COMPILER)
            .resolve(&mut table)
            .unwrap();
        assert_eq!(chosen, LEGACY_JDT_COMPILER);
    }

    #[test]
    fn renamed_only_boundary_resolves_renamed() {
        let mut table = SymbolTable::new().with_class(RENAMED_JDT_COMPILER);
        let chosen = CompilerResolver::for_identifier(LEGACY_JDT_COMPILER)
            .resolve(&mut table)
            .unwrap();
        assert_eq!(chosen, RENAMED_JDT_COMPILER);
    }

    #[test]
    fn configured_identifier_wins_when_both_exist() {
        let mut table = SymbolTable::new()
            .with_class(LEGACY_JDT_COMPILER)
            .with_class(RENAMED_JDT_COMPILER);
        let chosen = CompilerResolver::for_identifier(LEGACY_JDT_COMPILER)
            .resolve(&mut table)
            .unwrap();
        assert_eq!(chosen, LEGACY_JDT_COMPILER);
    }

    #[test]
    fn neither_names_both_attempts() {
        let err = CompilerResolver::for_identifier(LEGACY_JDT_COMPILER)
            .resolve(&mut SymbolTable::new())
            .unwrap_err();
        assert_eq!(
            err,
            AdapterError::CompilerNotResolved {
                attempted: vec![
                    LEGACY_JDT_COMPILER.to_string(),
                    RENAMED_JDT_COMPILER.to_string()
                ],
            }
        );
    }

    #[test]
    fn unknown_identifier_has_single_candidate() {
        let r = CompilerResolver::for_identifier("com.example.Custom");
        assert_eq!(r.candidates(), ["com.example.Custom".to_string()]);
    }

    struct ShortProbe;

    impl SymbolProbe for ShortProbe {
        fn resolve(&mut self, _symbols: &[Symbol]) -> Result<Vec<Resolution>, ProbeError> {
            Ok(vec![])
        }
    }

    #[test]
    fn short_answer_is_a_probe_error() {
        let err = CompilerResolver::for_identifier(LEGACY_JDT_COMPILER)
            .resolve(&mut ShortProbe)
            .unwrap_err();
        assert!(matches!(err, AdapterError::Probe(_)));
    }
}
