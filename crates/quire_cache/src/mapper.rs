//! Source-to-output path mapping.

use std::path::{Path, PathBuf};

/// Maps relative design paths to relative artifact paths by swapping the
/// trailing extension.
///
/// Only the final `.<source_ext>` suffix of the file name is replaced, so
/// directory names and extension-like substrings elsewhere in the name are
/// preserved: `a.jrxml.bak.jrxml` maps to `a.jrxml.bak.jasper`. A file whose
/// whole name is the suffix (`.jrxml`) is not a design. Non-UTF-8 file names
/// never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    source_suffix: String,
    output_suffix: String,
}

impl PathMapper {
    /// Creates a mapper for the given extensions; a leading dot is optional.
    pub fn new(source_ext: &str, output_ext: &str) -> Self {
        Self {
            source_suffix: format!(".{}", source_ext.trim_start_matches('.')),
            output_suffix: format!(".{}", output_ext.trim_start_matches('.')),
        }
    }

    /// Returns `true` if the path names a source design.
    pub fn matches(&self, path: &Path) -> bool {
        swap_suffix(path, &self.source_suffix, &self.output_suffix).is_some()
    }

    /// Maps a source path to its output path, or `None` if it is not a design.
    pub fn map(&self, relative_source: &Path) -> Option<PathBuf> {
        swap_suffix(relative_source, &self.source_suffix, &self.output_suffix)
    }

    /// Maps an output path back to the source path it was compiled from.
    pub fn unmap(&self, relative_output: &Path) -> Option<PathBuf> {
        swap_suffix(relative_output, &self.output_suffix, &self.source_suffix)
    }
}

fn swap_suffix(path: &Path, from: &str, to: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(from)?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(format!("{stem}{to}")))
}

/// Absolute roots of one task's source and output trees plus their mapper.
#[derive(Debug, Clone)]
pub struct TreeLayout {
    /// Root of the source tree.
    pub source_root: PathBuf,
    /// Root of the mirrored output tree.
    pub output_root: PathBuf,
    /// Extension mapping between the two trees.
    pub mapper: PathMapper,
}

impl TreeLayout {
    /// Creates a layout.
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>, mapper: PathMapper) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            mapper,
        }
    }

    /// Absolute source path for a relative design path.
    pub fn source_path(&self, relative: &Path) -> PathBuf {
        self.source_root.join(relative)
    }

    /// Absolute output path for a relative design path.
    pub fn output_path(&self, relative: &Path) -> Option<PathBuf> {
        Some(self.output_root.join(self.mapper.map(relative)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jasper() -> PathMapper {
        PathMapper::new("jrxml", "jasper")
    }

    #[test]
    fn maps_trailing_extension() {
        let m = jasper();
        assert_eq!(
            m.map(Path::new("invoice.jrxml")),
            Some(PathBuf::from("invoice.jasper"))
        );
    }

    #[test]
    fn preserves_directories() {
        let m = jasper();
        assert_eq!(
            m.map(Path::new("sales/2024/q1/summary.jrxml")),
            Some(PathBuf::from("sales/2024/q1/summary.jasper"))
        );
    }

    #[test]
    fn extension_substring_mid_name_is_kept() {
        let m = jasper();
        assert_eq!(
            m.map(Path::new("a.jrxml.bak.jrxml")),
            Some(PathBuf::from("a.jrxml.bak.jasper"))
        );
        assert_eq!(
            m.map(Path::new("my.jrxmlreport.jrxml")),
            Some(PathBuf::from("my.jrxmlreport.jasper"))
        );
        assert_eq!(
            m.map(Path::new("x.jrxml/y.jrxml")),
            Some(PathBuf::from("x.jrxml/y.jasper"))
        );
    }

    #[test]
    fn non_designs_do_not_map() {
        let m = jasper();
        assert_eq!(m.map(Path::new("readme.md")), None);
        assert_eq!(m.map(Path::new("invoice.jrxml.bak")), None);
        assert_eq!(m.map(Path::new("invoicejrxml")), None);
        assert_eq!(m.map(Path::new(".jrxml")), None);
        assert!(!m.matches(Path::new("logo.png")));
        assert!(m.matches(Path::new("logo.jrxml")));
    }

    #[test]
    fn unmap_inverts_map() {
        let m = jasper();
        for p in ["a.jrxml", "d/e/f.jrxml", "a.jasper.jrxml", "x.jrxml/y.jrxml"] {
            let out = m.map(Path::new(p)).unwrap();
            assert_eq!(m.unmap(&out), Some(PathBuf::from(p)), "round trip of {p}");
        }
    }

    #[test]
    fn leading_dots_are_optional() {
        assert_eq!(PathMapper::new(".jrxml", ".jasper"), jasper());
    }

    #[test]
    fn layout_joins_roots() {
        let layout = TreeLayout::new("/src", "/out", jasper());
        assert_eq!(
            layout.source_path(Path::new("a/b.jrxml")),
            PathBuf::from("/src/a/b.jrxml")
        );
        assert_eq!(
            layout.output_path(Path::new("a/b.jrxml")),
            Some(PathBuf::from("/out/a/b.jasper"))
        );
    }
}
