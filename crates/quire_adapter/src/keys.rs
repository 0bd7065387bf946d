//! Configuration keys whose names are discovered by probing.
//!
//! Each key is declared as a string constant on some library class. Probing
//! the constant tells us both whether the option exists in this version and
//! what its property name is.

use std::fmt;

use crate::symbol::Symbol;

/// What a configuration key controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// Schema validation of the design XML.
    XmlValidation,
    /// Keeping generated intermediate sources after compiling.
    KeepJavaFile,
    /// Directory for compiler scratch files.
    TempDir,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyRole::XmlValidation => "xml-validation",
            KeyRole::KeepJavaFile => "keep-java-file",
            KeyRole::TempDir => "temp-dir",
        })
    }
}

/// A probed configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyKey {
    /// What the key controls.
    pub role: KeyRole,
    /// Class declaring the constant.
    pub owner: &'static str,
    /// Name of the constant.
    pub constant: &'static str,
    /// Property name to use when the constant is absent. `None` means the
    /// option is dropped instead.
    pub literal: Option<&'static str>,
}

impl PropertyKey {
    /// The symbol to probe for this key.
    pub fn symbol(&self) -> Symbol {
        Symbol::field(self.owner, self.constant)
    }
}

/// Every key the adapter knows about, in probe order.
pub const PROPERTY_KEYS: &[PropertyKey] = &[
    // Gone in 7.x along with the SAX parser factory.
    PropertyKey {
        role: KeyRole::XmlValidation,
        owner: "net.sf.jasperreports.engine.xml.JRReportSaxParserFactory",
        constant: "COMPILER_XML_VALIDATION",
        literal: None,
    },
    PropertyKey {
        role: KeyRole::KeepJavaFile,
        owner: "net.sf.jasperreports.engine.design.JRCompiler",
        constant: "COMPILER_KEEP_JAVA_FILE",
        literal: Some("net.sf.jasperreports.compiler.keep.java.file"),
    },
    PropertyKey {
        role: KeyRole::TempDir,
        owner: "net.sf.jasperreports.engine.design.JRCompiler",
        constant: "COMPILER_TEMP_DIR",
        literal: Some("net.sf.jasperreports.compiler.temp.dir"),
    },
];
