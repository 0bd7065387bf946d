//! Artifact locators and the dependency sets built from them.
//!
//! A [`DependencySet`] defines what an isolation boundary can see: the
//! ordered list of library archives placed on the boundary's class path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ContentHash;

/// Coordinates of a single library archive: `group:name:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactLocator {
    /// Dotted group identifier (e.g. `net.sf.jasperreports`).
    pub group: String,
    /// Artifact name within the group (e.g. `jasperreports`).
    pub name: String,
    /// Exact version string (e.g. `6.21.0`).
    pub version: String,
}

/// Error returned when a locator string is not `group:name:version`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid artifact locator '{input}': expected 'group:name:version'")]
pub struct ParseLocatorError {
    /// The rejected input.
    pub input: String,
}

impl ArtifactLocator {
    /// Creates a locator from its three parts.
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// The archive file name this locator resolves to (`name-version.jar`).
    pub fn file_name(&self) -> String {
        format!("{}-{}.jar", self.name, self.version)
    }

    /// The major version component, if the version starts with a number.
    pub fn major_version(&self) -> Option<u32> {
        self.version.split(['.', '-']).next()?.parse().ok()
    }
}

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

impl FromStr for ArtifactLocator {
    type Err = ParseLocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLocatorError {
            input: s.to_string(),
        };
        let mut parts = s.trim().split(':');
        let (Some(group), Some(name), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        if group.is_empty() || name.is_empty() || version.is_empty() {
            return Err(err());
        }
        Ok(Self::new(group, name, version))
    }
}

impl Serialize for ArtifactLocator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArtifactLocator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An ordered, deduplicated list of artifact locators.
///
/// Insertion order is the class path order. Pushing a locator that is already
/// present is a no-op, so the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencySet {
    artifacts: Vec<ArtifactLocator>,
}

impl DependencySet {
    /// Creates an empty dependency set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a locator unless it is already present.
    ///
    /// Returns `true` if the locator was added.
    pub fn push(&mut self, locator: ArtifactLocator) -> bool {
        if self.artifacts.contains(&locator) {
            return false;
        }
        self.artifacts.push(locator);
        true
    }

    /// Parses each string as a locator and collects them in order.
    pub fn parse_all<I, S>(items: I) -> Result<Self, ParseLocatorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for item in items {
            set.push(item.as_ref().parse()?);
        }
        Ok(set)
    }

    /// Iterates over the locators in class path order.
    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactLocator> {
        self.artifacts.iter()
    }

    /// Number of distinct locators.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Returns `true` if the set holds no locators.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Stable hash of the ordered locator list.
    pub fn fingerprint(&self) -> ContentHash {
        let rendered: Vec<String> = self.artifacts.iter().map(|a| a.to_string()).collect();
        ContentHash::from_parts(rendered.iter().map(|s| s.as_bytes()))
    }
}

impl FromIterator<ArtifactLocator> for DependencySet {
    fn from_iter<T: IntoIterator<Item = ArtifactLocator>>(iter: T) -> Self {
        let mut set = Self::new();
        for locator in iter {
            set.push(locator);
        }
        set
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a ArtifactLocator;
    type IntoIter = std::slice::Iter<'a, ArtifactLocator>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.artifacts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{a}")?;
        }
        Ok(())
    }
}
