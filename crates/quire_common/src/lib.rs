//! Shared foundational types used across the Quire report compiler driver.
//!
//! This crate provides content hashing for staleness detection and the
//! artifact locators that make up a compiler dependency set.

#![warn(missing_docs)]

pub mod hash;
pub mod locator;

pub use hash::ContentHash;
pub use locator::{ArtifactLocator, DependencySet, ParseLocatorError};
