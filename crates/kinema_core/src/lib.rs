//! # Kinema Core
//!
//! Foundational types shared by every Kinema crate.
//!
//! Currently this is the error hierarchy: [`FormatError`] for malformed
//! motion files, [`LoadError`] for failed fetches, and the umbrella
//! [`Error`] returned by the import pipeline.

pub mod errors;

pub use errors::{Error, FormatError, LoadError, Result};
