//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! - [`FormatError`]: structurally malformed motion-file text. The load is
//!   aborted and whatever animation was active stays untouched.
//! - [`Error::EmptyAnimation`]: the file parsed but contains no frames, so
//!   no reference pose can be derived.
//! - [`LoadError`]: anything that went wrong while fetching and importing a
//!   motion file, wrapping the two above plus I/O failures.
//!
//! Non-fatal conditions (unmatched bone names, skeleton synthesis) are not
//! errors; they are collected as warnings by the binder.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kinema_core::{Error, Result};
//!
//! fn import(text: &str) -> Result<()> {
//!     let motion = parse_motion(text)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type of the import pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The motion file text is malformed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The motion file declares no frames.
    #[error("Motion file contains no frames; no reference pose can be derived")]
    EmptyAnimation,
}

/// Structural problems found while parsing motion-file text.
///
/// Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A required section never appeared.
    #[error("Missing `{0}` section")]
    MissingSection(&'static str),

    /// A section was opened but the input ended before its `end` line.
    #[error("Section `{section}` opened at line {line} is never closed")]
    UnterminatedSection {
        section: &'static str,
        line: usize,
    },

    /// A data line has fewer tokens than its section requires.
    #[error("Line {line}: expected at least {expected} tokens, found {found}")]
    TruncatedLine {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A token that should be numeric could not be parsed.
    #[error("Line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },

    /// A `time` line appeared outside the skeleton section.
    #[error("Line {line}: `time` outside of a skeleton section")]
    TimeOutsideSkeleton { line: usize },

    /// A bone sample appeared before any `time` line.
    #[error("Line {line}: bone sample before the first `time` line")]
    SampleOutsideFrame { line: usize },

    /// Frame indices must be strictly increasing.
    #[error("Line {line}: frame time {time} does not follow {previous}")]
    NonIncreasingTime {
        line: usize,
        time: u32,
        previous: u32,
    },

    /// Two bone declarations share the same id.
    #[error("Line {line}: bone id {id} declared twice")]
    DuplicateBone { line: usize, id: i32 },

    /// A bone declares a parent id that was never declared.
    #[error("Bone {id} references unknown parent {parent_id}")]
    UnknownParent { id: i32, parent_id: i32 },

    /// The parent links contain a cycle.
    #[error("Bone {id} is part of a parent cycle")]
    ParentCycle { id: i32 },

    /// A sample references a bone id that was never declared.
    #[error("Line {line}: sample for undeclared bone {id}")]
    UnknownBone { line: usize, id: i32 },

    /// A line that fits no section grammar.
    #[error("Line {line}: unexpected content `{content}`")]
    UnexpectedLine { line: usize, content: String },

    /// A bone name the text format cannot hold: it has both a `"` and
    /// whitespace, or starts with `"`.
    #[error("Bone {id} name `{name}` cannot be written to a motion file")]
    UnwritableName { id: i32, name: String },
}

/// Failure while fetching or importing a motion file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid UTF-8 text.
    #[error("Motion file `{uri}` is not valid UTF-8")]
    Utf8 { uri: String },

    /// The file was read but could not be imported.
    #[error("Failed to import `{uri}`: {source}")]
    Import {
        uri: String,
        #[source]
        source: Error,
    },

    /// The background task running the load was dropped.
    #[error("Load task for `{0}` was cancelled")]
    Cancelled(String),
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
