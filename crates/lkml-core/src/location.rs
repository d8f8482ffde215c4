//! Source positions attached to blocks, properties and violations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A span inside one source file.
///
/// Lines and columns are 1-based and physical: comments and embedded SQL
/// count toward them exactly as they appear in the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path of the file as supplied by the loader
    pub path: String,
    /// Line of the first character
    pub line: u32,
    /// Column of the first character
    pub column: u32,
    /// Line of the last character
    pub end_line: u32,
    /// Column just past the last character
    pub end_column: u32,
}

impl SourceLocation {
    /// Location covering a single point.
    pub fn point(path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    /// Location pointing at a whole file, with no meaningful line.
    pub fn file(path: impl Into<String>) -> Self {
        Self::point(path, 0, 0)
    }

    /// Extend this location so that it ends where `end` ends.
    pub fn to(mut self, end: &SourceLocation) -> Self {
        self.end_line = end.end_line;
        self.end_column = end.end_column;
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}:{}:{}", self.path, self.line, self.column)
        }
    }
}
