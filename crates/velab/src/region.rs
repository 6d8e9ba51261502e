use std::fmt;

use serde::{Deserialize, Serialize};

/// Index into the file table of the [`PtSource`](crate::pt::PtSource) a
/// region belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub(crate) u32);

impl FileId {
    pub fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("file table overflow"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A source span: file plus start/end line and column.
///
/// Every parse-tree node carries one, and elaborated entities copy the
/// region of the node they came from so diagnostics can point at source
/// without keeping the parse tree alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRegion {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl FileRegion {
    pub fn new(file: FileId, line: u32, column: u32) -> Self {
        Self {
            file,
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    /// The smallest region covering both `self` and `other`.
    ///
    /// Regions from different files keep `self`'s file; that only happens
    /// on malformed input and the first file is the better anchor.
    pub fn cover(self, other: Self) -> Self {
        let (end_line, end_column) = if (other.end_line, other.end_column) > (self.end_line, self.end_column) {
            (other.end_line, other.end_column)
        } else {
            (self.end_line, self.end_column)
        };
        Self {
            file: self.file,
            line: self.line,
            column: self.column,
            end_line,
            end_column,
        }
    }
}

impl fmt::Display for FileRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
