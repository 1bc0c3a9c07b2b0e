// SPDX-License-Identifier: MIT
//
// Text storage — rows of bytes loaded from a file.
//
// A `Document` is an ordered sequence of `Row`s. Rows are owned byte
// sequences stored in full; clipping to the viewport happens at render
// time, never in storage. This lineage loads at most one row — the
// first line of the file named on the command line.
//
// # Design choices
//
// - **Bytes, not chars.** Rows hold raw bytes and display clipping is
//   byte-based. The render path never re-encodes or validates; what was
//   in the file is what reaches the terminal.
//
// - **Line endings are trimmed on load.** Trailing `\n` and `\r` bytes
//   belong to the file encoding, not the row content.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

// ─── Row ────────────────────────────────────────────────────────────────────

/// One line of text content, stored in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    bytes: Vec<u8>,
}

impl Row {
    /// Create a row from its content bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Content length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the row holds no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The full row content.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The row content clipped to at most `width` bytes, for display.
    #[must_use]
    pub fn clipped(&self, width: usize) -> &[u8] {
        &self.bytes[..self.bytes.len().min(width)]
    }
}

// ─── Document ───────────────────────────────────────────────────────────────

/// An ordered sequence of text rows.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Document {
    rows: Vec<Row>,
}

impl Document {
    /// Create an empty document (no rows — the welcome screen case).
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Load a document from the file at `path`.
    ///
    /// Reads the first line, trims any trailing `\n`/`\r` bytes, and
    /// stores it as a single row. A zero-length file yields an empty
    /// document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut line = Vec::new();
        let n = reader.read_until(b'\n', &mut line)?;

        let mut rows = Vec::new();
        if n > 0 {
            trim_line_ending(&mut line);
            rows.push(Row::new(line));
        }

        Ok(Self { rows })
    }

    /// Build a document from in-memory text, mirroring [`open`](Self::open):
    /// only the first line is kept, with its line ending trimmed.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut line: Vec<u8> = match text.split_once('\n') {
            Some((first, _)) => {
                let mut bytes = first.as_bytes().to_vec();
                bytes.push(b'\n');
                bytes
            }
            None => text.as_bytes().to_vec(),
        };

        let mut rows = Vec::new();
        if !line.is_empty() {
            trim_line_ending(&mut line);
            rows.push(Row::new(line));
        }

        Self { rows }
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the document holds no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at index `y`, if one exists.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&Row> {
        self.rows.get(y)
    }
}

/// Strip trailing `\n` and `\r` bytes in place.
fn trim_line_ending(line: &mut Vec<u8>) {
    while line.last().is_some_and(|&b| b == b'\n' || b == b'\r') {
        line.pop();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
