//! Shared position table.
//!
//! All files of a translation batch register here and receive a disjoint
//! base offset; every `Span` in the AST is file-set-wide. `position` maps
//! a span back to `file:line:col` for diagnostics. The table is read-only
//! after parsing.

use std::fmt;

use crate::ast::Span;

#[derive(Debug)]
struct FileEntry {
    name: String,
    base: u32,
    size: u32,
    /// Byte offset (file-local) of the first byte of every line.
    line_starts: Vec<u32>,
}

/// Human-readable source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[derive(Debug, Default)]
pub struct FileSet {
    files: Vec<FileEntry>,
    next_base: u32,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file and returns the base offset its spans start at.
    pub fn add(&mut self, name: impl Into<String>, src: &str) -> u32 {
        // +1 keeps bases disjoint even for empty files, mirroring the gap
        // go/token leaves between files.
        let base = self.next_base;
        let mut line_starts = vec![0u32];
        for (i, b) in src.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        self.files.push(FileEntry {
            name: name.into(),
            base,
            size: src.len() as u32,
            line_starts,
        });
        self.next_base = base + src.len() as u32 + 1;
        base
    }

    fn file_containing(&self, offset: u32) -> Option<&FileEntry> {
        self.files
            .iter()
            .rev()
            .find(|f| offset >= f.base && offset <= f.base + f.size)
    }

    /// Maps the start of a span to `file:line:col` (1-based, columns in
    /// bytes, like go/token).
    pub fn position(&self, span: Span) -> Position {
        let Some(file) = self.file_containing(span.start) else {
            return Position {
                file: "<unknown>".to_string(),
                line: 0,
                col: 0,
            };
        };
        let local = span.start - file.base;
        let line_idx = match file.line_starts.binary_search(&local) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position {
            file: file.name.clone(),
            line: line_idx as u32 + 1,
            col: local - file.line_starts[line_idx] + 1,
        }
    }

    /// Name of the file a span starts in.
    pub fn file_name(&self, span: Span) -> Option<&str> {
        self.file_containing(span.start).map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_across_files() {
        let mut fs = FileSet::new();
        let a = fs.add("a.go", "package a\nvar x int\n");
        let b = fs.add("b.go", "package b\n");

        let p = fs.position(Span::at(a));
        assert_eq!(p.to_string(), "a.go:1:1");

        // "var" starts at offset 10 of a.go
        let p = fs.position(Span::new(a as usize + 10, a as usize + 13));
        assert_eq!(p.to_string(), "a.go:2:1");

        let p = fs.position(Span::new(b as usize + 8, b as usize + 9));
        assert_eq!(p.to_string(), "b.go:1:9");
    }
}
