//! Translator error taxonomy.
//!
//! Every user-facing diagnostic carries a `file:line:col` prefix taken
//! from the shared position table. Type-check and import failures are
//! accumulated by their passes and unified here into one error.

use std::path::PathBuf;

use thiserror::Error;
use trygo_parser::fileset::Position;

#[derive(Debug, Error)]
pub enum TranslateError {
    /// Misuse of `try()` or an unsupported translation position.
    /// Format mirrors `<file>:<line>:<col>: <package>: Error: <message>`.
    #[error("{pos}: {pkg}: Error: {msg}")]
    At {
        pos: Position,
        pkg: String,
        msg: String,
    },

    /// A source file failed to lex or parse.
    #[error("{pos}: Error: {msg}")]
    Parse { pos: Position, msg: String },

    /// Accumulated type resolution failures, unified per package.
    #[error("Type error(s) at {phase}:\n{}", bulleted(.errors))]
    TypeCheck {
        phase: &'static str,
        errors: Vec<String>,
    },

    /// One import path could not be resolved or rewritten.
    #[error("Import error while fixing import paths: At {pos}: {msg}")]
    Import { pos: Position, msg: String },

    /// Several import errors, aggregated.
    #[error("{} import error(s) while fixing import paths:{}", .errors.len(), located(.errors))]
    Imports { errors: Vec<(Position, String)> },

    #[error("Cannot read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open output file {path:?}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{msg}")]
    Usage { msg: String },
}

impl TranslateError {
    pub fn at(pos: Position, pkg: &str, msg: impl Into<String>) -> Self {
        TranslateError::At {
            pos,
            pkg: pkg.to_string(),
            msg: msg.into(),
        }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        TranslateError::Usage { msg: msg.into() }
    }
}

fn bulleted(errors: &[String]) -> String {
    let mut out = String::new();
    for e in errors {
        out.push_str("  ");
        out.push_str(e);
        out.push('\n');
    }
    out
}

fn located(errors: &[(Position, String)]) -> String {
    let mut out = String::new();
    for (pos, msg) in errors {
        out.push_str(&format!("\n  {msg} at {pos}"));
    }
    out
}

pub type Result<T> = std::result::Result<T, TranslateError>;
