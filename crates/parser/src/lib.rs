//! Go front-end for the trygo translator.
//!
//! - `lexer`: Logos token definitions with Go semicolon insertion.
//! - `ast`: arena-allocated, rewrite-friendly Go AST.
//! - `parser`: hand-written recursive descent (pre-generics Go).
//! - `printer`: gofmt-style pretty-printer.
//! - `fileset`: shared position table for diagnostics.
//! - `walk`: read-only visitor infrastructure (`#[derive(WalkAst)]`).

pub mod ast;
pub mod error;
pub mod fileset;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod walk;

pub use lexer::Lexer;
pub use parser::parse_file;
pub use printer::print_file;
