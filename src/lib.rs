//! trygo — a translator from TryGo into Go.
//!
//! TryGo is Go plus one pseudo-function: `try(f(...))` unwraps the
//! trailing error of `f`'s results and, when it is non-nil, returns zero
//! values plus the error from the enclosing function. The translator
//! lowers TryGo sources to ordinary Go in two passes over the AST:
//!
//! 1. **try-call elimination** ([`elim`]) rewrites every `try(...)` into
//!    a typeable placeholder form and records a translation point in a
//!    parallel [`block`] tree;
//! 2. after [`resolve`]-ing the types the placeholder form needs,
//!    **nil-check insertion** ([`nilcheck`]) replaces placeholders with
//!    fresh error variables and splices `if err != nil { return ... }`
//!    guards.
//!
//! [`imports`] then repoints cross-package import paths into the output
//! layout, and [`gen`] writes the mirrored output tree.

pub mod block;
pub mod buildctx;
pub mod diag;
pub mod elim;
pub mod gen;
pub mod imports;
pub mod nilcheck;
pub mod pkg;
pub mod resolve;
pub mod translate;

pub use buildctx::BuildContext;
pub use diag::{Result, TranslateError};
pub use gen::Gen;
pub use pkg::Package;
pub use translate::{translate, translate_package};
