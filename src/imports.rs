//! Import path fixing.
//!
//! Import statements referencing translated packages still point at the
//! original source layout after pass 2. Every import spec of every
//! translated file is resolved against the build context; when the
//! resolved directory is the origin of another package in the batch, the
//! import string is rewritten to that package's destination directory.
//! Resolution failures are collected, not aborted on first, and unified
//! into one diagnostic.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use trygo_parser::ast::{Decl, GenDeclKind, Spec, SpecIdx, TopLevelDecl};
use trygo_parser::fileset::{FileSet, Position};

use crate::buildctx::{import_path_to_rel, rel_to_import_path, unquote, BuildContext};
use crate::diag::{Result, TranslateError};
use crate::pkg::Package;

struct ImportsFixer<'c> {
    trans_map: HashMap<PathBuf, PathBuf>,
    ctx: &'c BuildContext,
    /// Resolved-directory cache, one probe per distinct import path.
    path_to_dir: HashMap<String, PathBuf>,
    count: usize,
    errs: Vec<(Position, String)>,
}

impl<'c> ImportsFixer<'c> {
    fn resolve_import_path(&mut self, path: &str) -> std::result::Result<PathBuf, String> {
        if let Some(dir) = self.path_to_dir.get(path) {
            return Ok(dir.clone());
        }
        let dir = self.ctx.import(path)?;
        debug!(path, dir = %dir.display(), "import path resolved");
        self.path_to_dir.insert(path.to_string(), dir.clone());
        Ok(dir)
    }

    fn fix_package(&mut self, pkg: &mut Package, fset: &FileSet) {
        debug!(pkg = %pkg.name, "fix imports");

        // Gather spec indices first; rewriting mutates the spec buffer.
        let mut specs: Vec<(usize, SpecIdx)> = Vec::new();
        for (file_idx, file) in pkg.files.iter().enumerate() {
            for &decl in pkg.arena.top_decls(file.ast.decls) {
                let TopLevelDecl::Decl(id) = decl else { continue };
                let Decl::Gen(g) = pkg.arena.decls[id];
                if g.kind != GenDeclKind::Import {
                    continue;
                }
                for i in 0..g.specs.len() {
                    specs.push((file_idx, SpecIdx(g.specs.start() + i)));
                }
            }
        }

        for (file_idx, idx) in specs {
            if self.fix_import(pkg, idx, fset) {
                pkg.files[file_idx].modified = true;
                pkg.modified = true;
            }
        }
    }

    fn fix_import(&mut self, pkg: &mut Package, idx: SpecIdx, fset: &FileSet) -> bool {
        let Spec::Import(im) = *pkg.arena.spec(idx) else {
            return false;
        };
        let raw = pkg.interner.resolve(im.path.sym);

        // The literal came from the parser, so a malformed string here is
        // a pipeline bug.
        let Some(path) = unquote(raw) else {
            panic!("import path is a broken Go string: {raw}");
        };
        let path = path.to_string();

        // Pseudo-C imports have no source directory and are never
        // translated.
        if path == "C" {
            return false;
        }

        let src_dir = match self.resolve_import_path(&path) {
            Ok(dir) => dir,
            Err(msg) => {
                let pos = fset.position(im.path.pos);
                debug!(error = %msg, "import resolution failed");
                self.errs
                    .push((pos, format!("Cannot resolve import path {path:?}: {msg}")));
                return false;
            }
        };

        let Some(dest_dir) = self.trans_map.get(&src_dir) else {
            return false;
        };

        // path:    trygo/some/pkg
        // src_dir: /root/trygo/some/pkg
        // dest:    /root/outdir/some/pkg
        // The shared prefix of src_dir above the import path maps the
        // destination back into import-path form.
        let rel = import_path_to_rel(&path);
        let Some(prefix) = strip_path_suffix(&src_dir, &rel) else {
            let pos = fset.position(im.path.pos);
            self.errs.push((
                pos,
                format!(
                    "resolved directory {:?} does not end with import path {path:?}",
                    src_dir
                ),
            ));
            return false;
        };
        let Ok(trans_rel) = dest_dir.strip_prefix(&prefix) else {
            let pos = fset.position(im.path.pos);
            self.errs.push((
                pos,
                format!(
                    "translated directory {:?} is outside source prefix {:?}",
                    dest_dir, prefix
                ),
            ));
            return false;
        };
        let trans_path = rel_to_import_path(trans_rel);

        let new_lit = format!("\"{trans_path}\"");
        debug!(from = raw, to = %new_lit, "fix import path");
        let sym = pkg.interner.intern(&new_lit);
        if let Spec::Import(im) = pkg.arena.spec_mut(idx) {
            im.path.sym = sym;
        }
        self.count += 1;
        true
    }
}

/// `base` minus a trailing `suffix` of path components.
fn strip_path_suffix(base: &Path, suffix: &Path) -> Option<PathBuf> {
    let base_parts: Vec<_> = base.components().collect();
    let suffix_parts: Vec<_> = suffix.components().collect();
    if suffix_parts.len() > base_parts.len() {
        return None;
    }
    let split = base_parts.len() - suffix_parts.len();
    if base_parts[split..] != suffix_parts[..] {
        return None;
    }
    Some(base_parts[..split].iter().collect())
}

/// Rewrites import paths across the whole batch.
pub fn fix_imports(pkgs: &mut [Package], ctx: &BuildContext, fset: &FileSet) -> Result<()> {
    debug!(packages = pkgs.len(), "fix imports");
    let trans_map = pkgs
        .iter()
        .map(|p| (p.birth.clone(), p.path.clone()))
        .collect();

    let mut fixer = ImportsFixer {
        trans_map,
        ctx,
        path_to_dir: HashMap::new(),
        count: 0,
        errs: Vec::new(),
    };
    for pkg in pkgs.iter_mut() {
        fixer.fix_package(pkg, fset);
    }

    match fixer.errs.len() {
        0 => {
            debug!(count = fixer.count, "fix imports done");
            Ok(())
        }
        1 => {
            let (pos, msg) = fixer.errs.remove(0);
            Err(TranslateError::Import { pos, msg })
        }
        _ => Err(TranslateError::Imports { errors: fixer.errs }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_matching_suffix() {
        let base = Path::new("/root/src/nested/b");
        let suffix = Path::new("nested/b");
        assert_eq!(
            strip_path_suffix(base, suffix),
            Some(PathBuf::from("/root/src"))
        );
        assert_eq!(strip_path_suffix(base, Path::new("other/b")), None);
    }
}
