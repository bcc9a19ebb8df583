//! Per-package translation driver.
//!
//! Three strictly ordered steps per package: pass 1 (try-call
//! elimination), type resolution over the rewritten program, pass 2
//! (nil-check insertion). The whole batch then gets its import paths
//! fixed. Failure in any step surfaces immediately; the partially
//! mutated AST is discarded by the caller, never written out.

use tracing::debug;

use trygo_parser::fileset::FileSet;

use crate::buildctx::BuildContext;
use crate::diag::{Result, TranslateError};
use crate::elim::{LeftoverTrySweep, TryCallElimination};
use crate::imports::fix_imports;
use crate::nilcheck::NilCheckInsertion;
use crate::pkg::Package;
use crate::resolve::{resolve, Importer};

/// Translates every package of the batch in place, then repoints
/// cross-package imports into the destination layout.
pub fn translate(pkgs: &mut [Package], fset: &FileSet, ctx: &BuildContext) -> Result<()> {
    let mut importer = Importer::new(ctx.clone());
    for pkg in pkgs.iter_mut() {
        translate_package(pkg, fset, &mut importer)?;
    }
    fix_imports(pkgs, ctx, fset)
}

/// Runs the two passes over one package. The AST is modified directly;
/// on error it may be incompletely modified.
pub fn translate_package(
    pkg: &mut Package,
    fset: &FileSet,
    importer: &mut Importer,
) -> Result<()> {
    let pkg_name = pkg.name.clone();
    debug!(pkg = %pkg_name, "translation start");

    let Package {
        arena,
        interner,
        files,
        modified,
        ..
    } = pkg;

    // Phase 1: try() call elimination.
    debug!(pkg = %pkg_name, "phase-1 start");
    let mut tce = TryCallElimination::new(arena, interner, fset, &pkg_name);
    for (i, f) in files.iter().enumerate() {
        tce.run_file(i, &f.ast)?;
    }
    tce.assert_post_condition();
    let (tree, num_trans, dirty_files) = (tce.tree, tce.num_trans, tce.dirty_files);
    debug!(pkg = %pkg_name, points = num_trans, "phase-1 end");

    // Any try() still present sits in an unsupported position.
    for f in files.iter() {
        if let Some(sweep) = LeftoverTrySweep::new(interner) {
            if let Some((span, msg)) = sweep.run(arena, &f.ast) {
                return Err(TranslateError::at(fset.position(span), &pkg_name, msg));
            }
        }
    }

    if num_trans == 0 {
        // Nothing was translated; later steps can be skipped entirely.
        return Ok(());
    }

    // Type resolution over the rewritten program.
    debug!(pkg = %pkg_name, "type check after phase-1 start");
    let points = tree.collect_trans_points();
    let info = resolve(arena, interner, fset, files, &points, importer)?;
    debug!(pkg = %pkg_name, "type check after phase-1 end");

    // Phase 2: if err != nil insertion.
    debug!(pkg = %pkg_name, "phase-2 start");
    let mut nci = NilCheckInsertion::new(arena, interner, fset, &pkg_name, &info);
    nci.translate(&tree)?;
    debug!(pkg = %pkg_name, "phase-2 end");

    for i in dirty_files {
        files[i].modified = true;
    }
    *modified = true;

    debug!(pkg = %pkg_name, "translation end");
    Ok(())
}
