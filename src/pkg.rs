//! Translated package model.
//!
//! A `Package` owns the arena, interner and per-file ASTs of one parsed
//! Go package, together with its origin (`birth`) and destination paths.
//! Files keep their original source text: untouched files are written
//! back byte-for-byte, only rewritten files go through the printer.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use trygo_parser::ast::{
    AstArena, BlockId, Expr, ExprId, Interner, Results, SimpleStmt, SourceFile, Stmt, StmtId,
    TopLevelDecl,
};
use trygo_parser::fileset::FileSet;
use trygo_parser::{parse_file, printer};

use crate::diag::{Result, TranslateError};
use crate::elim::result_types;
use crate::resolve::{verify_resolution, Importer};

#[derive(Debug)]
pub struct PkgFile {
    pub path: PathBuf,
    pub ast: SourceFile,
    pub src: String,
    /// Set when a translation point was applied or an import path was
    /// rewritten in this file.
    pub modified: bool,
}

#[derive(Debug)]
pub struct Package {
    pub name: String,
    pub arena: AstArena,
    pub interner: Interner,
    pub files: Vec<PkgFile>,
    /// Where this package *will* be created.
    pub path: PathBuf,
    /// Where this package was translated from.
    pub birth: PathBuf,
    pub(crate) modified: bool,
}

impl Package {
    /// Parses every `.go` file of one directory as a single package.
    pub fn parse_dir(dir: &Path, dest: &Path, fset: &mut FileSet) -> Result<Package> {
        let entries = std::fs::read_dir(dir).map_err(|e| TranslateError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "go") && p.is_file())
            .collect();
        paths.sort();

        let mut arena = AstArena::new();
        let mut interner = Interner::new();
        let mut files = Vec::with_capacity(paths.len());
        let mut name: Option<String> = None;

        for path in paths {
            let src = std::fs::read_to_string(&path).map_err(|e| TranslateError::ReadFile {
                path: path.clone(),
                source: e,
            })?;
            let base = fset.add(path.to_string_lossy().into_owned(), &src);
            let ast = parse_file(&src, base, &mut arena, &mut interner).map_err(|d| {
                TranslateError::Parse {
                    pos: fset.position(d.span),
                    msg: d.message,
                }
            })?;

            let file_pkg = interner.resolve(ast.name.sym).to_string();
            match &name {
                None => name = Some(file_pkg),
                Some(existing) if *existing != file_pkg => {
                    return Err(TranslateError::Parse {
                        pos: fset.position(ast.name.pos),
                        msg: format!(
                            "found packages {existing} and {file_pkg} in {}",
                            dir.display()
                        ),
                    });
                }
                Some(_) => {}
            }

            files.push(PkgFile {
                path,
                ast,
                src,
                modified: false,
            });
        }

        Ok(Package {
            name: name.unwrap_or_default(),
            arena,
            interner,
            files,
            path: dest.to_path_buf(),
            birth: dir.to_path_buf(),
            modified: false,
        })
    }

    /// Whether any translation or import rewrite touched this package.
    pub fn modified(&self) -> bool {
        self.modified
    }

    fn file_bytes(&self, f: &PkgFile) -> String {
        if f.modified {
            printer::print_file(&f.ast, &self.arena, &self.interner)
        } else {
            f.src.clone()
        }
    }

    /// Writes one file's output to `out`; `out_path` selects the file by
    /// name.
    pub fn write_file_to(&self, out: &mut dyn Write, out_path: &Path) -> Result<()> {
        let fname = out_path.file_name();
        let Some(f) = self.files.iter().find(|f| f.path.file_name() == fname) else {
            return Err(TranslateError::usage(format!(
                "no such file in package {}: {}",
                self.name,
                out_path.display()
            )));
        };
        out.write_all(self.file_bytes(f).as_bytes())
            .map_err(|e| TranslateError::WriteFile {
                path: out_path.to_path_buf(),
                source: e,
            })
    }

    /// Writes all files under the destination directory, returning the
    /// written paths in file order.
    pub fn write(&self) -> Result<Vec<PathBuf>> {
        debug!(birth = %self.birth.display(), dest = %self.path.display(), "write translated package");
        let mut written = Vec::with_capacity(self.files.len());
        for f in &self.files {
            let fname = f.path.file_name().expect("package file without a name");
            let out_path = self.path.join(fname);
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| TranslateError::WriteFile {
                    path: out_path.clone(),
                    source: e,
                })?;
            }
            std::fs::write(&out_path, self.file_bytes(f)).map_err(|e| {
                TranslateError::WriteFile {
                    path: out_path.clone(),
                    source: e,
                }
            })?;
            written.push(out_path);
        }
        Ok(written)
    }

    /// Verification of the translated package: every function must still
    /// resolve against the rewritten AST, and every `return` inside every
    /// function must carry the declared number of results.
    pub fn verify(&self, fset: &FileSet, importer: &mut Importer) -> Result<()> {
        debug!(pkg = %self.name, "verify translated package");

        // Re-run the resolver over the rewritten program; a frame that no
        // longer resolves means the translation itself broke the package.
        verify_resolution(&self.arena, &self.interner, fset, &self.files, importer)?;

        let mut errs = Vec::new();
        for f in &self.files {
            for &decl in self.arena.top_decls(f.ast.decls) {
                match decl {
                    TopLevelDecl::Func(id) => {
                        let fun = self.arena.funcs[id];
                        if let Some(body) = fun.body {
                            self.verify_block(body, fun.signature, fset, &mut errs);
                        }
                    }
                    TopLevelDecl::Decl(_) => {}
                }
            }
        }
        if errs.is_empty() {
            debug!(pkg = %self.name, "package verification OK");
            Ok(())
        } else {
            Err(TranslateError::TypeCheck {
                phase: "verification after translation",
                errors: errs,
            })
        }
    }

    fn verify_block(
        &self,
        block: BlockId,
        sig: trygo_parser::ast::SignatureId,
        fset: &FileSet,
        errs: &mut Vec<String>,
    ) {
        let arity = result_types(&self.arena, sig).len();
        let named = matches!(
            self.arena.signatures[sig].results,
            Some(Results::Params(fl))
                if self
                    .arena
                    .fields_list(fl.fields)
                    .iter()
                    .any(|&fid| !self.arena.fields[fid].names.is_empty())
        );
        let mut stack = vec![block];
        while let Some(b) = stack.pop() {
            for &sid in self.arena.stmts_list(self.arena.blocks[b].stmts) {
                self.verify_stmt(sid, arity, named, fset, errs, &mut stack);
            }
        }
    }

    fn verify_stmt(
        &self,
        sid: StmtId,
        arity: usize,
        named: bool,
        fset: &FileSet,
        errs: &mut Vec<String>,
        stack: &mut Vec<BlockId>,
    ) {
        match self.arena.stmts[sid] {
            Stmt::Return { results, .. } => {
                let n = results.len() as usize;
                let single_call = n == 1
                    && matches!(
                        self.arena.exprs[self.arena.exprs_list(results)[0]],
                        Expr::Call { .. }
                    );
                let ok = n == arity || (n == 0 && (arity == 0 || named)) || single_call;
                if !ok {
                    errs.push(format!(
                        "{}: wrong number of return values: have {n}, want {arity}",
                        fset.position(self.arena.stmts.span(sid))
                    ));
                }
            }
            Stmt::Block(b) => stack.push(b),
            Stmt::If {
                then_block,
                else_stmt,
                ..
            } => {
                stack.push(then_block);
                if let Some(e) = else_stmt {
                    self.verify_stmt(e, arity, named, fset, errs, stack);
                }
            }
            Stmt::For { body, .. } => stack.push(body),
            Stmt::Switch { clauses, .. } | Stmt::TypeSwitch { clauses, .. } => {
                for &cid in self.arena.switch_clause_ids(clauses) {
                    let stmts = self
                        .arena
                        .stmt_list_of(trygo_parser::ast::StmtListOwner::SwitchClause(cid));
                    for &s in self.arena.stmts_list(stmts) {
                        self.verify_stmt(s, arity, named, fset, errs, stack);
                    }
                }
            }
            Stmt::Select { clauses, .. } => {
                for &cid in self.arena.comm_clause_ids(clauses) {
                    let stmts = self
                        .arena
                        .stmt_list_of(trygo_parser::ast::StmtListOwner::CommClause(cid));
                    for &s in self.arena.stmts_list(stmts) {
                        self.verify_stmt(s, arity, named, fset, errs, stack);
                    }
                }
            }
            Stmt::Labeled { stmt, .. } => self.verify_stmt(stmt, arity, named, fset, errs, stack),
            Stmt::Simple(simple) => {
                // Function literals in initializers get verified against
                // their own signatures.
                self.verify_simple_funclits(simple, fset, errs);
            }
            _ => {}
        }
    }

    fn verify_simple_funclits(
        &self,
        sid: trygo_parser::ast::SimpleStmtId,
        fset: &FileSet,
        errs: &mut Vec<String>,
    ) {
        let mut exprs: Vec<ExprId> = Vec::new();
        match self.arena.simple_stmts[sid] {
            SimpleStmt::Expr(e) => exprs.push(e),
            SimpleStmt::Assign { rhs, .. } => exprs.extend(self.arena.exprs_list(rhs)),
            SimpleStmt::ShortVarDecl { values, .. } => {
                exprs.extend(self.arena.exprs_list(values))
            }
            _ => {}
        }
        for e in exprs {
            self.verify_expr_funclits(e, fset, errs);
        }
    }

    fn verify_expr_funclits(&self, e: ExprId, fset: &FileSet, errs: &mut Vec<String>) {
        match self.arena.exprs[e] {
            Expr::FuncLit { sig, body, .. } => self.verify_block(body, sig, fset, errs),
            Expr::Call { callee, args, .. } => {
                if let trygo_parser::ast::CallCallee::Expr(c) = callee {
                    self.verify_expr_funclits(c, fset, errs);
                }
                for &a in self.arena.exprs_list(args) {
                    self.verify_expr_funclits(a, fset, errs);
                }
            }
            Expr::Paren { expr, .. } | Expr::Unary { expr, .. } => {
                self.verify_expr_funclits(expr, fset, errs)
            }
            Expr::Binary { left, right, .. } => {
                self.verify_expr_funclits(left, fset, errs);
                self.verify_expr_funclits(right, fset, errs);
            }
            _ => {}
        }
    }
}
