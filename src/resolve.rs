//! Type resolution between pass 1 and pass 2.
//!
//! After try-call elimination the program is ordinary Go, and pass 2
//! needs exactly two pieces of semantic information:
//!
//! 1. for every enclosing function frame that owns a translation point,
//!    the classification of each non-error result type (to synthesize
//!    zero values);
//! 2. for every toplevel-call translation point, the result arity of the
//!    inner call (to know how many blank identifiers absorb the tuple).
//!
//! The resolver answers those pre-seeded queries with Go-shaped signature
//! resolution: universe builtins, package scope, explicitly-typed locals,
//! parameters/results/receivers, and imported packages loaded from source
//! through the build context. It is not a full type checker; anything it
//! cannot resolve for a requested node is a type error. Errors accumulate
//! and unify into a single phase-1 diagnostic.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::debug;

use trygo_parser::ast::*;
use trygo_parser::fileset::FileSet;
use trygo_parser::walk::{Visitor, Walk};
use trygo_parser::{parse_file, printer};

use crate::block::{FuncRef, TransKind, TransPoint};
use crate::buildctx::BuildContext;
use crate::diag::{Result, TranslateError};
use crate::elim::result_types;
use crate::pkg::PkgFile;

/// How the zero value of a type prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroKind {
    /// `false`
    BoolFalse,
    /// `0` (all integer kinds, `byte`, `rune`, `uintptr`)
    IntZero,
    /// `0.0`
    FloatZero,
    /// `0i`
    ImagZero,
    /// `""`
    StrEmpty,
    /// `nil` (slice, pointer, func, interface, map, chan, `error`,
    /// `unsafe.Pointer`)
    Nil,
    /// Composite literal reusing the declared return-type node
    /// (struct, array, named type with struct or array underlying)
    Composite,
}

/// Result-type summary of a resolved callable.
#[derive(Debug, Clone, Copy)]
pub struct SigSummary {
    pub arity: usize,
    pub last_is_error: bool,
}

/// Signature info for one enclosing function frame.
#[derive(Debug, Clone)]
pub struct FrameSig {
    /// One entry per non-error result: classification plus the declared
    /// AST type node (reused for composite zero values).
    pub zeros: Vec<(ZeroKind, TypeId)>,
    /// Total result count, trailing error included.
    pub arity: usize,
}

/// Answers to the pre-seeded queries, read-only to pass 2.
#[derive(Debug, Default)]
pub struct TypeInfo {
    pub frames: HashMap<FuncRef, FrameSig>,
    pub call_arities: HashMap<ExprId, usize>,
}

/// Resolves the pre-seeded queries for one package.
pub fn resolve(
    arena: &AstArena,
    interner: &Interner,
    fset: &FileSet,
    files: &[PkgFile],
    points: &[TransPoint],
    importer: &mut Importer,
) -> Result<TypeInfo> {
    let mut r = Resolver {
        arena,
        interner,
        fset,
        files,
        scope: PkgScope::build(arena, files),
        importer,
        errs: Vec::new(),
    };

    let mut info = TypeInfo::default();

    // Frames first (deduplicated), then toplevel calls.
    let mut seen = HashSet::new();
    for p in points {
        if seen.insert(p.fun) {
            if let Some(sig) = r.frame_sig(p.fun, p.file_idx) {
                info.frames.insert(p.fun, sig);
            }
        }
    }
    for p in points {
        if p.kind == TransKind::ToplevelCall {
            if let Some(arity) = r.call_arity(p.call, p.file_idx, p.fun) {
                info.call_arities.insert(p.call, arity);
            }
        }
    }

    if !r.errs.is_empty() {
        return Err(TranslateError::TypeCheck {
            phase: "phase-1",
            errors: r.errs,
        });
    }

    debug!(
        frames = info.frames.len(),
        calls = info.call_arities.len(),
        "type resolution done"
    );
    Ok(info)
}

/// Re-resolution pass over a rewritten package: the signature of every
/// function (declaration and literal) must still resolve against the
/// translated AST. Failures accumulate and unify the same way phase-1
/// resolution does, under the verification phase name.
pub fn verify_resolution(
    arena: &AstArena,
    interner: &Interner,
    fset: &FileSet,
    files: &[PkgFile],
    importer: &mut Importer,
) -> Result<()> {
    let mut r = Resolver {
        arena,
        interner,
        fset,
        files,
        scope: PkgScope::build(arena, files),
        importer,
        errs: Vec::new(),
    };

    for (file_idx, file) in files.iter().enumerate() {
        for &decl in arena.top_decls(file.ast.decls) {
            if let TopLevelDecl::Func(id) = decl {
                r.frame_sig(FuncRef::Decl(id), file_idx);
            }
        }
        let mut lits = FuncLitCollector { lits: Vec::new() };
        lits.visit_source_file(arena, &file.ast);
        for lit in lits.lits {
            r.frame_sig(FuncRef::Lit(lit), file_idx);
        }
    }

    if !r.errs.is_empty() {
        return Err(TranslateError::TypeCheck {
            phase: "verification after translation",
            errors: r.errs,
        });
    }
    debug!("re-resolution of rewritten package OK");
    Ok(())
}

/// Read-only collector of every function literal in a file.
struct FuncLitCollector {
    lits: Vec<ExprId>,
}

impl<'ast> Visitor<'ast> for FuncLitCollector {
    fn visit_expr(&mut self, a: &'ast AstArena, id: ExprId) {
        if matches!(a.exprs[id], Expr::FuncLit { .. }) {
            self.lits.push(id);
        }
        a.exprs[id].walk(a, self);
    }
}

/// Package-scope declarations, built once per package.
struct PkgScope {
    funcs: HashMap<Symbol, FuncDeclId>,
    methods: HashMap<(Symbol, Symbol), FuncDeclId>,
    types: HashMap<Symbol, TypeId>,
    vars: HashMap<Symbol, TypeId>,
}

impl PkgScope {
    fn build(arena: &AstArena, files: &[PkgFile]) -> Self {
        let mut funcs = HashMap::new();
        let mut methods = HashMap::new();
        let mut types = HashMap::new();
        let mut vars = HashMap::new();

        for file in files {
            for &decl in arena.top_decls(file.ast.decls) {
                match decl {
                    TopLevelDecl::Func(id) => {
                        let f = arena.funcs[id];
                        match f.recv {
                            None => {
                                funcs.insert(f.name.sym, id);
                            }
                            Some(recv) => {
                                if let Some(base) = named_base(arena, recv.typ) {
                                    methods.insert((base, f.name.sym), id);
                                }
                            }
                        }
                    }
                    TopLevelDecl::Decl(id) => {
                        let Decl::Gen(g) = arena.decls[id];
                        for spec in arena.specs_list(g.specs) {
                            match *spec {
                                Spec::Type(ts) => {
                                    types.insert(ts.name.sym, ts.typ);
                                }
                                Spec::Value(vs) => {
                                    if let Some(t) = vs.typ {
                                        for n in arena.ident_names(vs.names) {
                                            vars.insert(n.sym, t);
                                        }
                                    }
                                }
                                Spec::Import(_) => {}
                            }
                        }
                    }
                }
            }
        }

        Self {
            funcs,
            methods,
            types,
            vars,
        }
    }
}

/// Base name of a (possibly pointer / parenthesized) named receiver type.
fn named_base(arena: &AstArena, t: TypeId) -> Option<Symbol> {
    match arena.types[t] {
        Type::Named { pkg: None, name, .. } => Some(name.sym),
        Type::Pointer { elem, .. } | Type::Paren { typ: elem, .. } => named_base(arena, elem),
        _ => None,
    }
}

struct Resolver<'a> {
    arena: &'a AstArena,
    interner: &'a Interner,
    fset: &'a FileSet,
    files: &'a [PkgFile],
    scope: PkgScope,
    importer: &'a mut Importer,
    errs: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn err(&mut self, span: Span, msg: impl Into<String>) {
        let msg = format!("{}: {}", self.fset.position(span), msg.into());
        debug!(error = %msg, "type resolution error");
        self.errs.push(msg);
    }

    fn signature_of(&self, fun: FuncRef) -> SignatureId {
        match fun {
            FuncRef::Decl(id) => self.arena.funcs[id].signature,
            FuncRef::Lit(id) => match self.arena.exprs[id] {
                Expr::FuncLit { sig, .. } => sig,
                _ => unreachable!("function literal frame is not a FuncLit"),
            },
        }
    }

    fn frame_sig(&mut self, fun: FuncRef, file_idx: usize) -> Option<FrameSig> {
        let sig = self.signature_of(fun);
        let rets = result_types(self.arena, sig);
        let arity = rets.len();
        let mut zeros = Vec::with_capacity(arity.saturating_sub(1));
        let mut ok = true;
        for &t in rets.iter().take(arity.saturating_sub(1)) {
            match self.classify(t, file_idx) {
                Ok(kind) => zeros.push((kind, t)),
                Err(msg) => {
                    self.err(self.arena.types.span(t), msg);
                    ok = false;
                }
            }
        }
        ok.then_some(FrameSig { zeros, arity })
    }

    fn classify(&mut self, t: TypeId, file_idx: usize) -> std::result::Result<ZeroKind, String> {
        let imports = file_imports(self.arena, self.interner, &self.files[file_idx].ast);
        classify_type(
            self.arena,
            self.interner,
            &self.scope.types,
            &imports,
            self.importer,
            t,
            0,
        )
    }

    // ---- toplevel-call arity ----

    fn call_arity(&mut self, call: ExprId, file_idx: usize, fun: FuncRef) -> Option<usize> {
        let Expr::Call { callee, .. } = self.arena.exprs[call] else {
            panic!(
                "type information requested for non-call node at {}",
                self.fset.position(self.arena.exprs.span(call))
            );
        };

        let span = self.arena.exprs.span(call);
        let summary = match callee {
            CallCallee::Type(t) => {
                // A conversion yields exactly one value; it satisfies
                // try() only when converting to `error` itself.
                let is_error = matches!(
                    self.arena.types[t],
                    Type::Named { pkg: None, name, .. }
                        if self.interner.resolve(name.sym) == "error"
                );
                Ok(SigSummary {
                    arity: 1,
                    last_is_error: is_error,
                })
            }
            CallCallee::Expr(c) => self.expr_sig(c, file_idx, fun),
        };

        match summary {
            Ok(s) => {
                if !s.last_is_error {
                    self.err(
                        span,
                        format!(
                            "invalid try() call: {} does not return error as last return value",
                            printer::print_expr(call, self.arena, self.interner)
                        ),
                    );
                    return None;
                }
                Some(s.arity)
            }
            Err(msg) => {
                self.err(span, msg);
                None
            }
        }
    }

    fn expr_sig(
        &mut self,
        e: ExprId,
        file_idx: usize,
        fun: FuncRef,
    ) -> std::result::Result<SigSummary, String> {
        match self.arena.exprs[e] {
            Expr::Paren { expr, .. } => self.expr_sig(expr, file_idx, fun),
            Expr::FuncLit { sig, .. } => Ok(self.summary_of(sig)),
            Expr::Ident(name, _) => self.ident_sig(name, fun),
            Expr::Selector { expr, sel, .. } => match self.arena.exprs[expr] {
                Expr::Ident(base, _) => self.selector_sig(base, sel.sym, file_idx, fun),
                _ => Err(format!(
                    "cannot resolve type of call to {}",
                    printer::print_expr(e, self.arena, self.interner)
                )),
            },
            _ => Err(format!(
                "cannot resolve type of call to {}",
                printer::print_expr(e, self.arena, self.interner)
            )),
        }
    }

    fn summary_of(&self, sig: SignatureId) -> SigSummary {
        let rets = result_types(self.arena, sig);
        let last_is_error = rets.last().is_some_and(|&t| {
            matches!(
                self.arena.types[t],
                Type::Named { pkg: None, name, .. }
                    if self.interner.resolve(name.sym) == "error"
            )
        });
        SigSummary {
            arity: rets.len(),
            last_is_error,
        }
    }

    fn ident_sig(&mut self, name: Symbol, fun: FuncRef) -> std::result::Result<SigSummary, String> {
        // Innermost frame: parameters, named results, receiver.
        if let Some(t) = self.frame_binding(name, fun) {
            if let Some(sig) = func_type_sig(self.arena, t) {
                return Ok(self.summary_of(sig));
            }
        }
        // Locals with an explicit func type or a function-literal
        // initializer.
        if let Some(summary) = self.local_func_binding(name, fun) {
            return Ok(summary);
        }
        // Package scope.
        if let Some(&id) = self.scope.funcs.get(&name) {
            return Ok(self.summary_of(self.arena.funcs[id].signature));
        }
        if let Some(&t) = self.scope.vars.get(&name) {
            if let Some(sig) = func_type_sig(self.arena, t) {
                return Ok(self.summary_of(sig));
            }
        }
        Err(format!("undeclared name: {}", self.interner.resolve(name)))
    }

    /// Declared type of `name` among the frame's parameters, results and
    /// receiver.
    fn frame_binding(&self, name: Symbol, fun: FuncRef) -> Option<TypeId> {
        let sig = self.signature_of(fun);
        let s = self.arena.signatures[sig];

        let mut field_lists = vec![s.params];
        if let Some(Results::Params(fl)) = s.results {
            field_lists.push(fl);
        }
        for fl in field_lists {
            for &fid in self.arena.fields_list(fl.fields) {
                let f = self.arena.fields[fid];
                for n in self.arena.ident_names(f.names) {
                    if n.sym == name {
                        return Some(f.typ);
                    }
                }
            }
        }

        if let FuncRef::Decl(id) = fun {
            if let Some(recv) = self.arena.funcs[id].recv {
                if recv.name.is_some_and(|n| n.sym == name) {
                    return Some(recv.typ);
                }
            }
        }
        None
    }

    /// Scans the frame body for `var name func(...)` declarations and
    /// `name := func(...) {...}` bindings.
    fn local_func_binding(&self, name: Symbol, fun: FuncRef) -> Option<SigSummary> {
        let body = match fun {
            FuncRef::Decl(id) => self.arena.funcs[id].body?,
            FuncRef::Lit(id) => match self.arena.exprs[id] {
                Expr::FuncLit { body, .. } => body,
                _ => return None,
            },
        };
        self.scan_block_for_binding(body, name)
    }

    fn scan_block_for_binding(&self, block: BlockId, name: Symbol) -> Option<SigSummary> {
        for &sid in self.arena.stmts_list(self.arena.blocks[block].stmts) {
            match self.arena.stmts[sid] {
                Stmt::Decl(did) => {
                    let Decl::Gen(g) = self.arena.decls[did];
                    if g.kind != GenDeclKind::Var {
                        continue;
                    }
                    for spec in self.arena.specs_list(g.specs) {
                        let Spec::Value(vs) = *spec else { continue };
                        let Some(t) = vs.typ else { continue };
                        let Some(sig) = func_type_sig(self.arena, t) else {
                            continue;
                        };
                        if self.arena.ident_names(vs.names).iter().any(|n| n.sym == name) {
                            return Some(self.summary_of(sig));
                        }
                    }
                }
                Stmt::Simple(simple) => {
                    if let SimpleStmt::ShortVarDecl { names, values, .. } =
                        self.arena.simple_stmts[simple]
                    {
                        let names = self.arena.ident_names(names);
                        let values = self.arena.exprs_list(values);
                        for (i, n) in names.iter().enumerate() {
                            if n.sym != name || i >= values.len() {
                                continue;
                            }
                            if let Expr::FuncLit { sig, .. } = self.arena.exprs[values[i]] {
                                return Some(self.summary_of(sig));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn selector_sig(
        &mut self,
        base: Symbol,
        sel: Symbol,
        file_idx: usize,
        fun: FuncRef,
    ) -> std::result::Result<SigSummary, String> {
        let base_str = self.interner.resolve(base).to_string();
        let sel_str = self.interner.resolve(sel).to_string();

        // Imported package function: pkg.Fn(...)
        let imports = file_imports(self.arena, self.interner, &self.files[file_idx].ast);
        if let Some(path) = match_import(&imports, &base_str, self.importer) {
            let exports = self.importer.load(&path)?;
            return exports
                .funcs
                .get(&sel_str)
                .copied()
                .ok_or_else(|| format!("undefined: {base_str}.{sel_str}"));
        }

        // Method call: receiver is a binding with an explicitly written
        // type.
        let recv_type = self
            .frame_binding(base, fun)
            .or_else(|| self.scope.vars.get(&base).copied());
        let Some(recv_type) = recv_type else {
            return Err(format!("undeclared name: {base_str}"));
        };

        match strip_indirection(self.arena, recv_type) {
            Type::Named { pkg: None, name, .. } => self
                .scope
                .methods
                .get(&(name.sym, sel))
                .map(|&id| self.summary_of(self.arena.funcs[id].signature))
                .ok_or_else(|| {
                    format!(
                        "{}.{sel_str} undefined (no method {sel_str})",
                        self.interner.resolve(name.sym)
                    )
                }),
            Type::Named {
                pkg: Some(p), name, ..
            } => {
                let pkg_str = self.interner.resolve(p.sym).to_string();
                let type_str = self.interner.resolve(name.sym).to_string();
                let Some(path) = match_import(&imports, &pkg_str, self.importer) else {
                    return Err(format!("undeclared name: {pkg_str}"));
                };
                let exports = self.importer.load(&path)?;
                exports
                    .methods
                    .get(&(type_str.clone(), sel_str.clone()))
                    .copied()
                    .ok_or_else(|| {
                        format!("{pkg_str}.{type_str}.{sel_str} undefined (no method {sel_str})")
                    })
            }
            _ => Err(format!(
                "cannot resolve method {sel_str} on {base_str}"
            )),
        }
    }
}

fn func_type_sig(arena: &AstArena, t: TypeId) -> Option<SignatureId> {
    match arena.types[t] {
        Type::Func { sig, .. } => Some(sig),
        Type::Paren { typ, .. } => func_type_sig(arena, typ),
        _ => None,
    }
}

fn strip_indirection(arena: &AstArena, t: TypeId) -> Type {
    match arena.types[t] {
        Type::Pointer { elem, .. } | Type::Paren { typ: elem, .. } => {
            strip_indirection(arena, elem)
        }
        other => other,
    }
}

// =============================================================================
// Type classification (shared with the importer)
// =============================================================================

const MAX_NAMED_DEPTH: usize = 64;

fn builtin_zero(name: &str) -> Option<ZeroKind> {
    Some(match name {
        "bool" => ZeroKind::BoolFalse,
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" => ZeroKind::IntZero,
        // Deliberate collapse of the zero-value table's untyped-rune row:
        // that row exists for *constants*, which never reach this
        // classifier — every path here starts from a declared or exported
        // type name, and the declared types `rune` and `byte` are the
        // integer aliases int32/uint8, zeroing to `0`.
        "byte" | "rune" => ZeroKind::IntZero,
        "float32" | "float64" => ZeroKind::FloatZero,
        "complex64" | "complex128" => ZeroKind::ImagZero,
        "string" => ZeroKind::StrEmpty,
        "error" => ZeroKind::Nil,
        _ => return None,
    })
}

/// Classifies a syntactic type into its zero-value family, resolving
/// named types through the package scope and imported packages.
fn classify_type(
    arena: &AstArena,
    interner: &Interner,
    local_types: &HashMap<Symbol, TypeId>,
    imports: &[FileImport],
    importer: &mut Importer,
    t: TypeId,
    depth: usize,
) -> std::result::Result<ZeroKind, String> {
    if depth > MAX_NAMED_DEPTH {
        return Err("invalid recursive type".to_string());
    }
    match arena.types[t] {
        Type::Paren { typ, .. } => {
            classify_type(arena, interner, local_types, imports, importer, typ, depth + 1)
        }
        Type::Pointer { .. }
        | Type::Slice { .. }
        | Type::Map { .. }
        | Type::Chan { .. }
        | Type::Func { .. }
        | Type::Interface { .. } => Ok(ZeroKind::Nil),
        Type::Struct { .. } | Type::Array { .. } => Ok(ZeroKind::Composite),
        Type::Named { pkg: None, name, .. } => {
            let name_str = interner.resolve(name.sym);
            if let Some(z) = builtin_zero(name_str) {
                return Ok(z);
            }
            let Some(&underlying) = local_types.get(&name.sym) else {
                return Err(format!("undeclared name: {name_str}"));
            };
            // A named type whose underlying type needs a composite
            // literal stays Composite; the declared (named) node is
            // reused by the synthesizer.
            classify_type(
                arena,
                interner,
                local_types,
                imports,
                importer,
                underlying,
                depth + 1,
            )
        }
        Type::Named {
            pkg: Some(p), name, ..
        } => {
            let pkg_str = interner.resolve(p.sym).to_string();
            let name_str = interner.resolve(name.sym).to_string();
            if pkg_str == "unsafe" && name_str == "Pointer" {
                return Ok(ZeroKind::Nil);
            }
            let Some(path) = match_import(imports, &pkg_str, importer) else {
                return Err(format!("undeclared name: {pkg_str}"));
            };
            let exports = importer.load(&path)?;
            exports
                .types
                .get(&name_str)
                .copied()
                .ok_or_else(|| format!("undefined: {pkg_str}.{name_str}"))
        }
    }
}

// =============================================================================
// Imports of a single file
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileImport {
    /// Explicit alias, when one was written.
    pub alias: Option<String>,
    pub path: String,
}

pub fn file_imports(arena: &AstArena, interner: &Interner, file: &SourceFile) -> Vec<FileImport> {
    let mut out = Vec::new();
    for &decl in arena.top_decls(file.decls) {
        let TopLevelDecl::Decl(id) = decl else { continue };
        let Decl::Gen(g) = arena.decls[id];
        if g.kind != GenDeclKind::Import {
            continue;
        }
        for spec in arena.specs_list(g.specs) {
            let Spec::Import(im) = *spec else { continue };
            let raw = interner.resolve(im.path.sym);
            let Some(path) = crate::buildctx::unquote(raw) else {
                continue;
            };
            let alias = match im.name {
                Some(ImportName::Name(n)) => Some(interner.resolve(n.sym).to_string()),
                _ => None,
            };
            out.push(FileImport {
                alias,
                path: path.to_string(),
            });
        }
    }
    out
}

/// Finds the import whose local name is `name`: an explicit alias wins,
/// otherwise the imported package's declared name (loaded on demand).
fn match_import(imports: &[FileImport], name: &str, importer: &mut Importer) -> Option<String> {
    for im in imports {
        if im.alias.as_deref() == Some(name) {
            return Some(im.path.clone());
        }
    }
    for im in imports {
        if im.alias.is_some() {
            continue;
        }
        // Fast path: the last path segment usually names the package.
        if im.path.rsplit('/').next() == Some(name) {
            return Some(im.path.clone());
        }
    }
    for im in imports {
        if im.alias.is_some() {
            continue;
        }
        if let Ok(exports) = importer.load(&im.path) {
            if exports.name == name {
                return Some(im.path.clone());
            }
        }
    }
    None
}

// =============================================================================
// Source importer
// =============================================================================

/// Exported surface of an imported package, reduced to what the resolver
/// asks about.
#[derive(Debug, Default)]
pub struct PkgExports {
    pub name: String,
    pub funcs: HashMap<String, SigSummary>,
    pub methods: HashMap<(String, String), SigSummary>,
    pub types: HashMap<String, ZeroKind>,
}

/// Loads imported packages from source via the build context, with a
/// per-path cache. Mirrors the "source" importer the original pipeline
/// configured.
pub struct Importer {
    ctx: BuildContext,
    cache: HashMap<String, Rc<PkgExports>>,
    loading: Vec<String>,
}

impl Importer {
    pub fn new(ctx: BuildContext) -> Self {
        Self {
            ctx,
            cache: HashMap::new(),
            loading: Vec::new(),
        }
    }

    pub fn load(&mut self, path: &str) -> std::result::Result<Rc<PkgExports>, String> {
        if let Some(hit) = self.cache.get(path) {
            return Ok(Rc::clone(hit));
        }
        if self.loading.iter().any(|p| p == path) {
            return Err(format!("import cycle through {path:?}"));
        }
        self.loading.push(path.to_string());
        let out = self.load_uncached(path);
        self.loading.pop();

        let exports = out?;
        let exports = Rc::new(exports);
        self.cache.insert(path.to_string(), Rc::clone(&exports));
        Ok(exports)
    }

    fn load_uncached(&mut self, path: &str) -> std::result::Result<PkgExports, String> {
        let dir = self.ctx.import(path)?;
        debug!(path, dir = %dir.display(), "loading imported package from source");

        let mut entries: Vec<_> = std::fs::read_dir(&dir)
            .map_err(|e| format!("cannot read package directory {:?}: {e}", dir))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "go")
                    && !p
                        .file_name()
                        .is_some_and(|n| n.to_string_lossy().ends_with("_test.go"))
            })
            .collect();
        entries.sort();
        if entries.is_empty() {
            return Err(format!("no Go source files in {dir:?}"));
        }

        let mut arena = AstArena::new();
        let mut interner = Interner::new();
        let mut fset = FileSet::new();
        let mut files = Vec::new();

        for p in &entries {
            let src = std::fs::read_to_string(p)
                .map_err(|e| format!("cannot read {:?}: {e}", p))?;
            let base = fset.add(p.to_string_lossy().into_owned(), &src);
            let ast = parse_file(&src, base, &mut arena, &mut interner)
                .map_err(|d| format!("{}: {}", fset.position(d.span), d.message))?;
            files.push(ast);
        }

        let mut exports = PkgExports {
            name: interner.resolve(files[0].name.sym).to_string(),
            ..Default::default()
        };

        // Scope of the imported package itself.
        let mut local_types: HashMap<Symbol, TypeId> = HashMap::new();
        for file in &files {
            for &decl in arena.top_decls(file.decls) {
                let TopLevelDecl::Decl(id) = decl else { continue };
                let Decl::Gen(g) = arena.decls[id];
                for spec in arena.specs_list(g.specs) {
                    if let Spec::Type(ts) = *spec {
                        local_types.insert(ts.name.sym, ts.typ);
                    }
                }
            }
        }

        for file in &files {
            let imports = file_imports(&arena, &interner, file);
            for &decl in arena.top_decls(file.decls) {
                match decl {
                    TopLevelDecl::Func(id) => {
                        let f = arena.funcs[id];
                        let summary = remote_summary(&arena, &interner, f.signature);
                        let name = interner.resolve(f.name.sym).to_string();
                        match f.recv {
                            None => {
                                exports.funcs.insert(name, summary);
                            }
                            Some(recv) => {
                                if let Some(base) = named_base(&arena, recv.typ) {
                                    let base = interner.resolve(base).to_string();
                                    exports.methods.insert((base, name), summary);
                                }
                            }
                        }
                    }
                    TopLevelDecl::Decl(id) => {
                        let Decl::Gen(g) = arena.decls[id];
                        for spec in arena.specs_list(g.specs) {
                            let Spec::Type(ts) = *spec else { continue };
                            let kind = classify_type(
                                &arena,
                                &interner,
                                &local_types,
                                &imports,
                                self,
                                ts.typ,
                                0,
                            )?;
                            exports
                                .types
                                .insert(interner.resolve(ts.name.sym).to_string(), kind);
                        }
                    }
                }
            }
        }

        Ok(exports)
    }
}

fn remote_summary(arena: &AstArena, interner: &Interner, sig: SignatureId) -> SigSummary {
    let rets = result_types(arena, sig);
    let last_is_error = rets.last().is_some_and(|&t| {
        matches!(
            arena.types[t],
            Type::Named { pkg: None, name, .. } if interner.resolve(name.sym) == "error"
        )
    });
    SigSummary {
        arity: rets.len(),
        last_is_error,
    }
}
