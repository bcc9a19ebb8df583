//! Pass 1: try-call elimination.
//!
//! Eliminates every `try()` call so that the rewritten program type-checks:
//!
//! ```text
//! x := try(f())  ->  x, _ := f()
//! x = try(f())   ->  x, _ = f()
//! try(f())       ->  f()            (recorded, rewritten fully in pass 2)
//! ```
//!
//! Each elimination records a translation point in the block tree for
//! pass 2. The walk is hand-rolled (not the read-only visitor) because it
//! mutates the arena as it goes; the read-only visitor drives the final
//! sweep that reports any `try()` left in an unsupported position.

use tracing::debug;

use trygo_parser::ast::*;
use trygo_parser::fileset::FileSet;
use trygo_parser::printer;
use trygo_parser::walk::{Visitor, Walk};

use crate::block::{BlockNodeId, BlockTree, FuncRef, TransKind, TransPoint, TransTarget};
use crate::diag::{Result, TranslateError};

/// Stack of nodes the walker is currently inside. Mirrors the traversal;
/// an unbalanced stack at exit is a walker bug.
#[derive(Debug)]
pub struct NodeStack<T>(Vec<T>);

impl<T: Copy + std::fmt::Debug> NodeStack<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, n: T) {
        self.0.push(n);
    }

    pub fn pop(&mut self) -> T {
        self.0.pop().expect("popped an empty AST node stack")
    }

    pub fn top(&self) -> Option<T> {
        self.0.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn assert_empty(&self, for_what: &str) {
        if !self.0.is_empty() {
            panic!("AST node stack for {for_what} is not fully popped: {:?}", self.0);
        }
    }
}

/// Coarse parent classification, kept for traversal sanity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParentKind {
    Func,
    Block,
    Stmt,
}

pub struct TryCallElimination<'a> {
    arena: &'a mut AstArena,
    interner: &'a mut Interner,
    fset: &'a FileSet,
    pkg_name: String,
    pub tree: BlockTree,
    current: Option<BlockNodeId>,
    blk_index: usize,
    file_idx: usize,
    funcs: NodeStack<FuncRef>,
    parents: NodeStack<ParentKind>,
    pub num_trans: usize,
    /// Files that received at least one elimination.
    pub dirty_files: Vec<usize>,
    sym_try: Symbol,
    sym_error: Symbol,
    sym_blank: Symbol,
}

impl<'a> TryCallElimination<'a> {
    pub fn new(
        arena: &'a mut AstArena,
        interner: &'a mut Interner,
        fset: &'a FileSet,
        pkg_name: &str,
    ) -> Self {
        let sym_try = interner.intern("try");
        let sym_error = interner.intern("error");
        let sym_blank = interner.intern("_");
        Self {
            arena,
            interner,
            fset,
            pkg_name: pkg_name.to_string(),
            tree: BlockTree::new(),
            current: None,
            blk_index: 0,
            file_idx: 0,
            funcs: NodeStack::new(),
            parents: NodeStack::new(),
            num_trans: 0,
            dirty_files: Vec::new(),
            sym_try,
            sym_error,
            sym_blank,
        }
    }

    /// Walks one file of the package.
    pub fn run_file(&mut self, file_idx: usize, file: &SourceFile) -> Result<()> {
        debug!(file = file_idx, "phase-1 try() elimination");
        self.file_idx = file_idx;
        for &decl in self.arena.top_decls(file.decls).to_vec().iter() {
            match decl {
                TopLevelDecl::Func(id) => self.visit_func_decl(id)?,
                TopLevelDecl::Decl(id) => self.visit_decl(id)?,
            }
        }
        Ok(())
    }

    /// Traversal post-condition; an unbalanced walk is a bug, not input
    /// error.
    pub fn assert_post_condition(&self) {
        self.parents.assert_empty("parents");
        self.funcs.assert_empty("funcs");
        if self.current.is_some() {
            panic!("current block is not empty after walking package: {:?}", self.current);
        }
    }

    fn err_at(&self, span: Span, msg: impl Into<String>) -> TranslateError {
        let err = TranslateError::at(self.fset.position(span), &self.pkg_name, msg);
        debug!(error = %err, "phase-1 error");
        err
    }

    // ---- declarations ----

    fn visit_func_decl(&mut self, id: FuncDeclId) -> Result<()> {
        let f = self.arena.funcs[id];
        debug!(func = self.interner.resolve(f.name.sym), "start function");
        self.funcs.push(FuncRef::Decl(id));
        self.parents.push(ParentKind::Func);
        if let Some(body) = f.body {
            self.enter_block(StmtListOwner::Block(body))?;
        }
        self.parents.pop();
        self.funcs.pop();
        Ok(())
    }

    fn visit_decl(&mut self, id: DeclId) -> Result<()> {
        let Decl::Gen(g) = self.arena.decls[id];
        match g.kind {
            GenDeclKind::Var | GenDeclKind::Const => {
                for i in 0..g.specs.len() {
                    let idx = SpecIdx(g.specs.start() + i);
                    self.visit_value_spec(idx, g.kind)?;
                }
            }
            GenDeclKind::Import | GenDeclKind::Type => {}
        }
        Ok(())
    }

    fn visit_value_spec(&mut self, idx: SpecIdx, kind: GenDeclKind) -> Result<()> {
        let Spec::Value(vs) = *self.arena.spec(idx) else {
            return Ok(());
        };

        if vs.values.len() == 1 {
            let value = self.arena.exprs_list(vs.values)[0];
            if let Some(inner) = self.check_maybe_try_call(value)? {
                if kind == GenDeclKind::Const {
                    return Err(self.err_at(
                        self.arena.exprs.span(value),
                        "try() cannot be used in const declaration since it is not a constant expression",
                    ));
                }
                self.squash(value, inner);
                self.record_point(TransKind::ValueSpec, TransTarget::Spec(idx), value);

                // Keep the arity: var $names, _ = f(...)
                let blank = IdentName {
                    sym: self.sym_blank,
                    pos: Span::at(self.arena.exprs.span(value).start),
                };
                let names = self.arena.append_ident_name(vs.names, blank);
                if let Spec::Value(vs) = self.arena.spec_mut(idx) {
                    vs.names = names;
                }
                debug!("value spec translated");
            }
        } else {
            // Multiple RHS values never produce multiple returns; nothing
            // to translate here.
            debug!("value spec skipped due to multiple RHS values");
        }

        for &v in self.arena.exprs_list(vs.values).to_vec().iter() {
            self.visit_expr(v)?;
        }
        if let Some(t) = vs.typ {
            self.visit_type(t)?;
        }
        Ok(())
    }

    // ---- block traversal ----

    fn enter_block(&mut self, owner: StmtListOwner) -> Result<()> {
        let node = self.tree.push_block(owner, self.current);
        let prev_current = self.current;
        let prev_index = self.blk_index;
        self.current = Some(node);
        self.parents.push(ParentKind::Block);

        let stmts = self.arena.stmt_list_of(owner);
        for (i, &stmt) in self.arena.stmts_list(stmts).to_vec().iter().enumerate() {
            self.blk_index = i;
            self.visit_block_stmt(stmt)?;
        }

        self.parents.pop();
        self.current = prev_current;
        self.blk_index = prev_index;
        Ok(())
    }

    /// Statement at the immediate level of a block-like node; the only
    /// positions where assignments and toplevel calls are translated.
    fn visit_block_stmt(&mut self, id: StmtId) -> Result<()> {
        match self.arena.stmts[id] {
            Stmt::Simple(sid) => match self.arena.simple_stmts[sid] {
                SimpleStmt::Expr(e) => self.visit_toplevel_expr(id, e),
                SimpleStmt::Assign { .. } | SimpleStmt::ShortVarDecl { .. } => {
                    self.visit_assign(sid)
                }
                _ => self.visit_simple_exprs(sid),
            },
            Stmt::Decl(did) => self.visit_decl(did),
            _ => self.visit_stmt_generic(id),
        }
    }

    fn visit_assign(&mut self, sid: SimpleStmtId) -> Result<()> {
        let stmt = self.arena.simple_stmts[sid];
        let (values, op) = match stmt {
            SimpleStmt::ShortVarDecl { values, .. } => (values, None),
            SimpleStmt::Assign { rhs, op, .. } => (rhs, Some(op)),
            _ => unreachable!("visit_assign on non-assignment"),
        };

        if values.len() == 1 {
            let value = self.arena.exprs_list(values)[0];
            if let Some(inner) = self.check_maybe_try_call(value)? {
                if let Some(op) = op {
                    if op != AssignOp::Assign {
                        return Err(self.err_at(
                            self.arena.simple_stmts.span(sid),
                            format!(
                                "try() can only be used with = and :=, but found {}. Note that compound assignments such as += are not supported",
                                op.as_str()
                            ),
                        ));
                    }
                }

                self.squash(value, inner);
                self.record_point(TransKind::Assign, TransTarget::Assign(sid), value);

                // Keep the arity: $lhs, _ := f(...) / $lhs, _ = f(...)
                let pos = Span::at(self.arena.simple_stmts.span(sid).start);
                match self.arena.simple_stmts[sid] {
                    SimpleStmt::ShortVarDecl { names, .. } => {
                        let blank = IdentName {
                            sym: self.sym_blank,
                            pos,
                        };
                        let grown = self.arena.append_ident_name(names, blank);
                        if let SimpleStmt::ShortVarDecl { names, .. } =
                            self.arena.simple_stmts.get_mut(sid)
                        {
                            *names = grown;
                        }
                    }
                    SimpleStmt::Assign { lhs, .. } => {
                        let blank = self.arena.exprs.alloc(Expr::Ident(self.sym_blank, pos), pos);
                        let grown = self.arena.append_expr(lhs, blank);
                        if let SimpleStmt::Assign { lhs, .. } = self.arena.simple_stmts.get_mut(sid)
                        {
                            *lhs = grown;
                        }
                    }
                    _ => unreachable!(),
                }
                debug!("assignment translated");
            }
        } else {
            debug!("assignment skipped due to multiple RHS values");
        }

        self.visit_simple_exprs(sid)
    }

    fn visit_toplevel_expr(&mut self, stmt: StmtId, expr: ExprId) -> Result<()> {
        if let Some(inner) = self.check_maybe_try_call(expr)? {
            self.squash(expr, inner);
            self.record_point(TransKind::ToplevelCall, TransTarget::ExprStmt(stmt), expr);
            debug!("toplevel call translated");
        }
        // Visit the (possibly squashed) expression for function literals
        // in argument position; leftover try() calls are reported by the
        // post-pass sweep.
        self.visit_expr(expr)
    }

    // ---- try() validation & elimination ----

    /// When `expr` is a well-formed `try(f(...))`, returns the inner call.
    /// A non-`try` expression returns None; a malformed `try` aborts.
    fn check_maybe_try_call(&self, expr: ExprId) -> Result<Option<ExprId>> {
        match check_try_call(
            self.arena,
            self.interner,
            self.sym_try,
            self.sym_error,
            self.enclosing_signature(),
            expr,
        ) {
            Ok(inner) => {
                if inner.is_some() {
                    debug!("try() found");
                }
                Ok(inner)
            }
            Err(TryCallError::NotInFunction(span)) => {
                Err(self.err_at(span, "try() function is used outside function"))
            }
            Err(TryCallError::Other(span, msg)) => Err(self.err_at(span, msg)),
        }
    }

    fn enclosing_signature(&self) -> Option<SignatureId> {
        self.funcs.top().map(|f| match f {
            FuncRef::Decl(id) => self.arena.funcs[id].signature,
            FuncRef::Lit(id) => match self.arena.exprs[id] {
                Expr::FuncLit { sig, .. } => sig,
                _ => unreachable!("function literal frame is not a FuncLit"),
            },
        })
    }

    /// Squash `try(f(...))` into `f(...)` in place; references to the
    /// outer call now see the inner one.
    fn squash(&mut self, try_call: ExprId, inner: ExprId) {
        self.arena.exprs[try_call] = self.arena.exprs[inner];
    }

    fn record_point(&mut self, kind: TransKind, target: TransTarget, call: ExprId) {
        let current = self
            .current
            .expect("translation point recorded outside any block");
        let point = TransPoint {
            kind,
            target,
            call,
            fun: self.funcs.top().expect("translation point outside function"),
            block_index: self.blk_index,
            file_idx: self.file_idx,
            pos: self.arena.exprs.span(call),
        };
        self.tree.node_mut(current).trans_points.push(point);
        self.num_trans += 1;
        if !self.dirty_files.contains(&self.file_idx) {
            self.dirty_files.push(self.file_idx);
        }
        debug!(kind = %kind, index = self.blk_index, "new translation point");
    }

    // ---- generic descent ----

    fn visit_stmt_generic(&mut self, id: StmtId) -> Result<()> {
        self.parents.push(ParentKind::Stmt);
        let out = self.visit_stmt_generic_inner(id);
        self.parents.pop();
        out
    }

    fn visit_stmt_generic_inner(&mut self, id: StmtId) -> Result<()> {
        match self.arena.stmts[id] {
            Stmt::Simple(sid) => self.visit_simple_exprs(sid),
            Stmt::Decl(did) => self.visit_decl(did),
            Stmt::Labeled { stmt, .. } => self.visit_stmt_generic(stmt),
            Stmt::Go { call, .. } | Stmt::Defer { call, .. } => self.visit_expr(call),
            Stmt::Return { results, .. } => {
                for &e in self.arena.exprs_list(results).to_vec().iter() {
                    self.visit_expr(e)?;
                }
                Ok(())
            }
            Stmt::Branch(_) => Ok(()),
            Stmt::Block(b) => self.enter_block(StmtListOwner::Block(b)),
            Stmt::If {
                init,
                cond,
                then_block,
                else_stmt,
                ..
            } => {
                if let Some(init) = init {
                    self.visit_simple_exprs(init)?;
                }
                self.visit_expr(cond)?;
                self.enter_block(StmtListOwner::Block(then_block))?;
                if let Some(e) = else_stmt {
                    self.visit_stmt_generic(e)?;
                }
                Ok(())
            }
            Stmt::For { kind, body, .. } => {
                match kind {
                    ForKind::Infinite => {}
                    ForKind::Cond(c) => self.visit_expr(c)?,
                    ForKind::ForClause { init, cond, post } => {
                        if let Some(i) = init {
                            self.visit_simple_exprs(i)?;
                        }
                        if let Some(c) = cond {
                            self.visit_expr(c)?;
                        }
                        if let Some(p) = post {
                            self.visit_simple_exprs(p)?;
                        }
                    }
                    ForKind::Range { lhs, expr, .. } => {
                        if let Some(RangeLhs::Assign { exprs, .. }) = lhs {
                            for &e in self.arena.exprs_list(exprs).to_vec().iter() {
                                self.visit_expr(e)?;
                            }
                        }
                        self.visit_expr(expr)?;
                    }
                }
                self.enter_block(StmtListOwner::Block(body))
            }
            Stmt::Switch {
                init,
                tag,
                clauses,
                ..
            } => {
                if let Some(i) = init {
                    self.visit_simple_exprs(i)?;
                }
                if let Some(t) = tag {
                    self.visit_expr(t)?;
                }
                for &cid in self.arena.switch_clause_ids(clauses).to_vec().iter() {
                    if let SwitchClause::ExprCase { items, .. } = self.arena.switch_clauses[cid] {
                        for &e in self.arena.exprs_list(items).to_vec().iter() {
                            self.visit_expr(e)?;
                        }
                    }
                    self.enter_block(StmtListOwner::SwitchClause(cid))?;
                }
                Ok(())
            }
            Stmt::TypeSwitch {
                init,
                guard,
                clauses,
                ..
            } => {
                if let Some(i) = init {
                    self.visit_simple_exprs(i)?;
                }
                self.visit_expr(guard.x)?;
                for &cid in self.arena.switch_clause_ids(clauses).to_vec().iter() {
                    self.enter_block(StmtListOwner::SwitchClause(cid))?;
                }
                Ok(())
            }
            Stmt::Select { clauses, .. } => {
                for &cid in self.arena.comm_clause_ids(clauses).to_vec().iter() {
                    if let CommClause::Case { comm, .. } = self.arena.comm_clauses[cid] {
                        match comm {
                            CommStmt::Send { chan, value, .. } => {
                                self.visit_expr(chan)?;
                                self.visit_expr(value)?;
                            }
                            CommStmt::Recv { lhs, expr } => {
                                if let Some(RangeLhs::Assign { exprs, .. }) = lhs {
                                    for &e in self.arena.exprs_list(exprs).to_vec().iter() {
                                        self.visit_expr(e)?;
                                    }
                                }
                                self.visit_expr(expr)?;
                            }
                        }
                    }
                    self.enter_block(StmtListOwner::CommClause(cid))?;
                }
                Ok(())
            }
        }
    }

    fn visit_simple_exprs(&mut self, sid: SimpleStmtId) -> Result<()> {
        match self.arena.simple_stmts[sid] {
            SimpleStmt::Empty(_) => Ok(()),
            SimpleStmt::Expr(e) => self.visit_expr(e),
            SimpleStmt::Send { chan, value, .. } => {
                self.visit_expr(chan)?;
                self.visit_expr(value)
            }
            SimpleStmt::IncDec { expr, .. } => self.visit_expr(expr),
            SimpleStmt::Assign { lhs, rhs, .. } => {
                for &e in self.arena.exprs_list(lhs).to_vec().iter() {
                    self.visit_expr(e)?;
                }
                for &e in self.arena.exprs_list(rhs).to_vec().iter() {
                    self.visit_expr(e)?;
                }
                Ok(())
            }
            SimpleStmt::ShortVarDecl { values, .. } => {
                for &e in self.arena.exprs_list(values).to_vec().iter() {
                    self.visit_expr(e)?;
                }
                Ok(())
            }
        }
    }

    fn visit_expr(&mut self, id: ExprId) -> Result<()> {
        match self.arena.exprs[id] {
            Expr::Ident(..) | Expr::BasicLit(_) => Ok(()),
            Expr::FuncLit { body, .. } => {
                debug!("start function literal");
                self.funcs.push(FuncRef::Lit(id));
                self.parents.push(ParentKind::Func);
                let out = self.enter_block(StmtListOwner::Block(body));
                self.parents.pop();
                self.funcs.pop();
                debug!("end function literal");
                out
            }
            Expr::CompositeLit { typ, lit } => {
                self.visit_type(typ)?;
                self.visit_literal_value(&lit)
            }
            Expr::Index { expr, index, .. } => {
                self.visit_expr(expr)?;
                self.visit_expr(index)
            }
            Expr::Paren { expr, .. } => self.visit_expr(expr),
            Expr::Selector { expr, .. } => self.visit_expr(expr),
            Expr::Slice {
                expr, lo, hi, max, ..
            } => {
                self.visit_expr(expr)?;
                for e in [lo, hi, max].into_iter().flatten() {
                    self.visit_expr(e)?;
                }
                Ok(())
            }
            Expr::TypeAssert { expr, typ, .. } => {
                self.visit_expr(expr)?;
                if let Some(t) = typ {
                    self.visit_type(t)?;
                }
                Ok(())
            }
            Expr::Call { callee, args, .. } => {
                if let CallCallee::Expr(c) = callee {
                    self.visit_expr(c)?;
                }
                for &a in self.arena.exprs_list(args).to_vec().iter() {
                    self.visit_expr(a)?;
                }
                Ok(())
            }
            Expr::Unary { expr, .. } => self.visit_expr(expr),
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left)?;
                self.visit_expr(right)
            }
        }
    }

    fn visit_literal_value(&mut self, lit: &LiteralValue) -> Result<()> {
        for elem in self.arena.keyed_elems_list(lit.elements).to_vec().iter() {
            if let Some(Key::Expr(e)) = elem.key {
                self.visit_expr(e)?;
            }
            if let Some(Key::Literal(l)) = elem.key {
                self.visit_literal_value(&l)?;
            }
            match elem.value {
                Element::Expr(e) => self.visit_expr(e)?,
                Element::Literal(l) => self.visit_literal_value(&l)?,
            }
        }
        Ok(())
    }

    /// Array lengths are the only expressions nested inside types.
    fn visit_type(&mut self, id: TypeId) -> Result<()> {
        match self.arena.types[id] {
            Type::Array { len, elem, .. } => {
                if let ArrayLen::Expr(e) = len {
                    self.visit_expr(e)?;
                }
                self.visit_type(elem)
            }
            Type::Pointer { elem, .. }
            | Type::Slice { elem, .. }
            | Type::Chan { elem, .. }
            | Type::Paren { typ: elem, .. } => self.visit_type(elem),
            Type::Map { key, val, .. } => {
                self.visit_type(key)?;
                self.visit_type(val)
            }
            Type::Struct { fields, .. } => {
                for &fid in self.arena.fields_list(fields).to_vec().iter() {
                    let f = self.arena.fields[fid];
                    self.visit_type(f.typ)?;
                }
                Ok(())
            }
            Type::Named { .. } | Type::Interface { .. } | Type::Func { .. } => Ok(()),
        }
    }
}

// =============================================================================
// Shared try() call validation
// =============================================================================

pub enum TryCallError {
    NotInFunction(Span),
    Other(Span, String),
}

/// Checks whether `expr` is a `try(...)` call and validates it. `Ok(None)`
/// means "not a try call at all"; `Ok(Some(inner))` is a well-formed call
/// with its inner function call.
pub fn check_try_call(
    arena: &AstArena,
    interner: &Interner,
    sym_try: Symbol,
    sym_error: Symbol,
    enclosing: Option<SignatureId>,
    expr: ExprId,
) -> std::result::Result<Option<ExprId>, TryCallError> {
    let Expr::Call {
        callee: CallCallee::Expr(callee),
        type_arg,
        args,
        ..
    } = arena.exprs[expr]
    else {
        return Ok(None);
    };
    let Expr::Ident(name, _) = arena.exprs[callee] else {
        return Ok(None);
    };
    if name != sym_try {
        return Ok(None);
    }

    let span = arena.exprs.span(expr);
    let argc = args.len() as usize + usize::from(type_arg.is_some());
    if argc != 1 {
        return Err(TryCallError::Other(
            span,
            format!("try() should take 1 argument but {argc} arguments passed"),
        ));
    }
    if type_arg.is_some() {
        return Err(TryCallError::Other(
            span,
            "try() call's argument must be function call but found a type".to_string(),
        ));
    }
    let arg = arena.exprs_list(args)[0];
    if !matches!(arena.exprs[arg], Expr::Call { .. }) {
        return Err(TryCallError::Other(
            span,
            format!(
                "try() call's argument must be function call but found {}",
                describe_expr(&arena.exprs[arg])
            ),
        ));
    }

    let Some(sig) = enclosing else {
        return Err(TryCallError::NotInFunction(span));
    };

    let rets = result_types(arena, sig);
    if rets.is_empty() {
        return Err(TryCallError::Other(
            span,
            "The function returns nothing. try() is not available".to_string(),
        ));
    }
    let last = *rets.last().unwrap();
    let is_error = matches!(
        arena.types[last],
        Type::Named { pkg: None, name, .. } if name.sym == sym_error
    );
    if !is_error {
        return Err(TryCallError::Other(
            span,
            format!(
                "The function does not return error as last return value. Last return type is \"{}\"",
                printer::print_type(last, arena, interner)
            ),
        ));
    }

    Ok(Some(arg))
}

/// Flattened result types of a signature, one entry per returned value.
pub fn result_types(arena: &AstArena, sig: SignatureId) -> Vec<TypeId> {
    let s = arena.signatures[sig];
    match s.results {
        None => Vec::new(),
        Some(Results::Type(t)) => vec![t],
        Some(Results::Params(fl)) => {
            let mut out = Vec::new();
            for &fid in arena.fields_list(fl.fields) {
                let f = arena.fields[fid];
                let n = f.names.len().max(1);
                for _ in 0..n {
                    out.push(f.typ);
                }
            }
            out
        }
    }
}

fn describe_expr(e: &Expr) -> &'static str {
    match e {
        Expr::Ident(..) => "an identifier",
        Expr::BasicLit(_) => "a literal",
        Expr::FuncLit { .. } => "a function literal",
        Expr::CompositeLit { .. } => "a composite literal",
        Expr::Index { .. } => "an index expression",
        Expr::Paren { .. } => "a parenthesized expression",
        Expr::Selector { .. } => "a selector expression",
        Expr::Slice { .. } => "a slice expression",
        Expr::TypeAssert { .. } => "a type assertion",
        Expr::Call { .. } => "a call expression",
        Expr::Unary { .. } => "a unary expression",
        Expr::Binary { .. } => "a binary expression",
    }
}

// =============================================================================
// Leftover try() sweep (read-only visitor)
// =============================================================================

/// After pass 1 every translated `try` has been squashed away; any call
/// to `try` still present sits in an unsupported expression position (or
/// is malformed) and must be reported.
pub struct LeftoverTrySweep<'i> {
    interner: &'i Interner,
    sym_try: Symbol,
    sym_error: Symbol,
    sigs: Vec<SignatureId>,
    pub first: Option<(Span, String)>,
}

impl<'i> LeftoverTrySweep<'i> {
    pub fn new(interner: &'i Interner) -> Option<Self> {
        // If "try" was never interned the package cannot contain one.
        let sym_try = interner.get("try")?;
        // "error" may legitimately be absent; an unmatchable symbol makes
        // every last-return comparison fail, which is the right answer.
        let sym_error = interner
            .get("error")
            .unwrap_or(Symbol::from_raw(u32::MAX));
        Some(Self {
            interner,
            sym_try,
            sym_error,
            sigs: Vec::new(),
            first: None,
        })
    }

    pub fn run(mut self, arena: &AstArena, file: &SourceFile) -> Option<(Span, String)> {
        self.visit_source_file(arena, file);
        self.first
    }
}

impl<'ast, 'i> Visitor<'ast> for LeftoverTrySweep<'i> {
    fn visit_func_decl(&mut self, a: &'ast AstArena, id: FuncDeclId) {
        if self.first.is_some() {
            return;
        }
        self.sigs.push(a.funcs[id].signature);
        a.funcs[id].walk(a, self);
        self.sigs.pop();
    }

    fn visit_expr(&mut self, a: &'ast AstArena, id: ExprId) {
        if self.first.is_some() {
            return;
        }
        if let Expr::FuncLit { sig, .. } = a.exprs[id] {
            self.sigs.push(sig);
            a.exprs[id].walk(a, self);
            self.sigs.pop();
            return;
        }

        match check_try_call(
            a,
            self.interner,
            self.sym_try,
            self.sym_error,
            self.sigs.last().copied(),
            id,
        ) {
            Ok(None) => {}
            Ok(Some(_)) => {
                self.first = Some((
                    a.exprs.span(id),
                    "try() call was not translated. Only try() calls at toplevel call expression, assignments (= or :=), value spec (var or const) are translated".to_string(),
                ));
                return;
            }
            Err(TryCallError::NotInFunction(span)) => {
                self.first = Some((span, "try() function is used outside function".to_string()));
                return;
            }
            Err(TryCallError::Other(span, msg)) => {
                self.first = Some((span, msg));
                return;
            }
        }

        a.exprs[id].walk(a, self);
    }
}
