//! Pass 2: `if err != nil` check insertion.
//!
//! Consumes the block tree and the resolved type information, replacing
//! each phase-1 placeholder with a fresh error identifier and splicing a
//! guard after the host statement:
//!
//! ```text
//! var $vals, _ = f(...)   ->  var $vals, _err0 = f(...)
//!                             if _err0 != nil { return $zeros, _err0 }
//!
//! $vals, _ := f(...)      ->  $vals, _err0 := f(...)
//!                             if _err0 != nil { return $zeros, _err0 }
//!
//! $vals, _ = f(...)       ->  var _err0 error
//!                             $vals, _err0 = f(...)
//!                             if _err0 != nil { return $zeros, _err0 }
//!
//! f(...)                  ->  if $blanks, err := f(...); err != nil {
//!                                 return $zeros, err
//!                             }
//! ```
//!
//! Because every transform inserts or removes statements, a per-block
//! insertion offset corrects discovery-time indices; the `_errN` counter
//! also resets per block so generated names stay short and collision-free
//! within their lexical scope.

use tracing::debug;

use trygo_parser::ast::*;
use trygo_parser::fileset::FileSet;

use crate::block::{BlockNodeId, BlockTree, FuncRef, TransKind, TransPoint, TransTarget};
use crate::diag::{Result, TranslateError};
use crate::resolve::{FrameSig, TypeInfo, ZeroKind};

pub struct NilCheckInsertion<'a> {
    arena: &'a mut AstArena,
    interner: &'a mut Interner,
    fset: &'a FileSet,
    pkg_name: String,
    type_info: &'a TypeInfo,
    owner: Option<StmtListOwner>,
    offset: isize,
    var_id: usize,
}

impl<'a> NilCheckInsertion<'a> {
    pub fn new(
        arena: &'a mut AstArena,
        interner: &'a mut Interner,
        fset: &'a FileSet,
        pkg_name: &str,
        type_info: &'a TypeInfo,
    ) -> Self {
        Self {
            arena,
            interner,
            fset,
            pkg_name: pkg_name.to_string(),
            type_info,
            owner: None,
            offset: 0,
            var_id: 0,
        }
    }

    /// Applies every translation point in the tree, parents before
    /// children.
    pub fn translate(&mut self, tree: &BlockTree) -> Result<()> {
        for &root in &tree.roots {
            self.block(tree, root)?;
        }
        Ok(())
    }

    fn block(&mut self, tree: &BlockTree, id: BlockNodeId) -> Result<()> {
        let node = tree.node(id);
        self.owner = Some(node.owner);
        self.offset = 0;
        self.var_id = 0;

        debug!(points = node.trans_points.len(), "nil check insertion for block");
        for point in &node.trans_points {
            self.insert_nil_check(point)?;
        }

        for &child in &node.children {
            self.block(tree, child)?;
        }
        Ok(())
    }

    fn insert_nil_check(&mut self, point: &TransPoint) -> Result<()> {
        debug!(kind = %point.kind, pos = %self.fset.position(point.pos), "insert if err != nil check");
        match point.kind {
            TransKind::ValueSpec => self.trans_value_spec(point),
            TransKind::Assign => self.trans_assign(point),
            TransKind::ToplevelCall => self.trans_toplevel_call(point),
        }
    }

    // ---- identifier generation ----

    fn gen_err_ident(&mut self, pos: Span) -> IdentName {
        let name = format!("_err{}", self.var_id);
        self.var_id += 1;
        IdentName {
            sym: self.interner.intern(&name),
            pos,
        }
    }

    fn ident_expr(&mut self, name: &str, pos: Span) -> ExprId {
        let sym = self.interner.intern(name);
        self.arena.exprs.alloc(Expr::Ident(sym, pos), pos)
    }

    // ---- statement splicing ----

    /// Inserts `stmt` before position `idx` of the current block,
    /// adjusted by the running offset of earlier splices.
    fn insert_stmt_at(&mut self, idx: usize, stmt: StmtId) {
        let owner = self.owner.expect("splice outside any block");
        let list = self.arena.stmt_list_of(owner);
        let prev = self.arena.stmts_list(list).to_vec();
        let at = (idx as isize + self.offset) as usize;
        let mut next = Vec::with_capacity(prev.len() + 1);
        next.extend_from_slice(&prev[..at]);
        next.push(stmt);
        next.extend_from_slice(&prev[at..]);
        let next = self.arena.list_stmts(next);
        self.arena.set_stmt_list_of(owner, next);
        self.offset += 1;
    }

    fn remove_stmt_at(&mut self, idx: usize) {
        let owner = self.owner.expect("splice outside any block");
        let list = self.arena.stmt_list_of(owner);
        let prev = self.arena.stmts_list(list).to_vec();
        let at = (idx as isize + self.offset) as usize;
        let mut next = Vec::with_capacity(prev.len() - 1);
        next.extend_from_slice(&prev[..at]);
        next.extend_from_slice(&prev[at + 1..]);
        let next = self.arena.list_stmts(next);
        self.arena.set_stmt_list_of(owner, next);
        self.offset -= 1;
    }

    // ---- zero values ----

    fn zero_value_of(&mut self, kind: ZeroKind, type_node: TypeId, pos: Span) -> ExprId {
        let lit = |p: &mut Self, kind: BasicLitKind, text: &str| {
            let sym = p.interner.intern(text);
            p.arena
                .exprs
                .alloc(Expr::BasicLit(BasicLit { kind, sym, pos }), pos)
        };
        match kind {
            ZeroKind::BoolFalse => self.ident_expr("false", pos),
            ZeroKind::IntZero => lit(self, BasicLitKind::Int, "0"),
            ZeroKind::FloatZero => lit(self, BasicLitKind::Float, "0.0"),
            ZeroKind::ImagZero => lit(self, BasicLitKind::Imag, "0i"),
            ZeroKind::StrEmpty => lit(self, BasicLitKind::String, "\"\""),
            ZeroKind::Nil => self.ident_expr("nil", pos),
            ZeroKind::Composite => {
                // Reuse the declared return-type node; rebuilding syntax
                // from resolved types would need a full type-to-syntax
                // printer (and the node may carry a package qualifier).
                // Its position metadata is stale, which only affects
                // layout hints.
                let lit = LiteralValue {
                    l_brace: pos,
                    elements: ListRef::EMPTY,
                    r_brace: pos,
                };
                self.arena
                    .exprs
                    .alloc(Expr::CompositeLit { typ: type_node, lit }, pos)
            }
        }
    }

    fn frame_sig(&self, fun: FuncRef, pos: Span) -> Result<&'a FrameSig> {
        self.type_info.frames.get(&fun).ok_or_else(|| {
            TranslateError::at(
                self.fset.position(pos),
                &self.pkg_name,
                "Type cannot be resolved for enclosing function",
            )
        })
    }

    /// Builds `if <err> != nil { return $zeros..., <err> }` with an
    /// optional init statement and splices it after `index`.
    fn insert_if_nil_check_after(
        &mut self,
        index: usize,
        err_name: IdentName,
        init: Option<SimpleStmtId>,
        fun: FuncRef,
    ) -> Result<()> {
        let sig = self.frame_sig(fun, err_name.pos)?;
        let pos = err_name.pos;

        let mut ret_vals = Vec::with_capacity(sig.arity);
        for &(kind, node) in sig.zeros.clone().iter() {
            let z = self.zero_value_of(kind, node, pos);
            ret_vals.push(z);
        }
        let err_sym = err_name.sym;
        let err_ref = self.arena.exprs.alloc(Expr::Ident(err_sym, pos), pos);
        ret_vals.push(err_ref);

        let results = self.arena.list_exprs(ret_vals);
        let ret_stmt = self.arena.stmts.alloc(
            Stmt::Return {
                return_pos: pos,
                results,
            },
            pos,
        );
        let body_stmts = self.arena.list_stmts([ret_stmt]);
        let body = self.arena.blocks.alloc(
            Block {
                l_brace: pos,
                stmts: body_stmts,
                r_brace: pos,
            },
            pos,
        );

        let cond_lhs = self.arena.exprs.alloc(Expr::Ident(err_sym, pos), pos);
        let cond_rhs = self.ident_expr("nil", pos);
        let cond = self.arena.exprs.alloc(
            Expr::Binary {
                left: cond_lhs,
                op: BinaryOp::Ne,
                op_pos: pos,
                right: cond_rhs,
            },
            pos,
        );

        let if_stmt = self.arena.stmts.alloc(
            Stmt::If {
                if_pos: pos,
                init,
                cond,
                then_block: body,
                else_stmt: None,
            },
            pos,
        );

        self.insert_stmt_at(index + 1, if_stmt);
        debug!(index = index + 1, "inserted if statement for nil check");
        Ok(())
    }

    // ---- the three transforms ----

    /// `var $vals, _ = f(...)` -> `var $vals, _err0 = f(...)` + guard.
    fn trans_value_spec(&mut self, point: &TransPoint) -> Result<()> {
        let TransTarget::Spec(idx) = point.target else {
            panic!("value-spec translation point without a spec target");
        };
        let err_ident = self.gen_err_ident(Span::at(point.pos.start));

        let Spec::Value(vs) = *self.arena.spec(idx) else {
            panic!("value-spec translation point does not reference a value spec");
        };
        let names = self.arena.ident_names_mut(vs.names);
        *names.last_mut().expect("value spec without placeholder") = err_ident;

        self.insert_if_nil_check_after(point.block_index, err_ident, None, point.fun)
    }

    /// `$vals, _ :=` / `$vals, _ =` with guard; the `=` form needs a
    /// preceding `var _errN error` since it cannot introduce a binding.
    fn trans_assign(&mut self, point: &TransPoint) -> Result<()> {
        let TransTarget::Assign(sid) = point.target else {
            panic!("assignment translation point without an assign target");
        };
        let err_ident = self.gen_err_ident(Span::at(point.pos.start));

        match self.arena.simple_stmts[sid] {
            SimpleStmt::ShortVarDecl { names, .. } => {
                let names = self.arena.ident_names_mut(names);
                *names.last_mut().expect("short var decl without placeholder") = err_ident;
                self.insert_if_nil_check_after(point.block_index, err_ident, None, point.fun)
            }
            SimpleStmt::Assign { lhs, .. } => {
                let pos = err_ident.pos;

                // var _errN error
                let err_type = self.arena.types.alloc(
                    Type::Named {
                        pkg: None,
                        dot_pos: None,
                        name: IdentName {
                            sym: self.interner.intern("error"),
                            pos,
                        },
                    },
                    pos,
                );
                let names = self.arena.list_ident_names([err_ident]);
                let spec = Spec::Value(ValueSpec {
                    names,
                    typ: Some(err_type),
                    values: ListRef::EMPTY,
                });
                let specs = self.arena.list_specs([spec]);
                let decl = self.arena.decls.alloc(
                    Decl::Gen(GenDecl {
                        kw_pos: pos,
                        kind: GenDeclKind::Var,
                        l_paren: None,
                        specs,
                        r_paren: None,
                    }),
                    pos,
                );
                let decl_stmt = self.arena.stmts.alloc(Stmt::Decl(decl), pos);
                self.insert_stmt_at(point.block_index, decl_stmt);

                let err_ref = self.arena.exprs.alloc(Expr::Ident(err_ident.sym, pos), pos);
                let lhs = self.arena.exprs_list_mut(lhs);
                *lhs.last_mut().expect("assignment without placeholder") = err_ref;

                self.insert_if_nil_check_after(point.block_index, err_ident, None, point.fun)
            }
            _ => panic!("assignment translation point on unexpected statement"),
        }
    }

    /// `f(...)` -> `if $blanks, err := f(...); err != nil { ... }`.
    fn trans_toplevel_call(&mut self, point: &TransPoint) -> Result<()> {
        self.remove_stmt_at(point.block_index);

        let arity = *self
            .type_info
            .call_arities
            .get(&point.call)
            .unwrap_or_else(|| {
                panic!(
                    "type information is not collected for AST node at {}",
                    self.fset.position(point.pos)
                )
            });
        let num_ignores = arity.saturating_sub(1);
        debug!(num_ignores, "toplevel try() translation");

        let pos = Span::at(point.pos.start);
        let blank = self.interner.intern("_");
        let err_sym = self.interner.intern("err");

        let mut names = Vec::with_capacity(num_ignores + 1);
        for _ in 0..num_ignores {
            names.push(IdentName { sym: blank, pos });
        }
        let err_ident = IdentName { sym: err_sym, pos };
        names.push(err_ident);

        let names = self.arena.list_ident_names(names);
        let values = self.arena.list_exprs([point.call]);
        let init = self.arena.simple_stmts.alloc(
            SimpleStmt::ShortVarDecl {
                names,
                op_pos: pos,
                values,
            },
            pos,
        );

        // The removal above decremented the offset, so inserting "after
        // the host index" lands exactly at the removed statement's slot.
        self.insert_if_nil_check_after(point.block_index, err_ident, Some(init), point.fun)
    }
}
