//! gofmt-style pretty-printer for the arena AST.
//!
//! Output is normalized: tab indentation, one statement per line, one
//! blank line between top-level declarations, spaces around binary
//! operators. Only rewritten files go through the printer; untouched
//! files are emitted from their original source bytes, so the printer
//! never has to reproduce comments or incidental layout.

use crate::ast::*;

/// Prints one source file.
pub fn print_file(file: &SourceFile, arena: &AstArena, interner: &Interner) -> String {
    let mut p = Printer {
        arena,
        interner,
        out: String::with_capacity(4096),
        indent: 0,
    };
    p.file(file);
    p.out
}

/// Renders a single type node, for diagnostics.
pub fn print_type(id: TypeId, arena: &AstArena, interner: &Interner) -> String {
    let mut p = Printer {
        arena,
        interner,
        out: String::new(),
        indent: 0,
    };
    p.typ(id);
    p.out
}

/// Renders a single expression node, for diagnostics.
pub fn print_expr(id: ExprId, arena: &AstArena, interner: &Interner) -> String {
    let mut p = Printer {
        arena,
        interner,
        out: String::new(),
        indent: 0,
    };
    p.expr(id);
    p.out
}

struct Printer<'a> {
    arena: &'a AstArena,
    interner: &'a Interner,
    out: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn sym(&mut self, sym: Symbol) {
        let s = self.interner.resolve(sym);
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    /// Statement line start; labeled statements are outdented one stop,
    /// the way gofmt prints labels.
    fn stmt_newline(&mut self, id: StmtId) {
        if matches!(self.arena.stmts[id], Stmt::Labeled { .. }) {
            self.out.push('\n');
            for _ in 0..self.indent.saturating_sub(1) {
                self.out.push('\t');
            }
        } else {
            self.newline();
        }
    }

    // ---- file ----

    fn file(&mut self, file: &SourceFile) {
        self.push("package ");
        self.sym(file.name.sym);
        self.push("\n");

        for &decl in self.arena.top_decls(file.decls) {
            self.push("\n");
            match decl {
                TopLevelDecl::Decl(id) => {
                    let Decl::Gen(g) = self.arena.decls[id];
                    self.gen_decl(&g);
                    self.push("\n");
                }
                TopLevelDecl::Func(id) => {
                    self.func_decl(id);
                    self.push("\n");
                }
            }
        }
    }

    // ---- declarations ----

    fn gen_decl(&mut self, g: &GenDecl) {
        self.push(g.kind.keyword());
        if g.l_paren.is_some() {
            self.push(" (");
            self.indent += 1;
            let specs = self.arena.specs_list(g.specs).to_vec();
            for spec in &specs {
                self.newline();
                self.spec(spec);
            }
            self.indent -= 1;
            self.newline();
            self.push(")");
        } else {
            self.push(" ");
            let specs = self.arena.specs_list(g.specs).to_vec();
            debug_assert_eq!(specs.len(), 1);
            if let Some(spec) = specs.first() {
                self.spec(spec);
            }
        }
    }

    fn spec(&mut self, spec: &Spec) {
        match *spec {
            Spec::Import(im) => {
                match im.name {
                    Some(ImportName::Dot(_)) => self.push(". "),
                    Some(ImportName::Blank(_)) => self.push("_ "),
                    Some(ImportName::Name(n)) => {
                        self.sym(n.sym);
                        self.push(" ");
                    }
                    None => {}
                }
                self.sym(im.path.sym);
            }
            Spec::Value(vs) => {
                let names = self.arena.ident_names(vs.names).to_vec();
                for (i, n) in names.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.sym(n.sym);
                }
                if let Some(t) = vs.typ {
                    self.push(" ");
                    self.typ(t);
                }
                let values = self.arena.exprs_list(vs.values).to_vec();
                if !values.is_empty() {
                    self.push(" = ");
                    for (i, &v) in values.iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.expr(v);
                    }
                }
            }
            Spec::Type(ts) => {
                self.sym(ts.name.sym);
                if ts.alias {
                    self.push(" = ");
                } else {
                    self.push(" ");
                }
                self.typ(ts.typ);
            }
        }
    }

    fn func_decl(&mut self, id: FuncDeclId) {
        let f = self.arena.funcs[id];
        self.push("func ");
        if let Some(recv) = f.recv {
            self.push("(");
            if let Some(n) = recv.name {
                self.sym(n.sym);
                self.push(" ");
            }
            self.typ(recv.typ);
            self.push(") ");
        }
        self.sym(f.name.sym);
        self.signature(f.signature);
        match f.body {
            Some(b) => {
                self.push(" ");
                self.block(b);
            }
            None => {}
        }
    }

    fn signature(&mut self, id: SignatureId) {
        let sig = self.arena.signatures[id];
        self.field_list(&sig.params);
        match sig.results {
            Some(Results::Params(fl)) => {
                self.push(" ");
                // A single unnamed result prints without parentheses.
                let fields = self.arena.fields_list(fl.fields).to_vec();
                if fields.len() == 1 {
                    let f = self.arena.fields[fields[0]];
                    if self.arena.ident_names(f.names).is_empty() {
                        self.typ(f.typ);
                        return;
                    }
                }
                self.push("(");
                for (i, &fid) in fields.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.field(fid);
                }
                self.push(")");
            }
            Some(Results::Type(t)) => {
                self.push(" ");
                self.typ(t);
            }
            None => {}
        }
    }

    fn field_list(&mut self, fl: &FieldList) {
        self.push("(");
        let fields = self.arena.fields_list(fl.fields).to_vec();
        for (i, &fid) in fields.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.field(fid);
        }
        self.push(")");
    }

    fn field(&mut self, fid: FieldId) {
        let f = self.arena.fields[fid];
        let names = self.arena.ident_names(f.names).to_vec();
        for (i, n) in names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.sym(n.sym);
        }
        if !names.is_empty() {
            self.push(" ");
        }
        if f.ellipsis_pos.is_some() {
            self.push("...");
        }
        self.typ(f.typ);
        if let Some(tag) = f.tag {
            self.push(" ");
            self.sym(tag.sym);
        }
    }

    // ---- types ----

    fn typ(&mut self, id: TypeId) {
        match self.arena.types[id] {
            Type::Named { pkg, name, .. } => {
                if let Some(p) = pkg {
                    self.sym(p.sym);
                    self.push(".");
                }
                self.sym(name.sym);
            }
            Type::Pointer { elem, .. } => {
                self.push("*");
                self.typ(elem);
            }
            Type::Array { len, elem, .. } => {
                self.push("[");
                match len {
                    ArrayLen::Expr(e) => self.expr(e),
                    ArrayLen::Ellipsis(_) => self.push("..."),
                }
                self.push("]");
                self.typ(elem);
            }
            Type::Slice { elem, .. } => {
                self.push("[]");
                self.typ(elem);
            }
            Type::Map { key, val, .. } => {
                self.push("map[");
                self.typ(key);
                self.push("]");
                self.typ(val);
            }
            Type::Chan { dir, elem, .. } => {
                match dir {
                    ChanDir::Both => self.push("chan "),
                    ChanDir::Send => self.push("chan<- "),
                    ChanDir::Recv => self.push("<-chan "),
                }
                self.typ(elem);
            }
            Type::Struct { fields, .. } => {
                let fields = self.arena.fields_list(fields).to_vec();
                if fields.is_empty() {
                    self.push("struct{}");
                    return;
                }
                self.push("struct {");
                self.indent += 1;
                for &fid in &fields {
                    self.newline();
                    self.field(fid);
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            Type::Interface { elems, .. } => {
                let elems = self.arena.interface_elems(elems).to_vec();
                if elems.is_empty() {
                    self.push("interface{}");
                    return;
                }
                self.push("interface {");
                self.indent += 1;
                for elem in &elems {
                    self.newline();
                    match *elem {
                        InterfaceElem::Method { name, sig } => {
                            self.sym(name.sym);
                            self.signature(sig);
                        }
                        InterfaceElem::Embedded(t) => self.typ(t),
                    }
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            Type::Func { sig, .. } => {
                self.push("func");
                self.signature(sig);
            }
            Type::Paren { typ, .. } => {
                self.push("(");
                self.typ(typ);
                self.push(")");
            }
        }
    }

    // ---- statements ----

    fn block(&mut self, id: BlockId) {
        let stmts = self.arena.stmts_list(self.arena.blocks[id].stmts).to_vec();
        if stmts.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for &s in &stmts {
            self.stmt_newline(s);
            self.stmt(s);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn stmt(&mut self, id: StmtId) {
        match self.arena.stmts[id] {
            Stmt::Simple(s) => self.simple_stmt(s),
            Stmt::Decl(d) => {
                let Decl::Gen(g) = self.arena.decls[d];
                self.gen_decl(&g);
            }
            Stmt::Labeled {
                label,
                stmt,
                ..
            } => {
                self.sym(label.sym);
                self.push(":");
                self.newline();
                self.stmt(stmt);
            }
            Stmt::Go { call, .. } => {
                self.push("go ");
                self.expr(call);
            }
            Stmt::Defer { call, .. } => {
                self.push("defer ");
                self.expr(call);
            }
            Stmt::Return { results, .. } => {
                self.push("return");
                let results = self.arena.exprs_list(results).to_vec();
                for (i, &e) in results.iter().enumerate() {
                    self.push(if i == 0 { " " } else { ", " });
                    self.expr(e);
                }
            }
            Stmt::Branch(b) => match b {
                BranchStmt::Break { label, .. } => {
                    self.push("break");
                    if let Some(l) = label {
                        self.push(" ");
                        self.sym(l.sym);
                    }
                }
                BranchStmt::Continue { label, .. } => {
                    self.push("continue");
                    if let Some(l) = label {
                        self.push(" ");
                        self.sym(l.sym);
                    }
                }
                BranchStmt::Goto { label, .. } => {
                    self.push("goto ");
                    self.sym(label.sym);
                }
                BranchStmt::Fallthrough { .. } => self.push("fallthrough"),
            },
            Stmt::Block(b) => self.block(b),
            Stmt::If {
                init,
                cond,
                then_block,
                else_stmt,
                ..
            } => {
                self.push("if ");
                if let Some(init) = init {
                    self.simple_stmt(init);
                    self.push("; ");
                }
                self.expr(cond);
                self.push(" ");
                self.block(then_block);
                if let Some(e) = else_stmt {
                    self.push(" else ");
                    self.stmt(e);
                }
            }
            Stmt::For { kind, body, .. } => {
                self.push("for ");
                match kind {
                    ForKind::Infinite => {}
                    ForKind::Cond(c) => {
                        self.expr(c);
                        self.push(" ");
                    }
                    ForKind::ForClause { init, cond, post } => {
                        if let Some(i) = init {
                            self.simple_stmt(i);
                        }
                        self.push("; ");
                        if let Some(c) = cond {
                            self.expr(c);
                        }
                        self.push("; ");
                        if let Some(p) = post {
                            self.simple_stmt(p);
                        }
                        self.push(" ");
                    }
                    ForKind::Range { lhs, expr, .. } => {
                        if let Some(lhs) = lhs {
                            self.range_lhs(&lhs);
                        }
                        self.push("range ");
                        self.expr(expr);
                        self.push(" ");
                    }
                }
                self.block(body);
            }
            Stmt::Switch {
                init,
                tag,
                clauses,
                ..
            } => {
                self.push("switch ");
                if let Some(i) = init {
                    self.simple_stmt(i);
                    self.push("; ");
                }
                if let Some(t) = tag {
                    self.expr(t);
                    self.push(" ");
                }
                self.switch_body(clauses);
            }
            Stmt::TypeSwitch {
                init,
                guard,
                clauses,
                ..
            } => {
                self.push("switch ");
                if let Some(i) = init {
                    self.simple_stmt(i);
                    self.push("; ");
                }
                if let Some(bind) = guard.bind {
                    self.sym(bind.name.sym);
                    self.push(" := ");
                }
                self.expr(guard.x);
                self.push(".(type) ");
                self.switch_body(clauses);
            }
            Stmt::Select { clauses, .. } => {
                self.push("select {");
                let clauses = self.arena.comm_clause_ids(clauses).to_vec();
                for &cid in &clauses {
                    self.newline();
                    match self.arena.comm_clauses[cid] {
                        CommClause::Case { comm, stmts, .. } => {
                            self.push("case ");
                            match comm {
                                CommStmt::Send { chan, value, .. } => {
                                    self.expr(chan);
                                    self.push(" <- ");
                                    self.expr(value);
                                }
                                CommStmt::Recv { lhs, expr } => {
                                    if let Some(lhs) = lhs {
                                        self.range_lhs(&lhs);
                                    }
                                    self.expr(expr);
                                }
                            }
                            self.push(":");
                            self.clause_stmts(stmts);
                        }
                        CommClause::Default { stmts, .. } => {
                            self.push("default:");
                            self.clause_stmts(stmts);
                        }
                    }
                }
                self.newline();
                self.push("}");
            }
        }
    }

    fn switch_body(&mut self, clauses: ListRef<SwitchClauseId>) {
        self.push("{");
        let clauses = self.arena.switch_clause_ids(clauses).to_vec();
        for &cid in &clauses {
            self.newline();
            match self.arena.switch_clauses[cid] {
                SwitchClause::ExprCase { items, stmts, .. } => {
                    let items = self.arena.exprs_list(items).to_vec();
                    if items.is_empty() {
                        self.push("default:");
                    } else {
                        self.push("case ");
                        for (i, &e) in items.iter().enumerate() {
                            if i > 0 {
                                self.push(", ");
                            }
                            self.expr(e);
                        }
                        self.push(":");
                    }
                    self.clause_stmts(stmts);
                }
                SwitchClause::TypeCase { items, stmts, .. } => {
                    let items = self.arena.type_case_elems(items).to_vec();
                    if items.is_empty() {
                        self.push("default:");
                    } else {
                        self.push("case ");
                        for (i, item) in items.iter().enumerate() {
                            if i > 0 {
                                self.push(", ");
                            }
                            match *item {
                                TypeCaseElem::Type(t) => self.typ(t),
                                TypeCaseElem::Nil(_) => self.push("nil"),
                            }
                        }
                        self.push(":");
                    }
                    self.clause_stmts(stmts);
                }
            }
        }
        self.newline();
        self.push("}");
    }

    fn clause_stmts(&mut self, stmts: ListRef<StmtId>) {
        let stmts = self.arena.stmts_list(stmts).to_vec();
        self.indent += 1;
        for &s in &stmts {
            self.stmt_newline(s);
            self.stmt(s);
        }
        self.indent -= 1;
    }

    fn range_lhs(&mut self, lhs: &RangeLhs) {
        match *lhs {
            RangeLhs::Def { idents, .. } => {
                let idents = self.arena.ident_names(idents).to_vec();
                for (i, n) in idents.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.sym(n.sym);
                }
                self.push(" := ");
            }
            RangeLhs::Assign { exprs, .. } => {
                let exprs = self.arena.exprs_list(exprs).to_vec();
                for (i, &e) in exprs.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(e);
                }
                self.push(" = ");
            }
        }
    }

    fn simple_stmt(&mut self, id: SimpleStmtId) {
        match self.arena.simple_stmts[id] {
            SimpleStmt::Empty(_) => {}
            SimpleStmt::Expr(e) => self.expr(e),
            SimpleStmt::Send { chan, value, .. } => {
                self.expr(chan);
                self.push(" <- ");
                self.expr(value);
            }
            SimpleStmt::IncDec { expr, op, .. } => {
                self.expr(expr);
                self.push(match op {
                    IncDecOp::Inc => "++",
                    IncDecOp::Dec => "--",
                });
            }
            SimpleStmt::Assign { lhs, op, rhs, .. } => {
                let lhs = self.arena.exprs_list(lhs).to_vec();
                for (i, &e) in lhs.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(e);
                }
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                let rhs = self.arena.exprs_list(rhs).to_vec();
                for (i, &e) in rhs.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(e);
                }
            }
            SimpleStmt::ShortVarDecl { names, values, .. } => {
                let names = self.arena.ident_names(names).to_vec();
                for (i, n) in names.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.sym(n.sym);
                }
                self.push(" := ");
                let values = self.arena.exprs_list(values).to_vec();
                for (i, &e) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(e);
                }
            }
        }
    }

    // ---- expressions ----

    fn expr(&mut self, id: ExprId) {
        match self.arena.exprs[id] {
            Expr::Ident(sym, _) => self.sym(sym),
            Expr::BasicLit(lit) => self.sym(lit.sym),
            Expr::FuncLit { sig, body, .. } => {
                self.push("func");
                self.signature(sig);
                self.push(" ");
                self.block(body);
            }
            Expr::CompositeLit { typ, lit } => {
                self.typ(typ);
                self.literal_value(&lit);
            }
            Expr::Index { expr, index, .. } => {
                self.expr(expr);
                self.push("[");
                self.expr(index);
                self.push("]");
            }
            Expr::Paren { expr, .. } => {
                self.push("(");
                self.expr(expr);
                self.push(")");
            }
            Expr::Selector { expr, sel, .. } => {
                self.expr(expr);
                self.push(".");
                self.sym(sel.sym);
            }
            Expr::Slice {
                expr,
                lo,
                hi,
                colon2,
                max,
                ..
            } => {
                self.expr(expr);
                self.push("[");
                if let Some(lo) = lo {
                    self.expr(lo);
                }
                self.push(":");
                if let Some(hi) = hi {
                    self.expr(hi);
                }
                if colon2.is_some() {
                    self.push(":");
                    if let Some(max) = max {
                        self.expr(max);
                    }
                }
                self.push("]");
            }
            Expr::TypeAssert { expr, typ, .. } => {
                self.expr(expr);
                self.push(".(");
                match typ {
                    Some(t) => self.typ(t),
                    None => self.push("type"),
                }
                self.push(")");
            }
            Expr::Call {
                callee,
                type_arg,
                args,
                ellipsis,
                ..
            } => {
                match callee {
                    CallCallee::Expr(e) => self.expr(e),
                    CallCallee::Type(t) => self.typ(t),
                }
                self.push("(");
                let mut first = true;
                if let Some(t) = type_arg {
                    self.typ(t);
                    first = false;
                }
                let args = self.arena.exprs_list(args).to_vec();
                for &arg in &args {
                    if !first {
                        self.push(", ");
                    }
                    first = false;
                    self.expr(arg);
                }
                if ellipsis.is_some() {
                    self.push("...");
                }
                self.push(")");
            }
            Expr::Unary { op, expr, .. } => {
                self.push(op.as_str());
                self.expr(expr);
            }
            Expr::Binary {
                left, op, right, ..
            } => {
                self.expr(left);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.expr(right);
            }
        }
    }

    fn literal_value(&mut self, lit: &LiteralValue) {
        self.push("{");
        let elems = self.arena.keyed_elems_list(lit.elements).to_vec();
        for (i, elem) in elems.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if let Some(key) = elem.key {
                match key {
                    Key::Expr(e) => self.expr(e),
                    Key::Literal(l) => self.literal_value(&l),
                }
                self.push(": ");
            }
            match elem.value {
                Element::Expr(e) => self.expr(e),
                Element::Literal(l) => self.literal_value(&l),
            }
        }
        self.push("}");
    }
}
