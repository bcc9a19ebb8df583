//! Parser shape tests over small Go snippets.

use trygo_parser::ast::*;
use trygo_parser::parse_file;

fn parse(src: &str) -> (AstArena, Interner, SourceFile) {
    let mut arena = AstArena::new();
    let mut interner = Interner::new();
    let file = parse_file(src, 0, &mut arena, &mut interner)
        .unwrap_or_else(|d| panic!("parse failed: {} at {:?}", d.message, d.span));
    (arena, interner, file)
}

fn only_func(arena: &AstArena, file: &SourceFile) -> FuncDecl {
    let funcs: Vec<_> = arena
        .top_decls(file.decls)
        .iter()
        .filter_map(|d| match d {
            TopLevelDecl::Func(id) => Some(arena.funcs[*id]),
            _ => None,
        })
        .collect();
    assert_eq!(funcs.len(), 1);
    funcs[0]
}

fn body_stmts(arena: &AstArena, f: &FuncDecl) -> Vec<StmtId> {
    let body = f.body.expect("function has no body");
    arena.stmts_list(arena.blocks[body].stmts).to_vec()
}

#[test]
fn package_clause_and_imports() {
    let (arena, interner, file) = parse(
        "package main\n\nimport (\n\t\"fmt\"\n\tf \"os\"\n\t_ \"net\"\n)\n",
    );
    assert_eq!(interner.resolve(file.name.sym), "main");

    let TopLevelDecl::Decl(id) = arena.top_decls(file.decls)[0] else {
        panic!("expected import declaration");
    };
    let Decl::Gen(g) = arena.decls[id];
    assert_eq!(g.kind, GenDeclKind::Import);
    let specs = arena.specs_list(g.specs);
    assert_eq!(specs.len(), 3);
    let Spec::Import(first) = specs[0] else {
        panic!("expected import spec");
    };
    assert_eq!(interner.resolve(first.path.sym), "\"fmt\"");
    assert!(matches!(
        specs[1],
        Spec::Import(ImportSpec {
            name: Some(ImportName::Name(_)),
            ..
        })
    ));
    assert!(matches!(
        specs[2],
        Spec::Import(ImportSpec {
            name: Some(ImportName::Blank(_)),
            ..
        })
    ));
}

#[test]
fn short_var_decl_with_call() {
    let (arena, interner, file) = parse("package p\n\nfunc f() {\n\tx := g()\n}\n");
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    assert_eq!(stmts.len(), 1);

    let Stmt::Simple(sid) = arena.stmts[stmts[0]] else {
        panic!("expected simple statement");
    };
    let SimpleStmt::ShortVarDecl { names, values, .. } = arena.simple_stmts[sid] else {
        panic!("expected short var declaration");
    };
    assert_eq!(arena.ident_names(names).len(), 1);
    assert_eq!(interner.resolve(arena.ident_names(names)[0].sym), "x");
    let value = arena.exprs_list(values)[0];
    assert!(matches!(arena.exprs[value], Expr::Call { .. }));
}

#[test]
fn binary_precedence() {
    let (arena, _, file) = parse("package p\n\nfunc f() {\n\tx := 1 + 2*3\n}\n");
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    let Stmt::Simple(sid) = arena.stmts[stmts[0]] else {
        panic!()
    };
    let SimpleStmt::ShortVarDecl { values, .. } = arena.simple_stmts[sid] else {
        panic!()
    };
    // (1 + (2 * 3))
    let Expr::Binary { op, right, .. } = arena.exprs[arena.exprs_list(values)[0]] else {
        panic!("expected binary expression");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(
        arena.exprs[right],
        Expr::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn signature_results_are_flattened_forms() {
    let (arena, _, file) = parse("package p\n\nfunc f(a, b int, c string) (int, error) {\n}\n");
    let f = only_func(&arena, &file);
    let sig = arena.signatures[f.signature];

    let params = arena.fields_list(sig.params.fields);
    assert_eq!(params.len(), 2);
    assert_eq!(arena.ident_names(arena.fields[params[0]].names).len(), 2);
    assert_eq!(arena.ident_names(arena.fields[params[1]].names).len(), 1);

    let Some(Results::Params(rl)) = sig.results else {
        panic!("expected parenthesized results");
    };
    assert_eq!(arena.fields_list(rl.fields).len(), 2);
}

#[test]
fn if_with_init_statement() {
    let (arena, _, file) =
        parse("package p\n\nfunc f() error {\n\tif err := g(); err != nil {\n\t\treturn err\n\t}\n\treturn nil\n}\n");
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    let Stmt::If { init, cond, .. } = arena.stmts[stmts[0]] else {
        panic!("expected if statement");
    };
    assert!(init.is_some());
    assert!(matches!(
        arena.exprs[cond],
        Expr::Binary {
            op: BinaryOp::Ne,
            ..
        }
    ));
}

#[test]
fn composite_literal_suppressed_in_header() {
    // `{` after the condition must open the body, not a composite literal.
    let (arena, _, file) = parse("package p\n\nfunc f(x T) {\n\tif x == y {\n\t\tg()\n\t}\n}\n");
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    assert!(matches!(arena.stmts[stmts[0]], Stmt::If { .. }));
}

#[test]
fn composite_literals_and_conversions() {
    let (arena, _, file) = parse(
        "package p\n\nfunc f() {\n\tp := Point{X: 1}\n\tb := []byte(\"x\")\n\txs := []int{1, 2}\n\tm := map[string]int{\"a\": 1}\n}\n",
    );
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    assert_eq!(stmts.len(), 4);

    let value_of = |i: usize| {
        let Stmt::Simple(sid) = arena.stmts[stmts[i]] else {
            panic!()
        };
        let SimpleStmt::ShortVarDecl { values, .. } = arena.simple_stmts[sid] else {
            panic!()
        };
        arena.exprs_list(values)[0]
    };

    assert!(matches!(arena.exprs[value_of(0)], Expr::CompositeLit { .. }));
    assert!(matches!(
        arena.exprs[value_of(1)],
        Expr::Call {
            callee: CallCallee::Type(_),
            ..
        }
    ));
    assert!(matches!(arena.exprs[value_of(2)], Expr::CompositeLit { .. }));
    assert!(matches!(arena.exprs[value_of(3)], Expr::CompositeLit { .. }));
}

#[test]
fn switch_case_and_select_bodies() {
    let src = r#"package p

func f(x int, ch chan int) {
	switch x {
	case 1, 2:
		g()
	default:
	}
	select {
	case v := <-ch:
		use(v)
	default:
	}
}
"#;
    let (arena, _, file) = parse(src);
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);

    let Stmt::Switch { clauses, .. } = arena.stmts[stmts[0]] else {
        panic!("expected switch");
    };
    let clauses = arena.switch_clause_ids(clauses);
    assert_eq!(clauses.len(), 2);
    let SwitchClause::ExprCase { items, stmts: body, .. } = arena.switch_clauses[clauses[0]]
    else {
        panic!("expected expression case");
    };
    assert_eq!(arena.exprs_list(items).len(), 2);
    assert_eq!(arena.stmts_list(body).len(), 1);

    let Stmt::Select { clauses, .. } = arena.stmts[stmts[1]] else {
        panic!("expected select");
    };
    let clauses = arena.comm_clause_ids(clauses);
    assert_eq!(clauses.len(), 2);
    assert!(matches!(
        arena.comm_clauses[clauses[0]],
        CommClause::Case {
            comm: CommStmt::Recv { lhs: Some(_), .. },
            ..
        }
    ));
}

#[test]
fn type_switch_guard() {
    let src = "package p\n\nfunc f(x interface{}) {\n\tswitch v := x.(type) {\n\tcase int:\n\t\tuse(v)\n\t}\n}\n";
    let (arena, interner, file) = parse(src);
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    let Stmt::TypeSwitch { guard, .. } = arena.stmts[stmts[0]] else {
        panic!("expected type switch");
    };
    let bind = guard.bind.expect("expected guard binding");
    assert_eq!(interner.resolve(bind.name.sym), "v");
}

#[test]
fn for_loop_forms() {
    let src = r#"package p

func f(xs []int) {
	for {
		break
	}
	for i := 0; i < 10; i++ {
	}
	for _, x := range xs {
		use(x)
	}
}
"#;
    let (arena, _, file) = parse(src);
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    assert!(matches!(
        arena.stmts[stmts[0]],
        Stmt::For {
            kind: ForKind::Infinite,
            ..
        }
    ));
    assert!(matches!(
        arena.stmts[stmts[1]],
        Stmt::For {
            kind: ForKind::ForClause { .. },
            ..
        }
    ));
    assert!(matches!(
        arena.stmts[stmts[2]],
        Stmt::For {
            kind: ForKind::Range { lhs: Some(_), .. },
            ..
        }
    ));
}

#[test]
fn func_literal_in_expression() {
    let src = "package p\n\nfunc f() {\n\tg := func(n int) int {\n\t\treturn n\n\t}\n\tuse(g)\n}\n";
    let (arena, _, file) = parse(src);
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    let Stmt::Simple(sid) = arena.stmts[stmts[0]] else {
        panic!()
    };
    let SimpleStmt::ShortVarDecl { values, .. } = arena.simple_stmts[sid] else {
        panic!()
    };
    assert!(matches!(
        arena.exprs[arena.exprs_list(values)[0]],
        Expr::FuncLit { .. }
    ));
}

#[test]
fn variadic_call_and_spread() {
    let src = "package p\n\nfunc f(xs []int) {\n\tg(xs...)\n\th(1, 2, 3)\n}\n";
    let (arena, _, file) = parse(src);
    let f = only_func(&arena, &file);
    let stmts = body_stmts(&arena, &f);
    let Stmt::Simple(sid) = arena.stmts[stmts[0]] else {
        panic!()
    };
    let SimpleStmt::Expr(e) = arena.simple_stmts[sid] else {
        panic!()
    };
    let Expr::Call { ellipsis, .. } = arena.exprs[e] else {
        panic!("expected call");
    };
    assert!(ellipsis.is_some());
}

#[test]
fn method_declaration_with_receiver() {
    let src = "package p\n\nfunc (s *Server) Close() error {\n\treturn nil\n}\n";
    let (arena, interner, file) = parse(src);
    let f = only_func(&arena, &file);
    let recv = f.recv.expect("expected receiver");
    assert_eq!(interner.resolve(recv.name.unwrap().sym), "s");
    assert!(matches!(arena.types[recv.typ], Type::Pointer { .. }));
}

#[test]
fn parse_error_has_position() {
    let mut arena = AstArena::new();
    let mut interner = Interner::new();
    let err = parse_file("package p\n\nfunc f( {\n", 0, &mut arena, &mut interner)
        .expect_err("expected a parse error");
    assert!(err.span.start > 0);
    assert!(err.message.contains("expected"));
}
