//! End-to-end translation tests over testdata fixtures.
//!
//! Each fixture directory holds a `src` package and a `want` package; the
//! translated output of every file must match its `want` counterpart
//! byte for byte.

use std::fs;
use std::path::{Path, PathBuf};

use trygo::resolve::Importer;
use trygo::{translate, BuildContext, Package, TranslateError};
use trygo_parser::ast::{IdentName, Results, Span, TopLevelDecl, Type};
use trygo_parser::fileset::FileSet;

fn testdata() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn build_ctx() -> BuildContext {
    BuildContext::with_roots(vec![testdata().join("goroot"), testdata().join("gen")])
}

fn translate_fixture(case: &str) -> (Vec<Package>, FileSet) {
    let dir = testdata().join("trans").join(case);
    let src = dir.join("src");
    let want = dir.join("want");

    let mut fset = FileSet::new();
    let pkg = Package::parse_dir(&src, &want, &mut fset).expect("fixture must parse");
    let mut pkgs = vec![pkg];
    translate(&mut pkgs, &fset, &build_ctx()).expect("translation must succeed");
    (pkgs, fset)
}

fn assert_translates_to_want(case: &str) {
    let (pkgs, _fset) = translate_fixture(case);
    let pkg = &pkgs[0];
    assert!(pkg.modified(), "{case}: package should be marked modified");

    let want_dir = testdata().join("trans").join(case).join("want");
    let mut checked = 0;
    for entry in fs::read_dir(&want_dir).unwrap() {
        let want_path = entry.unwrap().path();
        if want_path.extension().is_none_or(|e| e != "go") {
            continue;
        }
        let want = fs::read_to_string(&want_path).unwrap();
        let mut have = Vec::new();
        pkg.write_file_to(&mut have, &want_path).unwrap();
        let have = String::from_utf8(have).unwrap();
        assert_eq!(
            have, want,
            "{case}: translated {} does not match",
            want_path.display()
        );
        checked += 1;
    }
    assert!(checked > 0, "{case}: no want files compared");
}

#[test]
fn simple_definition() {
    assert_translates_to_want("simple");
}

#[test]
fn assignment_value_spec_and_toplevel() {
    assert_translates_to_want("assign");
}

#[test]
fn zero_value_families() {
    assert_translates_to_want("zerovals");
}

#[test]
fn nested_blocks_clauses_and_func_literals() {
    assert_translates_to_want("nestedblock");
}

#[test]
fn imported_method_calls_and_qualified_zero_values() {
    assert_translates_to_want("methods");
}

#[test]
fn vanilla_go_is_a_fixed_point() {
    let dir = testdata().join("trans").join("unmodified");
    let src_dir = dir.join("src");

    let mut fset = FileSet::new();
    let pkg = Package::parse_dir(&src_dir, &src_dir, &mut fset).unwrap();
    let mut pkgs = vec![pkg];
    translate(&mut pkgs, &fset, &build_ctx()).unwrap();

    let pkg = &pkgs[0];
    assert!(!pkg.modified(), "untouched package must not be dirty");

    let src_path = src_dir.join("skip.go");
    let original = fs::read_to_string(&src_path).unwrap();
    let mut have = Vec::new();
    pkg.write_file_to(&mut have, &src_path).unwrap();
    assert_eq!(String::from_utf8(have).unwrap(), original);
}

#[test]
fn verification_accepts_translated_packages() {
    let (pkgs, fset) = translate_fixture("nestedblock");
    let mut importer = Importer::new(build_ctx());
    pkgs[0]
        .verify(&fset, &mut importer)
        .expect("verification must pass");
}

#[test]
fn verification_reresolves_rewritten_functions() {
    let (mut pkgs, fset) = translate_fixture("simple");
    let pkg = &mut pkgs[0];

    // Simulate a pipeline bug: clobber the declared result type of the
    // rewritten function so its frame no longer resolves. The structural
    // return-arity check alone cannot see this.
    let mut target = None;
    for &decl in pkg.arena.top_decls(pkg.files[0].ast.decls) {
        let TopLevelDecl::Func(id) = decl else { continue };
        let f = pkg.arena.funcs[id];
        if pkg.interner.resolve(f.name.sym) != "f" {
            continue;
        }
        let sig = pkg.arena.signatures[f.signature];
        let Some(Results::Params(fl)) = sig.results else {
            panic!("fixture function f must have parenthesized results");
        };
        let fid = pkg.arena.fields_list(fl.fields)[0];
        target = Some(pkg.arena.fields[fid].typ);
    }
    let target = target.expect("fixture function f not found");
    let bogus = pkg.interner.intern("Bogus");
    pkg.arena.types[target] = Type::Named {
        pkg: None,
        dot_pos: None,
        name: IdentName {
            sym: bogus,
            pos: Span::default(),
        },
    };

    let mut importer = Importer::new(build_ctx());
    let err = pkg
        .verify(&fset, &mut importer)
        .expect_err("verification must re-resolve the rewritten AST");
    let msg = err.to_string();
    assert!(msg.contains("verification after translation"), "{msg}");
    assert!(msg.contains("undeclared name: Bogus"), "{msg}");
}

// ---- error scenarios ----

/// Runs the pipeline over one inline source file and returns the error.
fn translate_error(src: &str) -> TranslateError {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("pkg");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("main.go"), src).unwrap();

    let mut fset = FileSet::new();
    let pkg = Package::parse_dir(&dir, &dir, &mut fset).expect("error fixtures must parse");
    let mut pkgs = vec![pkg];
    translate(&mut pkgs, &fset, &BuildContext::with_roots(vec![]))
        .expect_err("translation should fail")
}

#[test]
fn nested_try_is_reported_with_position() {
    let err = translate_error(
        "package p

func g() (int, error) {
	return 0, nil
}

func f() (int, error) {
	y := 1 + try(g())
	return y, nil
}
",
    );
    let msg = err.to_string();
    assert!(msg.contains("try() call was not translated"), "{msg}");
    assert!(msg.contains("main.go:8:"), "{msg}");
    assert!(msg.contains(": p: Error:"), "{msg}");
}

#[test]
fn try_argument_must_be_a_call() {
    let err = translate_error(
        "package p

func f() (int, error) {
	x := try(42)
	return x, nil
}
",
    );
    let msg = err.to_string();
    assert!(
        msg.contains("try() call's argument must be function call"),
        "{msg}"
    );
}

#[test]
fn try_takes_exactly_one_argument() {
    let err = translate_error(
        "package p

func g() (int, error) {
	return 0, nil
}

func f() (int, error) {
	x := try(g(), g())
	return x, nil
}
",
    );
    let msg = err.to_string();
    assert!(
        msg.contains("try() should take 1 argument but 2 arguments passed"),
        "{msg}"
    );
}

#[test]
fn try_outside_function_is_rejected() {
    let err = translate_error(
        "package p

func g() (int, error) {
	return 0, nil
}

var x = try(g())
",
    );
    let msg = err.to_string();
    assert!(msg.contains("try() function is used outside function"), "{msg}");
}

#[test]
fn enclosing_function_must_return_error_last() {
    let err = translate_error(
        "package p

func g() (int, error) {
	return 0, nil
}

func f() int {
	x := try(g())
	return x
}
",
    );
    let msg = err.to_string();
    assert!(
        msg.contains("does not return error as last return value"),
        "{msg}"
    );
}

#[test]
fn function_returning_nothing_cannot_use_try() {
    let err = translate_error(
        "package p

func g() error {
	return nil
}

func f() {
	try(g())
}
",
    );
    let msg = err.to_string();
    assert!(msg.contains("The function returns nothing"), "{msg}");
}

#[test]
fn compound_assignment_is_rejected() {
    let err = translate_error(
        "package p

func g() (int, error) {
	return 0, nil
}

func f() (int, error) {
	n := 0
	n += try(g())
	return n, nil
}
",
    );
    let msg = err.to_string();
    assert!(
        msg.contains("try() can only be used with = and :="),
        "{msg}"
    );
    assert!(msg.contains("+="), "{msg}");
}

#[test]
fn const_declarations_cannot_use_try() {
    let err = translate_error(
        "package p

func g() (int, error) {
	return 0, nil
}

func f() (int, error) {
	const x = try(g())
	return x, nil
}
",
    );
    let msg = err.to_string();
    assert!(msg.contains("const declaration"), "{msg}");
}

#[test]
fn unresolvable_toplevel_call_is_a_type_error() {
    let err = translate_error(
        "package p

func f() error {
	try(unknown())
	return nil
}
",
    );
    let msg = err.to_string();
    assert!(msg.contains("Type error(s) at phase-1"), "{msg}");
    assert!(msg.contains("undeclared name: unknown"), "{msg}");
}

#[test]
fn block_locality_of_generated_error_names() {
    // Two sibling blocks each restart the _errN counter; no sharing.
    let (pkgs, _) = translate_fixture("nestedblock");
    let pkg = &pkgs[0];
    let mut out = Vec::new();
    let want_path = testdata()
        .join("trans")
        .join("nestedblock")
        .join("want")
        .join("ok.go");
    pkg.write_file_to(&mut out, &want_path).unwrap();
    let text = String::from_utf8(out).unwrap();
    // `_err0` appears once per block that needs one; `_err1` never does,
    // because no block holds two value-binding translations here.
    assert!(text.matches("_err0").count() >= 8, "{text}");
    assert!(!text.contains("_err1"), "{text}");
}
