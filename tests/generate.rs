//! Generator tests: discovery, output mapping and full generation with
//! cross-package import rewriting.

use std::fs;
use std::path::{Path, PathBuf};

use trygo::{BuildContext, Gen};

fn testdata() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

#[test]
fn generate_nested_packages_with_import_rewrite() {
    let base = testdata().join("gen");
    let out_dir = base.join("HAVE");
    let _ = fs::remove_dir_all(&out_dir);

    let mut gen = Gen::with_writer(&out_dir, Vec::new()).unwrap();
    gen.build_ctx = BuildContext::with_roots(vec![base.clone()]);
    gen.generate(&[base.join("nested")], true).unwrap();

    // Every WANT file must have been produced with identical content.
    let mut produced = Vec::new();
    compare_tree(&base.join("WANT"), &base.join("HAVE"), &mut produced);
    assert!(!produced.is_empty());

    // All written paths are listed on the writer, in order.
    let stdout = String::from_utf8(gen.writer).unwrap();
    for path in &produced {
        assert!(
            stdout.contains(&path.display().to_string()),
            "{} missing from output listing:\n{stdout}",
            path.display()
        );
    }

    let _ = fs::remove_dir_all(&out_dir);
}

fn compare_tree(want_root: &Path, have_root: &Path, produced: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(want_root).unwrap() {
        let want_path = entry.unwrap().path();
        let have_path = have_root.join(want_path.file_name().unwrap());
        if want_path.is_dir() {
            compare_tree(&want_path, &have_path, produced);
            continue;
        }
        let want = fs::read_to_string(&want_path).unwrap();
        let have = fs::read_to_string(&have_path)
            .unwrap_or_else(|e| panic!("missing output {}: {e}", have_path.display()));
        assert_eq!(have, want, "mismatch at {}", have_path.display());
        produced.push(have_path);
    }
}

#[test]
fn check_mode_emits_no_files() {
    let base = testdata().join("trans").join("simple").join("src");
    let before = fs::read_dir(&base).unwrap().count();

    let mut gen = Gen::checker(Vec::new());
    gen.build_ctx = BuildContext::with_roots(vec![testdata().join("goroot")]);
    gen.check(&[base.clone()]).unwrap();

    let after = fs::read_dir(&base).unwrap().count();
    assert_eq!(before, after);
    assert!(gen.writer.is_empty());
}

#[test]
fn out_file_path_substitutes_shared_prefix() {
    let gen = Gen::with_writer("/repo/out", Vec::new()).unwrap();
    assert_eq!(
        gen.out_file_path(Path::new("/repo/foo/bar")),
        PathBuf::from("/repo/out/foo/bar")
    );
    assert_eq!(
        gen.out_file_path(Path::new("/repo/out/x")),
        PathBuf::from("/repo/out/x")
    );
}

#[test]
fn package_dir_discovery_modes() {
    // The three discovery behaviors share one test because they touch the
    // process-global GOFILE variable.
    std::env::remove_var("GOFILE");

    let gen = Gen::with_writer("/tmp/trygo-out", Vec::new()).unwrap();

    // 1. No paths, no GOFILE: the generator refuses to guess.
    let err = gen.package_dirs(&[]).unwrap_err();
    assert!(err
        .to_string()
        .contains("not run from `go generate` and no path is given"));

    // 2. GOFILE set: the working directory is the package.
    std::env::set_var("GOFILE", "foo.go");
    let dirs = gen.package_dirs(&[]).unwrap();
    assert_eq!(dirs, vec![std::env::current_dir().unwrap()]);
    std::env::remove_var("GOFILE");

    // 3. Paths are scanned recursively for Go files.
    let dirs = gen.package_dirs(&[testdata().join("gen").join("nested")]).unwrap();
    assert_eq!(dirs.len(), 2);
    assert!(dirs[0].ends_with("nested/a"));
    assert!(dirs[1].ends_with("nested/b"));
}

#[test]
fn discovery_errors() {
    let gen = Gen::with_writer("/tmp/trygo-out", Vec::new()).unwrap();

    let err = gen
        .package_dirs(&[PathBuf::from("/path/to/unknown")])
        .unwrap_err();
    assert!(err.to_string().contains("Cannot read directory"), "{err}");

    let tmp = tempfile::tempdir().unwrap();
    let err = gen.package_dirs(&[tmp.path().to_path_buf()]).unwrap_err();
    assert!(
        err.to_string().contains("No Go package is included"),
        "{err}"
    );
}

#[test]
fn empty_output_directory_is_rejected() {
    let err = Gen::with_writer("", Vec::new()).unwrap_err();
    assert!(err.to_string().contains("Output directory must be given"));
}
