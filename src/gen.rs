//! Generator: directory discovery, parsing, translation and output.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use trygo_parser::fileset::FileSet;

use crate::buildctx::BuildContext;
use crate::diag::{Result, TranslateError};
use crate::pkg::Package;
use crate::resolve::Importer;
use crate::translate::translate;

/// Drives TryGo-to-Go generation: discovers package directories, parses
/// and translates them, and writes the mirrored output tree. Paths of
/// written files go to `writer` in visitation order.
#[derive(Debug)]
pub struct Gen<W: Write> {
    /// Output directory; empty in check-only mode (outputs then map onto
    /// their origins and nothing is written).
    pub out_dir: PathBuf,
    pub writer: W,
    pub build_ctx: BuildContext,
}

impl Gen<std::io::Stdout> {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_writer(out_dir, std::io::stdout())
    }
}

impl<W: Write> Gen<W> {
    pub fn with_writer(out_dir: impl Into<PathBuf>, writer: W) -> Result<Self> {
        let out_dir: PathBuf = out_dir.into();
        if out_dir.as_os_str().is_empty() {
            return Err(TranslateError::usage("Output directory must be given"));
        }
        Ok(Self {
            out_dir: absolutize(out_dir)?,
            writer,
            build_ctx: BuildContext::from_env(),
        })
    }

    /// Check-only generator; no output directory involved.
    pub fn checker(writer: W) -> Self {
        Self {
            out_dir: PathBuf::new(),
            writer,
            build_ctx: BuildContext::from_env(),
        }
    }

    // ---- package discovery ----

    fn package_dirs_for_go_generate(&self) -> Result<Vec<PathBuf>> {
        if std::env::var_os("GOFILE").is_none() {
            return Err(TranslateError::usage(
                "`trygo` was not run from `go generate` and no path is given. Nothing to generate",
            ));
        }
        debug!("collect package dir for `go generate`");
        let cwd = std::env::current_dir().map_err(|e| TranslateError::ReadDir {
            path: PathBuf::from("."),
            source: e,
        })?;
        Ok(vec![cwd])
    }

    fn package_dirs_from_paths(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        debug!(?paths, "collect package dirs for given paths");
        let mut saw: Vec<PathBuf> = Vec::new();
        for path in paths {
            let path = absolutize(path.clone())?;
            for entry in WalkDir::new(&path) {
                let entry = entry.map_err(|e| TranslateError::ReadDir {
                    path: path.clone(),
                    source: e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("walk error")),
                })?;
                if entry.file_type().is_dir() {
                    continue;
                }
                if entry.path().extension().is_none_or(|ext| ext != "go") {
                    continue;
                }
                let dir = entry
                    .path()
                    .parent()
                    .expect("file entry without a parent directory")
                    .to_path_buf();
                if !saw.contains(&dir) {
                    saw.push(dir);
                }
            }
        }

        if saw.is_empty() {
            return Err(TranslateError::usage(format!(
                "No Go package is included in given paths: {paths:?}"
            )));
        }
        saw.sort();
        Ok(saw)
    }

    /// Package directories for the given paths; with no paths, the
    /// `GOFILE` code-generator mode uses the working directory.
    pub fn package_dirs(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if paths.is_empty() {
            self.package_dirs_for_go_generate()
        } else {
            self.package_dirs_from_paths(paths)
        }
    }

    /// Maps an input directory to its destination: the longest shared
    /// prefix with the output directory is substituted.
    ///
    /// ```text
    /// out_dir: /repo/out     input: /repo/foo/bar  ->  /repo/out/foo/bar
    /// ```
    pub fn out_file_path(&self, inpath: &Path) -> PathBuf {
        if self.out_dir.as_os_str().is_empty() {
            return inpath.to_path_buf();
        }
        let mut d = self.out_dir.as_path();
        while !inpath.starts_with(d) {
            match d.parent() {
                Some(parent) => d = parent,
                None => return self.out_dir.join(inpath),
            }
        }
        let part = inpath.strip_prefix(d).expect("prefix just verified");
        self.out_dir.join(part)
    }

    // ---- pipeline ----

    /// Parses and translates all packages under `pkg_dirs`.
    pub fn translate_packages(&mut self, pkg_dirs: &[PathBuf]) -> Result<(Vec<Package>, FileSet)> {
        debug!(?pkg_dirs, "parse package directories");
        let mut fset = FileSet::new();
        let mut pkgs = Vec::with_capacity(pkg_dirs.len());
        for dir in pkg_dirs {
            let dest = self.out_file_path(dir);
            pkgs.push(Package::parse_dir(dir, &dest, &mut fset)?);
        }

        translate(&mut pkgs, &fset, &self.build_ctx)?;
        Ok((pkgs, fset))
    }

    /// Full generation: discover, translate, optionally verify, write.
    pub fn generate(&mut self, paths: &[PathBuf], verify: bool) -> Result<()> {
        debug!(out_dir = %self.out_dir.display(), "create outdir");
        std::fs::create_dir_all(&self.out_dir).map_err(|e| TranslateError::WriteFile {
            path: self.out_dir.clone(),
            source: e,
        })?;

        let dirs = self.package_dirs(paths)?;
        debug!(?dirs, "package directories");
        let (pkgs, fset) = self.translate_packages(&dirs)?;

        if verify {
            let mut importer = Importer::new(self.build_ctx.clone());
            for pkg in pkgs.iter().filter(|p| p.modified()) {
                pkg.verify(&fset, &mut importer)?;
            }
        }

        for pkg in &pkgs {
            for path in pkg.write()? {
                writeln!(self.writer, "{}", path.display()).map_err(|e| {
                    TranslateError::WriteFile {
                        path: path.clone(),
                        source: e,
                    }
                })?;
            }
        }
        Ok(())
    }

    /// Check-only mode: runs the full pipeline including verification
    /// but emits no files.
    pub fn check(&mut self, paths: &[PathBuf]) -> Result<()> {
        let dirs = self.package_dirs(paths)?;
        let (pkgs, fset) = self.translate_packages(&dirs)?;
        let mut importer = Importer::new(self.build_ctx.clone());
        for pkg in pkgs.iter().filter(|p| p.modified()) {
            pkg.verify(&fset, &mut importer)?;
        }
        Ok(())
    }
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| TranslateError::ReadDir {
        path: PathBuf::from("."),
        source: e,
    })?;
    Ok(cwd.join(path))
}
