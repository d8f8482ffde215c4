//! Find the LookML files of a project and load their text.
//!
//! A directory is searched for `**/*.lkml` and `**/*.lookml`; a single file
//! is linted on its own. Either way, `include:` patterns of model files are
//! followed relative to the project root so that included files outside the
//! initial set are linted too.

use anyhow::{Context, Result};
use glob::Pattern;
use lkml_rules::SourceText;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extensions of LookML source files.
const EXTENSIONS: &[&str] = &["lkml", "lookml"];

/// Files to lint, in a deterministic order.
#[derive(Debug, Default)]
pub(crate) struct Discovery {
    /// Directory include patterns and output paths are relative to
    pub root: PathBuf,
    /// Sorted file paths
    pub files: Vec<PathBuf>,
    /// `(model file, pattern)` pairs that matched nothing
    pub unmatched_includes: Vec<(String, String)>,
}

impl Discovery {
    /// Discover the files under `path`, skipping `exclude` globs
    /// (relative to the project root).
    pub(crate) fn run(path: &Path, exclude: &[String]) -> Result<Self> {
        let (root, initial) = if path.is_dir() {
            (path.to_path_buf(), find_lookml_files(path)?)
        } else if path.is_file() {
            let root = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            (root, vec![path.to_path_buf()])
        } else {
            anyhow::bail!("Path not found: {}", path.display());
        };

        let exclude = compile_excludes(exclude)?;
        let mut discovery = Discovery {
            root,
            ..Default::default()
        };
        let mut seen: BTreeSet<PathBuf> = BTreeSet::new();
        let mut queue: Vec<PathBuf> = Vec::new();
        for file in initial {
            if !discovery.is_excluded(&file, &exclude) && seen.insert(file.clone()) {
                queue.push(file);
            }
        }

        // Follow includes of model files until no new file shows up.
        while let Some(file) = queue.pop() {
            if !is_model_file(&file) {
                continue;
            }
            for pattern in read_includes(&file) {
                let Some(matches) = discovery.resolve_include(&pattern)? else {
                    log::debug!("Not following remote include {pattern}");
                    continue;
                };
                if matches.is_empty() {
                    discovery
                        .unmatched_includes
                        .push((discovery.relative(&file), pattern));
                    continue;
                }
                for found in matches {
                    if !discovery.is_excluded(&found, &exclude) && seen.insert(found.clone()) {
                        queue.push(found);
                    }
                }
            }
        }

        discovery.files = seen.into_iter().collect();
        discovery.unmatched_includes.sort();
        log::debug!(
            "Discovered {} LookML files under {}",
            discovery.files.len(),
            discovery.root.display()
        );
        Ok(discovery)
    }

    /// Read every discovered file.
    ///
    /// Unreadable files are skipped with a warning so one bad file does not
    /// stop the run.
    pub(crate) fn load(&self) -> Vec<SourceText> {
        let mut sources = Vec::with_capacity(self.files.len());
        for file in &self.files {
            match std::fs::read_to_string(file) {
                Ok(text) => sources.push(SourceText::new(self.relative(file), text)),
                Err(e) => {
                    eprintln!("[warn] Skipping unreadable file {}: {}", file.display(), e)
                }
            }
        }
        sources
    }

    /// Path as shown in output: relative to the root, `/`-separated.
    pub(crate) fn relative(&self, file: &Path) -> String {
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn is_excluded(&self, file: &Path, exclude: &[Pattern]) -> bool {
        let relative = self.relative(file);
        exclude.iter().any(|p| p.matches(&relative))
    }

    /// Files an `include:` pattern names, `None` for remote dependencies
    /// (`//project/...`), which are not followed.
    ///
    /// Leading `/` means the project root; a pattern without a LookML
    /// extension gets `.lkml` appended (`*.view` matches `*.view.lkml`).
    fn resolve_include(&self, pattern: &str) -> Result<Option<Vec<PathBuf>>> {
        if pattern.starts_with("//") {
            return Ok(None);
        }
        let mut relative = pattern.trim_start_matches('/').to_string();
        if !EXTENSIONS.iter().any(|ext| relative.ends_with(&format!(".{ext}"))) {
            relative.push_str(".lkml");
        }
        let full = self.root.join(&relative);
        let mut found = glob_files(&full.to_string_lossy())?;
        found.sort();
        Ok(Some(found))
    }
}

fn find_lookml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for ext in EXTENSIONS {
        let pattern = dir.join("**").join(format!("*.{ext}"));
        files.extend(glob_files(&pattern.to_string_lossy())?);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn glob_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries =
        glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("Cannot read {}: {}", e.path().display(), e),
        }
    }
    Ok(files)
}

fn compile_excludes(exclude: &[String]) -> Result<Vec<Pattern>> {
    exclude
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}")))
        .collect()
}

fn is_model_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".model.lkml"))
}

/// `include:` patterns of a model file.
///
/// Files that fail to read or parse contribute nothing here; the lint run
/// reports them.
fn read_includes(file: &Path) -> Vec<String> {
    let Ok(text) = std::fs::read_to_string(file) else {
        return Vec::new();
    };
    match lkml_parser::parse_document(&file.to_string_lossy(), &text) {
        Ok(document) => document.includes().into_iter().map(String::from).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
