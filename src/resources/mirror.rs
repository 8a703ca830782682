//! Filtered directory mirroring.
//!
//! Copies an allow-listed subset of a source tree into a destination,
//! deleting anything at the destination that the source no longer provides.
//! Script-like files have unsupported directive lines removed on the way.
use anyhow::{Context as _, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::helpers::fs::{file_sha256, path_present, remove_any, sha256_hex, write_atomic};

/// Entry names never copied, at any depth.
pub const DENYLIST: &[&str] = &[
    ".git",
    ".github",
    ".gitignore",
    ".gitmodules",
    "plugins",
    "plugin",
    "CMakeLists.txt",
    "Makefile",
    "meson.build",
    "MIGRATION.md",
];

/// Extensions whose content is scanned for directive lines.
pub const SCRIPT_EXTENSIONS: &[&str] = &["qml", "js", "mjs", "sh"];

/// Which files a filtered copy materialises and how it rewrites them.
#[derive(Debug, Clone)]
pub struct CopyFilter {
    allowed_extensions: Vec<String>,
    directive: Option<Regex>,
}

impl CopyFilter {
    /// Allow files whose extension (case-insensitive) is in `allowed`.
    #[must_use]
    pub fn new(allowed: &[&str]) -> Self {
        Self {
            allowed_extensions: allowed.iter().map(|e| e.to_ascii_lowercase()).collect(),
            directive: None,
        }
    }

    /// Strip lines carrying `keyword` from script-like files.
    ///
    /// A line matches when, after optional indentation, an optional `//` or
    /// `#` comment marker and an optional `@`, it starts with the keyword as
    /// a whole word. Words of a multi-word keyword may be separated by any
    /// run of whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyword is empty.
    pub fn with_directive(mut self, keyword: &str) -> Result<Self> {
        let words: Vec<String> = keyword.split_whitespace().map(regex::escape).collect();
        anyhow::ensure!(!words.is_empty(), "directive keyword is empty");
        let pattern = format!(r"^\s*(//|#)?\s*@?{}\b", words.join(r"\s+"));
        self.directive =
            Some(Regex::new(&pattern).with_context(|| format!("invalid directive: {keyword}"))?);
        Ok(self)
    }

    /// Whether `path` has an allowed extension.
    #[must_use]
    pub fn allows(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }

    /// Remove directive lines from `content`, keeping every other line and
    /// its line ending. Returns the new content and the number of lines
    /// removed.
    #[must_use]
    pub fn strip_directives(&self, content: &str) -> (String, usize) {
        let Some(re) = &self.directive else {
            return (content.to_string(), 0);
        };
        let mut out = String::with_capacity(content.len());
        let mut removed = 0;
        for line in content.split_inclusive('\n') {
            if re.is_match(line.trim_end_matches(['\n', '\r'])) {
                removed += 1;
            } else {
                out.push_str(line);
            }
        }
        (out, removed)
    }

    fn render(&self, source: &Path) -> Result<(Vec<u8>, usize)> {
        let bytes =
            std::fs::read(source).with_context(|| format!("read {}", source.display()))?;
        let scriptable = extension_of(source)
            .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext.as_str()));
        if !scriptable || self.directive.is_none() {
            return Ok((bytes, 0));
        }
        match String::from_utf8(bytes) {
            Ok(text) => {
                let (stripped, removed) = self.strip_directives(&text);
                Ok((stripped.into_bytes(), removed))
            }
            Err(e) => Ok((e.into_bytes(), 0)),
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn denied(name: &std::ffi::OsStr) -> bool {
    DENYLIST.iter().any(|d| name == *d)
}

/// Counters produced by [`mirror`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorStats {
    /// Files written because they were new or differed.
    pub copied: usize,
    /// Files left alone because their content already matched.
    pub unchanged: usize,
    /// Destination files and directories deleted.
    pub pruned: usize,
    /// Directive lines removed across all written files.
    pub stripped_lines: usize,
}

/// Mirror the allowed part of `source` into `dest`.
///
/// A symlink or file occupying `dest` is replaced by a real directory.
/// Symlinks inside `source` are not followed and not copied.
///
/// # Errors
///
/// Returns an error on the first file that cannot be read, written or
/// removed.
pub fn mirror(source: &Path, dest: &Path, filter: &CopyFilter) -> Result<MirrorStats> {
    let mut stats = MirrorStats::default();
    if path_present(dest) && !is_real_dir(dest) {
        remove_any(dest)?;
        stats.pruned += 1;
    }
    std::fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;

    let mut kept = HashSet::new();
    copy_tree(source, dest, Path::new(""), filter, &mut kept, &mut stats)?;
    prune_tree(dest, Path::new(""), &kept, &mut stats)?;
    Ok(stats)
}

fn is_real_dir(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_dir())
}

fn copy_tree(
    src_dir: &Path,
    dest_root: &Path,
    rel: &Path,
    filter: &CopyFilter,
    kept: &mut HashSet<PathBuf>,
    stats: &mut MirrorStats,
) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(src_dir)
        .with_context(|| format!("reading directory {}", src_dir.display()))?
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("reading entry in {}", src_dir.display()))?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name();
        if denied(&name) {
            continue;
        }
        let src_path = entry.path();
        let rel_path = rel.join(&name);
        let dest_path = dest_root.join(&rel_path);
        let file_type = entry
            .file_type()
            .with_context(|| format!("reading file type of {}", src_path.display()))?;

        if file_type.is_dir() {
            copy_tree(&src_path, dest_root, &rel_path, filter, kept, stats)?;
        } else if file_type.is_file() && filter.allows(&src_path) {
            let (contents, removed) = filter.render(&src_path)?;
            let same = dest_path
                .symlink_metadata()
                .is_ok_and(|m| m.is_file())
                && file_sha256(&dest_path).as_deref() == Some(sha256_hex(&contents).as_str());
            if same {
                stats.unchanged += 1;
            } else {
                if path_present(&dest_path) {
                    remove_any(&dest_path)?;
                }
                clear_non_dir_ancestors(dest_root, &rel_path)?;
                write_atomic(&dest_path, &contents)?;
                stats.copied += 1;
                stats.stripped_lines += removed;
            }
            for ancestor in rel_path.ancestors() {
                kept.insert(ancestor.to_path_buf());
            }
        }
    }
    Ok(())
}

/// Remove files or links sitting where a directory of `rel`'s parent chain
/// must go.
fn clear_non_dir_ancestors(dest_root: &Path, rel: &Path) -> Result<()> {
    let Some(parent) = rel.parent() else {
        return Ok(());
    };
    let mut current = dest_root.to_path_buf();
    for part in parent.components() {
        current.push(part);
        if path_present(&current) && !is_real_dir(&current) {
            remove_any(&current)?;
        }
    }
    Ok(())
}

/// Delete everything under `dir` that is not in `kept`; returns whether
/// `dir` ended up empty.
fn prune_tree(
    dir: &Path,
    rel: &Path,
    kept: &HashSet<PathBuf>,
    stats: &mut MirrorStats,
) -> Result<bool> {
    let mut empty = true;
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let path = entry.path();
        let rel_path = rel.join(entry.file_name());

        if !kept.contains(&rel_path) {
            remove_any(&path)?;
            stats.pruned += 1;
            continue;
        }
        if is_real_dir(&path) && prune_tree(&path, &rel_path, kept, stats)? {
            std::fs::remove_dir(&path)
                .with_context(|| format!("remove empty directory {}", path.display()))?;
            stats.pruned += 1;
            continue;
        }
        empty = false;
    }
    Ok(empty)
}
