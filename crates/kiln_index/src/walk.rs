//! Walking a target's tree into a [`FileTree`].

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use kiln_common::{normalize, path_key, FileId, MTime};
use kiln_config::{compose, BuildFragment, ResolvedTarget, SourceKind};
use kiln_diagnostics::{codes, Diagnostic, DiagnosticSink};
use kiln_table::{KeySet, Table};

use crate::error::IndexError;
use crate::file::{File, Role};
use crate::ids::{ConfigIdx, FileIdx};
use crate::tree::{configuration_hash, ConfigEntry, FileTree};

/// Indexes a target rooted at `project_root`.
///
/// The build directory, the target's `ignore` paths and dotfiles are skipped.
/// Files no compiler claims are left out. Unreadable entries and duplicate
/// identities (hard links, symlink loops) are reported as warnings and
/// skipped. A missing or ambiguous entry file is fatal.
pub fn index(
    project_root: &Path,
    target: &ResolvedTarget,
    sink: &DiagnosticSink,
) -> Result<FileTree, IndexError> {
    let root_rel = normalize(&target.root);
    let root_path = normalize(&project_root.join(&root_rel));
    let meta = fs::metadata(&root_path).map_err(|source| IndexError::Io {
        path: root_path.clone(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(IndexError::NotADirectory(root_path));
    }

    let mut walker = Walker::new(project_root, target, sink);
    let base = walker
        .tree
        .push_config(ConfigEntry::new(target.base.clone()));
    let root = walker
        .walk(root_rel, None, base)
        .ok_or_else(|| IndexError::NotADirectory(root_path.clone()))?;

    let root_config = walker.tree.get(root).config;
    for extra in &target.extra {
        walker.walk(normalize(extra), Some(root), root_config);
    }

    walker.report_unmatched_fragments();
    let entry = find_entry(&walker.tree, &target.entry)?;
    walker.tree.set_entry(entry);

    tracing::debug!(
        target = %target.name,
        files = walker.tree.len(),
        entry = %walker.tree.get(entry).rel.display(),
        "indexed target"
    );
    Ok(walker.tree)
}

struct Walker<'a> {
    project_root: &'a Path,
    target: &'a ResolvedTarget,
    sink: &'a DiagnosticSink,
    tree: FileTree,
    ignored: KeySet,
    fragments: Table<(PathBuf, BuildFragment)>,
    matched: KeySet,
}

impl<'a> Walker<'a> {
    fn new(project_root: &'a Path, target: &'a ResolvedTarget, sink: &'a DiagnosticSink) -> Self {
        let mut ignored = KeySet::new();
        ignored.insert(path_key(&target.build_dir));
        for path in &target.ignore {
            ignored.insert(path_key(path));
        }
        let mut fragments = Table::new();
        for (path, fragment) in &target.fragments {
            fragments.add(path_key(path), (path.clone(), fragment.clone()));
        }
        Self {
            project_root,
            target,
            sink,
            tree: FileTree::new(),
            ignored,
            fragments,
            matched: KeySet::new(),
        }
    }

    /// Indexes `rel` and everything below it, appending it to `parent`'s
    /// children. Returns the index of `rel` itself.
    fn walk(&mut self, rel: PathBuf, parent: Option<FileIdx>, inherited: ConfigIdx) -> Option<FileIdx> {
        let mut top = None;
        let mut pending = vec![(rel, parent, inherited)];
        while let Some((rel, parent, inherited)) = pending.pop() {
            let Some(idx) = self.visit(&rel, parent, inherited) else {
                continue;
            };
            if top.is_none() {
                top = Some(idx);
            }
            if let Some(parent) = parent {
                if let Role::Directory { children } = &mut self.tree.get_mut(parent).role {
                    children.push(idx);
                }
            }

            let file = self.tree.get(idx);
            if matches!(file.role, Role::Directory { .. }) {
                let (path, config) = (file.path.clone(), file.config);
                // Reversed so siblings pop in name order.
                for name in self.read_children(&path, &rel).into_iter().rev() {
                    pending.push((normalize(&rel.join(&name)), Some(idx), config));
                }
            }
        }
        top
    }

    fn visit(&mut self, rel: &Path, parent: Option<FileIdx>, inherited: ConfigIdx) -> Option<FileIdx> {
        let key = path_key(rel);
        if self.ignored.has(key) {
            return None;
        }
        let path = normalize(&self.project_root.join(rel));
        let meta = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(err) => {
                self.skip(rel, format!("cannot read {}: {err}", rel.display()));
                return None;
            }
        };

        let fragment = self.fragments.get(key).map(|(_, f)| f.clone());
        if fragment.is_some() {
            self.matched.insert(key);
        }
        let config = self.compose(inherited, fragment.as_ref(), rel);

        let role = if meta.is_dir() {
            Role::Directory {
                children: Vec::new(),
            }
        } else if meta.is_file() {
            self.classify(rel, config)?
        } else {
            return None;
        };

        let id = FileId::of(&path, &meta);
        let mtime = MTime::of(&meta);
        let config_hash = configuration_hash(id, mtime, self.tree.config_at(config));
        let name = rel
            .file_name()
            .or_else(|| path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| rel.display().to_string());

        let file = File {
            id,
            mtime,
            path,
            rel: rel.to_path_buf(),
            name,
            parent,
            fragment,
            config,
            config_hash,
            include_paths: Vec::new(),
            role,
        };
        let idx = self.tree.push(file);
        if idx.is_none() {
            self.skip(rel, format!("{} is already indexed under another path", rel.display()));
        }
        idx
    }

    fn classify(&self, rel: &Path, config: ConfigIdx) -> Option<Role> {
        let compiler = &self.tree.config_at(config).resolved.compiler;
        match self.target.registry.classify(compiler, rel)? {
            SourceKind::Header => Some(Role::Interface { includes: None }),
            SourceKind::Source => {
                let prefix = &self.target.test_prefix;
                let is_test = !prefix.is_empty()
                    && rel
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(prefix.as_str()));
                Some(if is_test {
                    Role::test()
                } else {
                    Role::implementation()
                })
            }
        }
    }

    fn compose(&mut self, inherited: ConfigIdx, fragment: Option<&BuildFragment>, rel: &Path) -> ConfigIdx {
        let Some(fragment) = fragment else {
            return inherited;
        };
        let parent = self.tree.config_at(inherited);
        if parent.poisoned.is_some() {
            return inherited;
        }
        let entry = match compose(&parent.resolved, fragment) {
            Ok(resolved) => ConfigEntry::new(resolved),
            Err(err) => {
                self.sink.emit(
                    Diagnostic::error(codes::FLAG_CONFLICT, err.to_string())
                        .with_path(rel)
                        .with_note("files under this path will not be compiled"),
                );
                let mut entry = parent.clone();
                entry.poisoned = Some(rel.to_path_buf());
                entry
            }
        };
        self.tree.push_config(entry)
    }

    fn read_children(&self, path: &Path, rel: &Path) -> Vec<OsString> {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                self.skip(rel, format!("cannot list {}: {err}", rel.display()));
                return Vec::new();
            }
        };
        let mut names: Vec<OsString> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name())
            .filter(|name| !name.to_string_lossy().starts_with('.'))
            .collect();
        names.sort();
        names
    }

    fn skip(&self, rel: &Path, message: String) {
        self.sink
            .emit(Diagnostic::warning(codes::SKIPPED_PATH, message).with_path(rel));
    }

    fn report_unmatched_fragments(&self) {
        for path in self.target.fragments.keys() {
            if !self.matched.has(path_key(path)) {
                self.sink.emit(
                    Diagnostic::warning(
                        codes::UNMATCHED_FRAGMENT,
                        format!("configuration for `{}` matches no indexed file", path.display()),
                    )
                    .with_path(path),
                );
            }
        }
    }
}

fn find_entry(tree: &FileTree, entry: &str) -> Result<FileIdx, IndexError> {
    let candidates: Vec<FileIdx> = tree
        .iter()
        .filter(|(_, file)| matches!(file.role, Role::Implementation { .. }))
        .filter(|(_, file)| file.rel.ends_with(entry))
        .map(|(idx, _)| idx)
        .collect();
    match candidates.as_slice() {
        [] => Err(IndexError::EntryNotFound(entry.to_string())),
        [only] => Ok(*only),
        _ => Err(IndexError::AmbiguousEntry {
            entry: entry.to_string(),
            candidates: candidates
                .iter()
                .map(|&idx| tree.get(idx).rel.clone())
                .collect(),
        }),
    }
}
