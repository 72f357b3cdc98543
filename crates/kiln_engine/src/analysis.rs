//! Stages 1 to 4: index, apply the cache, extract includes, mark changes.

use kiln_cache::{CacheEntry, CacheSnapshot, CacheStore};
use kiln_common::FileId;
use kiln_config::LinkerConfig;
use kiln_diagnostics::{codes, Diagnostic, DiagnosticSink};
use kiln_graph::{add_include_edges, resolve_include, scan_missing_includes, Graph};
use kiln_index::{index, FileIdx, FileTree, Role};
use kiln_table::KeySet;

use crate::error::EngineError;
use crate::plan::BuildPlan;

/// Why a file was seeded into the changed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Seed {
    New,
    Modified,
}

/// Everything known about a target before anything is compiled.
pub(crate) struct Analysis {
    pub tree: FileTree,
    changed: KeySet,
    /// Files the cache has never seen.
    pub new: Vec<FileIdx>,
    /// Files whose hash, include resolution or object no longer match the cache.
    pub modified: Vec<FileIdx>,
    /// Files reached only by propagation along the include graph.
    pub affected: Vec<FileIdx>,
    /// Names of cached files that are gone, sorted.
    pub removed: Vec<String>,
    cached_linker: Option<LinkerConfig>,
}

impl Analysis {
    /// Changed translation units in walk order.
    pub fn to_compile(&self) -> Vec<FileIdx> {
        self.tree
            .iter()
            .filter(|(_, file)| file.is_compiled())
            .filter(|(_, file)| self.changed.has(file.id.as_raw()))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Returns `true` if the last link used another linker or base flags.
    /// Without a cache there was no last link.
    pub fn linker_changed(&self, linker: &LinkerConfig) -> bool {
        self.cached_linker
            .as_ref()
            .is_some_and(|cached| cached != linker)
    }
}

/// Runs the stages that decide what a build has to do.
///
/// Reads the source tree and the cache but writes nothing.
pub(crate) fn analyze(plan: &BuildPlan, sink: &DiagnosticSink) -> Result<Analysis, EngineError> {
    let mut tree = index(&plan.project_root, &plan.target, sink)?;
    stage(sink, format!("indexed {} files", tree.len()));

    let snapshot = CacheStore::new(&plan.cache_path).load(sink);
    let mut new = Vec::new();
    let mut modified = Vec::new();
    let mut reused = 0usize;
    for idx in tree.indices().collect::<Vec<_>>() {
        if matches!(tree.get(idx).role, Role::Directory { .. }) {
            continue;
        }
        match apply_cache(plan, &mut tree, idx, snapshot.as_ref()) {
            Some(Seed::New) => new.push(idx),
            Some(Seed::Modified) => modified.push(idx),
            None => reused += 1,
        }
    }
    tracing::debug!(reused, new = new.len(), modified = modified.len(), "applied cache");
    stage(sink, format!("{reused} files reused from cache"));

    let scanned = scan_missing_includes(&mut tree, &plan.project_root, sink);
    let mut includes = Graph::new();
    add_include_edges(&tree, &mut includes)?;
    stage(
        sink,
        format!("scanned {scanned} files, {} include edges", includes.edge_count()),
    );

    let mut changed = KeySet::new();
    let mut seeds: Vec<FileId> = Vec::with_capacity(new.len() + modified.len());
    for &idx in new.iter().chain(&modified) {
        let id = tree.get(idx).id;
        changed.insert(id.as_raw());
        seeds.push(id);
    }
    let mut affected = Vec::new();
    for id in includes.walk(seeds)? {
        if !changed.insert(id.as_raw()) {
            affected.push(tree.require(id)?);
        }
    }
    tracing::debug!(changed = changed.len(), affected = affected.len(), "propagated changes");

    let mut removed: Vec<String> = snapshot
        .as_ref()
        .map(|snap| {
            snap.entries()
                .filter(|entry| tree.lookup(entry.id).is_none())
                .map(|entry| entry.name.clone())
                .collect()
        })
        .unwrap_or_default();
    removed.sort();
    stage(
        sink,
        format!(
            "{} changed ({} through includes), {} removed",
            changed.len(),
            affected.len(),
            removed.len()
        ),
    );

    Ok(Analysis {
        tree,
        changed,
        new,
        modified,
        affected,
        removed,
        cached_linker: snapshot.map(|snap| snap.linker().clone()),
    })
}

/// Applies the cached sets of one file if they are still valid.
///
/// Returns the reason the file must be treated as changed, if any.
fn apply_cache(
    plan: &BuildPlan,
    tree: &mut FileTree,
    idx: FileIdx,
    snapshot: Option<&CacheSnapshot>,
) -> Option<Seed> {
    let file = tree.get(idx);
    let Some(entry) = snapshot.and_then(|snap| snap.get(file.id)) else {
        return Some(Seed::New);
    };
    if entry.kind != file.role.kind()
        || entry.hash != file.config_hash
        || !includes_resolve_alike(plan, tree, idx, entry)
    {
        return Some(Seed::Modified);
    }

    let object_missing = file.is_compiled() && !plan.object_path(file.id).exists();
    let poisoned = tree.config(idx).poisoned.is_some();
    let file = tree.get_mut(idx);
    entry.apply_to(&mut file.role);
    file.include_paths = entry.include_paths.clone();
    if poisoned || object_missing {
        Some(Seed::Modified)
    } else {
        None
    }
}

/// Returns `true` if the cached include targets still resolve to exactly
/// the cached include set.
///
/// A header created where an include used to miss, or one shadowing an
/// earlier resolution, or one removed, changes the answer even though the
/// includer itself is untouched.
fn includes_resolve_alike(plan: &BuildPlan, tree: &FileTree, idx: FileIdx, entry: &CacheEntry) -> bool {
    let mut resolved: Vec<FileId> = entry
        .include_paths
        .iter()
        .filter_map(|target| resolve_include(tree, &plan.project_root, idx, target))
        .map(|found| tree.get(found).id)
        .collect();
    resolved.sort();
    resolved.dedup();
    let mut cached = entry.includes.clone();
    cached.sort();
    cached.dedup();
    resolved == cached
}

fn stage(sink: &DiagnosticSink, message: String) {
    sink.emit(Diagnostic::debug(codes::STAGE, message));
}
