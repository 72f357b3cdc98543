//! Resolving include directives and building the include graph.

use std::fs;
use std::path::{Path, PathBuf};

use kiln_common::KilnResult;
use kiln_diagnostics::{codes, Diagnostic, DiagnosticSink};
use kiln_index::{include_set, FileIdx, FileTree, Role};

use crate::graph::Graph;
use crate::scan::scan_includes;

/// Include search directories named by `-I<dir>` or `-I <dir>` flags.
pub fn include_dirs(flags: &[String]) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        if flag == "-I" {
            if let Some(dir) = iter.next() {
                dirs.push(PathBuf::from(dir));
            }
        } else if let Some(dir) = flag.strip_prefix("-I") {
            dirs.push(PathBuf::from(dir));
        }
    }
    dirs
}

/// Resolves a quoted include to an indexed file.
///
/// The including file's directory is searched first, then each `-I`
/// directory of the includer's compiler flags, relative to `project_root`.
pub fn resolve_include(
    tree: &FileTree,
    project_root: &Path,
    includer: FileIdx,
    target: &str,
) -> Option<FileIdx> {
    let file = tree.get(includer);
    let local = file.path.parent().map(|dir| dir.join(target));
    let searched = include_dirs(tree.config(includer).resolved.compiler_flags.flags())
        .into_iter()
        .map(|dir| project_root.join(dir).join(target));

    local
        .into_iter()
        .chain(searched)
        .filter_map(|candidate| tree.lookup_path(&candidate))
        .find(|&idx| !matches!(tree.get(idx).role, Role::Directory { .. }))
}

/// Scans every non-directory file whose include set is still unknown.
///
/// Every quoted target is recorded in the file's `include_paths`. Targets
/// that resolve to no indexed file are reported and left out of the include
/// set. A file
/// that cannot be read is reported and keeps an unknown include set. Returns
/// the number of files scanned.
pub fn scan_missing_includes(tree: &mut FileTree, project_root: &Path, sink: &DiagnosticSink) -> usize {
    let pending: Vec<FileIdx> = tree
        .iter()
        .filter(|(_, file)| !matches!(file.role, Role::Directory { .. }))
        .filter(|(_, file)| file.role.includes().is_none())
        .map(|(idx, _)| idx)
        .collect();

    for &idx in &pending {
        let file = tree.get(idx);
        let bytes = match fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                sink.emit(
                    Diagnostic::error(
                        codes::UNREADABLE_PATH,
                        format!("cannot read {}: {err}", file.rel.display()),
                    )
                    .with_path(&file.rel),
                );
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let mut targets = scan_includes(&text);
        targets.sort();
        targets.dedup();
        let mut ids = Vec::new();
        for target in &targets {
            match resolve_include(tree, project_root, idx, target) {
                Some(found) => ids.push(tree.get(found).id),
                None => sink.emit(
                    Diagnostic::warning(
                        codes::MISSING_INCLUDE,
                        format!("included file \"{target}\" not found"),
                    )
                    .with_path(&file.rel),
                ),
            }
        }
        let file = tree.get_mut(idx);
        file.role.set_includes(include_set(ids));
        file.include_paths = targets;
    }

    tracing::debug!(scanned = pending.len(), "scanned includes");
    pending.len()
}

/// Adds every non-directory file as a node and an edge from each included
/// file to its includer.
pub fn add_include_edges(tree: &FileTree, graph: &mut Graph) -> KilnResult<()> {
    for (_, file) in tree.iter() {
        if !matches!(file.role, Role::Directory { .. }) {
            graph.add_node(file.id);
        }
    }
    for (_, file) in tree.iter() {
        let Some(includes) = file.role.includes() else {
            continue;
        };
        for &included in includes.values() {
            graph.add_edge(included, file.id)?;
        }
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built include graph"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::{load_config_from_str, resolve_target};
    use kiln_index::index;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn build(root: &Path, target_toml: &str) -> (FileTree, DiagnosticSink) {
        let toml = format!(
            "[project]\nname = \"p\"\nversion = \"1\"\n\n[targets.app]\nentry = \"main.c\"\n{target_toml}"
        );
        let config = load_config_from_str(&toml).unwrap();
        let target = resolve_target(&config, "app").unwrap();
        let sink = DiagnosticSink::new();
        let mut tree = index(root, &target, &sink).unwrap();
        scan_missing_includes(&mut tree, root, &sink);
        (tree, sink)
    }

    fn idx(tree: &FileTree, rel: &str) -> FileIdx {
        tree.iter()
            .find(|(_, f)| f.rel == Path::new(rel))
            .map(|(i, _)| i)
            .unwrap_or_else(|| panic!("{rel} not indexed"))
    }

    #[test]
    fn include_dirs_accepts_both_spellings() {
        let flags: Vec<String> = ["-Iinc", "-O2", "-I", "other", "-I"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            include_dirs(&flags),
            vec![PathBuf::from("inc"), PathBuf::from("other")]
        );
    }

    #[test]
    fn resolves_relative_to_includer_then_search_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "main.c", "#include \"src/a.h\"\n#include \"b.h\"\n");
        write(root, "src/a.h", "#include \"../inc/b.h\"\n");
        write(root, "inc/b.h", "");
        let (tree, sink) = build(root, "compiler_flags = [\"-Iinc\"]\n");

        let main = tree.get(idx(&tree, "main.c"));
        let includes = main.role.includes().unwrap();
        assert!(includes.has(tree.get(idx(&tree, "src/a.h")).id.as_raw()));
        assert!(includes.has(tree.get(idx(&tree, "inc/b.h")).id.as_raw()));
        let a = tree.get(idx(&tree, "src/a.h"));
        assert_eq!(a.role.includes().unwrap().len(), 1);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn missing_include_warns_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.c", "#include \"nope.h\"\n#include <stdio.h>\n");
        let (tree, sink) = build(dir.path(), "");
        let main = tree.get(tree.entry());
        assert!(main.role.includes().unwrap().is_empty());
        assert_eq!(main.include_paths, vec!["nope.h".to_string()]);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::MISSING_INCLUDE);
    }

    #[test]
    fn include_graph_points_from_header_to_includers() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a.h", "");
        write(root, "m.h", "#include \"a.h\"\n");
        write(root, "main.c", "#include \"m.h\"\n");
        let (tree, _) = build(root, "");
        let mut graph = Graph::new();
        add_include_edges(&tree, &mut graph).unwrap();

        let id = |rel: &str| tree.get(idx(&tree, rel)).id;
        assert_eq!(graph.successors(id("a.h")), &[id("m.h")]);
        let reached = graph.walk([id("a.h")]).unwrap();
        assert_eq!(reached, vec![id("a.h"), id("m.h"), id("main.c")]);
    }

    #[test]
    fn mutual_includes_are_legal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a.h", "#include \"b.h\"\n");
        write(root, "b.h", "#include \"a.h\"\n");
        write(root, "main.c", "#include \"a.h\"\n");
        let (tree, _) = build(root, "");
        let mut graph = Graph::new();
        add_include_edges(&tree, &mut graph).unwrap();
        let id = |rel: &str| tree.get(idx(&tree, rel)).id;
        let reached = graph.walk([id("b.h")]).unwrap();
        assert_eq!(reached.len(), 3);
        assert!(reached.contains(&id("main.c")));
    }
}
