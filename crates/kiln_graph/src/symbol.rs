//! Building the symbol graph from compiled objects' symbol tables.

use kiln_common::{FileId, KilnResult};
use kiln_index::FileTree;
use kiln_table::Table;

use crate::graph::Graph;

/// A symbol a compiled file references that no indexed file defines.
///
/// Usually a library symbol the linker resolves on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedSymbol {
    /// The referencing file.
    pub consumer: FileId,
    /// Symbol name.
    pub symbol: String,
}

/// Adds every compiled file as a node and an edge from each consumer to every
/// file defining a symbol it leaves undefined.
///
/// Only implementations provide symbols; tests only consume them and headers
/// take no part. A file is never made to depend on itself. Returns the
/// references no file defines, grouped by consumer in walk order.
pub fn add_symbol_edges(tree: &FileTree, graph: &mut Graph) -> KilnResult<Vec<UnresolvedSymbol>> {
    let mut providers: Table<Vec<FileId>> = Table::new();
    for (_, file) in tree.iter() {
        if !file.is_compiled() {
            continue;
        }
        graph.add_node(file.id);
        let Some(defined) = file.role.defined() else {
            continue;
        };
        for hash in defined.keys() {
            match providers.get_mut(hash) {
                Some(list) => list.push(file.id),
                None => {
                    providers.add(hash, vec![file.id]);
                }
            }
        }
    }

    let mut unresolved = Vec::new();
    for (_, file) in tree.iter() {
        let Some(undefined) = file.role.undefined() else {
            continue;
        };
        for (hash, name) in undefined.iter() {
            let Some(definers) = providers.get(hash) else {
                unresolved.push(UnresolvedSymbol {
                    consumer: file.id,
                    symbol: name.clone(),
                });
                continue;
            };
            for &provider in definers {
                if provider != file.id {
                    graph.add_edge(file.id, provider)?;
                }
            }
        }
    }

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        unresolved = unresolved.len(),
        "built symbol graph"
    );
    Ok(unresolved)
}
