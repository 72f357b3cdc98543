//! Directed graph over file identities.

use kiln_common::{FileId, InternalError, KilnResult};
use kiln_table::{KeySet, Table};

#[derive(Clone, Debug, Default)]
struct Node {
    successors: Vec<FileId>,
    seen: KeySet,
}

/// Adjacency lists keyed by [`FileId`], successors kept in insertion order.
///
/// Edges may only join nodes that already exist; anything else is a bug in
/// the caller and reported as an [`InternalError`].
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Table<Node>,
    edges: usize,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Returns `true` if it was already present.
    pub fn add_node(&mut self, id: FileId) -> bool {
        if self.nodes.has(id.as_raw()) {
            return true;
        }
        self.nodes.add(id.as_raw(), Node::default());
        false
    }

    /// Returns `true` if `id` is a node.
    pub fn has_node(&self, id: FileId) -> bool {
        self.nodes.has(id.as_raw())
    }

    /// Adds the edge `from -> to`, ignoring duplicates.
    pub fn add_edge(&mut self, from: FileId, to: FileId) -> KilnResult<()> {
        if !self.has_node(to) {
            return Err(InternalError::new(format!(
                "edge {from} -> {to} targets a missing node"
            )));
        }
        let node = self.nodes.get_mut(from.as_raw()).ok_or_else(|| {
            InternalError::new(format!("edge {from} -> {to} starts at a missing node"))
        })?;
        if !node.seen.insert(to.as_raw()) {
            node.successors.push(to);
            self.edges += 1;
        }
        Ok(())
    }

    /// Direct successors of `id`, in the order their edges were added.
    pub fn successors(&self, id: FileId) -> &[FileId] {
        self.nodes
            .get(id.as_raw())
            .map(|node| node.successors.as_slice())
            .unwrap_or(&[])
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Depth-first pre-order walk from each start in turn.
    ///
    /// Every reachable node is yielded exactly once, starts included, even
    /// when the graph has cycles. The walk uses an explicit stack.
    pub fn walk<I>(&self, starts: I) -> KilnResult<Vec<FileId>>
    where
        I: IntoIterator<Item = FileId>,
    {
        let mut visited = KeySet::new();
        let mut order = Vec::new();
        let mut stack = Vec::new();
        for start in starts {
            if !self.has_node(start) {
                return Err(InternalError::new(format!(
                    "walk starts at missing node {start}"
                )));
            }
            stack.push(start);
            while let Some(id) = stack.pop() {
                if visited.insert(id.as_raw()) {
                    continue;
                }
                order.push(id);
                for &next in self.successors(id).iter().rev() {
                    if !visited.has(next.as_raw()) {
                        stack.push(next);
                    }
                }
            }
        }
        Ok(order)
    }
}
