//! The include graph and the symbol graph.
//!
//! Both are [`Graph`]s over file identities. The include graph has an edge
//! from every file to each file that includes it, so walking it from a
//! changed header reaches every translation unit that must be recompiled.
//! The symbol graph has an edge from a consumer to each file defining a
//! symbol the consumer references, so walking it from the entry file yields
//! the objects to link.

#![warn(missing_docs)]

pub mod graph;
pub mod include;
pub mod scan;
pub mod symbol;

pub use graph::Graph;
pub use include::{add_include_edges, include_dirs, resolve_include, scan_missing_includes};
pub use scan::scan_includes;
pub use symbol::{add_symbol_edges, UnresolvedSymbol};
