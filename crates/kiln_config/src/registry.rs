//! Which file extensions each compiler treats as sources and headers.

use std::collections::BTreeMap;
use std::path::Path;

use crate::types::CompilerSpec;

/// How a compiler treats a file, judged by its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A translation unit the compiler turns into an object.
    Source,
    /// A file only ever included by other files.
    Header,
}

/// Registered compilers keyed by executable name.
#[derive(Clone, Debug)]
pub struct CompilerRegistry {
    specs: BTreeMap<String, CompilerSpec>,
    fallback: CompilerSpec,
}

fn spec(sources: &[&str], headers: &[&str]) -> CompilerSpec {
    CompilerSpec {
        sources: sources.iter().map(|s| s.to_string()).collect(),
        headers: headers.iter().map(|s| s.to_string()).collect(),
    }
}

impl CompilerRegistry {
    /// The built-in C and C++ compiler drivers.
    pub fn builtin() -> Self {
        let c = spec(&["c"], &["h"]);
        let cxx = spec(&["cc", "cpp", "cxx", "c++"], &["h", "hh", "hpp", "hxx"]);
        let fallback = spec(
            &["c", "cc", "cpp", "cxx", "c++"],
            &["h", "hh", "hpp", "hxx"],
        );

        let mut specs = BTreeMap::new();
        for name in ["cc", "gcc", "clang"] {
            specs.insert(name.to_string(), c.clone());
        }
        for name in ["c++", "g++", "clang++"] {
            specs.insert(name.to_string(), cxx.clone());
        }
        Self { specs, fallback }
    }

    /// Built-ins plus the project's `[compilers.*]` entries, which win on conflict.
    pub fn with_overrides(overrides: &BTreeMap<String, CompilerSpec>) -> Self {
        let mut registry = Self::builtin();
        for (name, spec) in overrides {
            registry.specs.insert(name.clone(), spec.clone());
        }
        registry
    }

    /// Classifies `path` for the given compiler executable.
    ///
    /// Unknown compilers use the union of the built-in C and C++ extensions.
    /// Returns `None` for files the compiler does not handle.
    pub fn classify(&self, compiler: &str, path: &Path) -> Option<SourceKind> {
        let ext = path.extension()?.to_str()?;
        let spec = self.lookup(compiler);
        if spec.sources.iter().any(|s| s == ext) {
            Some(SourceKind::Source)
        } else if spec.headers.iter().any(|h| h == ext) {
            Some(SourceKind::Header)
        } else {
            None
        }
    }

    fn lookup(&self, compiler: &str) -> &CompilerSpec {
        let name = Path::new(compiler)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(compiler);
        self.specs.get(name).unwrap_or(&self.fallback)
    }
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
