//! Where a target's inputs are and where its outputs go.

use std::path::{Path, PathBuf};

use kiln_common::FileId;
use kiln_config::{load_config, select_target, ResolvedTarget};

use crate::error::EngineError;

/// A resolved target together with every path a build reads or writes.
///
/// All outputs live under `<build_dir>/<target>/`; the cache sits beside that
/// directory as `<build_dir>/<target>.cache.json`.
#[derive(Clone, Debug)]
pub struct BuildPlan {
    /// Directory containing `kiln.toml`.
    pub project_root: PathBuf,
    /// The target being built.
    pub target: ResolvedTarget,
    /// `<build_dir>/<target>`.
    pub target_dir: PathBuf,
    /// Object files, named by file identity.
    pub object_dir: PathBuf,
    /// Linked test executables.
    pub tests_dir: PathBuf,
    /// The linked executable.
    pub output: PathBuf,
    /// The cache file.
    pub cache_path: PathBuf,
}

impl BuildPlan {
    /// Lays out the paths of `target` under `project_root`.
    pub fn new(project_root: impl Into<PathBuf>, target: ResolvedTarget) -> Self {
        let project_root = project_root.into();
        let build_dir = project_root.join(&target.build_dir);
        let target_dir = build_dir.join(&target.name);
        Self {
            object_dir: target_dir.join("obj"),
            tests_dir: target_dir.join("tests"),
            output: target_dir.join(&target.output),
            cache_path: build_dir.join(format!("{}.cache.json", target.name)),
            target_dir,
            project_root,
            target,
        }
    }

    /// Loads `kiln.toml` from `project_root` and plans the chosen target.
    ///
    /// Without a name, a project with a single target builds that target.
    pub fn load(project_root: &Path, target: Option<&str>) -> Result<Self, EngineError> {
        let config = load_config(project_root)?;
        let target = select_target(&config, target)?;
        Ok(Self::new(project_root, target))
    }

    /// The object file of the translation unit with identity `id`.
    pub fn object_path(&self, id: FileId) -> PathBuf {
        self.object_dir.join(id.object_name())
    }

    /// The executable a test file links to.
    pub fn test_output(&self, test_name: &str) -> PathBuf {
        let stem = Path::new(test_name)
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| test_name.into());
        self.tests_dir.join(stem)
    }
}
