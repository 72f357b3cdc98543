//! What a run did.

use std::path::PathBuf;

/// Files touched by a build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Translation units compiled successfully, relative to the project root.
    pub compiled: Vec<PathBuf>,
    /// Translation units that failed to compile.
    pub failed: Vec<PathBuf>,
    /// Names of files cached by the previous run that no longer exist.
    pub removed: Vec<String>,
    /// Whether the linker ran.
    pub linked: bool,
    /// Whether the linker ran and failed.
    pub link_failed: bool,
    /// The executable.
    pub output: PathBuf,
}

/// The result of [`Engine::build`](crate::Engine::build).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Something was compiled or linked.
    Built(BuildReport),
    /// Nothing needed rebuilding.
    UpToDate(BuildReport),
    /// A compile or the link failed.
    Failed(BuildReport),
}

impl BuildOutcome {
    /// The report, whatever the outcome.
    pub fn report(&self) -> &BuildReport {
        match self {
            BuildOutcome::Built(report)
            | BuildOutcome::UpToDate(report)
            | BuildOutcome::Failed(report) => report,
        }
    }

    /// Returns `true` unless the build failed.
    pub fn is_success(&self) -> bool {
        !matches!(self, BuildOutcome::Failed(_))
    }

    /// Process exit code: `0` for work done, `-1` for nothing to do, and for
    /// failures the number of failed compiles, or `1` for a failed link.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildOutcome::Built(_) => 0,
            BuildOutcome::UpToDate(_) => -1,
            BuildOutcome::Failed(report) if report.failed.is_empty() => 1,
            BuildOutcome::Failed(report) => i32::try_from(report.failed.len()).unwrap_or(i32::MAX),
        }
    }
}

/// What a build would do, from [`Engine::status`](crate::Engine::status).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Files the cache has never seen.
    pub new: Vec<PathBuf>,
    /// Files whose configuration hash changed, whose object is missing, or
    /// whose cached includes went stale.
    pub modified: Vec<PathBuf>,
    /// Files marked changed only because they include a changed file.
    pub affected: Vec<PathBuf>,
    /// Names of cached files that no longer exist.
    pub removed: Vec<String>,
    /// Translation units a build would compile.
    pub to_compile: Vec<PathBuf>,
    /// Whether a build would link.
    pub relink: bool,
}

impl StatusReport {
    /// Returns `true` if a build would do nothing.
    pub fn is_up_to_date(&self) -> bool {
        self.to_compile.is_empty() && !self.relink
    }
}

/// The result of [`Engine::test`](crate::Engine::test).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestReport {
    /// The build that preceded the tests.
    pub build: BuildOutcome,
    /// Tests that exited with status 0.
    pub passed: Vec<String>,
    /// Tests that failed to link or exited non-zero.
    pub failed: Vec<String>,
}

impl TestReport {
    /// `0` if everything passed, the build's code if it failed, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        if !self.build.is_success() {
            self.build.exit_code()
        } else if self.failed.is_empty() {
            0
        } else {
            1
        }
    }
}
