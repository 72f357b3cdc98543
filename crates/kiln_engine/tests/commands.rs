mod common;

use std::path::PathBuf;

use common::{Invocation, Project};
use kiln_diagnostics::codes;
use kiln_engine::BuildOutcome;

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

#[test]
fn status_of_a_fresh_project_lists_everything_as_new() {
    let project = Project::hello();
    let sink = Project::sink();
    let status = project.engine().status(&sink).unwrap();
    assert_eq!(status.new, paths(&["a.c", "a.h", "main.c"]));
    assert_eq!(status.to_compile, paths(&["a.c", "main.c"]));
    assert!(status.relink);
    assert!(!status.is_up_to_date());
    assert!(!project.plan().cache_path.exists());
}

#[test]
fn status_reports_propagated_changes_without_building() {
    let project = Project::hello();
    project.build();
    let sink = Project::sink();
    assert!(project.engine().status(&sink).unwrap().is_up_to_date());

    project.touch("a.h");
    let before = project.cache_bytes();
    let engine = project.engine();
    let status = engine.status(&sink).unwrap();
    assert_eq!(status.modified, paths(&["a.h"]));
    assert_eq!(status.affected, paths(&["a.c", "main.c"]));
    assert_eq!(status.to_compile, paths(&["a.c", "main.c"]));
    assert!(status.relink);
    assert!(engine.toolchain().log.is_empty());
    assert_eq!(before, project.cache_bytes());
    assert!(sink
        .diagnostics()
        .iter()
        .any(|d| d.code == codes::OUT_OF_DATE));

    let run = project.build();
    assert_eq!(run.compiled(&project), paths(&["a.c", "main.c"]));
}

#[test]
fn status_reports_removed_files() {
    let project = Project::hello();
    project.write("old.c", "// defines: old\n");
    project.build();
    project.remove("old.c");
    let status = project.engine().status(&Project::sink()).unwrap();
    assert_eq!(status.removed, vec!["old.c".to_string()]);
    assert!(status.to_compile.is_empty());
    assert!(status.relink);
}

#[test]
fn tests_link_their_own_closure_and_run() {
    let project = Project::hello();
    project.write("test_foo.c", "// uses: foo\n");
    project.write("test_broken.c", "// uses: foo\n// fails\n");

    let mut engine = project.engine();
    let sink = Project::sink();
    let report = engine.test(None, &sink).unwrap();
    assert!(matches!(report.build, BuildOutcome::Built(_)));
    assert_eq!(report.passed, vec!["test_foo.c".to_string()]);
    assert_eq!(report.failed, vec!["test_broken.c".to_string()]);
    assert_eq!(report.exit_code(), 1);
    assert!(sink.diagnostics().iter().any(|d| d.code == codes::TEST_FAILED));

    let plan = project.plan();
    let test_link = engine
        .toolchain()
        .links()
        .into_iter()
        .find(|job| job.output == plan.test_output("test_foo.c"))
        .unwrap()
        .clone();
    assert_eq!(test_link.objects.len(), 2);
    assert!(!test_link.objects.contains(&plan.object_path(kiln_common::FileId::of(
        &project.path("main.c"),
        &std::fs::metadata(project.path("main.c")).unwrap(),
    ))));
}

#[test]
fn test_filter_selects_by_substring() {
    let project = Project::hello();
    project.write("test_foo.c", "// uses: foo\n");
    project.write("test_bar.c", "// fails\n");

    let mut engine = project.engine();
    let report = engine.test(Some("foo"), &Project::sink()).unwrap();
    assert_eq!(report.passed, vec!["test_foo.c".to_string()]);
    assert!(report.failed.is_empty());
    let runs = engine
        .toolchain()
        .log
        .iter()
        .filter(|inv| matches!(inv, Invocation::RunTest(_)))
        .count();
    assert_eq!(runs, 1);
}

#[test]
fn failed_build_runs_no_tests() {
    let project = Project::hello();
    project.write("test_foo.c", "// uses: foo\n// error\n");
    let mut engine = project.engine();
    let report = engine.test(None, &Project::sink()).unwrap();
    assert!(!report.build.is_success());
    assert!(report.passed.is_empty() && report.failed.is_empty());
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn clean_removes_outputs_and_cache() {
    let project = Project::hello();
    project.build();
    let plan = project.plan();
    assert!(plan.target_dir.exists());

    let engine = project.engine();
    assert!(engine.clean().unwrap());
    assert!(!plan.target_dir.exists());
    assert!(!plan.cache_path.exists());
    assert!(!engine.clean().unwrap());

    let run = project.build();
    assert_eq!(run.compiled(&project), paths(&["a.c", "main.c"]));
}

#[test]
fn entry_must_exist() {
    let project = Project::new(common::SIMPLE_TOML);
    project.write("lib.c", "// defines: x\n");
    let err = project.engine().build(&Project::sink()).unwrap_err();
    assert!(matches!(err, kiln_engine::EngineError::Index(_)));
    assert!(!err.is_internal());
}
