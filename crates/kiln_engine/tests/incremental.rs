mod common;

use std::fs;
use std::path::PathBuf;

use common::{Project, SIMPLE_TOML};
use kiln_diagnostics::codes;
use kiln_engine::BuildOutcome;

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

#[test]
fn header_touch_rebuilds_every_includer() {
    let project = Project::hello();

    let first = project.build();
    assert!(matches!(first.outcome, BuildOutcome::Built(_)));
    assert_eq!(first.outcome.exit_code(), 0);
    assert_eq!(first.compiled(&project), paths(&["a.c", "main.c"]));
    let links = first.toolchain.links();
    assert_eq!(links.len(), 1);
    let plan = project.plan();
    assert_eq!(links[0].output, plan.output);
    assert_eq!(links[0].objects.len(), 2);
    assert!(plan.output.exists());

    let second = project.build();
    assert!(matches!(second.outcome, BuildOutcome::UpToDate(_)));
    assert_eq!(second.outcome.exit_code(), -1);
    assert!(second.toolchain.log.is_empty());
    assert!(second.diagnostics.iter().any(|d| d.code == codes::UP_TO_DATE));

    project.touch("a.h");
    let third = project.build();
    assert!(matches!(third.outcome, BuildOutcome::Built(_)));
    assert_eq!(third.compiled(&project), paths(&["a.c", "main.c"]));
    assert_eq!(third.toolchain.links().len(), 1);
}

#[test]
fn entry_object_is_linked_first() {
    let project = Project::hello();
    let run = project.build();
    let plan = project.plan();
    let objects = &run.toolchain.links()[0].objects;
    let main_id = kiln_common::FileId::of(
        &project.path("main.c"),
        &fs::metadata(project.path("main.c")).unwrap(),
    );
    assert_eq!(objects[0], plan.object_path(main_id));
}

#[test]
fn unchanged_rebuild_rewrites_identical_cache() {
    let project = Project::hello();
    project.build();
    let before = project.cache_bytes();
    project.build();
    assert_eq!(before, project.cache_bytes());
}

#[test]
fn touching_an_implementation_recompiles_only_it() {
    let project = Project::hello();
    project.build();
    project.touch("a.c");
    let run = project.build();
    assert_eq!(run.compiled(&project), paths(&["a.c"]));
    assert_eq!(run.toolchain.links().len(), 1);
}

#[test]
fn changes_propagate_through_nested_includes() {
    let project = Project::new(SIMPLE_TOML);
    project.write("base.h", "");
    project.write("mid.h", "#include \"base.h\"\n");
    project.write("main.c", "#include \"mid.h\"\n// defines: main\n");
    project.write("other.c", "// defines: other\n");
    project.build();

    project.touch("base.h");
    let run = project.build();
    assert_eq!(run.compiled(&project), paths(&["main.c"]));
}

#[test]
fn include_cycles_terminate() {
    let project = Project::new(SIMPLE_TOML);
    project.write("a.h", "#include \"b.h\"\n");
    project.write("b.h", "#include \"a.h\"\n");
    project.write("main.c", "#include \"a.h\"\n// defines: main\n");
    assert!(project.build().outcome.is_success());

    project.touch("b.h");
    let run = project.build();
    assert_eq!(run.compiled(&project), paths(&["main.c"]));
}

#[test]
fn missing_object_is_recompiled() {
    let project = Project::hello();
    project.build();
    let plan = project.plan();
    let a = project.path("a.c");
    let id = kiln_common::FileId::of(&a, &fs::metadata(&a).unwrap());
    fs::remove_file(plan.object_path(id)).unwrap();

    let run = project.build();
    assert!(matches!(run.outcome, BuildOutcome::Built(_)));
    assert_eq!(run.compiled(&project), paths(&["a.c"]));
}

#[test]
fn missing_executable_is_relinked() {
    let project = Project::hello();
    project.build();
    fs::remove_file(project.plan().output).unwrap();

    let run = project.build();
    assert!(matches!(run.outcome, BuildOutcome::Built(_)));
    assert!(run.compiled(&project).is_empty());
    assert_eq!(run.toolchain.links().len(), 1);
}

#[test]
fn removed_file_forces_relink() {
    let project = Project::hello();
    project.write("unused.c", "// defines: spare\n");
    project.build();
    project.remove("unused.c");

    let run = project.build();
    let BuildOutcome::Built(report) = &run.outcome else {
        panic!("expected a relink, got {:?}", run.outcome);
    };
    assert_eq!(report.removed, vec!["unused.c".to_string()]);
    assert!(report.compiled.is_empty());
    assert!(report.linked);
}

#[test]
fn linker_flag_change_relinks_without_compiling() {
    let project = Project::hello();
    project.build();
    project.write("kiln.toml", &format!("{SIMPLE_TOML}linker_flags = [\"-lm\"]\n"));

    let run = project.build();
    assert!(matches!(run.outcome, BuildOutcome::Built(_)));
    assert!(run.compiled(&project).is_empty());
    assert_eq!(run.toolchain.links()[0].flags, vec!["-lm".to_string()]);
}

#[test]
fn compile_failures_are_counted_and_block_the_link() {
    let project = Project::hello();
    project.write("bad1.c", "// error\n");
    project.write("bad2.c", "// error\n");

    let run = project.build();
    let BuildOutcome::Failed(report) = &run.outcome else {
        panic!("expected failure, got {:?}", run.outcome);
    };
    assert_eq!(report.failed, paths(&["bad1.c", "bad2.c"]));
    assert_eq!(report.compiled, paths(&["a.c", "main.c"]));
    assert_eq!(run.outcome.exit_code(), 2);
    assert!(run.toolchain.links().is_empty());
    let errors: Vec<_> = run
        .diagnostics
        .iter()
        .filter(|d| d.code == codes::COMPILE_FAILED)
        .collect();
    assert_eq!(errors.len(), 2);

    project.write("bad1.c", "// defines: fixed\n");
    project.remove("bad2.c");
    let next = project.build();
    assert!(matches!(next.outcome, BuildOutcome::Built(_)));
    assert_eq!(next.compiled(&project), paths(&["bad1.c"]));
}

#[test]
fn link_failure_is_retried_next_run() {
    let project = Project::hello();
    project.write("kiln.toml", &format!("{SIMPLE_TOML}linker_flags = [\"--scripted-fail\"]\n"));
    let run = project.build();
    let BuildOutcome::Failed(report) = &run.outcome else {
        panic!("expected failure, got {:?}", run.outcome);
    };
    assert!(report.link_failed);
    assert_eq!(run.outcome.exit_code(), 1);
    assert!(run.diagnostics.iter().any(|d| d.code == codes::LINK_FAILED));

    project.write("kiln.toml", SIMPLE_TOML);
    let next = project.build();
    assert!(matches!(next.outcome, BuildOutcome::Built(_)));
    assert!(next.compiled(&project).is_empty());
}

#[test]
fn fragments_reach_compile_commands() {
    let toml = "[project]\nname = \"proj\"\nversion = \"0.1.0\"\n\n\
        [targets.app]\nentry = \"main.c\"\ncompiler_flags = [\"-O2\", \"-Wall\"]\n\n\
        [targets.app.paths.\"fast\"]\ncompiler_flags = { add = [\"-O3\"], remove = [\"-O2\"] }\n";
    let project = Project::new(toml);
    project.write("main.c", "// defines: main\n");
    project.write("fast/kernel.c", "// defines: kernel\n");

    let run = project.build();
    let flags_of = |rel: &str| {
        run.toolchain
            .log
            .iter()
            .find_map(|inv| match inv {
                common::Invocation::Compile(job) if job.source == project.path(rel) => {
                    Some(job.flags.clone())
                }
                _ => None,
            })
            .unwrap()
    };
    assert_eq!(flags_of("main.c"), vec!["-O2", "-Wall"]);
    assert_eq!(flags_of("fast/kernel.c"), vec!["-Wall", "-O3"]);
}

#[test]
fn fragment_change_recompiles_its_subtree() {
    let base = "[project]\nname = \"proj\"\nversion = \"0.1.0\"\n\n\
        [targets.app]\nentry = \"main.c\"\n";
    let project = Project::new(base);
    project.write("main.c", "// defines: main\n");
    project.write("fast/kernel.c", "// defines: kernel\n");
    project.build();

    project.write(
        "kiln.toml",
        &format!("{base}\n[targets.app.paths.\"fast\"]\ncompiler_flags = [\"-O3\"]\n"),
    );
    let run = project.build();
    assert_eq!(run.compiled(&project), paths(&["fast/kernel.c"]));
}

#[test]
fn corrupt_cache_falls_back_to_full_rebuild() {
    let project = Project::hello();
    project.build();
    fs::write(project.plan().cache_path, "{ not json").unwrap();

    let run = project.build();
    assert!(run.diagnostics.iter().any(|d| d.code == codes::CORRUPT_CACHE));
    assert_eq!(run.compiled(&project), paths(&["a.c", "main.c"]));
}

#[test]
fn header_created_for_a_missed_include_reaches_includers() {
    let project = Project::new(SIMPLE_TOML);
    project.write("a.h", "#include \"gen.h\"\n");
    project.write("main.c", "#include \"a.h\"\n// defines: main\n");
    project.write("other.c", "// defines: other\n");
    let first = project.build();
    assert!(first.diagnostics.iter().any(|d| d.code == codes::MISSING_INCLUDE));

    project.write("gen.h", "");
    let second = project.build();
    assert_eq!(second.compiled(&project), paths(&["main.c"]));

    project.touch("gen.h");
    let third = project.build();
    assert_eq!(third.compiled(&project), paths(&["main.c"]));

    let fourth = project.build();
    assert!(matches!(fourth.outcome, BuildOutcome::UpToDate(_)));
}

#[test]
fn header_shadowing_a_search_path_recompiles_its_includer() {
    let project = Project::new(&format!("{SIMPLE_TOML}compiler_flags = [\"-Iinc\"]\n"));
    project.write("inc/cfg.h", "");
    project.write("main.c", "#include \"cfg.h\"\n// defines: main\n");
    project.write("other.c", "// defines: other\n");
    project.build();

    project.write("cfg.h", "");
    let run = project.build();
    assert_eq!(run.compiled(&project), paths(&["main.c"]));

    project.touch("inc/cfg.h");
    assert!(project.build().compiled(&project).is_empty());
}

#[test]
fn extra_trees_inherit_the_root_fragment() {
    let toml = "[project]\nname = \"proj\"\nversion = \"0.1.0\"\n\n\
        [targets.app]\nentry = \"main.c\"\nroot = \"app\"\nextra = [\"shared\"]\n\n\
        [targets.app.paths.\"app\"]\ncompiler_flags = { add = [\"-DROOT\"] }\n";
    let project = Project::new(toml);
    project.write("app/main.c", "// defines: main\n// uses: util\n");
    project.write("shared/util.c", "// defines: util\n");

    let run = project.build();
    assert!(matches!(run.outcome, BuildOutcome::Built(_)));
    for rel in ["app/main.c", "shared/util.c"] {
        let flags = run
            .toolchain
            .log
            .iter()
            .find_map(|inv| match inv {
                common::Invocation::Compile(job) if job.source == project.path(rel) => {
                    Some(job.flags.clone())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(flags, vec!["-DROOT"], "{rel}");
    }
}

#[test]
fn failed_link_notes_symbols_nobody_defines() {
    let project = Project::new(&format!("{SIMPLE_TOML}linker_flags = [\"--scripted-fail\"]\n"));
    project.write("main.c", "// defines: main\n// uses: helper nowhere\n");
    project.write("helper.c", "// defines: helper\n// uses: elsewhere absent\n");
    project.write("unused.c", "// uses: ignored\n");

    let run = project.build();
    assert!(matches!(run.outcome, BuildOutcome::Failed(_)));
    let notes: Vec<_> = run
        .diagnostics
        .iter()
        .filter(|d| d.code == codes::UNRESOLVED_SYMBOLS)
        .map(|d| (d.path.clone().unwrap(), d.message.clone()))
        .collect();
    assert_eq!(
        notes,
        vec![
            (
                PathBuf::from("helper.c"),
                "helper.c references symbols no file defines: absent, elsewhere".to_string()
            ),
            (
                PathBuf::from("main.c"),
                "main.c references symbols no file defines: nowhere".to_string()
            ),
        ]
    );

    let clean = Project::hello().build();
    assert!(!clean.diagnostics.iter().any(|d| d.code == codes::UNRESOLVED_SYMBOLS));
}
