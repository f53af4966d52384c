//! Clean command tests

mod common;

use assert_cmd::Command;
use common::{TWO_PACKAGE_MANIFEST, TestProject};
use predicates::prelude::*;

fn provender(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("provender").expect("binary exists");
    cmd.current_dir(&project.path);
    cmd
}

#[cfg(unix)]
fn vendored_project() -> TestProject {
    let project = TestProject::new();
    project.write_manifest(TWO_PACKAGE_MANIFEST);
    project.seed_source("alpha", "1.0");
    project.seed_source("beta", "2.0");

    provender(&project)
        .args(["vendor", "--no-progress"])
        .assert()
        .success();
    project
}

#[cfg(unix)]
#[test]
fn clean_removes_work_directory() {
    let project = vendored_project();
    assert!(project.file_exists(".provender"));

    provender(&project)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed:"));

    assert!(!project.file_exists(".provender"));
}

#[cfg(unix)]
#[test]
fn clean_artifacts_keeps_sources_and_cache() {
    let project = vendored_project();

    provender(&project)
        .args(["clean", "--artifacts"])
        .assert()
        .success();

    assert!(project.file_exists(".provender/src/alpha-1.0"));
    assert!(!project.file_exists(".provender/out"));
    assert!(!project.file_exists(".provender/dist"));
    assert!(!project.file_exists(".provender/staging"));
}

#[test]
fn clean_on_fresh_project_reports_nothing() {
    let project = TestProject::new();
    project.write_manifest(TWO_PACKAGE_MANIFEST);

    provender(&project)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean"));
}
