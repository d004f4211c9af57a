use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn write_rel(root: &Path, rel: &str, content: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, content).unwrap();
}

struct Layout {
    tmp: tempfile::TempDir,
    input: PathBuf,
    project: PathBuf,
}

/// Upstream A and B share `x`; C only has an untranslated German entry; D is
/// excluded and still present in the project from an older sync.
fn layout() -> Layout {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("upstream");
    let project = tmp.path().join("project");
    write_rel(&project, "skycultures/CMakeLists.txt.template", "install(DIRECTORY .)\n");
    write_rel(&project, "skycultures/D/index.json", "{}");
    write_rel(&input, "A/index.json", "{}");
    write_rel(&input, "A/po/fr.po", "msgid \"x\"\nmsgstr \"bonjour\"\n");
    write_rel(&input, "B/index.json", "{}");
    write_rel(
        &input,
        "B/po/fr.po",
        "msgid \"x\"\nmsgstr \"salut\"\n\nmsgid \"y\"\nmsgstr \"oui\"\n",
    );
    write_rel(&input, "C/index.json", "{}");
    write_rel(&input, "C/po/de.po", "msgid \"z\"\nmsgstr \"\"\n");
    write_rel(&input, "D/index.json", "{}");
    write_rel(&input, "notes/readme.txt", "no manifest here");
    write_rel(
        &project,
        "skysync.toml",
        "exclusions = [\"D\"]\nlocales = [\"fr\", \"de\"]\n",
    );
    Layout {
        tmp,
        input,
        project,
    }
}

fn bin_cmd(l: &Layout) -> Command {
    let mut cmd = Command::cargo_bin("skysync-cli").unwrap();
    cmd.current_dir(&l.project)
        .env("SKYSYNC_LOG_DIR", l.tmp.path().join("logs"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--quiet");
    cmd
}

#[test]
fn update_syncs_packages_and_writes_catalogs() {
    let l = layout();
    bin_cmd(&l)
        .args(["update", "--sky-culture-dir"])
        .arg(&l.input)
        .assert()
        .success()
        .stdout(predicate::str::contains("removed 1 excluded"));

    let out = l.project.join("skycultures");
    assert!(out.join("A/index.json").is_file());
    assert!(out.join("A/CMakeLists.txt").is_file());
    assert!(!out.join("A/po").exists());
    assert!(!out.join("D").exists());
    assert!(!out.join("notes").exists());

    let fr = fs::read_to_string(l.project.join("po/stellarium-skycultures/fr.po")).unwrap();
    assert!(fr.contains("\"Language: fr\\n\""), "{fr}");
    assert!(fr.contains("msgstr \"bonjour\""));
    assert!(!fr.contains("salut"), "first package wins: {fr}");
    assert!(fr.contains("msgstr \"oui\""));
    assert!(!l.project.join("po/stellarium-skycultures/de.po").exists());
}

#[test]
fn update_json_reports_every_locale() {
    let l = layout();
    let assert = bin_cmd(&l)
        .args(["update", "--format", "json", "--sky-culture-dir"])
        .arg(&l.input)
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["schema_version"], 1);
    assert_eq!(v["selected"], serde_json::json!(["A", "B", "C"]));
    assert_eq!(v["removed"], serde_json::json!(["D"]));
    let locales = v["locales"].as_array().unwrap();
    assert_eq!(locales.len(), 2);
    assert_eq!(locales[0]["locale"], "fr");
    assert_eq!(locales[0]["status"], "written");
    assert_eq!(locales[0]["translated"], 2);
    assert_eq!(locales[0]["duplicates"], 1);
    assert_eq!(locales[1]["locale"], "de");
    assert_eq!(locales[1]["status"], "empty");
    assert!(locales[1]["path"].is_null());
}

#[test]
fn dry_run_leaves_project_untouched() {
    let l = layout();
    bin_cmd(&l)
        .args(["update", "--dry-run", "--sky-culture-dir"])
        .arg(&l.input)
        .assert()
        .success()
        .stdout(predicate::str::contains("would sync 3 packages"));
    assert!(l.project.join("skycultures/D").exists());
    assert!(!l.project.join("skycultures/A").exists());
    assert!(!l.project.join("po").exists());
}

#[test]
fn missing_input_root_fails() {
    let l = layout();
    bin_cmd(&l)
        .args(["update", "--sky-culture-dir"])
        .arg(l.tmp.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    assert!(l.project.join("skycultures/D").exists());
}

#[test]
fn wrong_working_dir_fails() {
    let l = layout();
    bin_cmd(&l)
        .args(["update", "--project-root"])
        .arg(&l.input)
        .arg("--sky-culture-dir")
        .arg(&l.input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a packages directory"));
}

#[test]
fn source_dir_from_config_is_used() {
    let l = layout();
    write_rel(
        &l.project,
        "skysync.toml",
        &format!(
            "source_dir = {:?}\nexclusions = [\"D\"]\nlocales = [\"fr\"]\n",
            l.input.display().to_string()
        ),
    );
    bin_cmd(&l).arg("update").assert().success();
    assert!(l.project.join("po/stellarium-skycultures/fr.po").is_file());
}
