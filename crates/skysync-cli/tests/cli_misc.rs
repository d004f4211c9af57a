use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

fn bin_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("skysync-cli").unwrap();
    cmd.current_dir(dir)
        .env("SKYSYNC_LOG_DIR", dir.join("logs"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--quiet");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let tmp = tempfile::tempdir().unwrap();
    bin_cmd(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("resolve-locale"));
}

#[test]
fn resolve_locale_maps_script_tags() {
    let tmp = tempfile::tempdir().unwrap();
    bin_cmd(tmp.path())
        .args(["resolve-locale", "zh_Hant", "zh_Hans", "fr"])
        .assert()
        .success()
        .stdout("zh_Hant -> zh_TW\nzh_Hans -> zh_CN\nfr -> fr\n");
}

#[test]
fn resolve_locale_honours_config_aliases() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = tmp.path().join("extra.toml");
    fs::write(&cfg, "[aliases]\npt_BR = \"pt\"\n").unwrap();
    bin_cmd(tmp.path())
        .arg("--config")
        .arg(&cfg)
        .args(["resolve-locale", "pt_BR"])
        .assert()
        .success()
        .stdout("pt_BR -> pt\n");
}

#[test]
fn schema_writes_report_schemas() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    bin_cmd(tmp.path())
        .arg("schema")
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success();
    for name in [
        "run_summary.schema.json",
        "locale_report.schema.json",
        "package_listing.schema.json",
    ] {
        let text = fs::read_to_string(out.join(name)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(v.get("title").is_some(), "{name}: {text}");
    }
}

#[test]
fn packages_lists_selection_as_json() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("upstream");
    for id in ["maya", "egyptian", "aztec"] {
        fs::create_dir_all(input.join(id)).unwrap();
        fs::write(input.join(id).join("index.json"), "{}").unwrap();
    }
    fs::create_dir_all(input.join("drafts")).unwrap();

    let assert = bin_cmd(tmp.path())
        .args(["packages", "--format", "json", "--sky-culture-dir"])
        .arg(&input)
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["selected"], serde_json::json!(["egyptian", "maya"]));
    assert_eq!(v["excluded"], serde_json::json!(["aztec"]));
    assert_eq!(v["ignored"], serde_json::json!(["drafts"]));
}
