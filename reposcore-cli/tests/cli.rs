use assert_cmd::Command;

fn reposcore(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("reposcore").unwrap();
    cmd.current_dir(dir).env_remove("GITHUB_TOKEN").env_remove("REPOSCORE_LOG").env("NO_COLOR", "1");
    cmd
}

fn stdout(cmd: &mut Command) -> String {
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).unwrap()
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout(reposcore(dir.path()).arg("--help"));
    for word in ["analyze", "limit", "weights", "--semester-start"] {
        assert!(out.contains(word), "help is missing {word}");
    }
}

#[test]
fn missing_repository_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    reposcore(dir.path()).assert().failure();
}

#[test]
fn malformed_repository_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = reposcore(dir.path()).args(["--dry-run", "not-a-repo"]).assert().failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert!(stderr.contains("not-a-repo"), "{stderr}");
}

#[test]
fn weekly_chart_requires_semester_start() {
    let dir = tempfile::tempdir().unwrap();
    reposcore(dir.path()).args(["--dry-run", "--weekly-chart", "o/r"]).assert().failure();
    reposcore(dir.path())
        .args(["--dry-run", "--weekly-chart", "--semester-start", "2025-03-03", "o/r"])
        .assert()
        .success();
}

#[test]
fn dry_run_prints_plan_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout(reposcore(dir.path()).args(["--dry-run", "-o", "out", "--format", "table,text", "o/a,o/b", "o/a"]));
    assert!(out.contains("o/a"));
    assert!(out.contains("o/b"));
    assert!(out.contains("cache_o_a.json"));
    assert!(out.contains("table, text"));
    assert_eq!(out.matches("repo ").count(), 2, "duplicates should collapse:\n{out}");
    assert!(!dir.path().join("out").exists());
}

#[test]
fn analyze_subcommand_matches_bare_form() {
    let dir = tempfile::tempdir().unwrap();
    let bare = stdout(reposcore(dir.path()).args(["--dry-run", "o/a"]));
    let sub = stdout(reposcore(dir.path()).args(["analyze", "--dry-run", "o/a"]));
    assert_eq!(bare, sub);
}

#[test]
fn missing_alias_file_fails_before_fetching() {
    let dir = tempfile::tempdir().unwrap();
    reposcore(dir.path())
        .args(["--dry-run", "--user-info", "absent.json", "o/a"])
        .assert()
        .failure();
}

#[test]
fn weights_template_reflects_local_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".reposcore.toml"), "[weights]\nfeat_bug_pr = 7\n").unwrap();
    let out = stdout(reposcore(dir.path()).args(["weights", "--format", "toml"]));
    assert!(out.contains("[weights]"));
    assert!(out.contains("# feat_bug_pr = 7"));
    assert!(out.contains("# doc_pr = 2"));
}

#[test]
fn weights_rejects_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    reposcore(dir.path()).args(["weights", "--format", "yaml"]).assert().failure();
}

#[test]
fn explicit_config_that_fails_to_parse_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.toml"), "[weights\n").unwrap();
    reposcore(dir.path())
        .args(["weights", "--config", "bad.toml"])
        .assert()
        .failure();
}

#[test]
fn theme_must_be_a_known_name() {
    let dir = tempfile::tempdir().unwrap();
    reposcore(dir.path()).args(["--dry-run", "--theme", "solarized", "o/a"]).assert().failure();
    reposcore(dir.path()).args(["--dry-run", "--theme", "dark", "o/a"]).assert().success();
}
