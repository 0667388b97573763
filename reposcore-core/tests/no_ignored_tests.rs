use std::path::{Path, PathBuf};

/// Both workspace crates are scanned from here so the guard runs once.
#[test]
fn no_ignored_tests_in_workspace() {
    let core = Path::new(env!("CARGO_MANIFEST_DIR"));
    let cli = core.parent().map(|p| p.join("reposcore-cli")).unwrap_or_default();
    let dirs: Vec<PathBuf> = [core, cli.as_path()]
        .iter()
        .flat_map(|c| [c.join("src"), c.join("tests")])
        .collect();

    let mut violations = Vec::new();
    for dir in &dirs {
        scan_dir(dir, &mut violations);
    }

    assert!(
        violations.is_empty(),
        "#[ignore] found in test code; a failing test should fail:\n{}",
        violations.join("\n")
    );
}

fn scan_dir(dir: &Path, violations: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(&path, violations);
        } else if path.extension().and_then(|e| e.to_str()) == Some("rs")
            && path.file_name().and_then(|n| n.to_str()) != Some("no_ignored_tests.rs")
        {
            check_file(&path, violations);
        }
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>) {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return;
    };
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.starts_with("#[ignore") {
            violations.push(format!("  {}:{}: {line}", path.display(), i + 1));
        }
    }
}
