use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn cli(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("datasource-finder").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("DATA_SOURCE_CODE_TRANSFORMATION")
        .arg("--quiet");
    cmd
}

fn candidates(stdout: &[u8]) -> Vec<String> {
    let body: Value = serde_json::from_slice(stdout).expect("valid json");
    body["candidates"]
        .as_array()
        .expect("candidates")
        .iter()
        .map(|c| c.as_str().expect("string").to_string())
        .collect()
}

#[test]
fn plan_prints_hint_candidates_first() {
    let temp = tempdir().unwrap();
    let output = cli(temp.path())
        .args(["plan", "--jit", "--file-name", "ormconfig.ts", "--directory", "config"])
        .output()
        .expect("command run");
    assert!(output.status.success());

    assert_eq!(
        candidates(&output.stdout),
        vec![
            "ormconfig",
            "data-source",
            "config/ormconfig",
            "src/ormconfig",
            "src/{db,database}/ormconfig",
            "config/data-source",
            "src/data-source",
            "src/{db,database}/data-source",
        ]
    );
}

#[test]
fn plan_applies_tsconfig_out_dir() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("tsconfig.json"),
        r#"{ "compilerOptions": { "outDir": "build" } }"#,
    )
    .unwrap();

    let output = cli(temp.path()).arg("plan").output().expect("command run");
    assert!(output.status.success());
    assert_eq!(
        candidates(&output.stdout),
        vec![
            "data-source",
            "build/data-source",
            "build/{db,database}/data-source",
        ]
    );
}

#[test]
fn plan_reads_context_file() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("lookup.toml"),
        "fileName = \"database.mjs\"\npreserveFilePaths = true\n",
    )
    .unwrap();

    let output = cli(temp.path())
        .args(["plan", "--context", "lookup.toml"])
        .output()
        .expect("command run");
    assert!(output.status.success());
    assert_eq!(candidates(&output.stdout)[..2], ["database", "data-source"]);
}

#[test]
fn malformed_tsconfig_fails_the_plan() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("tsconfig.json"), "{ nope").unwrap();

    cli(temp.path())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Malformed layout configuration"));
}

#[test]
fn find_without_files_prints_null() {
    let temp = tempdir().unwrap();
    let output = cli(temp.path())
        .args(["find", "--jit", "--runtime", "datasource-finder-missing-runtime"])
        .output()
        .expect("command run");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "null");
}

#[test]
fn find_reports_load_failures() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/data-source.ts"), "export default {};").unwrap();

    cli(temp.path())
        .args(["find", "--jit", "--runtime", "datasource-finder-missing-runtime"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to load"));
}
