use assert_cmd::Command;

fn cmd(outputs: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("clinical-keywords").expect("binary exists");
    cmd.env("OUTPUTS_DIR", outputs)
        .env("RUST_LOG", "warn")
        .env_remove("NER_BACKEND")
        .env_remove("GAZETTEER_PATH")
        .env_remove("EXCLUSIONS_PATH");
    cmd
}

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("clinical-keywords").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn clean_prints_normalized_text() {
    let dir = tempfile::tempdir().unwrap();
    let out = cmd(dir.path())
        .args(["clean", "PATIENT   has     JAUNDICE"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap(), "patient has jaundice\n");
}

#[test]
fn clean_and_extract_leave_outputs_dir_alone() {
    let dir = tempfile::tempdir().unwrap();
    let outputs = dir.path().join("never-created");
    cmd(&outputs).args(["clean", "x"]).assert().success();
    cmd(&outputs)
        .args(["extract", "--text", "Aspirin"])
        .assert()
        .success();
    assert!(!outputs.exists());
}

#[test]
fn analyze_creates_outputs_dir_flag_target() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.csv");
    std::fs::write(&input, "transcription\nAspirin daily.\n").unwrap();
    let env_outputs = dir.path().join("from-env");
    let flag_outputs = dir.path().join("from-flag");
    cmd(&env_outputs)
        .arg("analyze")
        .arg("--input")
        .arg(&input)
        .arg("--outputs-dir")
        .arg(&flag_outputs)
        .arg("--no-charts")
        .assert()
        .success();
    assert!(flag_outputs.join("results.txt").exists());
    assert!(!env_outputs.exists());
}

#[test]
fn extract_lists_medications_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let out = cmd(dir.path())
        .arg("extract")
        .write_stdin("Started on Aspirin 81mg and oxygen. History of hypertension.")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    assert!(stdout.contains(r#"Medications found: ["Aspirin"]"#));
    assert!(stdout.contains(r#"Diseases found: ["hypertension"]"#));
}

#[test]
fn analyze_writes_report_and_charts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mtsamples.csv");
    std::fs::write(
        &input,
        "description,transcription\n\
         a,Aspirin and Metformin for diabetes.\n\
         b,Aspirin daily. Glucose 140.\n\
         c\n",
    )
    .unwrap();
    let outputs = dir.path().join("out");

    let out = cmd(&outputs)
        .arg("analyze")
        .arg("--input")
        .arg(&input)
        .args(["--top", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    assert!(stdout.starts_with("Processed 2 clinical notes (1 rows skipped)"));
    assert!(stdout.lines().any(|line| line == "Aspirin → 2 times"));
    assert!(stdout.lines().any(|line| line == "diabetes → 1 times"));

    assert!(outputs.join("results.txt").exists());
    assert!(outputs.join("clinical_keywords_visualization.vl.json").exists());
    assert!(outputs.join("medications_vs_diseases_pie.vl.json").exists());
}

#[test]
fn analyze_abort_policy_fails_on_short_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.csv");
    std::fs::write(&input, "description,transcription\nshort\n").unwrap();
    cmd(dir.path())
        .arg("analyze")
        .arg("--input")
        .arg(&input)
        .args(["--on-missing", "abort", "--no-charts"])
        .assert()
        .failure();
}

#[test]
fn remote_backend_without_service_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .env("NER_ENDPOINT", "http://127.0.0.1:9")
        .env("NER_TIMEOUT_SECS", "2")
        .args(["extract", "--backend", "remote", "--text", "Aspirin"])
        .assert()
        .failure();
}
