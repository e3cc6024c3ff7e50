//! Runs the `pbk` binary against a temporary project.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

const PFAS: &str = "\
model PBK_PFAS
  compartment Gut = 1
  compartment Blood = 5.6
  species AGut in Gut = 0
  species ABlood in Blood = 0
  BW = 70
  ka = 1.2
  kel = 0.05
  absorption: AGut -> ABlood; ka * AGut
  elimination: ABlood -> ; kel * ABlood
end
";

const CITATION: &str = "\
cff-version: 1.2.0
title: PBK model for PFAS
authors:
  - family-names: Doe
    given-names: Jane
";

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pbk.toml"), "[scenario]\nfrequency = 24\n").unwrap();
    fs::write(dir.path().join("CITATION.cff"), CITATION).unwrap();
    fs::create_dir(dir.path().join("model")).unwrap();
    fs::write(dir.path().join("model/PBK_PFAS.ant"), PFAS).unwrap();
    dir
}

fn pbk(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pbk"))
        .arg("--project")
        .arg(root)
        .arg("--format")
        .arg("json")
        .args(args)
        .env_remove("PBK_LOG")
        .output()
        .unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn build_then_simulate_bolus() {
    let root = project();

    let built = pbk(root.path(), &["build"]);
    assert!(built.status.success(), "{}", String::from_utf8_lossy(&built.stderr));
    let report = json(&built);
    assert_eq!(report["models"][0]["model"], "PBK_PFAS");
    assert_eq!(report["models"][0]["compilation"]["status"], "succeeded");
    assert!(root.path().join("model/PBK_PFAS.sbml").is_file());

    let document = root.path().join("model/PBK_PFAS.sbml");
    let simulated = pbk(
        root.path(),
        &["simulate", "bolus", "--model", document.to_str().unwrap(), "--id", "bolus"],
    );
    assert!(simulated.status.success(), "{}", String::from_utf8_lossy(&simulated.stderr));
    let summary = json(&simulated);
    assert_eq!(summary["samples"], 49);
    assert!(root.path().join("tests/__testoutputs__/bolus.csv").is_file());
}

#[test]
fn failing_parametrisation_exits_non_zero() {
    let root = project();
    assert!(pbk(root.path(), &["build"]).status.success());
    fs::create_dir(root.path().join("parametrisations")).unwrap();
    fs::write(
        root.path().join("parametrisations/pfoa.csv"),
        "idModelInstance,Parameter,Value\nHuman,BW,60\nRat,Vmax,2\n",
    )
    .unwrap();

    let document = root.path().join("model/PBK_PFAS.sbml");
    let checked = pbk(
        root.path(),
        &["check-params", "--model", document.to_str().unwrap()],
    );

    assert!(!checked.status.success());
    let report = json(&checked);
    assert_eq!(report["scopes"][0]["instance"], "Human");
    assert_eq!(report["scopes"][1]["failures"][0]["parameter"], "Vmax");
    assert!(String::from_utf8_lossy(&checked.stderr).contains("pbk error: 1 of 2"));
}

#[test]
fn missing_model_dir_fails_the_build() {
    let root = TempDir::new().unwrap();
    let built = pbk(root.path(), &["build"]);
    assert!(!built.status.success());
    assert!(String::from_utf8_lossy(&built.stderr).contains("failed to discover source models"));
}
