use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const BORING: &str = r#"package a;

public class Boring {
    public Boring self() {
        return this;
    }
}
"#;

const MAIN: &str = r#"package a;

class Main {
    void run(Boring arg) {
        arg.self();
    }
}
"#;

fn njast(temp: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("njast"));
    // Keep configs above the temp dir out of the picture.
    let config = temp.child("njast.toml");
    if !config.exists() {
        config.write_str("").unwrap();
    }
    cmd.current_dir(temp.path())
        .env("NJAST_CONFIG", config.path())
        .env_remove("RUST_LOG");
    cmd
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("src/a/Boring.java").write_str(BORING).unwrap();
    temp.child("src/a/Main.java").write_str(MAIN).unwrap();
    temp
}

#[test]
fn help_mentions_commands() {
    let temp = TempDir::new().unwrap();
    njast(&temp).arg("--help").assert().success().stdout(
        predicate::str::contains("parse")
            .and(predicate::str::contains("locate"))
            .and(predicate::str::contains("type"))
            .and(predicate::str::contains("suggest-import")),
    );
}

#[test]
fn parse_json_summarizes_declarations() {
    let temp = project();
    let output = njast(&temp)
        .args(["parse", "src/a/Boring.java", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["package"], "a");
    assert_eq!(v["types"], serde_json::json!(["a.Boring"]));
    assert_eq!(v["members"], serde_json::json!(["a.Boring#self"]));
    assert!(v["errors"].as_array().unwrap().is_empty());
}

#[test]
fn strict_parse_stops_at_first_error() {
    let temp = TempDir::new().unwrap();
    temp.child("Broken.java")
        .write_str("class Broken {\n    void a() { x. }\n    void b() {}\n}\n")
        .unwrap();

    njast(&temp)
        .args(["parse", "Broken.java"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error:2:").and(predicate::str::contains("type Broken").not()));

    njast(&temp)
        .args(["parse", "Broken.java", "--lenient"])
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("type Broken")
                .and(predicate::str::contains("member Broken#b"))
                .and(predicate::str::contains("error:2:")),
        );
}

#[test]
fn level_gates_jdk7_syntax() {
    let temp = TempDir::new().unwrap();
    temp.child("Diamond.java")
        .write_str("class Diamond {\n    Object list = new java.util.ArrayList<>();\n}\n")
        .unwrap();

    njast(&temp)
        .args(["parse", "Diamond.java"])
        .assert()
        .success();
    njast(&temp)
        .args(["parse", "Diamond.java", "--level", "6"])
        .assert()
        .code(1);
    njast(&temp)
        .args(["parse", "Diamond.java", "--level", "9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported language level 9"));
}

#[test]
fn locate_reports_the_innermost_node() {
    let temp = project();
    let output = njast(&temp)
        .args(["locate", "src/a/Main.java", "5", "10", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["kind"], "Identifier");
    assert_eq!(v["ancestors"][0], "CompilationUnit");

    njast(&temp)
        .args(["locate", "src/a/Main.java", "50", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("outside the file"));
}

#[test]
fn type_resolves_through_sibling_sources() {
    let temp = project();
    let output = njast(&temp)
        .args(["type", "src/a/Main.java", "5", "10", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["resolved"]["type"], "a.Boring");
    assert_eq!(v["resolved"]["from"], "object");

    njast(&temp)
        .args(["type", "src/a/Main.java", "5", "14"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("a.Boring\n"));
}

#[test]
fn type_failure_exits_with_one() {
    let temp = TempDir::new().unwrap();
    temp.child("src/a/Lonely.java")
        .write_str("package a;\n\nclass Lonely {\n    void run(Missing m) {\n        m.go();\n    }\n}\n")
        .unwrap();
    njast(&temp)
        .args(["type", "src/a/Lonely.java", "5", "12"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("go"));
}

#[test]
fn suggest_import_lists_project_types() {
    let temp = project();
    njast(&temp)
        .args(["suggest-import", "src/a/Main.java", "Boring"])
        .assert()
        .success()
        .stdout("a.Boring\n");
}
