//! `grimoire` resolution: splicing an imported file's definitions into the
//! current global environment, and the two ways importing the same file
//! twice fails (spec.md §4.4, §9).

use std::fs;

use witcher::{Engine, Value};

#[test]
fn import_splices_definitions_into_globals() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tools.witcher"),
        "aard double(x) { hunt x * 2 }\ncontract greeting = \"hi\"",
    )
    .unwrap();
    fs::write(
        dir.path().join("main.witcher"),
        "grimoire \"tools.witcher\"\ncontract r = double(21)",
    )
    .unwrap();

    let mut engine = Engine::new();
    engine.run_file(dir.path().join("main.witcher")).unwrap();

    assert_eq!(engine.get("r"), Some(Value::Number(42.0)));
    assert_eq!(engine.get("greeting"), Some(Value::Text("hi".into())));
}

#[test]
fn circular_import_is_a_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.witcher"), "grimoire \"b.witcher\"").unwrap();
    fs::write(dir.path().join("b.witcher"), "grimoire \"a.witcher\"").unwrap();

    let mut engine = Engine::new();
    let err = engine.run_file(dir.path().join("a.witcher")).unwrap_err();
    assert!(err.to_string().contains("Circular import"));
}

#[test]
fn reimporting_a_finished_file_also_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tools.witcher"), "contract loaded = truth").unwrap();
    fs::write(
        dir.path().join("main.witcher"),
        "grimoire \"tools.witcher\"\ngrimoire \"tools.witcher\"",
    )
    .unwrap();

    let mut engine = Engine::new();
    let err = engine.run_file(dir.path().join("main.witcher")).unwrap_err();
    // Same error as a true cycle — the import set is never pruned.
    assert!(err.to_string().contains("Circular import"));
}

#[test]
fn missing_grimoire_is_a_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.witcher"), "grimoire \"nope.witcher\"").unwrap();

    let mut engine = Engine::new();
    let err = engine.run_file(dir.path().join("main.witcher")).unwrap_err();
    assert!(err.to_string().contains("Grimoire not found"));
}
