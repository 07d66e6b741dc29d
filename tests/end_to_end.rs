//! End-to-end scenarios taken from the language reference: whole programs
//! run against a fresh `Engine` and checked by reading back global state
//! (witcher has no top-level expression result, unlike an expression-first
//! scripting language).

use witcher::{Engine, Value};

#[test]
fn sums_a_bestiary_with_for() {
    let mut engine = Engine::new();
    engine
        .eval(
            "contract n = 5\n\
             contract s = 0\n\
             yrden i -> [1,2,3,4,5] { s = s + i }",
        )
        .unwrap();
    assert_eq!(engine.get("s"), Some(Value::Number(15.0)));
}

#[test]
fn recursive_factorial_function() {
    let mut engine = Engine::new();
    engine
        .eval(
            "aard fact(n) { igni n <= 1 { hunt 1 } elixir { hunt n * fact(n - 1) } }\n\
             contract result = fact(5)",
        )
        .unwrap();
    assert_eq!(engine.get("result"), Some(Value::Number(120.0)));
}

#[test]
fn add_to_bestiary_and_monster_count() {
    let mut engine = Engine::new();
    engine
        .eval(
            "contract xs = [1,2,3]\n\
             add_to_bestiary(xs, 4)\n\
             contract count = monster_count(xs)",
        )
        .unwrap();
    assert_eq!(engine.get("count"), Some(Value::Number(4.0)));
}

#[test]
fn text_concatenation_stringifies_numbers() {
    let mut engine = Engine::new();
    engine
        .eval(r#"contract answer = "answer: " + 42"#)
        .unwrap();
    assert_eq!(engine.get("answer"), Some(Value::Text("answer: 42".into())));
}

#[test]
fn division_by_zero_surfaces_as_a_runtime_error_and_stops_the_program() {
    let mut engine = Engine::new();
    let err = engine.eval("contract x = 10 / 0\ncontract y = 1").unwrap_err();
    assert!(err.to_string().contains("Division by zero"));
    // The program stopped before the second statement ran.
    assert_eq!(engine.get("y"), None);
}

#[test]
fn frames_are_empty_after_the_program_finishes() {
    let mut engine = Engine::new();
    engine
        .eval("aard f(a, b) { hunt a + b }\ncontract r = f(1, f(2, 3))")
        .unwrap();
    assert_eq!(engine.frame_depth(), 0);
    assert_eq!(engine.get("r"), Some(Value::Number(6.0)));
}

#[test]
fn while_loop_with_mutation_flag_is_inert() {
    // `mutation` parses `is_constant = true` but the evaluator does not
    // enforce immutability (spec.md §9) — reassignment still succeeds.
    let mut engine = Engine::new();
    engine
        .eval(
            "mutation i = 0\n\
             quen i < 3 { i = i + 1 }",
        )
        .unwrap();
    assert_eq!(engine.get("i"), Some(Value::Number(3.0)));
}

#[test]
fn arity_mismatch_is_a_runtime_error() {
    let mut engine = Engine::new();
    let err = engine.eval("aard f(a, b) { hunt a }\ncontract r = f(1)").unwrap_err();
    assert!(err.to_string().to_lowercase().contains("argument"));
}

#[test]
fn not_callable_when_name_is_not_a_function() {
    let mut engine = Engine::new();
    let err = engine.eval("contract f = 1\ncontract r = f(2)").unwrap_err();
    assert!(err.to_string().contains("not callable"));
}

#[test]
fn undefined_name_is_a_runtime_error() {
    let mut engine = Engine::new();
    let err = engine.eval("contract r = undefined_thing").unwrap_err();
    assert!(err.to_string().contains("Undefined name"));
}
