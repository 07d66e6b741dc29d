//! Built-in functions, looked up before any user-defined function of the
//! same name (`spec.md` §4.3).

use std::io::{self, Write};

use crate::engine::{add_values, Engine};
use crate::error::RuntimeError;
use crate::token::Position;
use crate::value::Value;

/// Dispatches `name` to a built-in, if it is one. Returns `None` when `name`
/// isn't a recognized built-in, letting the caller fall through to
/// user-defined function lookup.
pub fn call(
    _engine: &mut Engine,
    name: &str,
    args: &[Value],
    position: Position,
) -> Option<Result<Value, RuntimeError>> {
    let result = match name {
        "medallion" => medallion(args),
        "sigh" => sigh(args, position),
        "witcher_speed" => witcher_speed(args, position),
        "monster_count" => monster_count(args, position),
        "add_to_bestiary" => add_to_bestiary(args, position),
        "hunter_instinct" => hunter_instinct(args, position),
        "potion_effect" => potion_effect(args, position),
        _ => return None,
    };
    Some(result)
}

fn arity(name: &str, args: &[Value], expected: usize, position: Position) -> Result<(), RuntimeError> {
    if args.len() != expected {
        Err(RuntimeError::arity_mismatch(name, expected, args.len(), position))
    } else {
        Ok(())
    }
}

fn medallion(args: &[Value]) -> Result<Value, RuntimeError> {
    let rendered: Vec<String> = args.iter().map(Value::to_display_string).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::Unit)
}

fn sigh(args: &[Value], position: Position) -> Result<Value, RuntimeError> {
    if args.len() > 1 {
        return Err(RuntimeError::arity_mismatch("sigh", 1, args.len(), position));
    }
    if let Some(prompt) = args.first() {
        print!("{}", prompt.to_display_string());
        let _ = io::stdout().flush();
    }
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .map_err(|e| RuntimeError::new(format!("Failed to read input: {e}"), position))?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::Text(line))
}

fn witcher_speed(args: &[Value], position: Position) -> Result<Value, RuntimeError> {
    arity("witcher_speed", args, 2, position)?;
    let text = match &args[0] {
        Value::Text(s) => s.clone(),
        other => {
            return Err(RuntimeError::type_mismatch(
                format!("witcher_speed expects text, found {}", other.type_name()),
                position,
            ))
        }
    };
    let n = match &args[1] {
        Value::Number(n) if *n >= 0.0 => *n as usize,
        other => {
            return Err(RuntimeError::type_mismatch(
                format!("witcher_speed expects a non-negative number, found {}", other.type_name()),
                position,
            ))
        }
    };
    Ok(Value::Text(text.repeat(n)))
}

fn monster_count(args: &[Value], position: Position) -> Result<Value, RuntimeError> {
    arity("monster_count", args, 1, position)?;
    match &args[0] {
        Value::Bestiary(seq) => Ok(Value::Number(seq.borrow().len() as f64)),
        Value::Text(s) => Ok(Value::Number(s.chars().count() as f64)),
        other => Err(RuntimeError::type_mismatch(
            format!("monster_count expects a bestiary or text, found {}", other.type_name()),
            position,
        )),
    }
}

fn add_to_bestiary(args: &[Value], position: Position) -> Result<Value, RuntimeError> {
    arity("add_to_bestiary", args, 2, position)?;
    match &args[0] {
        Value::Bestiary(seq) => {
            seq.borrow_mut().push(args[1].clone());
            Ok(args[0].clone())
        }
        other => Err(RuntimeError::type_mismatch(
            format!("add_to_bestiary expects a bestiary, found {}", other.type_name()),
            position,
        )),
    }
}

fn hunter_instinct(args: &[Value], position: Position) -> Result<Value, RuntimeError> {
    arity("hunter_instinct", args, 1, position)?;
    let name = match &args[0] {
        Value::Boolean(true) => "truth",
        Value::Boolean(false) => "falsehood",
        Value::Number(_) => "number",
        Value::Text(_) => "text",
        Value::Bestiary(_) => "bestiary",
        Value::Function(_) | Value::Unit => "unknown",
    };
    Ok(Value::Text(name.to_string()))
}

fn potion_effect(args: &[Value], position: Position) -> Result<Value, RuntimeError> {
    arity("potion_effect", args, 2, position)?;
    add_values(&args[0], &args[1], position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut engine = Engine::new();
        call(&mut engine, name, &args, Position::START).expect("builtin should exist")
    }

    #[test]
    fn witcher_speed_repeats_text() {
        let r = call_builtin(
            "witcher_speed",
            vec![Value::Text("ab".into()), Value::Number(3.0)],
        )
        .unwrap();
        assert_eq!(r, Value::Text("ababab".into()));
    }

    #[test]
    fn monster_count_counts_elements_and_chars() {
        let r = call_builtin("monster_count", vec![Value::bestiary(vec![Value::Unit; 4])]).unwrap();
        assert_eq!(r, Value::Number(4.0));

        let r = call_builtin("monster_count", vec![Value::Text("witcher".into())]).unwrap();
        assert_eq!(r, Value::Number(7.0));
    }

    #[test]
    fn add_to_bestiary_appends_and_returns_same_sequence() {
        let before = Value::bestiary(vec![Value::Number(1.0), Value::Number(2.0)]);
        let before_count = call_builtin("monster_count", vec![before.clone()]).unwrap();
        let after = call_builtin("add_to_bestiary", vec![before, Value::Number(3.0)]).unwrap();
        let after_count = call_builtin("monster_count", vec![after]).unwrap();
        assert_eq!(before_count, Value::Number(2.0));
        assert_eq!(after_count, Value::Number(3.0));
    }

    #[test]
    fn hunter_instinct_distinguishes_truth_and_falsehood() {
        assert_eq!(
            call_builtin("hunter_instinct", vec![Value::Boolean(true)]).unwrap(),
            Value::Text("truth".into())
        );
        assert_eq!(
            call_builtin("hunter_instinct", vec![Value::Boolean(false)]).unwrap(),
            Value::Text("falsehood".into())
        );
        assert_eq!(
            call_builtin("hunter_instinct", vec![Value::Unit]).unwrap(),
            Value::Text("unknown".into())
        );
    }

    #[test]
    fn potion_effect_matches_plus_operator() {
        let r = call_builtin(
            "potion_effect",
            vec![Value::Text("x=".into()), Value::Number(1.0)],
        )
        .unwrap();
        assert_eq!(r, Value::Text("x=1".into()));
    }

    #[test]
    fn unknown_name_is_not_a_builtin() {
        let mut engine = Engine::new();
        assert!(call(&mut engine, "fact", &[], Position::START).is_none());
    }
}
