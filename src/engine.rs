//! The tree-walking evaluator: statement/expression dispatch, operator
//! semantics, function calls, and the importer.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info, trace};

use crate::ast::{BinOp, Expr, Program, Stmt, UnaryOp};
use crate::builtins;
use crate::error::{RuntimeError, WitcherError};
use crate::scope::{Environment, Frame};
use crate::token::Position;
use crate::value::{Function, Value};

/// Distinguishes a statement that ran to completion from one that triggered
/// a `hunt`. Modeled as its own sum type rather than reusing the error
/// channel, per `spec.md` §9 — non-local return is control flow, not
/// failure.
pub enum StepOutcome {
    Normal,
    Returning(Value),
}

/// Holds the process-wide environment and import bookkeeping across
/// however many top-level programs get run against it. An embedder can
/// keep one `Engine` alive across multiple [`Engine::eval`] calls the way
/// `rhai::Engine` stays alive across multiple `eval_with_scope` calls.
pub struct Engine {
    env: Environment,
    imported: HashSet<PathBuf>,
    base_dirs: Vec<PathBuf>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            imported: HashSet::new(),
            base_dirs: vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))],
        }
    }

    /// Lexes, parses, and evaluates `source` against the current base
    /// directory (used for resolving any `grimoire` statements it
    /// contains). Intended for the REPL, where the base directory never
    /// changes.
    pub fn eval(&mut self, source: &str) -> Result<(), WitcherError> {
        let program = crate::parser::parse_source(source)?;
        self.interpret(&program)?;
        Ok(())
    }

    /// Loads and runs a `.witcher` file, resolving any imports it contains
    /// relative to its own directory.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<(), WitcherError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|_| {
            WitcherError::Runtime(RuntimeError::new(
                format!("Could not read file: {}", path.display()),
                Position::START,
            ))
        })?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        self.base_dirs.push(dir);
        let result = self.eval(&source);
        self.base_dirs.pop();
        result
    }

    pub fn frame_depth(&self) -> usize {
        self.env.frame_depth()
    }

    /// Reads a global by name. Scripts don't produce a top-level "result"
    /// the way an expression-oriented language would, so this is the hook
    /// an embedder (or a test) uses to observe what a run produced.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.env.get(name).cloned()
    }

    fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        match self.eval_block(program)? {
            StepOutcome::Normal | StepOutcome::Returning(_) => Ok(()),
        }
    }

    /// Runs a sequence of statements; a `hunt` anywhere in the sequence
    /// (however deeply nested inside `igni`/`quen`/`yrden`) immediately
    /// stops execution and is propagated to the caller.
    fn eval_block(&mut self, stmts: &[Stmt]) -> Result<StepOutcome, RuntimeError> {
        for stmt in stmts {
            match self.eval_stmt(stmt)? {
                StepOutcome::Normal => {}
                returning @ StepOutcome::Returning(_) => return Ok(returning),
            }
        }
        Ok(StepOutcome::Normal)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<StepOutcome, RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(StepOutcome::Normal)
            }
            Stmt::VarDecl {
                name, initializer, ..
            } => {
                // `is_constant` is parsed but deliberately unenforced — see
                // spec.md §9 and DESIGN.md.
                let value = self.eval_expr(initializer)?;
                trace!(name = %name, "binding variable");
                self.env.set(name.clone(), value);
                Ok(StepOutcome::Normal)
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.eval_block(then_body)
                } else if let Some(else_body) = else_body {
                    self.eval_block(else_body)
                } else {
                    Ok(StepOutcome::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(condition)?.is_truthy() {
                    match self.eval_block(body)? {
                        StepOutcome::Normal => {}
                        returning @ StepOutcome::Returning(_) => return Ok(returning),
                    }
                }
                Ok(StepOutcome::Normal)
            }
            Stmt::For {
                loop_var,
                iterable,
                body,
            } => self.eval_for(loop_var, iterable, body),
            Stmt::FuncDef { name, params, body } => {
                debug!(name = %name, arity = params.len(), "defining function");
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                };
                self.env.define_global(name.clone(), Value::Function(Rc::new(function)));
                Ok(StepOutcome::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Unit,
                };
                Ok(StepOutcome::Returning(value))
            }
            Stmt::Import { path, position } => {
                self.handle_import(path, *position)?;
                Ok(StepOutcome::Normal)
            }
        }
    }

    fn eval_for(
        &mut self,
        loop_var: &str,
        iterable: &Expr,
        body: &[Stmt],
    ) -> Result<StepOutcome, RuntimeError> {
        let position = iterable.position();
        let seq = match self.eval_expr(iterable)? {
            Value::Bestiary(seq) => seq,
            other => {
                return Err(RuntimeError::type_mismatch(
                    format!("'yrden' requires a bestiary, found {}", other.type_name()),
                    position,
                ))
            }
        };

        // Index by position rather than holding an iterator so that
        // mutating the sequence mid-loop (explicitly permitted by
        // spec.md §4.3) is observed on the next iteration.
        let mut i = 0;
        loop {
            let len = seq.borrow().len();
            if i >= len {
                break;
            }
            let element = seq.borrow()[i].clone();
            self.env.set(loop_var.to_string(), element);
            match self.eval_block(body)? {
                StepOutcome::Normal => {}
                returning @ StepOutcome::Returning(_) => return Ok(returning),
            }
            i += 1;
        }
        Ok(StepOutcome::Normal)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::NumberLit(n) => Ok(Value::Number(*n)),
            Expr::TextLit(s) => Ok(Value::Text(s.clone())),
            Expr::BoolLit(b) => Ok(Value::Boolean(*b)),
            Expr::Ident(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::undefined_name(name, Position::START)),
            Expr::ArrayLit(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for e in elements {
                    values.push(self.eval_expr(e)?);
                }
                Ok(Value::bestiary(values))
            }
            Expr::BinOp {
                op,
                left,
                right,
                position,
            } => self.eval_binop(op, left, right, *position),
            Expr::UnaryOp {
                op,
                operand,
                position,
            } => self.eval_unary(op, operand, *position),
            Expr::Assign {
                name,
                value,
                position: _,
            } => {
                let value = self.eval_expr(value)?;
                self.env.set(name.clone(), value.clone());
                Ok(value)
            }
            Expr::IndexAccess {
                target,
                index,
                position,
            } => {
                let target = self.eval_expr(target)?;
                let idx = self.eval_index(index, *position)?;
                self.index_get(&target, idx, *position)
            }
            Expr::IndexAssign {
                target,
                index,
                value,
                position,
            } => {
                let target_val = self.eval_expr(target)?;
                let idx = self.eval_index(index, *position)?;
                let value = self.eval_expr(value)?;
                self.index_set(&target_val, idx, value.clone(), *position)?;
                Ok(value)
            }
            Expr::Call {
                name,
                args,
                position,
            } => self.eval_call(name, args, *position),
        }
    }

    fn eval_index(&mut self, index: &Expr, position: Position) -> Result<i64, RuntimeError> {
        match self.eval_expr(index)? {
            Value::Number(n) => Ok(n.trunc() as i64),
            other => Err(RuntimeError::type_mismatch(
                format!("index must be a number, found {}", other.type_name()),
                position,
            )),
        }
    }

    fn index_get(&self, target: &Value, idx: i64, position: Position) -> Result<Value, RuntimeError> {
        match target {
            Value::Bestiary(seq) => {
                let seq = seq.borrow();
                resolve_index(seq.len(), idx, position).map(|i| seq[i].clone())
            }
            other => Err(RuntimeError::type_mismatch(
                format!("cannot index into {}", other.type_name()),
                position,
            )),
        }
    }

    fn index_set(
        &self,
        target: &Value,
        idx: i64,
        value: Value,
        position: Position,
    ) -> Result<(), RuntimeError> {
        match target {
            Value::Bestiary(seq) => {
                let mut seq = seq.borrow_mut();
                let i = resolve_index(seq.len(), idx, position)?;
                seq[i] = value;
                Ok(())
            }
            other => Err(RuntimeError::type_mismatch(
                format!("cannot index into {}", other.type_name()),
                position,
            )),
        }
    }

    fn eval_binop(
        &mut self,
        op: &BinOp,
        left: &Expr,
        right: &Expr,
        position: Position,
    ) -> Result<Value, RuntimeError> {
        // `and`/`or` short-circuit and must not evaluate the right operand
        // eagerly.
        if matches!(op, BinOp::And | BinOp::Or) {
            let l = self.eval_expr(left)?;
            return match op {
                BinOp::Or if l.is_truthy() => Ok(l),
                BinOp::Or => self.eval_expr(right),
                BinOp::And if l.is_truthy() => self.eval_expr(right),
                BinOp::And => Ok(l),
                _ => unreachable!(),
            };
        }

        let l = self.eval_expr(left)?;
        let r = self.eval_expr(right)?;

        match op {
            BinOp::Add => add_values(&l, &r, position),
            BinOp::Sub => numeric(&l, &r, position, |a, b| a - b),
            BinOp::Mul => numeric(&l, &r, position, |a, b| a * b),
            BinOp::Mod => numeric(&l, &r, position, |a, b| a % b),
            BinOp::Div => match (&l, &r) {
                (Value::Number(_), Value::Number(b)) if *b == 0.0 => {
                    Err(RuntimeError::division_by_zero(position))
                }
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
                _ => Err(type_error("/", &l, &r, position)),
            },
            BinOp::Lt => compare(&l, &r, position, |o| o.is_lt()),
            BinOp::LtEq => compare(&l, &r, position, |o| o.is_le()),
            BinOp::Gt => compare(&l, &r, position, |o| o.is_gt()),
            BinOp::GtEq => compare(&l, &r, position, |o| o.is_ge()),
            BinOp::Eq => Ok(Value::Boolean(l == r)),
            BinOp::NotEq => Ok(Value::Boolean(l != r)),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_unary(&mut self, op: &UnaryOp, operand: &Expr, position: Position) -> Result<Value, RuntimeError> {
        let v = self.eval_expr(operand)?;
        match op {
            UnaryOp::Not => Ok(Value::Boolean(!v.is_truthy())),
            UnaryOp::Neg => match v {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(RuntimeError::type_mismatch(
                    format!("unary '-' requires a number, found {}", other.type_name()),
                    position,
                )),
            },
        }
    }

    fn eval_call(&mut self, name: &str, args: &[Expr], position: Position) -> Result<Value, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval_expr(a)?);
        }

        if let Some(result) = builtins::call(self, name, &values, position) {
            return result;
        }

        self.call_user_function(name, values, position)
    }

    fn call_user_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        position: Position,
    ) -> Result<Value, RuntimeError> {
        let function = match self.env.get(name) {
            Some(Value::Function(f)) => f.clone(),
            Some(_) => return Err(RuntimeError::not_callable(name, position)),
            None => return Err(RuntimeError::undefined_name(name, position)),
        };

        if function.params.len() != args.len() {
            return Err(RuntimeError::arity_mismatch(
                name,
                function.params.len(),
                args.len(),
                position,
            ));
        }

        let mut frame = Frame::new();
        for (param, arg) in function.params.iter().zip(args.into_iter()) {
            frame.insert(param.clone(), arg);
        }
        self.env.push_frame(frame);

        // Functions resolve free names against globals at call time, not
        // at definition: nothing of the caller's frame is copied in, and
        // popping below always runs, even on a runtime failure mid-body.
        let outcome = self.eval_block(&function.body);
        self.env.pop_frame();

        match outcome? {
            StepOutcome::Normal => Ok(Value::Unit),
            StepOutcome::Returning(value) => Ok(value),
        }
    }

    // Resolved relative to the importing file's own directory, not the
    // process cwd. Diverges on purpose from the reference interpreter's
    // `os.path.abspath(path)` (cwd-relative) — see DESIGN.md.
    fn handle_import(&mut self, path: &str, position: Position) -> Result<(), RuntimeError> {
        let base = self.base_dirs.last().cloned().unwrap_or_else(|| PathBuf::from("."));
        let candidate = base.join(path);
        let resolved = fs::canonicalize(&candidate).map_err(|_| {
            RuntimeError::grimoire_not_found(path, position)
        })?;

        if self.imported.contains(&resolved) {
            return Err(RuntimeError::circular_import(path, position));
        }
        self.imported.insert(resolved.clone());

        info!(path = %resolved.display(), "importing grimoire");

        let source = fs::read_to_string(&resolved)
            .map_err(|_| RuntimeError::grimoire_not_found(path, position))?;
        let program = crate::parser::parse_source(&source)
            .map_err(|_| RuntimeError::new(format!("Failed to parse grimoire: {path}"), position))?;

        let dir = resolved
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(base);
        self.base_dirs.push(dir);
        let result = self.eval_block(&program).map(|_| ());
        self.base_dirs.pop();
        result
    }
}

/// `+`: text concatenation if either operand is Text, else numeric
/// addition. Shared between the `+` operator and the `potion_effect`
/// built-in, which spec.md §4.3 defines as "equivalent to `a + b`".
pub(crate) fn add_values(l: &Value, r: &Value, position: Position) -> Result<Value, RuntimeError> {
    if matches!(l, Value::Text(_)) || matches!(r, Value::Text(_)) {
        Ok(Value::Text(format!("{}{}", l.to_display_string(), r.to_display_string())))
    } else if let (Value::Number(a), Value::Number(b)) = (l, r) {
        Ok(Value::Number(a + b))
    } else {
        Err(type_error("+", l, r, position))
    }
}

fn resolve_index(len: usize, idx: i64, position: Position) -> Result<usize, RuntimeError> {
    if idx < 0 || idx as usize >= len {
        Err(RuntimeError::invalid_index(position))
    } else {
        Ok(idx as usize)
    }
}

fn numeric(
    l: &Value,
    r: &Value,
    position: Position,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        _ => Err(type_error("arithmetic", l, r, position)),
    }
}

fn compare(
    l: &Value,
    r: &Value,
    position: Position,
    f: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(f(a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)))),
        (Value::Text(a), Value::Text(b)) => Ok(Value::Boolean(f(a.cmp(b)))),
        _ => Err(type_error("comparison", l, r, position)),
    }
}

fn type_error(op: &str, l: &Value, r: &Value, position: Position) -> RuntimeError {
    RuntimeError::type_mismatch(
        format!(
            "cannot apply '{op}' to {} and {}",
            l.type_name(),
            r.type_name()
        ),
        position,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Engine {
        let mut engine = Engine::new();
        engine.eval(src).unwrap();
        engine
    }

    #[test]
    fn frames_are_empty_after_top_level_run() {
        let engine = run("contract x = 1");
        assert_eq!(engine.frame_depth(), 0);
    }

    #[test]
    fn function_calls_leave_frame_depth_unchanged() {
        let engine = run("aard id(x) { hunt x }\ncontract y = id(5)");
        assert_eq!(engine.frame_depth(), 0);
    }

    #[test]
    fn recursive_factorial() {
        let mut engine = Engine::new();
        engine
            .eval("aard fact(n) { igni n <= 1 { hunt 1 } elixir { hunt n * fact(n - 1) } }\ncontract r = fact(5)")
            .unwrap();
        assert_eq!(engine.get("r"), Some(Value::Number(120.0)));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let mut engine = Engine::new();
        let err = engine.eval("contract x = 10 / 0").unwrap_err();
        assert!(err.to_string().contains("Division by zero"));
    }

    #[test]
    fn for_loop_sums_bestiary() {
        let mut engine = Engine::new();
        engine
            .eval("contract s = 0\nyrden i -> [1,2,3,4,5] { s = s + i }")
            .unwrap();
        assert_eq!(engine.get("s"), Some(Value::Number(15.0)));
    }

    #[test]
    fn empty_bestiary_iterates_zero_times() {
        let mut engine = Engine::new();
        engine.eval("contract n = 0\nyrden i -> [] { n = n + 1 }").unwrap();
        assert_eq!(engine.get("n"), Some(Value::Number(0.0)));
    }

    #[test]
    fn negative_index_assignment_errors() {
        let mut engine = Engine::new();
        let err = engine.eval("contract xs = [1,2,3]\nxs[-1] = 9").unwrap_err();
        assert!(err.to_string().contains("Invalid index"));
    }

    #[test]
    fn or_returns_operand_value_not_boolean() {
        let mut engine = Engine::new();
        engine.eval("contract r = 0 or 7").unwrap();
        assert_eq!(engine.get("r"), Some(Value::Number(7.0)));
    }

    #[test]
    fn and_returns_operand_value_not_boolean() {
        let mut engine = Engine::new();
        engine.eval("contract r = 5 and 7").unwrap();
        assert_eq!(engine.get("r"), Some(Value::Number(7.0)));
    }

    #[test]
    fn double_not_equals_truthiness() {
        let mut engine = Engine::new();
        engine.eval("contract r = not not 5").unwrap();
        assert_eq!(engine.get("r"), Some(Value::Boolean(true)));
    }

    #[test]
    fn string_concatenation_with_numbers() {
        let mut engine = Engine::new();
        engine.eval(r#"contract r = "answer: " + 42"#).unwrap();
        assert_eq!(engine.get("r"), Some(Value::Text("answer: 42".into())));
    }
}
