//! The runtime value universe.
//!
//! [`Value::Bestiary`] is the one reference type in the language: it wraps
//! `Rc<RefCell<Vec<Value>>>` so that two bindings to the same sequence
//! observe each other's mutations, matching `spec.md` §3's "shared by
//! reference" requirement. Every other variant is plain-old data and clones
//! cheaply.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::Stmt;

/// A first-class function value: parameter names plus a reference-counted
/// handle to its body. Closures capture no environment — see
/// [`crate::engine::Engine`] for how free names are resolved at call time.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
}

/// A mutable, ordered, reference-counted sequence of values.
pub type Bestiary = Rc<RefCell<Vec<Value>>>;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Bestiary(Bestiary),
    Function(Rc<Function>),
    Unit,
}

impl Value {
    pub fn bestiary(items: Vec<Value>) -> Self {
        Self::Bestiary(Rc::new(RefCell::new(items)))
    }

    /// The coercion from any value to a boolean, used by conditions, `not`,
    /// and the short-circuit operators.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::Boolean(b) => *b,
            Self::Bestiary(seq) => !seq.borrow().is_empty(),
            Self::Function(_) => true,
            Self::Unit => false,
        }
    }

    /// A short type name used in runtime error messages. Not the same
    /// string table as the `hunter_instinct` built-in, which distinguishes
    /// `truth` from `falsehood`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::Bestiary(_) => "bestiary",
            Self::Function(_) => "function",
            Self::Unit => "unit",
        }
    }

    /// Renders a value the way `medallion` and string concatenation do:
    /// numbers without a trailing `.0` when integral, booleans as
    /// `truth`/`falsehood`, sequences bracketed and comma-separated.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::Boolean(b) => {
                if *b {
                    "truth".to_string()
                } else {
                    "falsehood".to_string()
                }
            }
            Self::Bestiary(seq) => {
                let items: Vec<String> = seq.borrow().iter().map(Value::to_display_string).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Function(func) => format!("<function {}>", func.name),
            Self::Unit => String::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        let s = format!("{n}");
        s
    }
}

impl PartialEq for Value {
    /// Structural, typed equality: values of different kinds are unequal
    /// without error. Bestiary equality compares contents, not identity —
    /// `spec.md` §3 explicitly allows this.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Bestiary(a), Self::Bestiary(b)) => *a.borrow() == *b.borrow(),
            (Self::Unit, Self::Unit) => true,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_spec_table() {
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Number(1.0).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(Value::Text("x".into()).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::bestiary(vec![]).is_truthy());
        assert!(Value::bestiary(vec![Value::Unit]).is_truthy());
        assert!(!Value::Unit.is_truthy());
    }

    #[test]
    fn bestiary_aliases_share_mutations() {
        let seq = Value::bestiary(vec![Value::Number(1.0)]);
        let alias = seq.clone();
        if let Value::Bestiary(cell) = &seq {
            cell.borrow_mut().push(Value::Number(2.0));
        }
        if let Value::Bestiary(cell) = &alias {
            assert_eq!(cell.borrow().len(), 2);
        } else {
            unreachable!()
        }
    }

    #[test]
    fn number_renders_without_trailing_zero() {
        assert_eq!(Value::Number(5.0).to_display_string(), "5");
        assert_eq!(Value::Number(5.5).to_display_string(), "5.5");
    }

    #[test]
    fn type_names_are_total() {
        assert_eq!(Value::Number(1.0).type_name(), "number");
        assert_eq!(Value::Text("a".into()).type_name(), "text");
        assert_eq!(Value::Boolean(true).type_name(), "boolean");
        assert_eq!(Value::bestiary(vec![]).type_name(), "bestiary");
        assert_eq!(Value::Unit.type_name(), "unit");
    }
}
