//! The process-wide environment: globals plus a stack of call frames.
//!
//! There is no lexical block scope — `if`/`while`/`for` bodies write
//! straight into the enclosing frame (or globals at top level). This is a
//! deliberate, spec-mandated departure from how a host language would
//! normally model scoping; see `spec.md` §9.

use std::collections::HashMap;

use crate::value::Value;

/// A single call activation record.
pub type Frame = HashMap<String, Value>;

/// `globals` plus a stack of `frames`. Lookup scans frames top-to-bottom
/// then falls back to globals; assignment writes to the innermost frame if
/// one is active, else to globals.
#[derive(Debug, Default)]
pub struct Environment {
    globals: Frame,
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.get(name) {
                return Some(v);
            }
        }
        self.globals.get(name)
    }

    /// Writes to the innermost frame if one is active, else to globals —
    /// the rule that makes loop variables and `hunt`-less assignments leak
    /// into the caller's scope.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value);
        } else {
            self.globals.insert(name.into(), value);
        }
    }

    /// Functions always bind into globals, regardless of the active frame —
    /// `aard` definitions are visible everywhere once executed.
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_without_frame_writes_globals() {
        let mut env = Environment::new();
        env.set("x", Value::Number(1.0));
        assert_eq!(env.get("x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn set_with_active_frame_writes_frame_not_globals() {
        let mut env = Environment::new();
        env.push_frame(Frame::new());
        env.set("x", Value::Number(1.0));
        env.pop_frame();
        assert_eq!(env.get("x"), None);
    }

    #[test]
    fn lookup_scans_frames_before_globals() {
        let mut env = Environment::new();
        env.set("x", Value::Number(1.0));
        let mut frame = Frame::new();
        frame.insert("x".to_string(), Value::Number(2.0));
        env.push_frame(frame);
        assert_eq!(env.get("x"), Some(&Value::Number(2.0)));
    }
}
