/*
 * ==========================================================================
 * A metacircular, continuation-passing-style interpreter core.
 * ==========================================================================
 *
 * License:
 * This file is part of the interpreter project.
 *
 * Dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */

//! Lexically-linked scope frames (`spec.md` §3 Environment, component C2).
//!
//! Generalizes `pawx::environment::Environment`: the teacher keeps an
//! access-level tag (`pride`/`den`/`lair`) per binding because its surface
//! language has public/private/protected variable declarations; this spec
//! has no such concept, so `Frame` drops that tag and keeps the rest of the
//! shape — a name→value map plus a shared, read-only back-edge to the
//! enclosing frame.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::AssignmentMode;
use crate::error::HostError;
use crate::value::Value;

/// One lexical scope. Frames are always held behind an `Rc`: a closure
/// captures its defining frame by cloning the `Rc`, never by copying the
/// frame — `spec.md` §3 requires frames to be "shared, never copied."
#[derive(Debug)]
pub struct Frame {
    values: RefCell<HashMap<String, Value>>,
    prev: Option<Rc<Frame>>,
}

impl Frame {
    pub fn root() -> Rc<Self> {
        Rc::new(Self { values: RefCell::new(HashMap::new()), prev: None })
    }

    pub fn child(prev: &Rc<Frame>) -> Rc<Self> {
        Rc::new(Self { values: RefCell::new(HashMap::new()), prev: Some(prev.clone()) })
    }

    /// `getValue` (`spec.md` §4.4): walk `prev` until found, `None` if the
    /// chain ends unbound.
    pub fn get_value(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.values.borrow().get(name) {
            return Some(v.clone());
        }
        self.prev.as_ref().and_then(|p| p.get_value(name))
    }

    /// `defineValue`: bind in the current frame, shadowing any outer
    /// binding of the same name.
    pub fn define_value(&self, name: impl Into<String>, value: Value) {
        self.values.borrow_mut().insert(name.into(), value);
    }

    /// `setValue`: assign in the nearest frame that already binds `name`.
    /// Under [`AssignmentMode::Sloppy`] (the default, matching
    /// `pawx::environment::Environment::assign`'s fallback — see
    /// `SPEC_FULL.md` §5 / DESIGN.md Open Questions), an unbound name is
    /// created in the root frame instead of erroring. Under
    /// [`AssignmentMode::Strict`] this raises `HostError::Reference`.
    pub fn set_value(self: &Rc<Self>, name: &str, value: Value, mode: AssignmentMode) -> Result<(), HostError> {
        if self.assign_in_place(name, value.clone()) {
            return Ok(());
        }

        match mode {
            AssignmentMode::Sloppy => {
                self.root().define_value(name.to_string(), value);
                Ok(())
            }
            AssignmentMode::Strict => Err(HostError::reference(name)),
        }
    }

    fn assign_in_place(&self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.borrow_mut().get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.prev {
            Some(p) => p.assign_in_place(name, value),
            None => false,
        }
    }

    fn root(self: &Rc<Self>) -> Rc<Frame> {
        let mut current = self.clone();
        loop {
            match &current.prev {
                Some(p) => current = p.clone(),
                None => return current,
            }
        }
    }

    /// `mergeValues`: a new child frame pre-populated with `extras`, used
    /// when binding a function's parameters or a `catch` clause's
    /// exception variable.
    pub fn merge_values(prev: &Rc<Frame>, extras: HashMap<String, Value>) -> Rc<Frame> {
        let frame = Frame::child(prev);
        *frame.values.borrow_mut() = extras;
        frame
    }

    /// Whether `name` is bound in this exact frame (not an ancestor) —
    /// used by `VariableDeclaration` hoisting checks and tests.
    pub fn has_own(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_the_parent_chain() {
        let root = Frame::root();
        root.define_value("a", Value::Number(1.0));
        let child = Frame::child(&root);
        assert_eq!(child.get_value("a").unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn shadowing_inner_binding_does_not_touch_outer() {
        let root = Frame::root();
        root.define_value("x", Value::Number(1.0));
        let child = Frame::child(&root);
        child.define_value("x", Value::Number(2.0));
        assert_eq!(child.get_value("x").unwrap().as_number(), Some(2.0));
        assert_eq!(root.get_value("x").unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn assignment_mutates_the_outer_frame_that_owns_the_binding() {
        let root = Frame::root();
        root.define_value("x", Value::Number(1.0));
        let child = Frame::child(&root);
        child.set_value("x", Value::Number(9.0), AssignmentMode::Sloppy).unwrap();
        assert_eq!(root.get_value("x").unwrap().as_number(), Some(9.0));
    }

    #[test]
    fn sloppy_assignment_to_undeclared_name_creates_at_root() {
        let root = Frame::root();
        let child = Frame::child(&root);
        child.set_value("ghost", Value::Number(3.0), AssignmentMode::Sloppy).unwrap();
        assert!(root.has_own("ghost"));
        assert!(!child.has_own("ghost"));
    }

    #[test]
    fn strict_assignment_to_undeclared_name_errors() {
        let root = Frame::root();
        let err = root.set_value("ghost", Value::Number(3.0), AssignmentMode::Strict).unwrap_err();
        assert!(matches!(err, HostError::Reference { .. }));
    }

    #[test]
    fn unbound_lookup_returns_none() {
        let root = Frame::root();
        assert!(root.get_value("nope").is_none());
    }
}
