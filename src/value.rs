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

//! Runtime value representation (`spec.md` §3, component C1).
//!
//! Every expression the evaluator dispatches ultimately produces one of
//! these. `Value` generalizes `pawx::value::Value`: primitives stay the
//! same shape, but the grab-bag of host-specific variants (`Class`,
//! `Instance`, `Furure`, `Regex`, `Module`, ...) collapses into one opaque
//! [`HostObject`] — the spec treats the host boundary as a single
//! collaborator, not a feature surface this crate owns.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::exception::ExceptionPacket;
use crate::meta_function::MetaFunction;

/// A host-native callable. Takes `this` and the evaluated argument vector,
/// returns a value or — mirroring a thrown error at the host boundary — an
/// [`ExceptionPacket`]. This is the uniform shape both plain native
/// functions and [`crate::meta_function::create_meta_function_wrapper`]
/// wrappers present to calling code (`spec.md` §4.3).
pub struct NativeFunction {
    pub name: String,
    #[allow(clippy::type_complexity)]
    func: Box<dyn Fn(Value, &[Value]) -> Result<Value, ExceptionPacket>>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(Value, &[Value]) -> Result<Value, ExceptionPacket> + 'static,
    ) -> Rc<Self> {
        Rc::new(Self { name: name.into(), func: Box::new(func) })
    }

    pub fn call(&self, this: Value, args: &[Value]) -> Result<Value, ExceptionPacket> {
        (self.func)(this, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// The host-side object model: arrays, records, and native functions.
///
/// `spec.md` describes this as "opaque reference to a host-side value" —
/// the evaluator never needs to know more than this about a `HostObject`
/// beyond what `MemberExpression`/`CallExpression` do with it.
#[derive(Debug, Clone)]
pub enum HostObject {
    Array(Rc<RefCell<Vec<Value>>>),
    Record(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<NativeFunction>),
}

impl HostObject {
    pub fn new_array(values: Vec<Value>) -> Self {
        HostObject::Array(Rc::new(RefCell::new(values)))
    }

    pub fn new_record(fields: IndexMap<String, Value>) -> Self {
        HostObject::Record(Rc::new(RefCell::new(fields)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HostObject::Array(_) => "Array",
            HostObject::Record(_) => "Object",
            HostObject::Function(_) => "Function",
        }
    }
}

/// The uniform tagged value every evaluation step produces (`spec.md` §3).
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    HostObject(HostObject),
    MetaFunction(Rc<MetaFunction>),
    /// A whole exception packet reified as a value — used when host code
    /// wants to hold onto or re-surface a full packet (label and all)
    /// rather than just the unwrapped thrown value a `catch` clause binds.
    Exception(Rc<ExceptionPacket>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::HostObject(HostObject::new_array(values))
    }

    pub fn record(fields: IndexMap<String, Value>) -> Self {
        Value::HostObject(HostObject::new_record(fields))
    }

    pub fn native_fn(
        name: impl Into<String>,
        func: impl Fn(Value, &[Value]) -> Result<Value, ExceptionPacket> + 'static,
    ) -> Self {
        Value::HostObject(HostObject::Function(NativeFunction::new(name, func)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::HostObject(h) => h.type_name(),
            Value::MetaFunction(_) => "Function",
            Value::Exception(_) => "ExceptionPacket",
        }
    }

    /// Host boolean coercion used by `if`/`while`/`&&`/`||` truthiness
    /// (`spec.md` §4.2). `NaN` and `0` are falsy; every object, array, and
    /// function is truthy, matching the teacher's `is_truthy` rules.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::HostObject(_) | Value::MetaFunction(_) | Value::Exception(_) => true,
        }
    }

    /// `??` treats only `null`/`undefined` as absent, unlike `is_truthy`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable stringification, analogous to `pawx::Value::stringify`.
    pub fn stringify(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.to_string(),
            Value::HostObject(HostObject::Array(values)) => {
                let inner = values.borrow().iter().map(Value::stringify).collect::<Vec<_>>().join(",");
                format!("[{inner}]")
            }
            Value::HostObject(HostObject::Record(_)) => "[object Object]".to_string(),
            Value::HostObject(HostObject::Function(f)) => format!("[Function: {}]", f.name),
            Value::MetaFunction(m) => format!("[Function: {}]", m.display_name()),
            Value::Exception(packet) => format!("[Exception {:?}]", packet.kind),
        }
    }

    /// Loose equality (`==`): primitives compare by value, `null`/`undefined`
    /// are mutually loosely-equal, everything else compares by identity.
    pub fn loose_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            _ => Value::strict_eq(a, b),
        }
    }

    /// Strict equality (`===`): primitives by value, reference types by
    /// pointer identity (`spec.md` §4.2).
    pub fn strict_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            (Value::HostObject(HostObject::Array(x)), Value::HostObject(HostObject::Array(y))) => {
                Rc::ptr_eq(x, y)
            }
            (Value::HostObject(HostObject::Record(x)), Value::HostObject(HostObject::Record(y))) => {
                Rc::ptr_eq(x, y)
            }
            (Value::HostObject(HostObject::Function(x)), Value::HostObject(HostObject::Function(y))) => {
                Rc::ptr_eq(x, y)
            }
            (Value::MetaFunction(x), Value::MetaFunction(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_truthiness_matches_nan_and_zero_rules() {
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
    }

    #[test]
    fn nullish_is_narrower_than_truthy() {
        assert!(!Value::Number(0.0).is_nullish());
        assert!(Value::Undefined.is_nullish());
        assert!(Value::Null.is_nullish());
    }

    #[test]
    fn strict_eq_on_arrays_is_pointer_identity() {
        let a = Value::array(vec![Value::Number(1.0)]);
        let b = Value::array(vec![Value::Number(1.0)]);
        assert!(!Value::strict_eq(&a, &b));
        assert!(Value::strict_eq(&a, &a.clone()));
    }

    #[test]
    fn loose_eq_treats_null_and_undefined_as_equal() {
        assert!(Value::loose_eq(&Value::Null, &Value::Undefined));
    }
}
