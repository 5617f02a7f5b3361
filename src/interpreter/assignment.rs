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

//! `AssignmentExpression` and `MemberExpression` (`spec.md` §4.2).
//!
//! Property access and property assignment share one notion of a resolved
//! property name, whether it came from a plain `.foo` or a computed
//! `[expr]` — [`resolve_property_name`] and [`get_property`]/[`set_property`]
//! are also reused by `crate::interpreter::operators::update` for `++`/`--`
//! on a member target.

use std::rc::Rc;

use crate::ast::{AssignOp, AstNode, MemberKey, NodeKind};
use crate::config::EvaluationConfig;
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::error::HostError;
use crate::exception::ExceptionPacket;
use crate::interpreter::operators::apply_binary;
use crate::value::{HostObject, Value};

pub fn assign(
    op: AssignOp,
    target: &Rc<AstNode>,
    value_node: &Rc<AstNode>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    match &target.kind {
        NodeKind::Identifier(name) => assign_identifier(op, name.clone(), value_node.clone(), env, config, c, cerr),
        NodeKind::Member { object, property } => {
            assign_member(op, object.clone(), property.clone(), value_node.clone(), env, config, c, cerr)
        }
        _ => cerr(ExceptionPacket::host_error(HostError::syntax("invalid assignment target"))),
    }
}

fn assign_identifier(
    op: AssignOp,
    name: String,
    value_node: Rc<AstNode>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let env_for_rhs = env.clone();
    let config_for_set = config.clone();
    let cerr_for_rhs = cerr.clone();

    evaluate(
        value_node,
        env.clone(),
        config,
        Rc::new(move |rhs| {
            let final_value = match op.as_binary_op() {
                None => rhs,
                Some(bin_op) => {
                    let current = env_for_rhs.get_value(&name).unwrap_or(Value::Undefined);
                    apply_binary(bin_op, &current, &rhs)
                }
            };
            match env_for_rhs.set_value(&name, final_value.clone(), config_for_set.assignment_mode) {
                Ok(()) => c(final_value),
                Err(err) => cerr_for_rhs.clone()(ExceptionPacket::host_error(err)),
            }
        }),
        cerr,
    )
}

fn assign_member(
    op: AssignOp,
    object: Rc<AstNode>,
    property: MemberKey,
    value_node: Rc<AstNode>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let env_for_key = env.clone();
    let config_for_key = config.clone();
    let cerr_for_obj = cerr.clone();

    evaluate(
        object,
        env,
        config,
        Rc::new(move |obj_val| {
            if obj_val.is_nullish() {
                return cerr_for_obj.clone()(ExceptionPacket::host_error(HostError::type_error(
                    "cannot set properties of null or undefined",
                )));
            }

            let obj_for_rhs = obj_val.clone();
            let value_node = value_node.clone();
            let env_for_rhs = env_for_key.clone();
            let config_for_rhs = config_for_key.clone();
            let c_for_name = c.clone();
            let cerr_for_name = cerr_for_obj.clone();

            resolve_property_name(
                &property,
                env_for_key.clone(),
                config_for_key.clone(),
                Rc::new(move |name| {
                    let obj_for_write = obj_for_rhs.clone();
                    let name_for_write = name.clone();
                    let c = c_for_name.clone();
                    let cerr_for_write = cerr_for_name.clone();

                    evaluate(
                        value_node.clone(),
                        env_for_rhs.clone(),
                        config_for_rhs.clone(),
                        Rc::new(move |rhs| {
                            let final_value = match op.as_binary_op() {
                                None => rhs,
                                Some(bin_op) => {
                                    let current = get_property(&obj_for_write, &name_for_write);
                                    apply_binary(bin_op, &current, &rhs)
                                }
                            };
                            match set_property(&obj_for_write, &name_for_write, final_value.clone()) {
                                Ok(()) => c(final_value),
                                Err(err) => cerr_for_write.clone()(ExceptionPacket::host_error(err)),
                            }
                        }),
                        cerr_for_name.clone(),
                    );
                }),
                cerr_for_obj.clone(),
            );
        }),
        cerr,
    )
}

pub fn member_get(
    object: &Rc<AstNode>,
    property: &MemberKey,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let property = property.clone();
    let env_for_key = env.clone();
    let config_for_key = config.clone();
    let cerr_for_obj = cerr.clone();

    evaluate(
        object.clone(),
        env,
        config,
        Rc::new(move |obj_val| {
            if obj_val.is_nullish() {
                return cerr_for_obj.clone()(ExceptionPacket::host_error(HostError::type_error(
                    "cannot read properties of null or undefined",
                )));
            }
            let obj_for_name = obj_val.clone();
            let c = c.clone();
            resolve_property_name(
                &property,
                env_for_key.clone(),
                config_for_key.clone(),
                Rc::new(move |name| c(get_property(&obj_for_name, &name))),
                cerr_for_obj.clone(),
            );
        }),
        cerr,
    )
}

/// Resolves a `.foo` or `[expr]` property key to a plain string, evaluating
/// the computed-key expression if needed.
pub(crate) fn resolve_property_name(
    property: &MemberKey,
    env: Rc<Frame>,
    config: EvaluationConfig,
    on_name: Rc<dyn Fn(String)>,
    cerr: ErrorCont,
) {
    match property {
        MemberKey::Identifier(name) => on_name(name.clone()),
        MemberKey::Computed(expr) => {
            evaluate(expr.clone(), env, config, Rc::new(move |key_val| on_name(key_val.stringify())), cerr)
        }
    }
}

/// `array.length` is the one virtual, read-only property this crate
/// supports; every other array/string access is by numeric index, every
/// record access is by field name. Anything else (reading a property off a
/// number, boolean, or function) is `undefined`, matching how the rest of
/// the evaluator treats host types as opaque.
pub(crate) fn get_property(obj: &Value, name: &str) -> Value {
    match obj {
        Value::HostObject(HostObject::Array(arr)) => {
            if name == "length" {
                return Value::Number(arr.borrow().len() as f64);
            }
            match name.parse::<usize>() {
                Ok(idx) => arr.borrow().get(idx).cloned().unwrap_or(Value::Undefined),
                Err(_) => Value::Undefined,
            }
        }
        Value::HostObject(HostObject::Record(map)) => map.borrow().get(name).cloned().unwrap_or(Value::Undefined),
        Value::String(s) if name == "length" => Value::Number(s.chars().count() as f64),
        _ => Value::Undefined,
    }
}

pub(crate) fn set_property(obj: &Value, name: &str, value: Value) -> Result<(), HostError> {
    match obj {
        Value::HostObject(HostObject::Array(arr)) => {
            if name == "length" {
                return Err(HostError::type_error("cannot assign to array length"));
            }
            match name.parse::<usize>() {
                Ok(idx) => {
                    let mut arr = arr.borrow_mut();
                    if idx >= arr.len() {
                        arr.resize(idx + 1, Value::Undefined);
                    }
                    arr[idx] = value;
                    Ok(())
                }
                Err(_) => Err(HostError::type_error(format!("invalid array index '{name}'"))),
            }
        }
        Value::HostObject(HostObject::Record(map)) => {
            map.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        other => Err(HostError::type_error(format!("cannot set property '{name}' on {}", other.type_name()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn array_length_is_read_only() {
        let arr = Value::array(vec![Value::Number(1.0)]);
        assert!(set_property(&arr, "length", Value::Number(0.0)).is_err());
    }

    #[test]
    fn array_out_of_bounds_write_extends_with_undefined_holes() {
        let arr = Value::array(vec![Value::Number(1.0)]);
        set_property(&arr, "3", Value::Number(9.0)).unwrap();
        assert_eq!(get_property(&arr, "1").stringify(), "undefined");
        assert_eq!(get_property(&arr, "3").as_number(), Some(9.0));
    }

    #[test]
    fn record_field_round_trips() {
        let record = Value::record(IndexMap::new());
        set_property(&record, "name", Value::string("ok")).unwrap();
        assert_eq!(get_property(&record, "name").as_string(), Some("ok"));
    }
}
