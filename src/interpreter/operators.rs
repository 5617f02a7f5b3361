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

//! `BinaryExpression`, `LogicalExpression`, `UnaryExpression`, and
//! `UpdateExpression` (`spec.md` §4.2).

use std::rc::Rc;

use crate::ast::{AstNode, BinaryOp, LogicalOp, NodeKind, UnaryOp, UpdateOp};
use crate::config::EvaluationConfig;
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::error::HostError;
use crate::exception::ExceptionPacket;
use crate::interpreter::assignment;
use crate::interpreter::helpers;
use crate::value::{HostObject, Value};

pub fn binary(
    op: BinaryOp,
    left: &Rc<AstNode>,
    right: &Rc<AstNode>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let right = right.clone();
    let env_for_right = env.clone();
    let config_for_right = config.clone();
    let cerr_for_right = cerr.clone();

    evaluate(
        left.clone(),
        env,
        config,
        Rc::new(move |left_val| {
            let c = c.clone();
            evaluate(
                right.clone(),
                env_for_right.clone(),
                config_for_right.clone(),
                Rc::new(move |right_val| c(apply_binary(op, &left_val, &right_val))),
                cerr_for_right.clone(),
            );
        }),
        cerr,
    )
}

/// `&&`/`||`/`??` short-circuit: the right side is only dispatched — and
/// only then does it go through the interceptor — when the left side
/// doesn't already decide the result (`spec.md` §4.2).
pub fn logical(
    op: LogicalOp,
    left: &Rc<AstNode>,
    right: &Rc<AstNode>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let right = right.clone();
    let env_for_right = env.clone();
    let config_for_right = config.clone();
    let cerr_for_right = cerr.clone();

    evaluate(
        left.clone(),
        env,
        config,
        Rc::new(move |left_val| {
            let short_circuits = match op {
                LogicalOp::And => !left_val.is_truthy(),
                LogicalOp::Or => left_val.is_truthy(),
                LogicalOp::NullishCoalesce => !left_val.is_nullish(),
            };
            if short_circuits {
                return c(left_val);
            }
            evaluate(right.clone(), env_for_right.clone(), config_for_right.clone(), c.clone(), cerr_for_right.clone());
        }),
        cerr,
    )
}

pub fn unary(op: UnaryOp, argument: &Rc<AstNode>, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    // `typeof` on an unbound identifier yields `"undefined"` rather than
    // raising a reference error — the one place this evaluator treats a
    // missing binding as a value instead of an error.
    if let (UnaryOp::TypeOf, NodeKind::Identifier(name)) = (op, &argument.kind) {
        let value = env.get_value(name).unwrap_or(Value::Undefined);
        return c(Value::string(type_of(&value)));
    }

    evaluate(
        argument.clone(),
        env,
        config,
        Rc::new(move |value| {
            c(match op {
                UnaryOp::Neg => Value::Number(-helpers::to_number(&value)),
                UnaryOp::Plus => Value::Number(helpers::to_number(&value)),
                UnaryOp::Not => Value::Boolean(!value.is_truthy()),
                UnaryOp::BitNot => Value::Number(!helpers::to_i32(&value) as f64),
                UnaryOp::TypeOf => Value::string(type_of(&value)),
            });
        }),
        cerr,
    )
}

/// `++`/`--`, prefix or postfix, on an identifier or member target
/// (`spec.md` §4.2). Shares [`assignment::get_property`]/`set_property` with
/// plain member assignment rather than re-deriving property access rules.
pub fn update(
    op: UpdateOp,
    argument: &Rc<AstNode>,
    prefix: bool,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    match &argument.kind {
        NodeKind::Identifier(name) => {
            let current = match env.get_value(name) {
                Some(v) => v,
                None => return cerr(ExceptionPacket::host_error(HostError::reference(name.clone()))),
            };
            let old = helpers::to_number(&current);
            let new_value = Value::Number(apply_update(op, old));
            if let Err(err) = env.set_value(name, new_value.clone(), config.assignment_mode) {
                return cerr(ExceptionPacket::host_error(err));
            }
            c(if prefix { new_value } else { Value::Number(old) })
        }
        NodeKind::Member { object, property } => {
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
                            "cannot update properties of null or undefined",
                        )));
                    }
                    let obj_for_write = obj_val.clone();
                    let c = c.clone();
                    let cerr_for_write = cerr_for_obj.clone();

                    assignment::resolve_property_name(
                        &property,
                        env_for_key.clone(),
                        config_for_key.clone(),
                        Rc::new(move |name| {
                            let current = assignment::get_property(&obj_for_write, &name);
                            let old = helpers::to_number(&current);
                            let new_value = Value::Number(apply_update(op, old));
                            match assignment::set_property(&obj_for_write, &name, new_value.clone()) {
                                Ok(()) => c(if prefix { new_value.clone() } else { Value::Number(old) }),
                                Err(err) => cerr_for_write.clone()(ExceptionPacket::host_error(err)),
                            }
                        }),
                        cerr_for_obj.clone(),
                    );
                }),
                cerr,
            );
        }
        _ => cerr(ExceptionPacket::host_error(HostError::syntax("invalid update target"))),
    }
}

fn apply_update(op: UpdateOp, old: f64) -> f64 {
    match op {
        UpdateOp::Increment => old + 1.0,
        UpdateOp::Decrement => old - 1.0,
    }
}

pub(crate) fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            if helpers::is_string_like(left) || helpers::is_string_like(right) {
                Value::string(format!("{}{}", left.stringify(), right.stringify()))
            } else {
                Value::Number(helpers::to_number(left) + helpers::to_number(right))
            }
        }
        BinaryOp::Sub => Value::Number(helpers::to_number(left) - helpers::to_number(right)),
        BinaryOp::Mul => Value::Number(helpers::to_number(left) * helpers::to_number(right)),
        BinaryOp::Div => Value::Number(helpers::to_number(left) / helpers::to_number(right)),
        BinaryOp::Mod => Value::Number(helpers::to_number(left) % helpers::to_number(right)),
        BinaryOp::Eq => Value::Boolean(Value::loose_eq(left, right)),
        BinaryOp::NotEq => Value::Boolean(!Value::loose_eq(left, right)),
        BinaryOp::StrictEq => Value::Boolean(Value::strict_eq(left, right)),
        BinaryOp::StrictNotEq => Value::Boolean(!Value::strict_eq(left, right)),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => compare(op, left, right),
        BinaryOp::Shl => Value::Number(((helpers::to_i32(left)) << (helpers::to_i32(right) & 31)) as f64),
        BinaryOp::Shr => Value::Number(((helpers::to_i32(left)) >> (helpers::to_i32(right) & 31)) as f64),
        BinaryOp::UShr => {
            Value::Number(((helpers::to_i32(left) as u32) >> (helpers::to_i32(right) as u32 & 31)) as f64)
        }
        BinaryOp::BitAnd => Value::Number((helpers::to_i32(left) & helpers::to_i32(right)) as f64),
        BinaryOp::BitOr => Value::Number((helpers::to_i32(left) | helpers::to_i32(right)) as f64),
        BinaryOp::BitXor => Value::Number((helpers::to_i32(left) ^ helpers::to_i32(right)) as f64),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let result = if let (Value::String(a), Value::String(b)) = (left, right) {
        ordering(op, a.as_ref().cmp(b.as_ref()))
    } else {
        let a = helpers::to_number(left);
        let b = helpers::to_number(right);
        match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Gt => a > b,
            BinaryOp::LtEq => a <= b,
            BinaryOp::GtEq => a >= b,
            _ => unreachable!("compare only called for ordering operators"),
        }
    };
    Value::Boolean(result)
}

fn ordering(op: BinaryOp, ord: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;
    match op {
        BinaryOp::Lt => ord == Less,
        BinaryOp::Gt => ord == Greater,
        BinaryOp::LtEq => ord != Greater,
        BinaryOp::GtEq => ord != Less,
        _ => unreachable!("ordering only called for ordering operators"),
    }
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "object",
        Value::Boolean(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::HostObject(HostObject::Function(_)) => "function",
        Value::HostObject(_) => "object",
        Value::MetaFunction(_) => "function",
        Value::Exception(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_concatenates_when_either_side_is_string_like() {
        let result = apply_binary(BinaryOp::Add, &Value::string("n="), &Value::Number(4.0));
        assert_eq!(result.as_string(), Some("n=4"));
    }

    #[test]
    fn add_is_numeric_when_neither_side_is_string_like() {
        let result = apply_binary(BinaryOp::Add, &Value::Number(2.0), &Value::Number(2.0));
        assert_eq!(result.as_number(), Some(4.0));
    }

    #[test]
    fn typeof_null_is_object_per_the_historical_quirk() {
        assert_eq!(type_of(&Value::Null), "object");
    }

    #[test]
    fn typeof_unbound_identifier_is_undefined_not_a_reference_error() {
        let root = Frame::root();
        let value = root.get_value("missing").unwrap_or(Value::Undefined);
        assert_eq!(type_of(&value), "undefined");
    }
}
