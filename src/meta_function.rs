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

//! The meta-function bridge (`spec.md` §3 component C5, §4.3).
//!
//! Generalizes `pawx::interpreter::calls::call_user_function`: the teacher
//! binds parameters, pushes a child environment, and walks the body
//! directly-recursively. Here the body is walked through
//! [`crate::dispatch::evaluate`] instead, so a meta-function closing over a
//! `this`/environment pair and invoked from host Rust code goes through
//! exactly the same dispatch, interception, and exception-packet machinery
//! as a function called from interpreted code — "host and interpreted calls
//! are indistinguishable once the call reaches C3" per `spec.md` §4.3.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::ast::{AstNode, FunctionNode, NodeKind, Pattern};
use crate::config::EvaluationConfig;
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::error::HostError;
use crate::exception::{ExceptionPacket, PacketKind};
use crate::interceptor::{Evaluation, Phase};
use crate::value::{HostObject, NativeFunction, Value};

/// An interpreted function reified as a first-class [`Value`].
///
/// Holds everything needed to invoke it later without re-threading context
/// through the caller: the AST, the closed-over [`Frame`], and a snapshot of
/// the [`EvaluationConfig`] it was created under (`spec.md` §4.3 step 1).
pub struct MetaFunction {
    pub node: Rc<FunctionNode>,
    pub closure: Rc<Frame>,
    pub config: EvaluationConfig,
}

impl fmt::Debug for MetaFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetaFunction({})", self.display_name())
    }
}

impl MetaFunction {
    pub fn new(node: Rc<FunctionNode>, closure: Rc<Frame>, config: EvaluationConfig) -> Rc<Self> {
        Rc::new(Self { node, closure, config })
    }

    pub fn display_name(&self) -> &str {
        self.node.name.as_deref().unwrap_or("anonymous")
    }

    pub fn arity(&self) -> usize {
        self.node.params.iter().filter(|p| matches!(p, Pattern::Identifier { .. })).count()
    }
}

/// Binds `args` against `params` into a fresh child frame (`spec.md` §4.3
/// step 2): plain identifiers take the positional argument or, if absent,
/// evaluate their default expression in the callee's own frame; a trailing
/// `Rest` pattern collects whatever arguments remain.
fn bind_parameters(
    params: &[Pattern],
    args: &[Value],
    closure: &Rc<Frame>,
    config: &EvaluationConfig,
) -> Result<Rc<Frame>, ExceptionPacket> {
    let call_frame = Frame::child(closure);
    let mut index = 0usize;

    for param in params {
        match param {
            Pattern::Identifier { name, default } => {
                let value = match args.get(index) {
                    Some(v) if !matches!(v, Value::Undefined) => v.clone(),
                    _ => match default {
                        Some(expr) => evaluate_to_value(expr, &call_frame, config)?,
                        None => args.get(index).cloned().unwrap_or(Value::Undefined),
                    },
                };
                call_frame.define_value(name.clone(), value);
                index += 1;
            }
            Pattern::Rest(name) => {
                let rest = args.get(index..).unwrap_or(&[]).to_vec();
                call_frame.define_value(name.clone(), Value::array(rest));
                index = args.len();
            }
        }
    }

    Ok(call_frame)
}

/// Runs one evaluator step to completion synchronously, for contexts (like
/// parameter-default evaluation) that need a plain value rather than a
/// continuation pair. The core evaluator never does this to itself — only
/// this bridge, where "evaluate a default expression" is a leaf step with no
/// further CPS structure of its own.
fn evaluate_to_value(
    node: &Rc<crate::ast::AstNode>,
    frame: &Rc<Frame>,
    config: &EvaluationConfig,
) -> Result<Value, ExceptionPacket> {
    let result: Rc<std::cell::RefCell<Option<Result<Value, ExceptionPacket>>>> =
        Rc::new(std::cell::RefCell::new(None));

    let ok_slot = result.clone();
    let ok: SuccessCont = Rc::new(move |v| *ok_slot.borrow_mut() = Some(Ok(v)));
    let err_slot = result.clone();
    let err: ErrorCont = Rc::new(move |e| *err_slot.borrow_mut() = Some(Err(e)));

    evaluate(node.clone(), frame.clone(), config.clone(), ok, err);

    result.borrow_mut().take().expect("evaluate always calls exactly one continuation")
}

/// `evaluateMetaFunction` (`spec.md` §4.3 steps 1-5): binds arguments into a
/// fresh frame under the function's closure, walks the body through
/// dispatch, and turns a `Return` packet into a plain success — every other
/// packet kind (an uncaught `Throw`/`HostError`, or a `Break`/`Continue` that
/// escaped its loop) propagates to `cerr` unchanged.
pub fn evaluate_meta_function(meta: &Rc<MetaFunction>, this: Value, args: &[Value], c: SuccessCont, cerr: ErrorCont) {
    let depth_cell = meta.config.call_depth.clone();
    if depth_cell.get() >= meta.config.limits.max_call_depth {
        return cerr(ExceptionPacket::host_error(HostError::not_implemented("maximum call depth exceeded")));
    }
    depth_cell.set(depth_cell.get() + 1);

    let c_outer = c;
    let cerr_outer = cerr;
    let depth_for_ok = depth_cell.clone();
    let c: SuccessCont = Rc::new(move |v| {
        depth_for_ok.set(depth_for_ok.get() - 1);
        c_outer(v);
    });
    let depth_for_err = depth_cell.clone();
    let cerr: ErrorCont = Rc::new(move |e| {
        depth_for_err.set(depth_for_err.get() - 1);
        cerr_outer(e);
    });

    let call_frame = match bind_parameters(&meta.node.params, args, &meta.closure, &meta.config) {
        Ok(frame) => frame,
        Err(packet) => return cerr(packet),
    };
    call_frame.define_value("this", if meta.node.is_arrow { meta.closure.get_value("this").unwrap_or(this) } else { this });
    call_frame.define_value("arguments", Value::array(args.to_vec()));

    let config = meta.config.clone();

    // `spec.md` §4.5 requires an enter/exit pair on the function node itself
    // for a meta-function invocation, not just on the body block dispatch
    // emits on its own — `MetaFunction` only keeps the bare `FunctionNode`,
    // so a fresh wrapper node is synthesized here purely as the interceptor's
    // `node` handle.
    let invocation_node = AstNode::new(NodeKind::Function(meta.node.clone()));

    let enter = Evaluation {
        script_id: config.script_id.clone(),
        node: invocation_node.clone(),
        env: call_frame.clone(),
        phase: Phase::Enter,
        value: None,
    };
    if let Err(err) = config.interceptor.on_enter(&enter) {
        return cerr(ExceptionPacket::host_error(err));
    }

    let settled = Rc::new(Cell::new(false));

    let settled_ok = settled.clone();
    let node_for_exit_ok = invocation_node.clone();
    let env_for_exit_ok = call_frame.clone();
    let config_for_exit_ok = config.clone();
    let c_inner = c.clone();
    let cerr_for_exit_fail = cerr.clone();
    let guarded_c: SuccessCont = Rc::new(move |value| {
        if settled_ok.replace(true) {
            return;
        }
        let exit = Evaluation {
            script_id: config_for_exit_ok.script_id.clone(),
            node: node_for_exit_ok.clone(),
            env: env_for_exit_ok.clone(),
            phase: Phase::Exit,
            value: Some(value.clone()),
        };
        match config_for_exit_ok.interceptor.on_exit(&exit) {
            Ok(()) => c_inner(value),
            Err(err) => cerr_for_exit_fail(ExceptionPacket::host_error(err).with_location(node_for_exit_ok.clone())),
        }
    });

    let settled_err = settled.clone();
    let node_for_exit_err = invocation_node.clone();
    let env_for_exit_err = call_frame.clone();
    let config_for_exit_err = config.clone();
    let guarded_cerr: ErrorCont = Rc::new(move |packet| {
        if settled_err.replace(true) {
            return;
        }
        let packet = packet.with_location(node_for_exit_err.clone());
        let exit = Evaluation {
            script_id: config_for_exit_err.script_id.clone(),
            node: node_for_exit_err.clone(),
            env: env_for_exit_err.clone(),
            phase: Phase::Exit,
            value: None,
        };
        if let Err(err) = config_for_exit_err.interceptor.on_exit(&exit) {
            config_for_exit_err.notify_error(&err);
        }
        cerr(packet);
    });

    let body = meta.node.body.clone();

    // Functions whose body completes by falling off the end (no explicit
    // `return`) yield the body's own completion value (an empty block still
    // settles with `undefined`, matching `interpreter::blocks::block`); a
    // `Return` packet is unwrapped to its value on the success path instead
    // of propagating as an error.
    let guarded_c_for_return = guarded_c.clone();
    let unwrap_return: ErrorCont = Rc::new(move |packet: ExceptionPacket| match packet.kind {
        PacketKind::Return => guarded_c_for_return(packet.value.clone()),
        _ => guarded_cerr(packet),
    });

    evaluate(body, call_frame, config, guarded_c, unwrap_return);
}

/// `createMetaFunctionWrapper` (`spec.md` §4.3 step 5): wraps a
/// [`MetaFunction`] behind the same synchronous [`NativeFunction`] calling
/// convention host code already uses, so a host caller can invoke an
/// interpreted function without knowing it is interpreted. A `cerr`
/// invocation here surfaces as the host function's `Err` branch, mirroring
/// how `pawx::interpreter::calls::call_value` turns an interpreter signal
/// into a host-visible error.
pub fn create_meta_function_wrapper(meta: Rc<MetaFunction>) -> Rc<NativeFunction> {
    let name = meta.display_name().to_string();
    NativeFunction::new(name, move |this, args| {
        let result: Rc<std::cell::RefCell<Option<Result<Value, ExceptionPacket>>>> =
            Rc::new(std::cell::RefCell::new(None));

        let ok_slot = result.clone();
        let c: SuccessCont = Rc::new(move |v| *ok_slot.borrow_mut() = Some(Ok(v)));
        let err_slot = result.clone();
        let cerr: ErrorCont = Rc::new(move |e| *err_slot.borrow_mut() = Some(Err(e)));

        evaluate_meta_function(&meta, this, args, c, cerr);

        result.borrow_mut().take().expect("evaluate_meta_function always settles exactly once")
    })
}

/// Calling convention shared by both meta-functions and native functions
/// reachable from a `CallExpression` (`spec.md` §4.3): used by
/// `crate::interpreter::calls` so call sites don't need to match on
/// [`Value::MetaFunction`] vs. a native [`HostObject::Function`] themselves.
pub fn call_value(callee: &Value, this: Value, args: &[Value], c: SuccessCont, cerr: ErrorCont) {
    match callee {
        Value::MetaFunction(meta) => evaluate_meta_function(meta, this, args, c, cerr),
        Value::HostObject(HostObject::Function(native)) => match native.call(this, args) {
            Ok(value) => c(value),
            Err(packet) => cerr(packet),
        },
        other => cerr(ExceptionPacket::host_error(HostError::type_error(format!(
            "{} is not a function",
            other.type_name()
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, NodeKind};

    fn noop_config() -> EvaluationConfig {
        EvaluationConfig::new("test")
    }

    #[test]
    fn arity_counts_only_plain_identifier_parameters() {
        let node = Rc::new(FunctionNode {
            name: Some("f".to_string()),
            params: vec![
                Pattern::Identifier { name: "a".to_string(), default: None },
                Pattern::Rest("rest".to_string()),
            ],
            body: AstNode::new(NodeKind::Block(vec![])),
            is_arrow: false,
            is_declaration: false,
        });
        let meta = MetaFunction::new(node, Frame::root(), noop_config());
        assert_eq!(meta.arity(), 1);
    }

    #[test]
    fn display_name_falls_back_to_anonymous() {
        let node = Rc::new(FunctionNode {
            name: None,
            params: vec![],
            body: AstNode::new(NodeKind::Block(vec![])),
            is_arrow: true,
            is_declaration: false,
        });
        let meta = MetaFunction::new(node, Frame::root(), noop_config());
        assert_eq!(meta.display_name(), "anonymous");
    }

    #[test]
    fn calling_a_non_function_value_raises_a_type_error() {
        let result = Rc::new(std::cell::RefCell::new(None));
        let slot = result.clone();
        let cerr: ErrorCont = Rc::new(move |e| *slot.borrow_mut() = Some(e));
        call_value(&Value::Number(1.0), Value::Undefined, &[], Rc::new(|_| {}), cerr);
        let packet = result.borrow_mut().take().unwrap();
        assert!(matches!(packet.kind, PacketKind::HostError(HostError::Type(_))));
    }
}
