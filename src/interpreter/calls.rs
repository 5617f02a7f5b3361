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

//! `CallExpression` and `NewExpression` (`spec.md` §4.2, §4.3).
//!
//! Generalizes `pawx::interpreter::calls::{call_value, call_user_function}`:
//! the teacher evaluates arguments eagerly into a `Vec` before dispatching:
//! this keeps that evaluation order but routes every step — argument
//! evaluation, callee resolution, and the call itself — through the same
//! continuation-passing dispatch as everything else, via
//! [`crate::meta_function::call_value`].

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{AstNode, NodeKind};
use crate::config::EvaluationConfig;
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::interpreter::{assignment, eval_sequence};
use crate::meta_function;
use crate::value::{HostObject, Value};

/// A plain call evaluates its callee normally; a method call (`obj.m(...)`)
/// evaluates `obj` once and binds it as `this` for the call, without
/// re-evaluating `obj` to fetch the method (`spec.md` §4.2 CallExpression).
pub fn call(
    callee: &Rc<AstNode>,
    arguments: &[Rc<AstNode>],
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    if let NodeKind::Member { object, property } = &callee.kind {
        let property = property.clone();
        let arguments = arguments.to_vec();
        let env_for_rest = env.clone();
        let config_for_rest = config.clone();
        let cerr_for_obj = cerr.clone();

        evaluate(
            object.clone(),
            env,
            config,
            Rc::new(move |this_val| {
                let this_for_args = this_val.clone();
                let arguments2 = arguments.clone();
                let env2 = env_for_rest.clone();
                let config2 = config_for_rest.clone();
                let c2 = c.clone();
                let cerr2 = cerr_for_obj.clone();

                assignment::resolve_property_name(
                    &property,
                    env_for_rest.clone(),
                    config_for_rest.clone(),
                    Rc::new(move |name| {
                        let func_val = assignment::get_property(&this_for_args, &name);
                        let this_for_call = this_for_args.clone();
                        let c3 = c2.clone();
                        let cerr3 = cerr2.clone();

                        eval_sequence(
                            arguments2.clone(),
                            env2.clone(),
                            config2.clone(),
                            Rc::new(move |args| {
                                meta_function::call_value(&func_val, this_for_call.clone(), &args, c3.clone(), cerr3.clone());
                            }),
                            cerr2.clone(),
                        );
                    }),
                    cerr_for_obj.clone(),
                );
            }),
            cerr,
        );
        return;
    }

    let arguments = arguments.to_vec();
    let env_for_args = env.clone();
    let config_for_args = config.clone();
    let cerr_for_callee = cerr.clone();

    evaluate(
        callee.clone(),
        env,
        config,
        Rc::new(move |func_val| {
            let c = c.clone();
            let cerr2 = cerr_for_callee.clone();
            eval_sequence(
                arguments.clone(),
                env_for_args.clone(),
                config_for_args.clone(),
                Rc::new(move |args| meta_function::call_value(&func_val, Value::Undefined, &args, c.clone(), cerr2.clone())),
                cerr_for_callee.clone(),
            );
        }),
        cerr,
    );
}

/// `new Callee(...)` (`spec.md` §4.2 NewExpression). No Non-goal excludes
/// `new` itself, only classes as a surface-language feature — this models
/// the reduced form: a fresh record is passed as `this`, and the call's
/// return value is used instead only if it is itself a record (mirroring
/// the common-subset rule every curly-brace language agrees on for
/// constructor return values).
pub fn new_call(
    callee: &Rc<AstNode>,
    arguments: &[Rc<AstNode>],
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let arguments = arguments.to_vec();
    let env_for_args = env.clone();
    let config_for_args = config.clone();
    let cerr_for_callee = cerr.clone();

    evaluate(
        callee.clone(),
        env,
        config,
        Rc::new(move |func_val| {
            let c = c.clone();
            let cerr2 = cerr_for_callee.clone();
            eval_sequence(
                arguments.clone(),
                env_for_args.clone(),
                config_for_args.clone(),
                Rc::new(move |args| {
                    let instance = Value::HostObject(HostObject::new_record(IndexMap::new()));
                    let instance_for_result = instance.clone();
                    let c = c.clone();
                    meta_function::call_value(
                        &func_val,
                        instance.clone(),
                        &args,
                        Rc::new(move |result| {
                            c(match result {
                                Value::HostObject(HostObject::Record(_)) => result,
                                _ => instance_for_result.clone(),
                            });
                        }),
                        cerr2.clone(),
                    );
                }),
                cerr_for_callee.clone(),
            );
        }),
        cerr,
    );
}
