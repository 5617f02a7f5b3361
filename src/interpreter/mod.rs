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

//! Node evaluators (`spec.md` §3 component C4), one submodule per family of
//! `NodeKind` variants. [`crate::dispatch::evaluate`] is the only caller of
//! any function in this tree from outside it — evaluators call each other,
//! and call back into dispatch for sub-expressions, but nothing outside
//! `crate::dispatch` matches on `NodeKind` directly.

pub mod assignment;
pub mod blocks;
pub mod calls;
pub mod collections;
pub mod control_flow;
pub mod exceptions;
pub mod functions;
pub mod helpers;
pub mod literal;
pub mod operators;

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::AstNode;
use crate::config::EvaluationConfig;
use crate::continuation::ErrorCont;
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::value::Value;

/// Evaluates `nodes` left-to-right, collecting one [`Value`] per node, and
/// calls `on_done` with the full vector once every node has settled
/// successfully. Shared by [`calls`] (call arguments) and [`collections`]
/// (array elements) — anywhere a fixed list of expressions evaluates in
/// order with no short-circuiting.
#[allow(clippy::type_complexity)]
pub(crate) fn eval_sequence(
    nodes: Vec<Rc<AstNode>>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    on_done: Rc<dyn Fn(Vec<Value>)>,
    cerr: ErrorCont,
) {
    eval_sequence_from(Rc::new(nodes), 0, Rc::new(RefCell::new(Vec::new())), env, config, on_done, cerr);
}

#[allow(clippy::type_complexity)]
fn eval_sequence_from(
    nodes: Rc<Vec<Rc<AstNode>>>,
    index: usize,
    acc: Rc<RefCell<Vec<Value>>>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    on_done: Rc<dyn Fn(Vec<Value>)>,
    cerr: ErrorCont,
) {
    if index >= nodes.len() {
        return on_done(acc.borrow().clone());
    }

    let node = nodes[index].clone();
    let nodes_rest = nodes.clone();
    let env_rest = env.clone();
    let config_rest = config.clone();
    let cerr_rest = cerr.clone();
    let acc_rest = acc.clone();

    evaluate(
        node,
        env,
        config,
        Rc::new(move |value| {
            acc_rest.borrow_mut().push(value);
            eval_sequence_from(
                nodes_rest.clone(),
                index + 1,
                acc_rest.clone(),
                env_rest.clone(),
                config_rest.clone(),
                on_done.clone(),
                cerr_rest.clone(),
            );
        }),
        cerr,
    );
}
