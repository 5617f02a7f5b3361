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

//! `IfStatement`, `ConditionalExpression`, and the five loop kinds
//! (`spec.md` §4.2). Every loop shares one rule for `break`/`continue`: an
//! unlabeled signal always targets the innermost loop; a labeled one targets
//! the loop whose own label matches, and passes through any loop in between
//! untouched so an outer labeled loop can catch it.

use std::rc::Rc;

use crate::ast::AstNode;
use crate::config::EvaluationConfig;
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::error::HostError;
use crate::exception::{ExceptionPacket, PacketKind};
use crate::value::{HostObject, Value};

enum LoopSignal {
    Break,
    Continue,
    Propagate(ExceptionPacket),
}

fn label_matches(packet_label: &Option<String>, loop_label: &Option<String>) -> bool {
    match packet_label {
        None => true,
        Some(l) => loop_label.as_deref() == Some(l.as_str()),
    }
}

fn classify_loop_signal(packet: ExceptionPacket, loop_label: &Option<String>) -> LoopSignal {
    match &packet.kind {
        PacketKind::Break if label_matches(&packet.label, loop_label) => LoopSignal::Break,
        PacketKind::Continue if label_matches(&packet.label, loop_label) => LoopSignal::Continue,
        _ => LoopSignal::Propagate(packet),
    }
}

pub fn if_stmt(
    test: &Rc<AstNode>,
    consequent: &Rc<AstNode>,
    alternate: Option<&Rc<AstNode>>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let consequent = consequent.clone();
    let alternate = alternate.cloned();
    let env_for_branch = env.clone();
    let config_for_branch = config.clone();
    let cerr_for_branch = cerr.clone();

    evaluate(
        test.clone(),
        env,
        config,
        Rc::new(move |test_val| {
            if test_val.is_truthy() {
                evaluate(consequent.clone(), env_for_branch.clone(), config_for_branch.clone(), c.clone(), cerr_for_branch.clone());
            } else {
                match &alternate {
                    Some(alt) => evaluate(alt.clone(), env_for_branch.clone(), config_for_branch.clone(), c.clone(), cerr_for_branch.clone()),
                    None => c(Value::Undefined),
                }
            }
        }),
        cerr,
    );
}

pub fn conditional(
    test: &Rc<AstNode>,
    consequent: &Rc<AstNode>,
    alternate: &Rc<AstNode>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let consequent = consequent.clone();
    let alternate = alternate.clone();
    let env_for_branch = env.clone();
    let config_for_branch = config.clone();
    let cerr_for_branch = cerr.clone();

    evaluate(
        test.clone(),
        env,
        config,
        Rc::new(move |test_val| {
            let branch = if test_val.is_truthy() { consequent.clone() } else { alternate.clone() };
            evaluate(branch, env_for_branch.clone(), config_for_branch.clone(), c.clone(), cerr_for_branch.clone());
        }),
        cerr,
    );
}

pub fn while_loop(test: &Rc<AstNode>, body: &Rc<AstNode>, label: Option<String>, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    while_step(test.clone(), body.clone(), label, env, config, c, cerr);
}

fn while_step(test: Rc<AstNode>, body: Rc<AstNode>, label: Option<String>, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    let test_for_ok = test.clone();
    let body_for_ok = body.clone();
    let label_for_ok = label.clone();
    let env_for_ok = env.clone();
    let config_for_ok = config.clone();
    let c_for_ok = c.clone();
    let cerr_for_ok = cerr.clone();
    let c_for_false = c.clone();

    evaluate(
        test.clone(),
        env.clone(),
        config.clone(),
        Rc::new(move |test_val| {
            if !test_val.is_truthy() {
                return c_for_false.clone()(Value::Undefined);
            }

            let test_s = test_for_ok.clone();
            let body_s = body_for_ok.clone();
            let label_s = label_for_ok.clone();
            let env_s = env_for_ok.clone();
            let config_s = config_for_ok.clone();
            let c_s = c_for_ok.clone();
            let cerr_s = cerr_for_ok.clone();

            let test_e = test_for_ok.clone();
            let body_e = body_for_ok.clone();
            let label_e = label_for_ok.clone();
            let env_e = env_for_ok.clone();
            let config_e = config_for_ok.clone();
            let c_e = c_for_ok.clone();
            let cerr_e = cerr_for_ok.clone();

            evaluate(
                body_for_ok.clone(),
                env_for_ok.clone(),
                config_for_ok.clone(),
                Rc::new(move |_| {
                    while_step(test_s.clone(), body_s.clone(), label_s.clone(), env_s.clone(), config_s.clone(), c_s.clone(), cerr_s.clone());
                }),
                Rc::new(move |packet| match classify_loop_signal(packet, &label_e) {
                    LoopSignal::Break => c_e.clone()(Value::Undefined),
                    LoopSignal::Continue => while_step(test_e.clone(), body_e.clone(), label_e.clone(), env_e.clone(), config_e.clone(), c_e.clone(), cerr_e.clone()),
                    LoopSignal::Propagate(p) => cerr_e.clone()(p),
                }),
            );
        }),
        cerr,
    );
}

pub fn do_while_loop(test: &Rc<AstNode>, body: &Rc<AstNode>, label: Option<String>, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    do_while_body(test.clone(), body.clone(), label, env, config, c, cerr);
}

fn do_while_body(test: Rc<AstNode>, body: Rc<AstNode>, label: Option<String>, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    let test_for_ok = test.clone();
    let body_for_ok = body.clone();
    let label_for_ok = label.clone();
    let env_for_ok = env.clone();
    let config_for_ok = config.clone();
    let c_for_ok = c.clone();
    let cerr_for_ok = cerr.clone();

    let test_for_err = test.clone();
    let body_for_err = body.clone();
    let label_for_err = label.clone();
    let env_for_err = env.clone();
    let config_for_err = config.clone();
    let c_for_err = c.clone();
    let cerr_for_err = cerr.clone();

    evaluate(
        body.clone(),
        env.clone(),
        config.clone(),
        Rc::new(move |_| {
            do_while_test(test_for_ok.clone(), body_for_ok.clone(), label_for_ok.clone(), env_for_ok.clone(), config_for_ok.clone(), c_for_ok.clone(), cerr_for_ok.clone());
        }),
        Rc::new(move |packet| match classify_loop_signal(packet, &label_for_err) {
            LoopSignal::Break => c_for_err.clone()(Value::Undefined),
            LoopSignal::Continue => do_while_test(test_for_err.clone(), body_for_err.clone(), label_for_err.clone(), env_for_err.clone(), config_for_err.clone(), c_for_err.clone(), cerr_for_err.clone()),
            LoopSignal::Propagate(p) => cerr_for_err.clone()(p),
        }),
    );
}

fn do_while_test(test: Rc<AstNode>, body: Rc<AstNode>, label: Option<String>, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    let test_for_true = test.clone();
    let body_for_true = body.clone();
    let label_for_true = label.clone();
    let env_for_true = env.clone();
    let config_for_true = config.clone();
    let c_for_true = c.clone();

    evaluate(
        test,
        env.clone(),
        config.clone(),
        Rc::new(move |test_val| {
            if test_val.is_truthy() {
                do_while_body(
                    test_for_true.clone(),
                    body_for_true.clone(),
                    label_for_true.clone(),
                    env_for_true.clone(),
                    config_for_true.clone(),
                    c_for_true.clone(),
                    cerr.clone(),
                );
            } else {
                c_for_true.clone()(Value::Undefined);
            }
        }),
        cerr,
    );
}

pub fn for_loop(
    init: Option<&Rc<AstNode>>,
    test: Option<&Rc<AstNode>>,
    update: Option<&Rc<AstNode>>,
    body: &Rc<AstNode>,
    label: Option<String>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let loop_env = Frame::child(&env);
    let test = test.cloned();
    let update = update.cloned();
    let body = body.clone();

    match init {
        Some(init_node) => {
            let test_for_start = test.clone();
            let update_for_start = update.clone();
            let body_for_start = body.clone();
            let label_for_start = label.clone();
            let loop_env_for_start = loop_env.clone();
            let config_for_start = config.clone();
            let c_for_start = c.clone();

            evaluate(
                init_node.clone(),
                loop_env.clone(),
                config.clone(),
                Rc::new(move |_| {
                    for_test_step(
                        test_for_start.clone(),
                        update_for_start.clone(),
                        body_for_start.clone(),
                        label_for_start.clone(),
                        loop_env_for_start.clone(),
                        config_for_start.clone(),
                        c_for_start.clone(),
                        cerr.clone(),
                    );
                }),
                cerr.clone(),
            );
        }
        None => for_test_step(test, update, body, label, loop_env, config, c, cerr),
    }
}

fn for_test_step(
    test: Option<Rc<AstNode>>,
    update: Option<Rc<AstNode>>,
    body: Rc<AstNode>,
    label: Option<String>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    match test.clone() {
        Some(test_node) => {
            let test_for_ok = test;
            let update_for_ok = update.clone();
            let body_for_ok = body.clone();
            let label_for_ok = label.clone();
            let env_for_ok = env.clone();
            let config_for_ok = config.clone();
            let c_for_ok = c.clone();
            let cerr_for_ok = cerr.clone();
            let c_for_false = c.clone();

            evaluate(
                test_node,
                env.clone(),
                config.clone(),
                Rc::new(move |test_val| {
                    if !test_val.is_truthy() {
                        return c_for_false.clone()(Value::Undefined);
                    }
                    run_for_body(
                        test_for_ok.clone(),
                        update_for_ok.clone(),
                        body_for_ok.clone(),
                        label_for_ok.clone(),
                        env_for_ok.clone(),
                        config_for_ok.clone(),
                        c_for_ok.clone(),
                        cerr_for_ok.clone(),
                    );
                }),
                cerr,
            );
        }
        None => run_for_body(test, update, body, label, env, config, c, cerr),
    }
}

fn run_for_body(
    test: Option<Rc<AstNode>>,
    update: Option<Rc<AstNode>>,
    body: Rc<AstNode>,
    label: Option<String>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let test_for_ok = test.clone();
    let update_for_ok = update.clone();
    let body_for_ok = body.clone();
    let label_for_ok = label.clone();
    let env_for_ok = env.clone();
    let config_for_ok = config.clone();
    let c_for_ok = c.clone();
    let cerr_for_ok = cerr.clone();

    let test_for_err = test.clone();
    let update_for_err = update.clone();
    let body_for_err = body.clone();
    let label_for_err = label.clone();
    let env_for_err = env.clone();
    let config_for_err = config.clone();
    let c_for_err = c.clone();
    let cerr_for_err = cerr.clone();

    evaluate(
        body.clone(),
        env.clone(),
        config.clone(),
        Rc::new(move |_| {
            run_for_update(
                test_for_ok.clone(),
                update_for_ok.clone(),
                body_for_ok.clone(),
                label_for_ok.clone(),
                env_for_ok.clone(),
                config_for_ok.clone(),
                c_for_ok.clone(),
                cerr_for_ok.clone(),
            );
        }),
        Rc::new(move |packet| match classify_loop_signal(packet, &label_for_err) {
            LoopSignal::Break => c_for_err.clone()(Value::Undefined),
            LoopSignal::Continue => run_for_update(
                test_for_err.clone(),
                update_for_err.clone(),
                body_for_err.clone(),
                label_for_err.clone(),
                env_for_err.clone(),
                config_for_err.clone(),
                c_for_err.clone(),
                cerr_for_err.clone(),
            ),
            LoopSignal::Propagate(p) => cerr_for_err.clone()(p),
        }),
    );
}

fn run_for_update(
    test: Option<Rc<AstNode>>,
    update: Option<Rc<AstNode>>,
    body: Rc<AstNode>,
    label: Option<String>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    match update.clone() {
        Some(update_node) => {
            let test_for_next = test;
            let update_for_next = update;
            let body_for_next = body.clone();
            let label_for_next = label.clone();
            let env_for_next = env.clone();
            let config_for_next = config.clone();
            let c_for_next = c.clone();

            evaluate(
                update_node,
                env,
                config,
                Rc::new(move |_| {
                    for_test_step(
                        test_for_next.clone(),
                        update_for_next.clone(),
                        body_for_next.clone(),
                        label_for_next.clone(),
                        env_for_next.clone(),
                        config_for_next.clone(),
                        c_for_next.clone(),
                        cerr.clone(),
                    );
                }),
                cerr,
            );
        }
        None => for_test_step(test, update, body, label, env, config, c, cerr),
    }
}

pub fn for_of_loop(left: &str, right: &Rc<AstNode>, body: &Rc<AstNode>, label: Option<String>, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    let left = left.to_string();
    let body = body.clone();
    let env_for_right = env.clone();
    let config_for_right = config.clone();
    let cerr_for_right = cerr.clone();
    let c_for_right = c.clone();

    evaluate(
        right.clone(),
        env,
        config,
        Rc::new(move |right_val| {
            let items: Vec<Value> = match &right_val {
                Value::HostObject(HostObject::Array(arr)) => arr.borrow().clone(),
                other => {
                    return cerr_for_right.clone()(ExceptionPacket::host_error(HostError::type_error(format!(
                        "{} is not iterable",
                        other.type_name()
                    ))));
                }
            };
            for_of_step(items, 0, left.clone(), body.clone(), label.clone(), env_for_right.clone(), config_for_right.clone(), c_for_right.clone(), cerr_for_right.clone());
        }),
        cerr,
    );
}

#[allow(clippy::too_many_arguments)]
fn for_of_step(
    items: Vec<Value>,
    index: usize,
    left: String,
    body: Rc<AstNode>,
    label: Option<String>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    if index >= items.len() {
        return c(Value::Undefined);
    }
    let iter_env = Frame::child(&env);
    iter_env.define_value(left.clone(), items[index].clone());

    let items_for_ok = items.clone();
    let left_for_ok = left.clone();
    let body_for_ok = body.clone();
    let label_for_ok = label.clone();
    let env_for_ok = env.clone();
    let config_for_ok = config.clone();
    let c_for_ok = c.clone();
    let cerr_for_ok = cerr.clone();

    let items_for_err = items;
    let left_for_err = left;
    let body_for_err = body.clone();
    let label_for_err = label;
    let env_for_err = env;
    let config_for_err = config;
    let c_for_err = c;
    let cerr_for_err = cerr;

    evaluate(
        body,
        iter_env,
        config_for_ok.clone(),
        Rc::new(move |_| {
            for_of_step(items_for_ok.clone(), index + 1, left_for_ok.clone(), body_for_ok.clone(), label_for_ok.clone(), env_for_ok.clone(), config_for_ok.clone(), c_for_ok.clone(), cerr_for_ok.clone());
        }),
        Rc::new(move |packet| match classify_loop_signal(packet, &label_for_err) {
            LoopSignal::Break => c_for_err.clone()(Value::Undefined),
            LoopSignal::Continue => for_of_step(
                items_for_err.clone(),
                index + 1,
                left_for_err.clone(),
                body_for_err.clone(),
                label_for_err.clone(),
                env_for_err.clone(),
                config_for_err.clone(),
                c_for_err.clone(),
                cerr_for_err.clone(),
            ),
            LoopSignal::Propagate(p) => cerr_for_err.clone()(p),
        }),
    );
}

pub fn for_in_loop(left: &str, right: &Rc<AstNode>, body: &Rc<AstNode>, label: Option<String>, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    let left = left.to_string();
    let body = body.clone();
    let env_for_right = env.clone();
    let config_for_right = config.clone();
    let cerr_for_right = cerr.clone();
    let c_for_right = c.clone();

    evaluate(
        right.clone(),
        env,
        config,
        Rc::new(move |right_val| {
            let keys: Vec<String> = match &right_val {
                Value::HostObject(HostObject::Record(map)) => map.borrow().keys().cloned().collect(),
                other => {
                    return cerr_for_right.clone()(ExceptionPacket::host_error(HostError::type_error(format!(
                        "{} has no enumerable keys",
                        other.type_name()
                    ))));
                }
            };
            for_in_step(keys, 0, left.clone(), body.clone(), label.clone(), env_for_right.clone(), config_for_right.clone(), c_for_right.clone(), cerr_for_right.clone());
        }),
        cerr,
    );
}

#[allow(clippy::too_many_arguments)]
fn for_in_step(
    keys: Vec<String>,
    index: usize,
    left: String,
    body: Rc<AstNode>,
    label: Option<String>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    if index >= keys.len() {
        return c(Value::Undefined);
    }
    let iter_env = Frame::child(&env);
    iter_env.define_value(left.clone(), Value::string(keys[index].clone()));

    let keys_for_ok = keys.clone();
    let left_for_ok = left.clone();
    let body_for_ok = body.clone();
    let label_for_ok = label.clone();
    let env_for_ok = env.clone();
    let config_for_ok = config.clone();
    let c_for_ok = c.clone();
    let cerr_for_ok = cerr.clone();

    let keys_for_err = keys;
    let left_for_err = left;
    let body_for_err = body.clone();
    let label_for_err = label;
    let env_for_err = env;
    let config_for_err = config;
    let c_for_err = c;
    let cerr_for_err = cerr;

    evaluate(
        body,
        iter_env,
        config_for_ok.clone(),
        Rc::new(move |_| {
            for_in_step(keys_for_ok.clone(), index + 1, left_for_ok.clone(), body_for_ok.clone(), label_for_ok.clone(), env_for_ok.clone(), config_for_ok.clone(), c_for_ok.clone(), cerr_for_ok.clone());
        }),
        Rc::new(move |packet| match classify_loop_signal(packet, &label_for_err) {
            LoopSignal::Break => c_for_err.clone()(Value::Undefined),
            LoopSignal::Continue => for_in_step(
                keys_for_err.clone(),
                index + 1,
                left_for_err.clone(),
                body_for_err.clone(),
                label_for_err.clone(),
                env_for_err.clone(),
                config_for_err.clone(),
                c_for_err.clone(),
                cerr_for_err.clone(),
            ),
            LoopSignal::Propagate(p) => cerr_for_err.clone()(p),
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlabeled_break_matches_any_loop() {
        assert!(label_matches(&None, &Some("outer".to_string())));
        assert!(label_matches(&None, &None));
    }

    #[test]
    fn labeled_break_only_matches_its_own_label() {
        assert!(label_matches(&Some("outer".to_string()), &Some("outer".to_string())));
        assert!(!label_matches(&Some("outer".to_string()), &Some("inner".to_string())));
        assert!(!label_matches(&Some("outer".to_string()), &None));
    }
}
