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

//! `BlockStatement` and `VariableDeclaration` (`spec.md` §4.2).
//!
//! A block opens a fresh child [`Frame`] (`spec.md` §3: "blocks introduce
//! their own lexical scope") and threads the value of each statement into
//! the next, so the block as a whole completes with its last statement's
//! value — the shape `evalFunctionBody`/`evalToPromise` rely on when a
//! function body has no explicit `return`.

use std::rc::Rc;

use crate::ast::{AstNode, VariableDeclarator};
use crate::config::EvaluationConfig;
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::value::Value;

pub fn block(statements: &[Rc<AstNode>], env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    let block_env = Frame::child(&env);
    exec_statements(statements.to_vec(), 0, Value::Undefined, block_env, config, c, cerr);
}

fn exec_statements(
    statements: Vec<Rc<AstNode>>,
    index: usize,
    last: Value,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    if index >= statements.len() {
        return c(last);
    }

    let node = statements[index].clone();
    let statements_rest = statements.clone();
    let env_rest = env.clone();
    let config_rest = config.clone();
    let cerr_rest = cerr.clone();

    evaluate(
        node,
        env,
        config,
        Rc::new(move |value| {
            exec_statements(
                statements_rest.clone(),
                index + 1,
                value,
                env_rest.clone(),
                config_rest.clone(),
                c.clone(),
                cerr_rest.clone(),
            );
        }),
        cerr,
    );
}

pub fn variable_declaration(
    declarators: &[VariableDeclarator],
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    bind_declarators(declarators.to_vec(), 0, env, config, c, cerr);
}

fn bind_declarators(
    declarators: Vec<VariableDeclarator>,
    index: usize,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    if index >= declarators.len() {
        return c(Value::Undefined);
    }

    let declarator = declarators[index].clone();
    match declarator.init {
        Some(init) => {
            let declarators_rest = declarators.clone();
            let env_for_define = env.clone();
            let env_rest = env.clone();
            let config_rest = config.clone();
            let cerr_for_body = cerr.clone();
            let name = declarator.name;

            evaluate(
                init,
                env,
                config,
                Rc::new(move |value| {
                    env_for_define.define_value(name.clone(), value);
                    bind_declarators(declarators_rest.clone(), index + 1, env_rest.clone(), config_rest.clone(), c.clone(), cerr_for_body.clone());
                }),
                cerr,
            );
        }
        None => {
            env.define_value(declarator.name, Value::Undefined);
            bind_declarators(declarators, index + 1, env, config, c, cerr);
        }
    }
}
