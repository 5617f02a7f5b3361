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

//! `FunctionNode` evaluation (`spec.md` §4.3 step 1).
//!
//! Turns the closed AST's `FunctionNode` into a first-class
//! [`crate::value::Value::MetaFunction`], closing over the frame it's
//! evaluated in. A `FunctionDeclaration`-flavored node additionally binds
//! itself into that frame under its own name so later statements in the
//! same block can call it — this crate evaluates declarations in source
//! order rather than hoisting them ahead of the block, a simplification
//! from the original's hoisting pass (see DESIGN.md).

use std::rc::Rc;

use crate::ast::FunctionNode;
use crate::config::EvaluationConfig;
use crate::continuation::SuccessCont;
use crate::environment::Frame;
use crate::meta_function::MetaFunction;
use crate::value::Value;

pub fn function_expr(node: &Rc<FunctionNode>, env: &Rc<Frame>, config: &EvaluationConfig, c: SuccessCont) {
    let meta = MetaFunction::new(node.clone(), env.clone(), config.clone());

    if node.is_declaration {
        if let Some(name) = &node.name {
            env.define_value(name.clone(), Value::MetaFunction(meta.clone()));
        }
    }

    c(Value::MetaFunction(meta));
}
