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

//! `Identifier` and `ThisExpression` (`spec.md` §4.2).

use std::rc::Rc;

use crate::continuation::{ErrorCont, SuccessCont};
use crate::environment::Frame;
use crate::error::HostError;
use crate::exception::ExceptionPacket;
use crate::value::Value;

/// An unbound identifier raises a reference error rather than evaluating to
/// `undefined` — `spec.md` §4.2 IdentifierExpression, edge case.
pub fn identifier(name: &str, env: &Rc<Frame>, c: SuccessCont, cerr: ErrorCont) {
    match env.get_value(name) {
        Some(value) => c(value),
        None => cerr(ExceptionPacket::host_error(HostError::reference(name))),
    }
}

/// `this` looks itself up like any other binding — every call frame defines
/// it (`crate::meta_function::evaluate_meta_function`); at the top level it
/// is `undefined` unless the host seeded a root-frame `this`.
pub fn this_expr(env: &Rc<Frame>, c: SuccessCont) {
    c(env.get_value("this").unwrap_or(Value::Undefined));
}
