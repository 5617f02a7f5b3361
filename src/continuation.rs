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

//! The `(c, cerr)` continuation pair every evaluator in `crate::interpreter`
//! takes (`spec.md` §3, §4: "no evaluator ever returns a value directly").
//!
//! No example repo in the retrieval pack is itself CPS-structured — this
//! shape is new relative to the teacher — so these aliases exist purely to
//! keep every evaluator's signature readable instead of re-spelling the
//! trait-object boxed-closure type at every call site.

use std::rc::Rc;

use crate::exception::ExceptionPacket;
use crate::value::Value;

/// Called exactly once with the result of a successful evaluation.
pub type SuccessCont = Rc<dyn Fn(Value)>;

/// Called exactly once with the packet carrying a throw, a host error, or a
/// `return`/`break`/`continue` control transfer.
pub type ErrorCont = Rc<dyn Fn(ExceptionPacket)>;
