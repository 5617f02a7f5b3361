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

//! A metacircular interpreter for a small, dynamically-typed expression and
//! statement language, built entirely in continuation-passing style: every
//! evaluator takes a success continuation and an error continuation rather
//! than returning a `Result`, so non-local control flow (`return`, `break`,
//! `continue`, `throw`) and an always-on enter/exit interceptor protocol
//! compose uniformly through the same two callbacks at every node.
//!
//! Host code embeds this through [`context::EvaluationContext`]; everything
//! else in this crate is the machinery that makes `evaluate` on that context
//! behave the way `SPEC_FULL.md` describes.

pub mod ast;
pub mod config;
pub mod context;
pub mod continuation;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod exception;
pub mod interceptor;
pub mod interpreter;
pub mod logging;
pub mod meta_function;
pub mod value;

pub use ast::AstNode;
pub use config::EvaluationConfig;
pub use context::{EvaluationContext, Source};
pub use error::HostError;
pub use exception::ExceptionPacket;
pub use value::Value;
