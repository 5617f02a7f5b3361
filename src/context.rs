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

//! The embedding façade (`spec.md` §3 component C7, §4.5).
//!
//! `EvaluationContext` is what a host actually holds onto: one root
//! [`Frame`] scripts share across calls, a [`Parser`] turning raw AST JSON
//! into the closed node set, and the [`ScriptIdGenerator`] used whenever a
//! caller doesn't supply its own `scriptId`. `evaluate`/`eval_to_promise`/
//! `eval_function_body` all drive the same CPS evaluator synchronously to a
//! single `Result`, the way `rhai::EvalContext` lets host code call back into
//! script evaluation without itself becoming continuation-passing.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::ast::{from_json, AstNode};
use crate::config::{EvaluationConfig, ScriptIdGenerator};
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::error::HostError;
use crate::exception::{ExceptionPacket, PacketKind};
use crate::value::Value;

/// Where a script's AST comes from when handed to [`EvaluationContext`].
///
/// There's no separate "host function" source: a host that already has a
/// parsed function body just calls [`EvaluationContext::eval_function_body`]
/// directly — see DESIGN.md for why that collapses to these two variants
/// instead of a third.
pub enum Source {
    /// Raw JSON text, parsed through the context's [`Parser`] before
    /// evaluation.
    Text(String),
    /// An already-parsed node — skips parsing entirely, for callers building
    /// or caching ASTs themselves.
    Parsed(Rc<AstNode>),
}

/// Converts a parser's raw JSON output into the closed AST (`spec.md` §9).
/// [`JsonAstParser`] is the only implementation this crate ships; a host
/// fronting a different concrete syntax implements this trait once its own
/// parser has produced the equivalent `serde_json::Value` tree.
pub trait Parser {
    fn parse(&self, json: &Json) -> Result<Rc<AstNode>, HostError>;
}

/// The default [`Parser`], wired directly to [`crate::ast::from_json`].
#[derive(Default)]
pub struct JsonAstParser;

impl Parser for JsonAstParser {
    fn parse(&self, json: &Json) -> Result<Rc<AstNode>, HostError> {
        from_json::parse(json)
    }
}

/// The entry point a host embeds (`spec.md` §3 component C7).
pub struct EvaluationContext {
    root: Rc<Frame>,
    parser: Rc<dyn Parser>,
    script_ids: ScriptIdGenerator,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self { root: Frame::root(), parser: Rc::new(JsonAstParser), script_ids: ScriptIdGenerator::new() }
    }

    pub fn with_parser(parser: Rc<dyn Parser>) -> Self {
        Self { root: Frame::root(), parser, script_ids: ScriptIdGenerator::new() }
    }

    /// The shared root frame every top-level `evaluate` call runs a child of
    /// — hosts pre-bind globals here before evaluating any script.
    pub fn root_frame(&self) -> &Rc<Frame> {
        &self.root
    }

    fn next_config(&self, config: Option<EvaluationConfig>) -> EvaluationConfig {
        config.unwrap_or_else(|| EvaluationConfig::new(self.script_ids.next_id()))
    }

    fn resolve(&self, source: Source) -> Result<Rc<AstNode>, ExceptionPacket> {
        match source {
            Source::Parsed(node) => Ok(node),
            Source::Text(text) => {
                let json: Json = serde_json::from_str(&text)
                    .map_err(|e| ExceptionPacket::host_error(HostError::syntax(e.to_string())))?;
                self.parser.parse(&json).map_err(ExceptionPacket::host_error)
            }
        }
    }

    /// `evaluate` (`spec.md` §4.5): parses (if needed) and runs `source` to
    /// completion in a fresh child of the root frame, returning either the
    /// program's completion value or whatever exception packet escaped it
    /// uncaught.
    pub fn evaluate(&self, source: Source, config: Option<EvaluationConfig>) -> Result<Value, ExceptionPacket> {
        let node = self.resolve(source)?;
        let config = self.next_config(config);
        let env = Frame::child(&self.root);
        run_to_completion(node, env, config)
    }

    /// `evalToPromise` (`spec.md` §4.5): identical to [`Self::evaluate`]
    /// except a bare top-level `return` settles successfully with the
    /// returned value instead of propagating as an error — a script is
    /// allowed to end itself early the way a module body can.
    pub fn eval_to_promise(&self, source: Source, config: Option<EvaluationConfig>) -> Result<Value, ExceptionPacket> {
        match self.evaluate(source, config) {
            Err(packet) if matches!(packet.kind, PacketKind::Return) => Ok(packet.value),
            other => other,
        }
    }

    /// `evalFunctionBody` (`spec.md` §4.5): runs `body` as a function body
    /// under a frame with `this`/`arguments` pre-bound, unwrapping a
    /// `Return` packet into its value exactly as
    /// [`crate::meta_function::evaluate_meta_function`] does — for hosts
    /// that have a body AST but no need to reify a whole
    /// [`crate::meta_function::MetaFunction`] around it.
    pub fn eval_function_body(
        &self,
        body: Source,
        this: Value,
        arguments: Vec<Value>,
        config: Option<EvaluationConfig>,
    ) -> Result<Value, ExceptionPacket> {
        let node = self.resolve(body)?;
        let config = self.next_config(config);
        let env = Frame::child(&self.root);
        env.define_value("this", this);
        env.define_value("arguments", Value::array(arguments));

        match run_to_completion(node, env, config) {
            Err(packet) if matches!(packet.kind, PacketKind::Return) => Ok(packet.value),
            Ok(_) => Ok(Value::Undefined),
            other => other,
        }
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

fn run_to_completion(node: Rc<AstNode>, env: Rc<Frame>, config: EvaluationConfig) -> Result<Value, ExceptionPacket> {
    let result: Rc<RefCell<Option<Result<Value, ExceptionPacket>>>> = Rc::new(RefCell::new(None));

    let ok_slot = result.clone();
    let c: SuccessCont = Rc::new(move |v| *ok_slot.borrow_mut() = Some(Ok(v)));
    let err_slot = result.clone();
    let cerr: ErrorCont = Rc::new(move |e| *err_slot.borrow_mut() = Some(Err(e)));

    evaluate(node, env, config, c, cerr);

    result.borrow_mut().take().expect("evaluate always calls exactly one continuation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, NodeKind};

    fn literal_source(n: f64) -> Source {
        Source::Parsed(AstNode::new(NodeKind::Literal(Value::Number(n))))
    }

    #[test]
    fn evaluate_runs_a_parsed_node_without_a_parser() {
        let ctx = EvaluationContext::new();
        let result = ctx.evaluate(literal_source(2.0), None).unwrap();
        assert_eq!(result.as_number(), Some(2.0));
    }

    #[test]
    fn evaluate_parses_json_text_through_the_default_parser() {
        let ctx = EvaluationContext::new();
        let text = r#"{"kind": "Literal", "value": {"type": "number", "value": 4.0}}"#.to_string();
        let result = ctx.evaluate(Source::Text(text), None).unwrap();
        assert_eq!(result.as_number(), Some(4.0));
    }

    #[test]
    fn eval_to_promise_unwraps_a_bare_top_level_return() {
        let ctx = EvaluationContext::new();
        let node = AstNode::new(NodeKind::Return(Some(AstNode::new(NodeKind::Literal(Value::Number(5.0))))));
        let result = ctx.eval_to_promise(Source::Parsed(node), None).unwrap();
        assert_eq!(result.as_number(), Some(5.0));
    }

    #[test]
    fn globals_bound_on_the_root_frame_are_visible_to_evaluated_scripts() {
        let ctx = EvaluationContext::new();
        ctx.root_frame().define_value("answer", Value::Number(42.0));
        let node = AstNode::new(NodeKind::Identifier("answer".to_string()));
        let result = ctx.evaluate(Source::Parsed(node), None).unwrap();
        assert_eq!(result.as_number(), Some(42.0));
    }
}
