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

//! The interceptor protocol (`spec.md` §3 component C6, §4.1).
//!
//! Every node dispatch calls `on_enter` before evaluating and `on_exit`
//! after, exactly once each, regardless of which of the node's own
//! continuations eventually fires — `spec.md` §4.1: "an interceptor must see
//! exactly one enter and one exit per node, even if the node's evaluator
//! invokes its callbacks more than once." [`crate::dispatch::evaluate`]
//! enforces the "exactly once" half with an idempotent exit guard; this
//! module only defines the shape an interceptor sees.
//!
//! No repo in the retrieval pack has a literal enter/exit observer, but
//! `rhai`'s `EvalContext` (bundled under `other_examples/`) is the closest
//! analog for "a context value threaded alongside evaluation that exposes
//! the current node/scope to surrounding code" — `Evaluation` here plays
//! that role for one enter/exit pair instead of the whole evaluation.

use std::fmt;
use std::rc::Rc;

use crate::ast::AstNode;
use crate::environment::Frame;
use crate::error::HostError;
use crate::value::Value;

/// Which half of a node's dispatch an [`Evaluation`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Exit,
}

/// What an interceptor observes at one enter or exit event.
///
/// `value` is always `None` on `Enter`; on `Exit` it holds the node's
/// produced value for a successful evaluation, `None` if the node instead
/// settled via `cerr`.
#[derive(Clone)]
pub struct Evaluation {
    pub script_id: String,
    pub node: Rc<AstNode>,
    pub env: Rc<Frame>,
    pub phase: Phase,
    pub value: Option<Value>,
}

impl fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluation")
            .field("script_id", &self.script_id)
            .field("kind", &self.node.kind_name())
            .field("phase", &self.phase)
            .field("has_value", &self.value.is_some())
            .finish()
    }
}

/// Observer invoked around every node's evaluation (`spec.md` §4.1).
///
/// Returning `Err` from either hook routes a [`HostError`] through `cerr` at
/// the dispatch site that invoked it — an interceptor can veto or redirect
/// evaluation the same way a node evaluator's own error path does.
pub trait Interceptor {
    fn on_enter(&self, evaluation: &Evaluation) -> Result<(), HostError> {
        let _ = evaluation;
        Ok(())
    }

    fn on_exit(&self, evaluation: &Evaluation) -> Result<(), HostError> {
        let _ = evaluation;
        Ok(())
    }
}

/// The default interceptor: observes nothing, vetoes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInterceptor;

impl Interceptor for NoopInterceptor {}

/// An interceptor that emits a `tracing` event per enter/exit, for the
/// ambient logging this crate carries regardless of the Non-goal excluding
/// logging as an interpreter *feature* (`SPEC_FULL.md` §3).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInterceptor;

impl Interceptor for TracingInterceptor {
    fn on_enter(&self, evaluation: &Evaluation) -> Result<(), HostError> {
        tracing::trace!(script_id = %evaluation.script_id, kind = evaluation.node.kind_name(), "enter");
        Ok(())
    }

    fn on_exit(&self, evaluation: &Evaluation) -> Result<(), HostError> {
        tracing::trace!(
            script_id = %evaluation.script_id,
            kind = evaluation.node.kind_name(),
            ok = evaluation.value.is_some(),
            "exit"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    fn sample_evaluation(phase: Phase) -> Evaluation {
        Evaluation {
            script_id: "0".to_string(),
            node: AstNode::new(NodeKind::This),
            env: Frame::root(),
            phase,
            value: None,
        }
    }

    #[test]
    fn noop_interceptor_never_vetoes() {
        let interceptor = NoopInterceptor;
        assert!(interceptor.on_enter(&sample_evaluation(Phase::Enter)).is_ok());
        assert!(interceptor.on_exit(&sample_evaluation(Phase::Exit)).is_ok());
    }
}
