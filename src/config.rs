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

//! Evaluation configuration (`spec.md` §3 EvaluationConfig, §9 Open
//! Questions) plus the runaway-script safety valve no Non-goal excludes
//! (see `SPEC_FULL.md` §5).

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use crate::error::HostError;
use crate::interceptor::{Interceptor, NoopInterceptor};

/// Resolves the §9 Open Question "assignment to an undeclared identifier":
/// `Sloppy` creates the binding at the root frame (matching
/// `pawx::environment::Environment::assign`'s fallback and this crate's
/// default), `Strict` raises a reference error instead. See DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AssignmentMode {
    #[default]
    Sloppy,
    Strict,
}

/// Runaway-script guards. Not part of `spec.md`'s `EvaluationConfig` — every
/// tree-walking interpreter in the retrieval pack carries some bound like
/// this (see `SPEC_FULL.md` §5); it exists purely to turn a pathological
/// script into a `HostError` instead of a host stack overflow or an
/// infinite loop, without changing any node's documented semantics.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RuntimeLimits {
    pub max_call_depth: usize,
    pub max_loop_iterations: u64,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self { max_call_depth: 2_000, max_loop_iterations: 10_000_000 }
    }
}

/// `onError` hook: notified of interpreter/host errors that arise outside
/// the normal `cerr` path (`spec.md` §3) — currently, unsupported parameter
/// patterns encountered while binding a meta-function call.
pub type OnErrorHook = Rc<dyn Fn(&HostError)>;

/// The `spec.md` §3/§4.6 `EvaluationConfig`: `interceptor`, `scriptId`, and
/// `onError`, plus this crate's [`AssignmentMode`] and [`RuntimeLimits`]
/// additions.
#[derive(Clone)]
pub struct EvaluationConfig {
    pub interceptor: Rc<dyn Interceptor>,
    pub script_id: String,
    pub on_error: Option<OnErrorHook>,
    pub assignment_mode: AssignmentMode,
    pub limits: RuntimeLimits,
    /// Live call-depth counter shared by every clone of this config across
    /// one top-level evaluation — `call_depth.get()` is how
    /// `crate::meta_function::evaluate_meta_function` enforces
    /// `limits.max_call_depth` without threading an extra parameter through
    /// every dispatch signature.
    pub call_depth: Rc<Cell<usize>>,
}

impl EvaluationConfig {
    pub fn new(script_id: impl Into<String>) -> Self {
        Self {
            interceptor: Rc::new(NoopInterceptor),
            script_id: script_id.into(),
            on_error: None,
            assignment_mode: AssignmentMode::default(),
            limits: RuntimeLimits::default(),
            call_depth: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Rc<dyn Interceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn with_assignment_mode(mut self, mode: AssignmentMode) -> Self {
        self.assignment_mode = mode;
        self
    }

    pub fn with_limits(mut self, limits: RuntimeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_on_error(mut self, hook: OnErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    pub fn notify_error(&self, error: &HostError) {
        if let Some(hook) = &self.on_error {
            hook(error);
        }
    }
}

/// Monotonically increasing decimal `scriptId` generator, used when a
/// caller doesn't supply one (`spec.md` §3: "auto-assigned as a
/// monotonically increasing decimal string when absent").
#[derive(Default)]
pub struct ScriptIdGenerator {
    next: AtomicU64,
}

impl ScriptIdGenerator {
    pub fn new() -> Self {
        Self { next: AtomicU64::new(0) }
    }

    pub fn next_id(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_ids_increase_monotonically_as_decimal_strings() {
        let gen = ScriptIdGenerator::new();
        assert_eq!(gen.next_id(), "0");
        assert_eq!(gen.next_id(), "1");
        assert_eq!(gen.next_id(), "2");
    }

    #[test]
    fn default_assignment_mode_is_sloppy() {
        assert_eq!(AssignmentMode::default(), AssignmentMode::Sloppy);
    }

    #[test]
    fn default_limits_are_generous_but_finite() {
        let limits = RuntimeLimits::default();
        assert!(limits.max_call_depth > 0);
        assert!(limits.max_loop_iterations > 0);
    }
}
