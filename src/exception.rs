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

//! Non-local control transfer (`spec.md` §3 ExceptionPacket, §7).
//!
//! `Return`, `Break`, `Continue`, and a user `throw` all share the `cerr`
//! channel; a `HostError` rides along the same channel as a fifth,
//! interpreter-raised kind. Nothing in this crate ever uses a native Rust
//! panic or `Result::Err` to carry one of these out of an evaluator —
//! they're always an explicit [`ExceptionPacket`] passed to the error
//! continuation.

use std::rc::Rc;

use crate::ast::AstNode;
use crate::error::HostError;
use crate::value::Value;

/// Which of the four non-local control transfers (or a host fault) this
/// packet represents.
#[derive(Debug, Clone)]
pub enum PacketKind {
    Throw,
    Return,
    Break,
    Continue,
    HostError(HostError),
}

/// The sole vehicle for non-local control flow in the evaluator.
///
/// `value` is `Value::Undefined` for `Break`/`Continue`/`HostError` packets,
/// the returned/thrown value for `Return`/`Throw`. `location` is attached by
/// [`crate::dispatch::evaluate`] as the packet transits a dispatch frame, if
/// not already set — "closest node that re-raised it" per `spec.md` §3.
#[derive(Debug, Clone)]
pub struct ExceptionPacket {
    pub kind: PacketKind,
    pub value: Value,
    pub location: Option<Rc<AstNode>>,
    pub label: Option<String>,
}

impl ExceptionPacket {
    pub fn throw_(value: Value) -> Self {
        Self { kind: PacketKind::Throw, value, location: None, label: None }
    }

    pub fn return_(value: Value) -> Self {
        Self { kind: PacketKind::Return, value, location: None, label: None }
    }

    pub fn break_(label: Option<String>) -> Self {
        Self { kind: PacketKind::Break, value: Value::Undefined, location: None, label }
    }

    pub fn continue_(label: Option<String>) -> Self {
        Self { kind: PacketKind::Continue, value: Value::Undefined, location: None, label }
    }

    pub fn host_error(error: HostError) -> Self {
        Self { kind: PacketKind::HostError(error), value: Value::Undefined, location: None, label: None }
    }

    /// Attaches a location, but only if one isn't already set — the
    /// innermost node that first raised the packet keeps ownership of the
    /// attribution as it unwinds through outer dispatch frames.
    pub fn with_location(mut self, node: Rc<AstNode>) -> Self {
        if self.location.is_none() {
            self.location = Some(node);
        }
        self
    }

    /// `true` for `Return`/`Break`/`Continue` — packets a `TryStatement`
    /// must let pass through its `catch` clause untouched (`spec.md` §4.2).
    pub fn is_control_transfer(&self) -> bool {
        matches!(self.kind, PacketKind::Return | PacketKind::Break | PacketKind::Continue)
    }

    /// `true` for a user `throw` or a wrapped `HostError` — the two kinds a
    /// `catch` clause is entitled to intercept.
    pub fn is_catchable(&self) -> bool {
        matches!(self.kind, PacketKind::Throw | PacketKind::HostError(_))
    }

    /// The value a `catch (e)` binding should see: the thrown value itself,
    /// or a stringified form of a host error.
    pub fn catch_value(&self) -> Value {
        match &self.kind {
            PacketKind::HostError(err) => Value::string(err.to_string()),
            _ => self.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_sticky_to_the_innermost_raiser() {
        let inner = AstNode::new(crate::ast::NodeKind::This);
        let outer = AstNode::new(crate::ast::NodeKind::This);
        let packet = ExceptionPacket::throw_(Value::Number(1.0))
            .with_location(inner.clone())
            .with_location(outer);
        assert!(Rc::ptr_eq(packet.location.as_ref().unwrap(), &inner));
    }

    #[test]
    fn return_and_break_are_control_transfers_not_catchable() {
        assert!(ExceptionPacket::return_(Value::Undefined).is_control_transfer());
        assert!(!ExceptionPacket::return_(Value::Undefined).is_catchable());
        assert!(ExceptionPacket::break_(None).is_control_transfer());
    }

    #[test]
    fn throw_and_host_error_are_catchable() {
        assert!(ExceptionPacket::throw_(Value::Undefined).is_catchable());
        assert!(ExceptionPacket::host_error(HostError::reference("x")).is_catchable());
    }
}
