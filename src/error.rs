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

//! Host-side (interpreter/native) error taxonomy.
//!
//! These are distinct from user-program exceptions: a [`HostError`] is
//! raised by the interpreter itself — an unbound identifier, an unknown
//! node kind, an unsupported operator — never by a script's own `throw`.
//! Every `HostError` is wrapped into an [`crate::exception::ExceptionPacket`]
//! before it travels through `cerr`; nothing in this crate lets a
//! `HostError` unwind the native Rust stack via `panic!`.

use std::fmt;

/// Stable location a [`HostError`] or user exception can be attributed to.
///
/// Parsers that produce real positions should fill this in; ASTs built by
/// hand (tests, `evalFunctionBody` callers) may leave it at the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
}

impl SourceSpan {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Interpreter/host errors (`spec.md` §7.2).
///
/// These map onto the error-shaped packets produced by the evaluator: an
/// unbound [`HostError::Reference`], an [`HostError::NotImplemented`] node
/// kind or assignment operator, a [`HostError::Type`] mismatch in a native
/// operator, or a [`HostError::Syntax`] error from the JSON AST validator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    #[error("ReferenceError: {name} is not defined")]
    Reference { name: String },

    #[error("NotImplementedException: {0}")]
    NotImplemented(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error("SyntaxError: {0}")]
    Syntax(String),
}

impl HostError {
    pub fn reference(name: impl Into<String>) -> Self {
        HostError::Reference { name: name.into() }
    }

    pub fn not_implemented(what: impl Into<String>) -> Self {
        HostError::NotImplemented(what.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        HostError::Type(message.into())
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        HostError::Syntax(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_error_message_names_the_identifier() {
        let err = HostError::reference("window");
        assert_eq!(err.to_string(), "ReferenceError: window is not defined");
    }

    #[test]
    fn span_displays_as_line_colon_column() {
        let span = SourceSpan::new(3, 7);
        assert_eq!(span.to_string(), "3:7");
    }
}
