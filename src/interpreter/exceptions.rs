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

//! `ReturnStatement`, `ThrowStatement`, and `TryStatement` (`spec.md` §4.2).
//!
//! `return` and `throw` don't produce a value through `c` at all — they hand
//! an [`ExceptionPacket`] to `cerr` and let it unwind until something is
//! listening for it: a `MetaFunction` call frame for `Return`, a `catch`
//! clause or the top-level caller for `Throw`. `TryStatement` is the one
//! place that inspects a packet's kind before deciding whether to swallow it
//! or let it keep unwinding, per `spec.md` §4.2: `catch` may only intercept
//! `Throw` and `HostError` packets, never `Return`/`Break`/`Continue`; and a
//! `finally` block runs no matter how the `try`/`catch` settles, with
//! whatever it produces itself overriding the original outcome.

use std::rc::Rc;

use crate::ast::{AstNode, CatchClause};
use crate::config::EvaluationConfig;
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::exception::ExceptionPacket;
use crate::value::Value;

pub fn return_stmt(argument: Option<&Rc<AstNode>>, env: Rc<Frame>, config: EvaluationConfig, _c: SuccessCont, cerr: ErrorCont) {
    match argument {
        Some(arg) => {
            let cerr_for_ok = cerr.clone();
            evaluate(arg.clone(), env, config, Rc::new(move |value| cerr_for_ok.clone()(ExceptionPacket::return_(value))), cerr);
        }
        None => cerr(ExceptionPacket::return_(Value::Undefined)),
    }
}

pub fn throw_stmt(argument: &Rc<AstNode>, env: Rc<Frame>, config: EvaluationConfig, cerr: ErrorCont) {
    let cerr_for_ok = cerr.clone();
    evaluate(argument.clone(), env, config, Rc::new(move |value| cerr_for_ok.clone()(ExceptionPacket::throw_(value))), cerr);
}

/// Runs `finalizer` (if any) and then delivers `value` through `c` — unless
/// the finalizer itself raises, in which case that packet supersedes the
/// `try`'s own completion value entirely.
fn finish_with_value(finalizer: Option<Rc<AstNode>>, value: Value, env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    match finalizer {
        Some(fin) => {
            evaluate(fin, env, config, Rc::new(move |_| c(value.clone())), cerr);
        }
        None => c(value),
    }
}

/// Runs `finalizer` (if any) and then re-raises `packet` — unless the
/// finalizer raises its own packet, which supersedes `packet` entirely.
fn finish_with_packet(finalizer: Option<Rc<AstNode>>, packet: ExceptionPacket, env: Rc<Frame>, config: EvaluationConfig, cerr: ErrorCont) {
    match finalizer {
        Some(fin) => {
            let cerr_for_ok = cerr.clone();
            evaluate(fin, env, config, Rc::new(move |_| cerr_for_ok.clone()(packet.clone())), cerr);
        }
        None => cerr(packet),
    }
}

pub fn try_stmt(
    block: &Rc<AstNode>,
    handler: Option<&CatchClause>,
    finalizer: Option<&Rc<AstNode>>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    let handler = handler.cloned();
    let finalizer = finalizer.cloned();

    let finalizer_for_ok = finalizer.clone();
    let env_for_ok = env.clone();
    let config_for_ok = config.clone();
    let c_for_ok = c;
    let cerr_for_ok = cerr.clone();

    let finalizer_for_err = finalizer;
    let env_for_err = env.clone();
    let config_for_err = config.clone();
    let c_for_err = c_for_ok.clone();
    let cerr_for_err = cerr.clone();

    evaluate(
        block.clone(),
        env,
        config,
        Rc::new(move |value| {
            finish_with_value(finalizer_for_ok.clone(), value, env_for_ok.clone(), config_for_ok.clone(), c_for_ok.clone(), cerr_for_ok.clone());
        }),
        Rc::new(move |packet| {
            if packet.is_catchable() {
                if let Some(clause) = &handler {
                    let catch_env = Frame::child(&env_for_err);
                    if let Some(param) = &clause.param {
                        catch_env.define_value(param.clone(), packet.catch_value());
                    }

                    let finalizer_for_handler_ok = finalizer_for_err.clone();
                    let env_for_handler_ok = env_for_err.clone();
                    let config_for_handler_ok = config_for_err.clone();
                    let c_for_handler_ok = c_for_err.clone();
                    let cerr_for_handler_ok = cerr_for_err.clone();

                    let finalizer_for_handler_err = finalizer_for_err.clone();
                    let env_for_handler_err = env_for_err.clone();
                    let config_for_handler_err = config_for_err.clone();
                    let cerr_for_handler_err = cerr_for_err.clone();

                    evaluate(
                        clause.body.clone(),
                        catch_env,
                        config_for_err.clone(),
                        Rc::new(move |value| {
                            finish_with_value(
                                finalizer_for_handler_ok.clone(),
                                value,
                                env_for_handler_ok.clone(),
                                config_for_handler_ok.clone(),
                                c_for_handler_ok.clone(),
                                cerr_for_handler_ok.clone(),
                            );
                        }),
                        Rc::new(move |handler_packet| {
                            finish_with_packet(
                                finalizer_for_handler_err.clone(),
                                handler_packet,
                                env_for_handler_err.clone(),
                                config_for_handler_err.clone(),
                                cerr_for_handler_err.clone(),
                            );
                        }),
                    );
                    return;
                }
            }
            finish_with_packet(finalizer_for_err.clone(), packet, env_for_err.clone(), config_for_err.clone(), cerr_for_err.clone());
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::PacketKind;

    #[test]
    fn return_statement_without_argument_yields_undefined() {
        let packet = ExceptionPacket::return_(Value::Undefined);
        assert!(matches!(packet.kind, PacketKind::Return));
        assert!(matches!(packet.value, Value::Undefined));
    }

    #[test]
    fn throw_packet_is_catchable_but_return_is_not() {
        assert!(ExceptionPacket::throw_(Value::Number(1.0)).is_catchable());
        assert!(!ExceptionPacket::return_(Value::Number(1.0)).is_catchable());
    }
}
