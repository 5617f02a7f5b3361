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

//! `ArrayExpression` and `ObjectExpression` (`spec.md` §4.2). Elements and
//! property values evaluate left-to-right, each one fully settling (and
//! passing through the interceptor) before the next begins.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{AstNode, PropertyKey};
use crate::config::EvaluationConfig;
use crate::continuation::{ErrorCont, SuccessCont};
use crate::dispatch::evaluate;
use crate::environment::Frame;
use crate::interpreter::eval_sequence;
use crate::value::{HostObject, Value};

pub fn array(elements: &[Rc<AstNode>], env: Rc<Frame>, config: EvaluationConfig, c: SuccessCont, cerr: ErrorCont) {
    eval_sequence(elements.to_vec(), env, config, Rc::new(move |values| c(Value::array(values))), cerr);
}

pub fn object(
    properties: &[(PropertyKey, Rc<AstNode>)],
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    eval_object_from(Rc::new(properties.to_vec()), 0, Rc::new(RefCell::new(IndexMap::new())), env, config, c, cerr);
}

#[allow(clippy::type_complexity)]
fn eval_object_from(
    properties: Rc<Vec<(PropertyKey, Rc<AstNode>)>>,
    index: usize,
    acc: Rc<RefCell<IndexMap<String, Value>>>,
    env: Rc<Frame>,
    config: EvaluationConfig,
    c: SuccessCont,
    cerr: ErrorCont,
) {
    if index >= properties.len() {
        return c(Value::HostObject(HostObject::new_record(acc.borrow().clone())));
    }

    let (key, value_node) = properties[index].clone();
    let properties_rest = properties.clone();
    let env_for_value = env.clone();
    let config_for_value = config.clone();
    let c_rest = c.clone();
    let cerr_rest = cerr.clone();
    let acc_rest = acc.clone();

    let on_name: Rc<dyn Fn(String)> = Rc::new(move |name: String| {
        let acc_for_insert = acc_rest.clone();
        let properties_next = properties_rest.clone();
        let env_next = env_for_value.clone();
        let config_next = config_for_value.clone();
        let c_next = c_rest.clone();
        let cerr_next = cerr_rest.clone();
        let cerr_for_value = cerr_rest.clone();

        evaluate(
            value_node.clone(),
            env_for_value.clone(),
            config_for_value.clone(),
            Rc::new(move |value| {
                acc_for_insert.borrow_mut().insert(name.clone(), value);
                eval_object_from(
                    properties_next.clone(),
                    index + 1,
                    acc_for_insert.clone(),
                    env_next.clone(),
                    config_next.clone(),
                    c_next.clone(),
                    cerr_next.clone(),
                );
            }),
            cerr_for_value,
        );
    });

    match key {
        PropertyKey::Identifier(name) => on_name(name),
        PropertyKey::Computed(expr) => {
            evaluate(expr, env, config, Rc::new(move |key_val| on_name(key_val.stringify())), cerr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::config::EvaluationConfig;

    #[test]
    fn empty_array_produces_an_empty_host_array() {
        let result = Rc::new(RefCell::new(None));
        let slot = result.clone();
        array(&[], Frame::root(), EvaluationConfig::new("t"), Rc::new(move |v| *slot.borrow_mut() = Some(v)), Rc::new(|_| {}));
        let value = result.borrow_mut().take().unwrap();
        assert_eq!(value.stringify(), "[]");
    }

    #[test]
    fn object_preserves_declaration_order() {
        let props = vec![
            (PropertyKey::Identifier("b".to_string()), AstNode::new(NodeKind::Literal(Value::Number(2.0)))),
            (PropertyKey::Identifier("a".to_string()), AstNode::new(NodeKind::Literal(Value::Number(1.0)))),
        ];
        let result = Rc::new(RefCell::new(None));
        let slot = result.clone();
        object(&props, Frame::root(), EvaluationConfig::new("t"), Rc::new(move |v| *slot.borrow_mut() = Some(v)), Rc::new(|_| {}));
        let value = result.borrow_mut().take().unwrap();
        if let Value::HostObject(HostObject::Record(map)) = value {
            let keys: Vec<_> = map.borrow().keys().cloned().collect();
            assert_eq!(keys, vec!["b".to_string(), "a".to_string()]);
        } else {
            panic!("expected a record");
        }
    }
}
