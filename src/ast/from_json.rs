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

//! The post-parse validator (`spec.md` §9): turns an arbitrary
//! `serde_json::Value` tree — whatever shape an upstream parser happens to
//! emit — into the closed [`crate::ast::NodeKind`] set. An unrecognized
//! `"kind"` string, a missing required field, or a field of the wrong JSON
//! type all become a [`HostError::Syntax`] or [`HostError::NotImplemented`];
//! nothing downstream of this module ever has to guess at an AST shape it
//! doesn't know how to evaluate.
//!
//! Every node is a JSON object tagged by a `"kind"` field naming one of the
//! [`crate::ast::NodeKind`] variants (e.g. `"Binary"`, `"If"`, `"ForOf"`),
//! with an optional `"span": {"line": .., "column": ..}`. See `tests` below
//! for worked examples of every shape this module accepts.

use std::rc::Rc;

use serde_json::Value as Json;

use crate::ast::{
    AstNode, AssignOp, BinaryOp, CatchClause, FunctionNode, LogicalOp, MemberKey, NodeKind, Pattern, PropertyKey,
    UnaryOp, UpdateOp, VariableDeclarator,
};
use crate::error::{HostError, SourceSpan};
use crate::value::Value;

type JsonResult<T> = Result<T, HostError>;

pub fn parse(json: &Json) -> JsonResult<Rc<AstNode>> {
    parse_node(json)
}

fn parse_node(json: &Json) -> JsonResult<Rc<AstNode>> {
    let obj = as_object(json)?;
    let kind_name = field_str(obj, "kind")?;
    let kind = match kind_name {
        "Literal" => NodeKind::Literal(parse_literal(field(obj, "value")?)?),
        "Identifier" => NodeKind::Identifier(field_string(obj, "name")?),
        "This" => NodeKind::This,

        "Binary" => NodeKind::Binary {
            op: parse_binary_op(field_str(obj, "op")?)?,
            left: parse_node(field(obj, "left")?)?,
            right: parse_node(field(obj, "right")?)?,
        },
        "Logical" => NodeKind::Logical {
            op: parse_logical_op(field_str(obj, "op")?)?,
            left: parse_node(field(obj, "left")?)?,
            right: parse_node(field(obj, "right")?)?,
        },
        "Unary" => NodeKind::Unary {
            op: parse_unary_op(field_str(obj, "op")?)?,
            argument: parse_node(field(obj, "argument")?)?,
        },
        "Update" => NodeKind::Update {
            op: parse_update_op(field_str(obj, "op")?)?,
            argument: parse_node(field(obj, "argument")?)?,
            prefix: field_bool(obj, "prefix")?,
        },

        "Assignment" => NodeKind::Assignment {
            op: parse_assign_op(field_str(obj, "op")?)?,
            target: parse_node(field(obj, "target")?)?,
            value: parse_node(field(obj, "value")?)?,
        },
        "Member" => NodeKind::Member {
            object: parse_node(field(obj, "object")?)?,
            property: parse_member_key(field(obj, "property")?)?,
        },

        "Call" => NodeKind::Call {
            callee: parse_node(field(obj, "callee")?)?,
            arguments: parse_node_array(field(obj, "arguments")?)?,
        },
        "New" => NodeKind::New {
            callee: parse_node(field(obj, "callee")?)?,
            arguments: parse_node_array(field(obj, "arguments")?)?,
        },

        "Array" => NodeKind::Array(parse_node_array(field(obj, "elements")?)?),
        "Object" => NodeKind::Object(parse_properties(field(obj, "properties")?)?),

        "Function" => NodeKind::Function(Rc::new(parse_function(obj)?)),

        "Block" => NodeKind::Block(parse_node_array(field(obj, "body")?)?),
        "ExpressionStatement" => NodeKind::ExpressionStatement(parse_node(field(obj, "expression")?)?),
        "VariableDeclaration" => NodeKind::VariableDeclaration(parse_declarators(field(obj, "declarations")?)?),

        "If" => NodeKind::If {
            test: parse_node(field(obj, "test")?)?,
            consequent: parse_node(field(obj, "consequent")?)?,
            alternate: parse_node_opt(obj.get("alternate"))?,
        },
        "Conditional" => NodeKind::Conditional {
            test: parse_node(field(obj, "test")?)?,
            consequent: parse_node(field(obj, "consequent")?)?,
            alternate: parse_node(field(obj, "alternate")?)?,
        },

        "While" => NodeKind::While {
            test: parse_node(field(obj, "test")?)?,
            body: parse_node(field(obj, "body")?)?,
            label: parse_label(obj)?,
        },
        "DoWhile" => NodeKind::DoWhile {
            test: parse_node(field(obj, "test")?)?,
            body: parse_node(field(obj, "body")?)?,
            label: parse_label(obj)?,
        },
        "For" => NodeKind::For {
            init: parse_node_opt(obj.get("init"))?,
            test: parse_node_opt(obj.get("test"))?,
            update: parse_node_opt(obj.get("update"))?,
            body: parse_node(field(obj, "body")?)?,
            label: parse_label(obj)?,
        },
        "ForOf" => NodeKind::ForOf {
            left: field_string(obj, "left")?,
            right: parse_node(field(obj, "right")?)?,
            body: parse_node(field(obj, "body")?)?,
            label: parse_label(obj)?,
        },
        "ForIn" => NodeKind::ForIn {
            left: field_string(obj, "left")?,
            right: parse_node(field(obj, "right")?)?,
            body: parse_node(field(obj, "body")?)?,
            label: parse_label(obj)?,
        },

        "Break" => NodeKind::Break(parse_label(obj)?),
        "Continue" => NodeKind::Continue(parse_label(obj)?),
        "Return" => NodeKind::Return(parse_node_opt(obj.get("argument"))?),
        "Throw" => NodeKind::Throw(parse_node(field(obj, "argument")?)?),

        "Try" => NodeKind::Try {
            block: parse_node(field(obj, "block")?)?,
            handler: parse_catch_clause(obj.get("handler"))?,
            finalizer: parse_node_opt(obj.get("finalizer"))?,
        },

        other => return Err(HostError::not_implemented(format!("AST node kind '{other}'"))),
    };

    match parse_span(obj)? {
        Some(span) => Ok(AstNode::with_span(kind, span)),
        None => Ok(AstNode::new(kind)),
    }
}

fn parse_span(obj: &serde_json::Map<String, Json>) -> JsonResult<Option<SourceSpan>> {
    match obj.get("span") {
        None | Some(Json::Null) => Ok(None),
        Some(span_json) => {
            let span_obj = as_object(span_json)?;
            let line = field_u32(span_obj, "line")?;
            let column = field_u32(span_obj, "column")?;
            Ok(Some(SourceSpan::new(line, column)))
        }
    }
}

fn parse_label(obj: &serde_json::Map<String, Json>) -> JsonResult<Option<String>> {
    match obj.get("label") {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(HostError::syntax("'label' must be a string or null")),
    }
}

fn parse_literal(json: &Json) -> JsonResult<Value> {
    let obj = as_object(json)?;
    match field_str(obj, "type")? {
        "undefined" => Ok(Value::Undefined),
        "null" => Ok(Value::Null),
        "boolean" => Ok(Value::Boolean(field_bool(obj, "value")?)),
        "number" => Ok(Value::Number(field_f64(obj, "value")?)),
        "string" => Ok(Value::string(field_string(obj, "value")?)),
        other => Err(HostError::syntax(format!("unsupported literal type '{other}'"))),
    }
}

fn parse_binary_op(op: &str) -> JsonResult<BinaryOp> {
    Ok(match op {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Mod,
        "==" => BinaryOp::Eq,
        "!=" => BinaryOp::NotEq,
        "===" => BinaryOp::StrictEq,
        "!==" => BinaryOp::StrictNotEq,
        "<" => BinaryOp::Lt,
        ">" => BinaryOp::Gt,
        "<=" => BinaryOp::LtEq,
        ">=" => BinaryOp::GtEq,
        "<<" => BinaryOp::Shl,
        ">>" => BinaryOp::Shr,
        ">>>" => BinaryOp::UShr,
        "&" => BinaryOp::BitAnd,
        "|" => BinaryOp::BitOr,
        "^" => BinaryOp::BitXor,
        other => return Err(HostError::not_implemented(format!("binary operator '{other}'"))),
    })
}

fn parse_logical_op(op: &str) -> JsonResult<LogicalOp> {
    Ok(match op {
        "&&" => LogicalOp::And,
        "||" => LogicalOp::Or,
        "??" => LogicalOp::NullishCoalesce,
        other => return Err(HostError::not_implemented(format!("logical operator '{other}'"))),
    })
}

fn parse_unary_op(op: &str) -> JsonResult<UnaryOp> {
    Ok(match op {
        "-" => UnaryOp::Neg,
        "!" => UnaryOp::Not,
        "+" => UnaryOp::Plus,
        "~" => UnaryOp::BitNot,
        "typeof" => UnaryOp::TypeOf,
        other => return Err(HostError::not_implemented(format!("unary operator '{other}'"))),
    })
}

fn parse_update_op(op: &str) -> JsonResult<UpdateOp> {
    Ok(match op {
        "++" => UpdateOp::Increment,
        "--" => UpdateOp::Decrement,
        other => return Err(HostError::not_implemented(format!("update operator '{other}'"))),
    })
}

fn parse_assign_op(op: &str) -> JsonResult<AssignOp> {
    Ok(match op {
        "=" => AssignOp::Assign,
        "+=" => AssignOp::AddAssign,
        "-=" => AssignOp::SubAssign,
        "*=" => AssignOp::MulAssign,
        "/=" => AssignOp::DivAssign,
        "%=" => AssignOp::ModAssign,
        "<<=" => AssignOp::ShlAssign,
        ">>=" => AssignOp::ShrAssign,
        ">>>=" => AssignOp::UShrAssign,
        "&=" => AssignOp::BitAndAssign,
        "|=" => AssignOp::BitOrAssign,
        "^=" => AssignOp::BitXorAssign,
        other => return Err(HostError::not_implemented(format!("assignment operator '{other}'"))),
    })
}

fn parse_member_key(json: &Json) -> JsonResult<MemberKey> {
    let obj = as_object(json)?;
    if field_bool(obj, "computed")? {
        Ok(MemberKey::Computed(parse_node(field(obj, "expression")?)?))
    } else {
        Ok(MemberKey::Identifier(field_string(obj, "name")?))
    }
}

fn parse_properties(json: &Json) -> JsonResult<Vec<(PropertyKey, Rc<AstNode>)>> {
    as_array(json)?
        .iter()
        .map(|entry| {
            let obj = as_object(entry)?;
            let key = if field_bool(obj, "computed")? {
                PropertyKey::Computed(parse_node(field(obj, "expression")?)?)
            } else {
                PropertyKey::Identifier(field_string(obj, "name")?)
            };
            Ok((key, parse_node(field(obj, "value")?)?))
        })
        .collect()
}

fn parse_function(obj: &serde_json::Map<String, Json>) -> JsonResult<FunctionNode> {
    let name = match obj.get("name") {
        None | Some(Json::Null) => None,
        Some(Json::String(s)) => Some(s.clone()),
        Some(_) => return Err(HostError::syntax("'name' must be a string or null")),
    };

    let params = as_array(field(obj, "params")?)?
        .iter()
        .map(parse_pattern)
        .collect::<JsonResult<Vec<_>>>()?;

    Ok(FunctionNode {
        name,
        params,
        body: parse_node(field(obj, "body")?)?,
        is_arrow: field_bool(obj, "isArrow")?,
        is_declaration: field_bool(obj, "isDeclaration")?,
    })
}

fn parse_pattern(json: &Json) -> JsonResult<Pattern> {
    let obj = as_object(json)?;
    if let Some(Json::String(rest_name)) = obj.get("rest") {
        return Ok(Pattern::Rest(rest_name.clone()));
    }
    let name = field_string(obj, "name")?;
    let default = parse_node_opt(obj.get("default"))?;
    Ok(Pattern::Identifier { name, default })
}

fn parse_declarators(json: &Json) -> JsonResult<Vec<VariableDeclarator>> {
    as_array(json)?
        .iter()
        .map(|entry| {
            let obj = as_object(entry)?;
            Ok(VariableDeclarator {
                name: field_string(obj, "name")?,
                init: parse_node_opt(obj.get("init"))?,
            })
        })
        .collect()
}

fn parse_catch_clause(json: Option<&Json>) -> JsonResult<Option<CatchClause>> {
    match json {
        None | Some(Json::Null) => Ok(None),
        Some(value) => {
            let obj = as_object(value)?;
            let param = match obj.get("param") {
                None | Some(Json::Null) => None,
                Some(Json::String(s)) => Some(s.clone()),
                Some(_) => return Err(HostError::syntax("'param' must be a string or null")),
            };
            Ok(Some(CatchClause { param, body: parse_node(field(obj, "body")?)? }))
        }
    }
}

fn parse_node_array(json: &Json) -> JsonResult<Vec<Rc<AstNode>>> {
    as_array(json)?.iter().map(parse_node).collect()
}

fn parse_node_opt(json: Option<&Json>) -> JsonResult<Option<Rc<AstNode>>> {
    match json {
        None | Some(Json::Null) => Ok(None),
        Some(value) => Ok(Some(parse_node(value)?)),
    }
}

fn as_object(json: &Json) -> JsonResult<&serde_json::Map<String, Json>> {
    json.as_object().ok_or_else(|| HostError::syntax("expected a JSON object for an AST node"))
}

fn as_array(json: &Json) -> JsonResult<&Vec<Json>> {
    json.as_array().ok_or_else(|| HostError::syntax("expected a JSON array"))
}

fn field<'a>(obj: &'a serde_json::Map<String, Json>, name: &str) -> JsonResult<&'a Json> {
    obj.get(name).ok_or_else(|| HostError::syntax(format!("missing required field '{name}'")))
}

fn field_str<'a>(obj: &'a serde_json::Map<String, Json>, name: &str) -> JsonResult<&'a str> {
    field(obj, name)?.as_str().ok_or_else(|| HostError::syntax(format!("field '{name}' must be a string")))
}

fn field_string(obj: &serde_json::Map<String, Json>, name: &str) -> JsonResult<String> {
    Ok(field_str(obj, name)?.to_string())
}

fn field_bool(obj: &serde_json::Map<String, Json>, name: &str) -> JsonResult<bool> {
    field(obj, name)?.as_bool().ok_or_else(|| HostError::syntax(format!("field '{name}' must be a boolean")))
}

fn field_f64(obj: &serde_json::Map<String, Json>, name: &str) -> JsonResult<f64> {
    field(obj, name)?.as_f64().ok_or_else(|| HostError::syntax(format!("field '{name}' must be a number")))
}

fn field_u32(obj: &serde_json::Map<String, Json>, name: &str) -> JsonResult<u32> {
    field(obj, name)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| HostError::syntax(format!("field '{name}' must be a non-negative integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_numeric_literal() {
        let node = parse(&json!({"kind": "Literal", "value": {"type": "number", "value": 2.0}})).unwrap();
        assert!(matches!(node.kind, NodeKind::Literal(Value::Number(n)) if n == 2.0));
    }

    #[test]
    fn parses_binary_addition_of_two_identifiers() {
        let node = parse(&json!({
            "kind": "Binary",
            "op": "+",
            "left": {"kind": "Identifier", "name": "a"},
            "right": {"kind": "Identifier", "name": "b"},
        }))
        .unwrap();
        assert!(matches!(node.kind, NodeKind::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn parses_a_labeled_for_of_with_break() {
        let node = parse(&json!({
            "kind": "ForOf",
            "left": "x",
            "right": {"kind": "Identifier", "name": "items"},
            "body": {"kind": "Block", "body": [{"kind": "Break", "label": null}]},
            "label": "outer",
        }))
        .unwrap();
        match &node.kind {
            NodeKind::ForOf { label, .. } => assert_eq!(label.as_deref(), Some("outer")),
            _ => panic!("expected ForOf"),
        }
    }

    #[test]
    fn unknown_kind_is_not_implemented() {
        let err = parse(&json!({"kind": "ClassDeclaration"})).unwrap_err();
        assert!(matches!(err, HostError::NotImplemented(_)));
    }

    #[test]
    fn missing_required_field_is_a_syntax_error() {
        let err = parse(&json!({"kind": "Identifier"})).unwrap_err();
        assert!(matches!(err, HostError::Syntax(_)));
    }

    #[test]
    fn parses_try_catch_finally_with_a_bound_param() {
        let node = parse(&json!({
            "kind": "Try",
            "block": {"kind": "Block", "body": []},
            "handler": {"param": "e", "body": {"kind": "Block", "body": []}},
            "finalizer": {"kind": "Block", "body": []},
        }))
        .unwrap();
        match &node.kind {
            NodeKind::Try { handler: Some(clause), finalizer: Some(_), .. } => {
                assert_eq!(clause.param.as_deref(), Some("e"));
            }
            _ => panic!("expected Try with handler and finalizer"),
        }
    }
}
