//! End-to-end scenarios driving a handful of complete programs through
//! [`EvaluationContext::evaluate`], exercising arithmetic, mutation, loops,
//! `try`/`catch`/`throw`, user-defined functions, rest parameters, and an
//! unbound identifier producing a `ReferenceError` instead of a panic.
//!
//! ASTs are built by hand with [`AstNode`]/[`NodeKind`] constructors rather
//! than through the JSON front door — the JSON shape already has its own
//! coverage in `src/ast/from_json.rs`; these tests are about the evaluator's
//! end-to-end behavior once a tree is in hand.

use std::rc::Rc;

use cps_interpreter::ast::{
    AstNode, BinaryOp, CatchClause, FunctionNode, MemberKey, NodeKind, Pattern, VariableDeclarator,
};
use cps_interpreter::exception::PacketKind;
use cps_interpreter::{EvaluationContext, HostError, Source, Value};

fn lit_num(n: f64) -> Rc<AstNode> {
    AstNode::new(NodeKind::Literal(Value::Number(n)))
}

fn lit_str(s: &str) -> Rc<AstNode> {
    AstNode::new(NodeKind::Literal(Value::string(s)))
}

fn ident(name: &str) -> Rc<AstNode> {
    AstNode::new(NodeKind::Identifier(name.to_string()))
}

#[test]
fn two_plus_two_is_four() {
    let ctx = EvaluationContext::new();
    let node = AstNode::new(NodeKind::Binary { op: BinaryOp::Add, left: lit_num(2.0), right: lit_num(2.0) });
    let result = ctx.evaluate(Source::Parsed(node), None).unwrap();
    assert_eq!(result.as_number(), Some(4.0));
}

#[test]
fn identifiers_resolve_against_globals_bound_on_the_root_frame() {
    let ctx = EvaluationContext::new();
    ctx.root_frame().define_value("a", Value::Number(2.0));
    ctx.root_frame().define_value("b", Value::Number(2.0));
    let node = AstNode::new(NodeKind::Binary { op: BinaryOp::Add, left: ident("a"), right: ident("b") });
    let result = ctx.evaluate(Source::Parsed(node), None).unwrap();
    assert_eq!(result.as_number(), Some(4.0));
}

#[test]
fn postfix_increment_on_a_declared_variable_leaves_it_at_one() {
    let ctx = EvaluationContext::new();
    let program = AstNode::new(NodeKind::Block(vec![
        AstNode::new(NodeKind::VariableDeclaration(vec![VariableDeclarator {
            name: "c".to_string(),
            init: Some(lit_num(0.0)),
        }])),
        AstNode::new(NodeKind::ExpressionStatement(AstNode::new(NodeKind::Update {
            op: cps_interpreter::ast::UpdateOp::Increment,
            argument: ident("c"),
            prefix: false,
        }))),
        AstNode::new(NodeKind::ExpressionStatement(ident("c"))),
    ]));
    let result = ctx.evaluate(Source::Parsed(program), None).unwrap();
    assert_eq!(result.as_number(), Some(1.0));
}

/// `for (const x of items) { try { if (x === 2) throw "e"; } catch (err) {
/// result = err; break; } }` — the thrown value lands in `result` and the
/// loop exits via the labeled-break-matches-innermost-loop path.
#[test]
fn a_throw_caught_inside_a_for_of_body_can_break_the_loop() {
    let ctx = EvaluationContext::new();
    ctx.root_frame().define_value("items", Value::array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]));

    let try_block = AstNode::new(NodeKind::Block(vec![AstNode::new(NodeKind::If {
        test: AstNode::new(NodeKind::Binary { op: BinaryOp::StrictEq, left: ident("x"), right: lit_num(2.0) }),
        consequent: AstNode::new(NodeKind::Block(vec![AstNode::new(NodeKind::Throw(lit_str("e")))])),
        alternate: None,
    })]));

    let catch_body = AstNode::new(NodeKind::Block(vec![
        AstNode::new(NodeKind::ExpressionStatement(AstNode::new(NodeKind::Assignment {
            op: cps_interpreter::ast::AssignOp::Assign,
            target: ident("result"),
            value: ident("err"),
        }))),
        AstNode::new(NodeKind::Break(None)),
    ]));

    let try_stmt = AstNode::new(NodeKind::Try {
        block: try_block,
        handler: Some(CatchClause { param: Some("err".to_string()), body: catch_body }),
        finalizer: None,
    });

    let program = AstNode::new(NodeKind::Block(vec![
        AstNode::new(NodeKind::VariableDeclaration(vec![VariableDeclarator {
            name: "result".to_string(),
            init: Some(lit_str("")),
        }])),
        AstNode::new(NodeKind::ForOf {
            left: "x".to_string(),
            right: ident("items"),
            body: AstNode::new(NodeKind::Block(vec![try_stmt])),
            label: None,
        }),
        AstNode::new(NodeKind::ExpressionStatement(ident("result"))),
    ]));

    let result = ctx.evaluate(Source::Parsed(program), None).unwrap();
    assert_eq!(result.as_string(), Some("e"));
}

/// `function multiply(a, b) { return a * b; } multiply(6, 7)` === 42.
#[test]
fn a_declared_function_can_be_called_by_name() {
    let ctx = EvaluationContext::new();
    let function = FunctionNode {
        name: Some("multiply".to_string()),
        params: vec![Pattern::Identifier { name: "a".to_string(), default: None }, Pattern::Identifier {
            name: "b".to_string(),
            default: None,
        }],
        body: AstNode::new(NodeKind::Block(vec![AstNode::new(NodeKind::Return(Some(AstNode::new(
            NodeKind::Binary { op: BinaryOp::Mul, left: ident("a"), right: ident("b") },
        ))))])),
        is_arrow: false,
        is_declaration: true,
    };

    let program = AstNode::new(NodeKind::Block(vec![
        AstNode::new(NodeKind::ExpressionStatement(AstNode::new(NodeKind::Function(Rc::new(function))))),
        AstNode::new(NodeKind::ExpressionStatement(AstNode::new(NodeKind::Call {
            callee: ident("multiply"),
            arguments: vec![lit_num(6.0), lit_num(7.0)],
        }))),
    ]));

    let result = ctx.evaluate(Source::Parsed(program), None).unwrap();
    assert_eq!(result.as_number(), Some(42.0));
}

/// `function f(...args) { return args.length; } f(1, 2, 3, 4)` === 4.
#[test]
fn rest_parameters_collect_every_trailing_argument() {
    let ctx = EvaluationContext::new();
    let function = FunctionNode {
        name: Some("f".to_string()),
        params: vec![Pattern::Rest("args".to_string())],
        body: AstNode::new(NodeKind::Block(vec![AstNode::new(NodeKind::Return(Some(AstNode::new(
            NodeKind::Member { object: ident("args"), property: MemberKey::Identifier("length".to_string()) },
        ))))])),
        is_arrow: false,
        is_declaration: true,
    };

    let program = AstNode::new(NodeKind::Block(vec![
        AstNode::new(NodeKind::ExpressionStatement(AstNode::new(NodeKind::Function(Rc::new(function))))),
        AstNode::new(NodeKind::ExpressionStatement(AstNode::new(NodeKind::Call {
            callee: ident("f"),
            arguments: vec![lit_num(1.0), lit_num(2.0), lit_num(3.0), lit_num(4.0)],
        }))),
    ]));

    let result = ctx.evaluate(Source::Parsed(program), None).unwrap();
    assert_eq!(result.as_number(), Some(4.0));
}

#[test]
fn an_unbound_identifier_raises_a_reference_error_instead_of_settling() {
    let ctx = EvaluationContext::new();
    let node = ident("window");
    let err = ctx.evaluate(Source::Parsed(node), None).unwrap_err();
    match err.kind {
        PacketKind::HostError(HostError::Reference { name }) => assert_eq!(name, "window"),
        other => panic!("expected a reference HostError, got {other:?}"),
    }
}
