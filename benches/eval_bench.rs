//! Dispatch-path micro-benchmarks.
//!
//! Measures the cost of running [`EvaluationContext::evaluate`] over a small
//! arithmetic expression and over a bounded loop — the two access patterns
//! that matter most for a CPS evaluator: per-node dispatch overhead, and
//! the closure-allocation cost of looping through `crate::interpreter::control_flow`.

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cps_interpreter::ast::{AstNode, BinaryOp, NodeKind, VariableDeclarator};
use cps_interpreter::value::Value;
use cps_interpreter::{EvaluationContext, Source};

fn arithmetic_chain(depth: usize) -> Rc<AstNode> {
    let mut node = AstNode::new(NodeKind::Literal(Value::Number(0.0)));
    for i in 0..depth {
        node = AstNode::new(NodeKind::Binary {
            op: BinaryOp::Add,
            left: node,
            right: AstNode::new(NodeKind::Literal(Value::Number(i as f64))),
        });
    }
    node
}

fn counting_loop(iterations: f64) -> Rc<AstNode> {
    let ident = |name: &str| AstNode::new(NodeKind::Identifier(name.to_string()));

    AstNode::new(NodeKind::Block(vec![
        AstNode::new(NodeKind::VariableDeclaration(vec![VariableDeclarator {
            name: "i".to_string(),
            init: Some(AstNode::new(NodeKind::Literal(Value::Number(0.0)))),
        }])),
        AstNode::new(NodeKind::While {
            test: AstNode::new(NodeKind::Binary {
                op: BinaryOp::Lt,
                left: ident("i"),
                right: AstNode::new(NodeKind::Literal(Value::Number(iterations))),
            }),
            body: AstNode::new(NodeKind::ExpressionStatement(AstNode::new(NodeKind::Update {
                op: cps_interpreter::ast::UpdateOp::Increment,
                argument: ident("i"),
                prefix: false,
            }))),
            label: None,
        }),
        AstNode::new(NodeKind::ExpressionStatement(ident("i"))),
    ]))
}

fn bench_arithmetic_chain(c: &mut Criterion) {
    let node = arithmetic_chain(64);
    c.bench_function("arithmetic_chain_64", |b| {
        b.iter(|| {
            let ctx = EvaluationContext::new();
            black_box(ctx.evaluate(Source::Parsed(node.clone()), None).unwrap());
        });
    });
}

fn bench_counting_loop(c: &mut Criterion) {
    let node = counting_loop(1_000.0);
    c.bench_function("counting_loop_1000", |b| {
        b.iter(|| {
            let ctx = EvaluationContext::new();
            black_box(ctx.evaluate(Source::Parsed(node.clone()), None).unwrap());
        });
    });
}

criterion_group!(benches, bench_arithmetic_chain, bench_counting_loop);
criterion_main!(benches);
