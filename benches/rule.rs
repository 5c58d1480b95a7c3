extern crate criterion;
extern crate term_rules;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use term_rules::matcher::Matcher;
use term_rules::{parse_rule, parse_term, Rule};

pub fn rule_construction_benchmark(c: &mut Criterion) {
    let left = parse_term("f(a, g(b, h(c, a)), k(b))").expect("left");
    let right = parse_term("k(c, b, a)").expect("right");

    c.bench_function("rule_construction", |b| {
        b.iter(|| Rule::rewrite(black_box(&left), black_box(&right)))
    });
}

pub fn rule_apply_benchmark(c: &mut Criterion) {
    let rule = parse_rule("f(a, g(b, h(c, a)), k(b)) --> k(c, b, a)").expect("rule");
    let hit = parse_term("f(x + 1, g(y, h(z * 2, x + 1)), k(y))").expect("hit");
    let miss = parse_term("f(x + 1, g(y, h(z * 2, x + 2)), k(y))").expect("miss");

    c.bench_function("rule_apply_hit", |b| {
        b.iter(|| black_box(&rule).apply(black_box(&hit)))
    });
    c.bench_function("rule_apply_miss", |b| {
        b.iter(|| black_box(&rule).apply(black_box(&miss)))
    });
}

pub fn commutative_apply_benchmark(c: &mut Criterion) {
    let engine = Arc::new(Matcher::with_commutative(vec!["add", "mul"]));
    let left = parse_term("add(mul(a, b), mul(a, c))").expect("left");
    let right = parse_term("mul(a, add(b, c))").expect("right");
    let rule = Rule::rewrite_with(engine, &left, &right).expect("rule");
    let term = parse_term("y * x + z * x").expect("term");

    c.bench_function("commutative_apply", |b| {
        b.iter(|| black_box(&rule).apply(black_box(&term)))
    });
}

criterion_group!(
    rule,
    rule_construction_benchmark,
    rule_apply_benchmark,
    commutative_apply_benchmark
);
criterion_main!(rule);
