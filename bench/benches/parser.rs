use criterion::{criterion_group, criterion_main, Criterion};
use scriptc::{
    lexer::SUGGESTED_TOKENS_CAPACITY,
    parser::{parse_program, ErrorPolicy},
    token::Token,
};
use std::hint::black_box;

static INPUT: &str = include_str!("../../demos/loops.sc");

fn parser(input: &str, tokens: &mut Vec<Token>) {
    let program = parse_program(input, tokens, ErrorPolicy::CollectAll).unwrap();
    _ = black_box(program);
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);

    c.bench_function("parser", |b| {
        b.iter(|| {
            tokens.clear();
            parser(black_box(INPUT), &mut tokens);
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
