use criterion::{criterion_group, criterion_main, Criterion};
use scriptc::{
    lexer::{self, SUGGESTED_TOKENS_CAPACITY},
    token::{Token, TokenKind},
};
use std::hint::black_box;

static INPUT: &str = include_str!("../../demos/loops.sc");

fn lexer(input: &str, tokens: &mut Vec<Token>) {
    lexer::lex(input, tokens);
    let unknown = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Unknown)
        .count();
    black_box(unknown);
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);

    c.bench_function("lexer", |b| {
        b.iter(|| {
            tokens.clear();
            lexer(black_box(INPUT), &mut tokens);
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
