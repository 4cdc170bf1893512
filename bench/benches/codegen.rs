use criterion::{criterion_group, criterion_main, Criterion};
use scriptc::{
    codegen::Generator,
    lexer::lex_in_new,
    parser::{parse, ErrorPolicy},
};
use std::hint::black_box;

static INPUT: &str = include_str!("../../demos/fib.sc");

fn criterion_benchmark(c: &mut Criterion) {
    let tokens = lex_in_new(INPUT);
    let program = parse(&tokens, ErrorPolicy::CollectAll).unwrap();

    c.bench_function("codegen", |b| {
        b.iter(|| black_box(Generator::new().generate(black_box(&program))));
    });

    c.bench_function("compile", |b| {
        b.iter(|| black_box(scriptc::compile(black_box(INPUT))));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
