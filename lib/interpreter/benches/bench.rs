use criterion::{criterion_group, criterion_main, Criterion};
use interpreter::{run_source, Interpreter};

pub fn criterion_benchmark(c: &mut Criterion) {
    let source = (0..200).map(|i| format!("({i} + 1.5) * 2 - -{i} / 3 >= {i}")).collect::<Vec<_>>().join(" == ");

    c.bench_function("scan + parse + evaluate", |b| {
        b.iter(|| {
            let mut output = Vec::new();
            run_source(&source, &mut output).unwrap();
        })
    });

    let (tokens, _) = scanner::scan(&source);
    let (expr, _) = parser::parse(tokens);
    let expr = expr.unwrap();
    c.bench_function("evaluate", |b| b.iter(|| Interpreter::new().evaluate(&expr).unwrap()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
