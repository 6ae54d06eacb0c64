use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rd_gen::{Generator, GeneratorConfig, GrammarBuilder, Recognizer};

fn bench_recognizing(c: &mut Criterion) {
    let parens = GrammarBuilder::new('S')
        .rule('S', "(S)S")
        .rule('S', "")
        .build();
    let config = GeneratorConfig::default();
    let recognizer = Recognizer::new(&parens, &config).unwrap();

    c.bench_function("recognize_balanced_parens", |b| {
        let input = "(()())".repeat(16);
        b.iter(|| recognizer.recognize(black_box(input.as_bytes())).unwrap())
    });

    c.bench_function("reject_unbalanced_parens", |b| {
        let input = format!("{}(", "(()())".repeat(16));
        b.iter(|| recognizer.recognize(black_box(input.as_bytes())).unwrap())
    });

    let expr = GrammarBuilder::new('E')
        .rule('E', "TR")
        .rule('R', "+TR")
        .rule('R', "")
        .rule('T', "FQ")
        .rule('Q', "*FQ")
        .rule('Q', "")
        .rule('F', "(E)")
        .rule('F', "x")
        .build();
    let recognizer = Recognizer::new(&expr, &config).unwrap();

    c.bench_function("recognize_expression", |b| {
        let input = "x+x*(x+x)*x+(x)";
        b.iter(|| recognizer.recognize(black_box(input.as_bytes())).unwrap())
    });
}

fn bench_generating(c: &mut Criterion) {
    let expr = GrammarBuilder::new('E')
        .rule('E', "TR")
        .rule('R', "+TR")
        .rule('R', "")
        .rule('T', "(E)")
        .rule('T', "x")
        .build();
    let generator = Generator::default();

    c.bench_function("generate_rust_recognizer", |b| {
        b.iter(|| generator.generate_to_string(black_box(&expr)).unwrap())
    });
}

criterion_group!(benches, bench_recognizing, bench_generating);
criterion_main!(benches);
