use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sharplint_core::{parse, Compilation, Linter};

/// A class with `methods` methods, each tripping several rules.
fn synthetic_source(methods: usize) -> String {
    let mut source = String::from("using System;\nusing System.Collections.Generic;\n\nclass Sample {\n");
    for i in 0..methods {
        source.push_str(&format!(
            r#"    int Method{i}(object o, int n, bool flag) {{
        var s = o as string;
        int total = 0;
        for (int j = 0; j < n; j++) {{
            var r = new Random(j);
            total += r.Next();
        }}
        if (false) {{ total = -1; }}
        switch (n) {{
            case 1: bool same = flag ? true : false; return same ? 1 : 0;
            case 2: return total;
        }}
        return DateTime.Now.Second;
    }}

"#
        ));
    }
    source.push_str("}\n");
    source
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for methods in [10, 100] {
        let source = synthetic_source(methods);
        group.bench_with_input(BenchmarkId::new("reference_parser", methods), &source, |b, source| {
            b.iter(|| black_box(parse(source)));
        });
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let linter = Linter::default();
    for methods in [10, 100] {
        let tree = parse(&synthetic_source(methods)).tree;

        group.bench_with_input(BenchmarkId::new("bind_and_dispatch", methods), &tree, |b, tree| {
            b.iter(|| black_box(linter.analyze(tree)));
        });

        // dispatch only, facts already memoized
        let model = Compilation::new(&tree);
        linter.analyze_with(&tree, &model);
        group.bench_with_input(BenchmarkId::new("dispatch_only", methods), &tree, |b, tree| {
            b.iter(|| black_box(linter.analyze_with(tree, &model)));
        });
    }
    group.finish();
}

fn bench_fix(c: &mut Criterion) {
    let mut group = c.benchmark_group("fix");
    let linter = Linter::default();
    let source = synthetic_source(10);

    group.bench_function("fix_until_stable", |b| {
        b.iter(|| {
            let outcome = linter.fix_until_stable(&source).unwrap();
            black_box(outcome);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_analyze, bench_fix);
criterion_main!(benches);
