use criterion::{criterion_group, criterion_main, Criterion};
use dom::Document;
use tpl::{html, render};

fn bench_render(c: &mut Criterion) {
    c.bench_function("first_render", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            let container = doc.create_fragment();
            render(
                &mut doc,
                html!("<ul><li a=" {1} ">" {"one"} "</li><li a=" {2} ">" {"two"} "</li></ul>"),
                container,
            );
            doc
        });
    });

    c.bench_function("update_render", |b| {
        let mut doc = Document::new();
        let container = doc.create_fragment();
        let mut n = 0i64;
        b.iter(|| {
            n += 1;
            render(
                &mut doc,
                html!("<div a=\"x " {n} "\">" {n} "</div>"),
                container,
            );
        });
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
