//! Benchmarks comparing cached vs freshly bound page output.

use std::fs;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagemvc::{Binder, MvcConfig, Page, PageProxy};

/// Create a site with a custom article controller/view and one template.
fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("controllers")).expect("controllers dir");
    fs::create_dir_all(dir.path().join("views")).expect("views dir");
    fs::create_dir_all(dir.path().join("templates/article")).expect("templates dir");
    fs::write(
        dir.path().join("controllers/article_controller.yml"),
        "default_action: show\n",
    )
    .expect("controller definition");
    fs::write(dir.path().join("views/article_view.yml"), "").expect("view definition");
    fs::write(
        dir.path().join("templates/article/show.html"),
        "<h1><%= title %></h1><p><%= body %></p>",
    )
    .expect("template");
    dir
}

fn output_comparison(c: &mut Criterion) {
    let dir = site();
    let binder = Rc::new(Binder::scanned(MvcConfig::new(dir.path())));
    let page = Page::new(1, "article")
        .with_property("title", "Hello")
        .with_property("body", "World")
        .shared();
    let proxy = PageProxy::new(page, binder.clone()).expect("bind");

    let mut group = c.benchmark_group("output");
    group.bench_function("cached", |b| {
        b.iter(|| black_box(proxy.output(black_box(false)).expect("output")))
    });
    group.bench_function("forced", |b| {
        b.iter(|| black_box(proxy.output(black_box(true)).expect("output")))
    });
    group.bench_function("render", |b| {
        b.iter(|| {
            let view = proxy.output(false).expect("output");
            black_box(view.render().expect("render"))
        })
    });
    group.finish();

    let mut group = c.benchmark_group("proxy");
    group.bench_function("construct", |b| {
        b.iter(|| {
            let page = Page::new(2, black_box("article")).shared();
            black_box(PageProxy::new(page, binder.clone()).expect("bind"))
        })
    });
    group.finish();
}

criterion_group!(benches, output_comparison);
criterion_main!(benches);
