//! Keyed reconciliation benchmarks
//!
//! Measures full-list operations against the in-memory host.

use canopy_core::{h, MemNode, MemoryHost, Renderer, VNode};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn rows(ids: impl Iterator<Item = usize>) -> VNode {
    h("tbody")
        .children(ids.map(|id| {
            h("tr")
                .key(id)
                .child(h("td").attr("class", "id").child(id).build().unwrap())
                .child(h("td").child(format!("row {id}")).build().unwrap())
                .build()
                .unwrap()
        }))
        .build()
        .unwrap()
}

fn mounted(size: usize) -> (Renderer<MemoryHost>, MemNode, MemNode) {
    let mut host = MemoryHost::new();
    let root = host.create_root();
    let mut renderer = Renderer::new(host);
    let body = renderer.render(rows(0..size), &root, None).unwrap();
    (renderer, root, body)
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");
    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(mounted(size)));
        });
    }
    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("reverse");
    for size in [100, 1000] {
        let (mut renderer, root, body) = mounted(size);
        let mut flipped = false;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                flipped = !flipped;
                let next = if flipped { rows((0..size).rev()) } else { rows(0..size) };
                black_box(renderer.render(next, &root, Some(&body)).unwrap());
                renderer.host_mut().take_ops();
            });
        });
    }
    group.finish();
}

fn bench_swap_rows(c: &mut Criterion) {
    let size = 1000;
    let (mut renderer, root, body) = mounted(size);
    let mut order: Vec<usize> = (0..size).collect();

    c.bench_function("swap_rows/1000", |b| {
        b.iter(|| {
            order.swap(1, size - 2);
            black_box(renderer.render(rows(order.iter().copied()), &root, Some(&body)).unwrap());
            renderer.host_mut().take_ops();
        });
    });
}

criterion_group!(benches, bench_create, bench_reverse, bench_swap_rows);
criterion_main!(benches);
