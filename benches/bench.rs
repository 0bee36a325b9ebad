use std::collections::BTreeMap;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;
use tree_table::{Column, Node, Sequence, TreeTable, TreeTableState};

/// Every node below `i / 4`, delivered in reverse so sorting has something to do.
fn generated_nodes(amount: usize) -> Vec<Node<usize, ()>> {
    (0..amount)
        .rev()
        .map(|index| {
            let parent = (index > 0).then(|| (index - 1) / 4);
            Node::new(index, parent, ())
        })
        .collect()
}

fn generated_rows(amount: usize) -> Vec<Node<usize, BTreeMap<String, String>>> {
    generated_nodes(amount)
        .into_iter()
        .map(|node| {
            let mut fields = BTreeMap::new();
            fields.insert("title".to_owned(), format!("Row {}", node.id()));
            fields.insert("depth".to_owned(), node.id().to_string());
            Node::new(*node.id(), node.parent().copied(), fields)
        })
        .collect()
}

fn linearize(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("linearize");

    for amount in [100, 10_000] {
        group.throughput(Throughput::Elements(amount as u64));
        group.bench_function(format!("sort-{amount}"), |bencher| {
            bencher.iter_batched(
                || generated_nodes(amount),
                |nodes| black_box(Sequence::new(black_box(nodes)).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn operations(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("operations");
    group.throughput(Throughput::Elements(1));

    let sequence = Sequence::new(generated_nodes(10_000)).unwrap();

    group.bench_function("collapse-root", |bencher| {
        bencher.iter(|| black_box(sequence.collapse(black_box(&0)).unwrap()));
    });

    let collapsed = sequence.collapse(&1).unwrap();
    group.bench_function("expand", |bencher| {
        bencher.iter(|| black_box(collapsed.expand(black_box(&1)).unwrap()));
    });

    group.bench_function("move", |bencher| {
        bencher.iter(|| black_box(sequence.move_node(black_box(9_000), black_box(10)).unwrap()));
    });

    group.bench_function("combine", |bencher| {
        bencher.iter(|| black_box(sequence.combine(black_box(&9_999), black_box(&2)).unwrap()));
    });

    group.finish();
}

fn renders(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("render");
    group.throughput(Throughput::Elements(1)); // Frames per second

    let buffer_size = Rect::new(0, 0, 100, 100);
    let columns = Column::parse_list("title:Title,depth:Depth");

    let empty = Sequence::<usize, BTreeMap<String, String>>::default();
    group.bench_function("empty", |bencher| {
        bencher.iter_batched(
            TreeTableState::<usize>::default,
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(TreeTable::new(&empty, &columns)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    let sequence = Sequence::new(generated_rows(10_000)).unwrap();
    group.bench_function("generated", |bencher| {
        bencher.iter_batched(
            || {
                let mut state = TreeTableState::default();
                state.select(Some(5_000));
                state
            },
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(TreeTable::new(&sequence, &columns)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Create flamegraphs with `cargo bench --bench bench -- --profile-time=5`
#[cfg(unix)]
fn profiled() -> Criterion {
    use pprof::criterion::{Output, PProfProfiler};
    Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}
#[cfg(not(unix))]
fn profiled() -> Criterion {
    Criterion::default()
}

criterion_group! {
    name = benches;
    config = profiled();
    targets = linearize, operations, renders
}
criterion_main!(benches);
