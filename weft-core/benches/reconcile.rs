//! Reconcile benchmarks: sequence re-emission and keyed reorder.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use weft_core::{Arg, Document, Emission, Key, State, Value};

fn bench_sequence_reemit(c: &mut Criterion) {
    let doc = Document::new();
    let slot = State::new(Emission::sequence((0..256).map(Value::from)));
    let view = doc.create_element("div", [Arg::from(slot.stream())]);

    c.bench_function("sequence_reemit_256", |b| {
        b.iter(|| {
            slot.set(Emission::sequence((0..256).map(|n| Value::from(black_box(n)))));
        })
    });

    view.teardown();
}

fn bench_keyed_reverse(c: &mut Criterion) {
    let doc = Document::new();
    let forward: Vec<(Key, Value)> = (0..256)
        .map(|n| (Key::from(n as i64), Value::from(n)))
        .collect();
    let mut reversed = forward.clone();
    reversed.reverse();

    let slot = State::new(Emission::keyed(forward.clone()));
    let view = doc.create_element("ul", [Arg::from(slot.stream())]);

    c.bench_function("keyed_reverse_256", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let pairs = if flip { reversed.clone() } else { forward.clone() };
            slot.set(Emission::keyed(pairs));
        })
    });

    view.teardown();
}

criterion_group!(benches, bench_sequence_reemit, bench_keyed_reverse);
criterion_main!(benches);
