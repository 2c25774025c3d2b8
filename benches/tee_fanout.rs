use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::thread;
use std::time::Duration;

use pullkit::prelude::{Cursor, CursorExt, Yielder, from_iter, start, tee_n};

fn drain_generator(total: u64) -> u64 {
    let mut g = start(move |y: &mut Yielder<u64>| {
        for i in 0..total {
            y.send(i)?;
        }
        Ok(())
    });

    let mut sum = 0;
    while g.next() {
        sum += *g.value();
    }
    sum
}

fn fan_out(total: u64, readers: usize) -> u64 {
    let workers: Vec<_> = tee_n(from_iter(0..total), readers)
        .into_iter()
        .map(|mut c| {
            thread::spawn(move || {
                let mut sum = 0;
                while c.next() {
                    sum += black_box(*c.value());
                }
                sum
            })
        })
        .collect();

    workers.into_iter().map(|w| w.join().unwrap_or(0)).sum()
}

pub fn bench_generator_handoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("generator_handoff");

    for &total in &[1_000_u64, 10_000_u64] {
        group.bench_function(BenchmarkId::from_parameter(total), |b| {
            b.iter(|| black_box(drain_generator(total)));
        });
    }

    group.finish();
}

pub fn bench_tee_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("tee_fanout");

    for &readers in &[1_usize, 4, 16] {
        group.bench_function(BenchmarkId::from_parameter(readers), |b| {
            b.iter(|| black_box(fan_out(100_000, readers)));
        });
    }

    group.bench_function("sequential_pair", |b| {
        b.iter(|| {
            let (l, r) = from_iter(0..100_000_u64).tee();
            black_box(l.to_vec().len() + r.to_vec().len())
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
        .sample_size(12);
    targets = bench_generator_handoff, bench_tee_fanout
}
criterion_main!(benches);
