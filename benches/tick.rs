use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use rv32sim::encode::*;
use rv32sim::hart::Hart;

fn arith_loop() -> Result<Vec<u32>, &'static str> {
    // Increment forever; jal with a non-zero offset never halts
    Ok(vec![addi!(x10, x10, 1), jal!(x0, -4)])
}

fn tick_benchmark(c: &mut Criterion) {
    c.bench_function("tick_arith_loop", |b| {
        let mut hart = Hart::new();
        hart.load_image(&program(&arith_loop().expect("encoding should succeed")));
        b.iter(|| {
            hart.tick();
            black_box(hart.pc());
        });
    });
}

fn hart_new_benchmark(c: &mut Criterion) {
    c.bench_function("hart_new", |b| {
        b.iter(|| black_box(Hart::new()));
    });
}

criterion_group!(benches, tick_benchmark, hart_new_benchmark);
criterion_main!(benches);
