use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rustheat::config::{Config, RunOptions};
use rustheat::heat_mpi::Heat2DMpi;
use rustheat::mpi::{SerialComm, ThreadComm};

const SIZES: [usize; 3] = [128, 256, 512];

fn config(n: usize, px: usize, py: usize) -> Config {
    let input = format!("{} {}\n0 1 0 1\n0 1\n1.0\n{} {}\n", n, n, px, py);
    Config::parse(&input, RunOptions::default()).unwrap()
}

pub fn bench_forward_euler(c: &mut Criterion) {
    let mut group = c.benchmark_group("ForwardEuler");
    group.significance_level(0.1).sample_size(10);
    for n in SIZES.iter() {
        let config = config(*n, 1, 1);
        let comm = SerialComm;
        let mut heat = Heat2DMpi::new(&comm, &config).unwrap();
        group.bench_function(BenchmarkId::new("1x1", *n), |b| {
            b.iter(|| heat.forward_euler())
        });
    }
    group.finish();
}

pub fn bench_forward_euler_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("ForwardEulerThreads");
    group.significance_level(0.1).sample_size(10);
    for n in SIZES.iter() {
        let config = config(*n, 2, 2);
        // includes thread start up, 10 steps per sample
        group.bench_function(BenchmarkId::new("2x2", *n), |b| {
            b.iter(|| {
                ThreadComm::run(4, |comm| {
                    let mut heat = Heat2DMpi::new(comm, &config).unwrap();
                    for _ in 0..10 {
                        heat.forward_euler();
                    }
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forward_euler, bench_forward_euler_threads);
criterion_main!(benches);
