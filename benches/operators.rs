use adops::{
    gradient, hessian, jacobian, lazy_hessian, pullback_function, FiniteDifferences, ForwardDiff,
    HigherOrder, ReverseDiff, Value,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

#[path = "common/mod.rs"]
mod common;
use common::*;

fn bench_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient");
    for n in [2, 10, 100] {
        let x = make_input(n);

        group.bench_with_input(BenchmarkId::new("forward", n), &x, |b, x| {
            b.iter(|| black_box(gradient(&ForwardDiff, &Rosenbrock, black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("reverse", n), &x, |b, x| {
            b.iter(|| black_box(gradient(&ReverseDiff, &Rosenbrock, black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("finite_differences", n), &x, |b, x| {
            let fd = FiniteDifferences::default();
            b.iter(|| black_box(gradient(&fd, &Rosenbrock, black_box(x))))
        });
    }
    group.finish();
}

fn bench_jacobian(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobian");
    for n in [2, 10, 50] {
        let x = make_input(n);

        group.bench_with_input(BenchmarkId::new("forward", n), &x, |b, x| {
            b.iter(|| black_box(jacobian(&ForwardDiff, &Cyclic, black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("reverse", n), &x, |b, x| {
            b.iter(|| black_box(jacobian(&ReverseDiff, &Cyclic, black_box(x))))
        });
    }
    group.finish();
}

fn bench_hessian(c: &mut Criterion) {
    let mut group = c.benchmark_group("hessian");
    for n in [2, 10, 30] {
        let x = make_input(n);

        group.bench_with_input(BenchmarkId::new("forward_over_reverse", n), &x, |b, x| {
            let backend = HigherOrder::new((ForwardDiff, ReverseDiff));
            b.iter(|| black_box(hessian(&backend, &Rosenbrock, black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("reverse_over_forward", n), &x, |b, x| {
            let backend = HigherOrder::new((ReverseDiff, ForwardDiff));
            b.iter(|| black_box(hessian(&backend, &Rosenbrock, black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("forward_over_forward", n), &x, |b, x| {
            let backend = HigherOrder::new((ForwardDiff, ForwardDiff));
            b.iter(|| black_box(hessian(&backend, &Rosenbrock, black_box(x))))
        });
    }
    group.finish();
}

fn bench_products(c: &mut Criterion) {
    let mut group = c.benchmark_group("products");
    for n in [10, 100] {
        let x = make_input(n);
        let v = Value::from_vec(vec![1.0; n]);

        group.bench_with_input(BenchmarkId::new("hvp_lazy", n), &x, |b, x| {
            let backend = HigherOrder::new((ForwardDiff, ReverseDiff));
            let h = lazy_hessian(&backend, &Rosenbrock, x.clone());
            b.iter(|| black_box(&h * black_box(&v)))
        });

        group.bench_with_input(BenchmarkId::new("vjp_reuse_tape", n), &x, |b, x| {
            let pb = pullback_function(&ReverseDiff, &Cyclic, x).unwrap();
            b.iter(|| black_box(pb(black_box(&v))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_gradient,
    bench_jacobian,
    bench_hessian,
    bench_products
);
criterion_main!(benches);
