use struct_rs::{factory::declare, value::Value};

use criterion::*;

fn access_benchmark(c: &mut Criterion) {
    let kind = declare(["a", "b", "c", "d", "e", "f", "g", "h"]).unwrap();
    let instance = kind
        .new_instance((0..8).map(Value::Integer).collect::<Vec<_>>())
        .unwrap();
    let by_name = Value::from("g");
    let accessor = kind.accessor("g").unwrap();

    c.bench_function("get by offset", |b| {
        b.iter(|| instance.get(black_box(&Value::Integer(-2))))
    });
    c.bench_function("get by name", |b| {
        b.iter(|| instance.get(black_box(&by_name)))
    });
    c.bench_function("generated getter", |b| {
        b.iter(|| accessor.get(black_box(&instance)))
    });
}

fn construct_benchmark(c: &mut Criterion) {
    let kind = declare(["x", "y", "z"]).unwrap();
    c.bench_function("construct", |b| {
        b.iter(|| kind.new_instance(vec![Value::Integer(1), Value::Integer(2)]))
    });

    let instance = kind
        .new_instance(vec![Value::Integer(1), Value::from("two"), Value::Nil])
        .unwrap();
    c.bench_function("inspect", |b| b.iter(|| instance.inspect()));
}

criterion_group!(benches, access_benchmark, construct_benchmark);
criterion_main!(benches);
