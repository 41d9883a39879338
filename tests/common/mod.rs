//! Scaffolding for struct kind tests

use struct_rs::{Instance, Kind, value::Value};

/// Route `tracing` output through the test harness. Safe to call from every
/// test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Integer).collect()
}

pub fn instance_of(kind: &Kind, values: &[i64]) -> Instance {
    kind.new_instance(ints(values))
        .unwrap_or_else(|e| panic!("failed to construct {kind}: {e}"))
}
