#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use metricflow_agent::{config, MetricRegistry};
use metricflow_core::{MetricKind, MetricValue};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
flusher:
  output: "metrics.log"
  intervall_ms: 500 # typo should fail
metrics:
  - name: "CPU"
    kind: floating
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
metrics:
  - name: "RPS"
    kind: integral
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.flusher.output, "metrics.log");
    assert_eq!(cfg.flusher.interval_ms, 1000);
    assert_eq!(cfg.metrics[0].kind, MetricKind::Integral);
}

#[test]
fn rejects_unknown_version() {
    let bad = r#"
version: 2
metrics:
  - name: "RPS"
    kind: integral
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_bad_metric_declarations() {
    let cases = [
        // empty list
        "version: 1\nmetrics: []\n",
        // duplicate name
        "version: 1\nmetrics:\n  - { name: a, kind: integral }\n  - { name: a, kind: floating }\n",
        // precision on an integer
        "version: 1\nmetrics:\n  - { name: a, kind: integral, precision: 2 }\n",
        // unknown kind
        "version: 1\nmetrics:\n  - { name: a, kind: histogram }\n",
    ];
    for yaml in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(err.kind().as_str(), "BAD_CONFIG", "{yaml}");
    }
}

#[test]
fn rejects_out_of_range_interval() {
    let bad = r#"
version: 1
flusher: { interval_ms: 0 }
metrics:
  - { name: a, kind: integral }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "INVALID_INTERVAL");
}

#[test]
fn apply_registers_with_precision() {
    let cfg = config::load_from_str(
        r#"
version: 1
metrics:
  - name: "CPU"
    kind: floating
    precision: 2
  - name: "HTTP requests RPS"
    kind: integral
"#,
    )
    .expect("must parse");

    let registry = MetricRegistry::new();
    config::apply(&cfg, &registry).expect("apply");
    registry.add("CPU", 1.0);
    registry.add("HTTP requests RPS", 3);

    assert_eq!(registry.value_of("HTTP requests RPS"), Some(MetricValue::Integral(3)));
    let rec = registry.snapshot_all();
    assert_eq!(rec.get("CPU"), Some("1.00"));
    assert_eq!(rec.get("HTTP requests RPS"), Some("3"));
}
