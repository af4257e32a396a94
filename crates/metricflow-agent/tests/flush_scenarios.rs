#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use metricflow_agent::{FileSink, MemorySink, MetricRegistry, PeriodicFlusher};
use metricflow_core::{fixed_precision, ErrorKind, MetricKind, MetricsError};

fn rps_cpu_registry() -> MetricRegistry {
    let registry = MetricRegistry::new();
    registry.register("RPS", MetricKind::Integral).unwrap();
    registry.register_floating("CPU", Some(fixed_precision(2))).unwrap();
    registry
}

#[test]
fn flush_writes_sums_then_zeroes() {
    let registry = rps_cpu_registry();
    for v in [10, 20, 12] {
        registry.add("RPS", v);
    }
    registry.add("CPU", 1.005);
    registry.add("CPU", 2.005);

    let sink = MemorySink::new();
    registry.flush_all(&sink).unwrap();
    registry.flush_all(&sink).unwrap();

    let records = sink.records();
    let first = records[0].to_line();
    assert!(first.contains("\"RPS\" 42"), "{first}");
    assert!(first.contains("\"CPU\" 3.01"), "{first}");

    let second = records[1].to_line();
    assert!(second.contains("\"RPS\" 0"), "{second}");
    assert!(second.contains("\"CPU\" 0.00"), "{second}");
}

#[test]
fn unregistered_name_never_shows_up() {
    let registry = rps_cpu_registry();
    registry.add("ghost", 5);

    let sink = MemorySink::new();
    registry.flush_all(&sink).unwrap();

    let line = sink.records()[0].to_line();
    assert!(!line.contains("ghost"));
    assert_eq!(sink.records()[0].entries.len(), 2);
}

#[test]
fn reregistration_rules() {
    let registry = rps_cpu_registry();
    registry.register("RPS", MetricKind::Integral).expect("same kind is a no-op");
    let err = registry.register("RPS", MetricKind::Floating).expect_err("kind conflict");
    assert_eq!(err.kind(), ErrorKind::DuplicateMetricTypeConflict);
}

#[test]
fn sink_failure_still_resets_values() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let hook_seen = Arc::clone(&seen);
    let registry = MetricRegistry::with_diagnostics(Arc::new(move |e: &MetricsError| {
        hook_seen.lock().unwrap().push(e.kind());
    }));
    registry.register("RPS", MetricKind::Integral).unwrap();
    registry.add("RPS", 7);

    let dir = tempfile::tempdir().unwrap();
    let broken = FileSink::new(dir.path().join("no-such-dir").join("metrics.log"));
    let err = registry.flush_all(&broken).expect_err("unwritable");
    assert_eq!(err.kind(), ErrorKind::SinkWriteFailure);
    assert_eq!(*seen.lock().unwrap(), vec![ErrorKind::SinkWriteFailure]);

    let rec = registry.snapshot_all();
    assert_eq!(rec.get("RPS"), Some("0"));
}

#[test]
fn concurrent_adds_and_flushes_account_for_everything() {
    let registry = Arc::new(rps_cpu_registry());
    let sink = Arc::new(MemorySink::new());
    let writers = 8;
    let per_writer = 20_000;

    let handles: Vec<_> = (0..writers)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..per_writer {
                    registry.add("RPS", 1);
                    registry.add("CPU", 0.25);
                }
            })
        })
        .collect();

    let flusher_registry = Arc::clone(&registry);
    let flusher_sink = Arc::clone(&sink);
    let flusher = thread::spawn(move || {
        for _ in 0..200 {
            flusher_registry.flush_all(flusher_sink.as_ref()).unwrap();
        }
    });

    for h in handles {
        h.join().unwrap();
    }
    flusher.join().unwrap();
    registry.flush_all(sink.as_ref()).unwrap();

    let mut rps = 0_i64;
    let mut cpu = 0.0_f64;
    for rec in sink.records() {
        rps += rec.get("RPS").unwrap().parse::<i64>().unwrap();
        cpu += rec.get("CPU").unwrap().parse::<f64>().unwrap();
    }
    assert_eq!(rps, (writers * per_writer) as i64);
    // 0.25 steps are exact, and two decimals render them without loss.
    assert_eq!(cpu, (writers * per_writer) as f64 * 0.25);
}

#[test]
fn periodic_flusher_appends_lines_to_file() {
    let registry = Arc::new(rps_cpu_registry());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.log");

    let mut flusher = PeriodicFlusher::new(Arc::clone(&registry), Arc::new(FileSink::new(&path)))
        .flush_on_stop(true);
    flusher.start(Duration::from_millis(20)).unwrap();
    registry.add("RPS", 4);
    thread::sleep(Duration::from_millis(120));
    flusher.stop();

    let body = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert!(lines.len() >= 3, "{body}");
    for line in &lines {
        assert!(line.starts_with('['));
        assert!(line.contains("\"CPU\" "));
        assert!(line.contains("\"RPS\" "));
    }

    let total: i64 = lines
        .iter()
        .map(|l| {
            let tail = l.split("\"RPS\" ").nth(1).unwrap();
            tail.split_whitespace().next().unwrap().parse::<i64>().unwrap()
        })
        .sum();
    assert_eq!(total, 4);
}

#[test]
fn dropping_a_running_flusher_stops_it() {
    let registry = Arc::new(rps_cpu_registry());
    let sink = Arc::new(MemorySink::new());
    {
        let mut flusher = PeriodicFlusher::new(Arc::clone(&registry), sink.clone());
        flusher.start(Duration::from_secs(3600)).unwrap();
    }
    // Worker joined and flusher dropped; only this handle is left.
    assert_eq!(Arc::strong_count(&registry), 1);
    assert_eq!(sink.len(), 1);
}
