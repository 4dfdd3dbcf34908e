// tests/dispatcher_scenarios.rs
//
// End-to-end runs against real processes (`sh`, `sleep`, `seq`).

mod common;
use crate::common::builders::JobBuilder;
use crate::common::{RecordingHandlers, assert_serialized, init_tracing, with_timeout};

use std::error::Error;
use std::time::{Duration, Instant};

use gcmd::engine::Dispatcher;
use gcmd::errors::{GcmdError, NodeErrorKind};
use gcmd::types::NodeStatus;

type TestResult = Result<(), Box<dyn Error>>;

/// Three nodes, two at a time, each printing `hello <node>`.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn hello_on_three_nodes_with_bound_two() -> TestResult {
    init_tracing();

    let job = JobBuilder::shell("echo hello $0")
        .nodes(&["a", "b", "c"])
        .maxflight(2)
        .build();
    let recorder = RecordingHandlers::new();

    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    for node in ["a", "b", "c"] {
        assert_eq!(recorder.stdout_lines(node), vec![format!("hello {node}")]);
        assert!(recorder.stderr_lines(node).is_empty());
        assert_eq!(recorder.exit_code(node), Some(0));
        assert_eq!(recorder.terminal_reports(node).len(), 1);
        assert_eq!(report.status(node), Some(&NodeStatus::Exited(0)));
    }
    assert_eq!(report.len(), 3);
    assert!(report.all_succeeded());

    Ok(())
}

/// A missing executable fails that node only, and `run` still returns.
#[tokio::test]
async fn missing_executable_reports_process_start_error() -> TestResult {
    init_tracing();

    let job = JobBuilder::new("/nonexistent/gcmd-no-such-program")
        .arg("__NODE__")
        .node("x")
        .build();
    let recorder = RecordingHandlers::new();

    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    assert_eq!(recorder.line_count(), 0);
    let errors = recorder.errors("x");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, NodeErrorKind::ProcessStart);
    assert_eq!(recorder.exit_code("x"), None);

    let status = report.status("x").expect("x must be in the report");
    assert_eq!(status.failure_kind(), Some(NodeErrorKind::ProcessStart));

    Ok(())
}

/// With a bound of one, no two invocations ever run at the same time.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bound_of_one_serializes_invocations() -> TestResult {
    init_tracing();

    let nodes = ["n1", "n2", "n3", "n4", "n5"];
    let job = JobBuilder::shell("echo start; sleep 0.1")
        .nodes(&nodes)
        .maxflight(1)
        .build();
    let recorder = RecordingHandlers::new();

    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;
    assert!(report.all_succeeded());

    // Interval per node: its "start" line until its exit report.
    let calls = recorder.timed_calls();
    let mut intervals = Vec::new();
    for node in nodes {
        let start = calls
            .iter()
            .find(|(_, c)| c.node() == node && !c.is_terminal())
            .map(|(t, _)| *t)
            .expect("start line");
        let end = calls
            .iter()
            .find(|(_, c)| c.node() == node && c.is_terminal())
            .map(|(t, _)| *t)
            .expect("exit report");
        intervals.push((start, end));
    }
    assert_serialized(intervals);

    Ok(())
}

/// A bound of zero is rejected before anything runs.
#[tokio::test]
async fn zero_bound_is_a_configuration_error() -> TestResult {
    init_tracing();

    let job = JobBuilder::shell("echo should-not-run")
        .nodes(&["a", "b"])
        .maxflight(0)
        .build();
    let recorder = RecordingHandlers::new();

    let result = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await;

    match result {
        Err(GcmdError::ConfigError(msg)) => assert!(msg.contains("maxflight")),
        other => panic!("expected ConfigError, got {:?}", other),
    }
    assert!(recorder.is_empty(), "no handler may be called");

    Ok(())
}

#[tokio::test]
async fn empty_node_list_is_a_configuration_error() -> TestResult {
    let job = JobBuilder::shell("true").build();
    let result = Dispatcher::new(job).run(RecordingHandlers::new().handlers()).await;

    assert!(matches!(result, Err(GcmdError::ConfigError(_))));
    Ok(())
}

#[tokio::test]
async fn stderr_lines_come_from_stderr() -> TestResult {
    init_tracing();

    let job = JobBuilder::shell("echo out-$0; echo err-$0 >&2; echo out2-$0")
        .node("x")
        .build();
    let recorder = RecordingHandlers::new();

    with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    assert_eq!(recorder.stdout_lines("x"), vec!["out-x", "out2-x"]);
    assert_eq!(recorder.stderr_lines("x"), vec!["err-x"]);

    Ok(())
}

/// Nonzero exit is an exit, not an error.
#[tokio::test]
async fn nonzero_exit_is_reported_through_on_exit() -> TestResult {
    init_tracing();

    let job = JobBuilder::shell("exit 3").nodes(&["a", "b"]).build();
    let recorder = RecordingHandlers::new();

    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    assert_eq!(recorder.exit_code("a"), Some(3));
    assert!(recorder.errors("a").is_empty());
    assert_eq!(report.status("b"), Some(&NodeStatus::Exited(3)));
    assert!(!report.all_succeeded());
    assert_eq!(report.unsuccessful().count(), 2);

    Ok(())
}

/// Output larger than a pipe buffer on both streams must not deadlock, and
/// every line arrives in order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn large_output_on_both_streams_is_fully_drained() -> TestResult {
    init_tracing();

    let job = JobBuilder::shell("seq 1 20000; seq 1 20000 >&2")
        .nodes(&["big1", "big2"])
        .maxflight(2)
        .build();
    let recorder = RecordingHandlers::new();

    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;
    assert!(report.all_succeeded());

    for node in ["big1", "big2"] {
        let out = recorder.stdout_lines(node);
        let err = recorder.stderr_lines(node);
        assert_eq!(out.len(), 20000);
        assert_eq!(err.len(), 20000);
        assert_eq!(out.first().map(String::as_str), Some("1"));
        assert_eq!(out.last().map(String::as_str), Some("20000"));
        assert_eq!(err.last().map(String::as_str), Some("20000"));
    }

    Ok(())
}

/// The timeout kills the process and reports `Timeout` instead of an exit.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timeout_kills_the_process() -> TestResult {
    init_tracing();

    let job = JobBuilder::new("sleep")
        .arg("5")
        .nodes(&["slow"])
        .timeout(Duration::from_millis(200))
        .build();
    let recorder = RecordingHandlers::new();

    let started = Instant::now();
    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    assert!(started.elapsed() < Duration::from_secs(3), "timeout was not enforced");
    assert_eq!(
        report.status("slow").and_then(NodeStatus::failure_kind),
        Some(NodeErrorKind::Timeout)
    );
    assert_eq!(recorder.exit_code("slow"), None);
    assert_eq!(recorder.terminal_reports("slow").len(), 1);

    Ok(())
}

/// A timed-out process whose child keeps the pipes open still finishes
/// after the drain grace.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timeout_with_inherited_pipes_finishes_after_grace() -> TestResult {
    init_tracing();

    let job = JobBuilder::shell("echo before; sleep 5 & wait")
        .node("orphan")
        .timeout(Duration::from_millis(200))
        .drain_grace(Duration::from_millis(200))
        .build();
    let recorder = RecordingHandlers::new();

    let started = Instant::now();
    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(recorder.stdout_lines("orphan"), vec!["before"]);
    assert_eq!(
        report.status("orphan").and_then(NodeStatus::failure_kind),
        Some(NodeErrorKind::Timeout)
    );

    Ok(())
}

/// Fast nodes are not held back by a slow one beyond the gate.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timeout_on_one_node_does_not_affect_others() -> TestResult {
    init_tracing();

    let job = JobBuilder::shell("if [ \"$0\" = slow ]; then sleep 5; else echo ok; fi")
        .nodes(&["fast1", "slow", "fast2"])
        .maxflight(3)
        .timeout(Duration::from_millis(500))
        .build();
    let recorder = RecordingHandlers::new();

    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    assert_eq!(report.status("fast1"), Some(&NodeStatus::Exited(0)));
    assert_eq!(report.status("fast2"), Some(&NodeStatus::Exited(0)));
    assert_eq!(
        report.status("slow").and_then(NodeStatus::failure_kind),
        Some(NodeErrorKind::Timeout)
    );
    assert_eq!(recorder.stdout_lines("fast2"), vec!["ok"]);

    Ok(())
}

/// The same node listed twice runs twice.
#[tokio::test]
async fn duplicate_nodes_are_independent_invocations() -> TestResult {
    init_tracing();

    let job = JobBuilder::shell("echo hi $0").nodes(&["a", "a"]).build();
    let recorder = RecordingHandlers::new();

    let report = with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    assert_eq!(report.len(), 2);
    assert_eq!(report.statuses("a").len(), 2);
    assert_eq!(recorder.stdout_lines("a"), vec!["hi a", "hi a"]);
    assert_eq!(recorder.terminal_reports("a").len(), 2);

    Ok(())
}

/// A custom marker is substituted instead of `__NODE__`.
#[tokio::test]
async fn custom_marker_is_substituted() -> TestResult {
    init_tracing();

    let job = JobBuilder::new("echo")
        .arg("host={}")
        .arg("__NODE__")
        .marker("{}")
        .node("web1")
        .build();
    let recorder = RecordingHandlers::new();

    with_timeout(Dispatcher::new(job).run(recorder.handlers())).await?;

    assert_eq!(recorder.stdout_lines("web1"), vec!["host=web1 __NODE__"]);

    Ok(())
}
