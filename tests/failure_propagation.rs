mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::*;
use taskroute::engine::{action_fn, Hooks, Orchestrator};
use taskroute::errors::{HookKind, TaskrouteError};
use taskroute::rules::RuleMap;
use taskroute::types::RunOptions;

#[tokio::test]
async fn failing_action_is_reported_and_after_is_skipped() {
    let rec = Recorder::new();
    let after = CountingHook::new("after", &rec);
    let after_calls = after.calls();
    let map = RuleMap::new().with(".", RecordingAction::new(&rec).failing_on("b.src"));
    let orchestrator = Orchestrator::new(&map, RunOptions::default())
        .unwrap()
        .with_hooks(Hooks::new().with_after(after));

    let mut set = pending(&["a.src", "b.src", "c.src"]);
    let report = orchestrator.run(&mut set).await.unwrap();

    assert!(!report.is_success());
    match report.failure {
        Some(TaskrouteError::ActionFailed { ref path, ref message }) => {
            assert_eq!(path, "b.src");
            assert!(message.contains("action failed for b.src"));
        }
        ref other => panic!("unexpected failure: {other:?}"),
    }
    assert_eq!(after_calls.load(Ordering::SeqCst), 0);
    // Every matched file was still dispatched and consumed.
    assert_eq!(report.dispatched.len(), 3);
    assert!(set.is_exhausted());
}

#[tokio::test(start_paused = true)]
async fn first_failure_in_discovery_order_wins() {
    let rec = Recorder::new();
    let map = RuleMap::new().with(
        ".",
        RecordingAction::new(&rec)
            .failing_on("a")
            .failing_on("b")
            .with_delay_for("a", Duration::from_millis(200))
            .with_delay_for("b", Duration::from_millis(10)),
    );
    let orchestrator = Orchestrator::new(&map, RunOptions::default()).unwrap();

    let report = orchestrator.run(&mut pending(&["a", "b"])).await.unwrap();

    assert!(matches!(
        report.failure,
        Some(TaskrouteError::ActionFailed { ref path, .. }) if path == "a"
    ));
}

#[tokio::test]
async fn synchronous_failure_is_normalised_like_a_rejected_future() {
    let map = RuleMap::new().with(
        ".",
        action_fn(|_ctx, _m| anyhow::Result::<()>::Err(anyhow::anyhow!("boom")).into()),
    );
    let orchestrator = Orchestrator::new(&map, RunOptions::default()).unwrap();

    let err = orchestrator
        .run(&mut pending(&["x"]))
        .await
        .unwrap()
        .into_result()
        .unwrap_err();

    assert!(matches!(err, TaskrouteError::ActionFailed { .. }));
}

#[tokio::test]
async fn failing_before_is_fatal_and_nothing_is_dispatched() {
    let rec = Recorder::new();
    let map = RuleMap::new().with(".", RecordingAction::new(&rec));
    let orchestrator = Orchestrator::new(&map, RunOptions::default())
        .unwrap()
        .with_hooks(
            Hooks::new()
                .with_before(CountingHook::new("before", &rec).failing())
                .with_after(CountingHook::new("after", &rec)),
        );

    let mut set = pending(&["a", "b"]);
    let err = orchestrator.run(&mut set).await.unwrap_err();

    assert!(matches!(
        err,
        TaskrouteError::HookFailed {
            hook: HookKind::Before,
            ..
        }
    ));
    assert_eq!(rec.events(), vec!["before"]);
    assert_eq!(set.remaining_count(), 2);
}

#[tokio::test]
async fn failing_after_is_reported() {
    let rec = Recorder::new();
    let map = RuleMap::new().with(".", RecordingAction::new(&rec));
    let orchestrator = Orchestrator::new(&map, RunOptions::default())
        .unwrap()
        .with_hooks(Hooks::new().with_after(CountingHook::new("after", &rec).failing()));

    let report = orchestrator.run(&mut pending(&["a"])).await.unwrap();

    assert!(matches!(
        report.failure,
        Some(TaskrouteError::HookFailed {
            hook: HookKind::After,
            ..
        })
    ));
}

#[tokio::test]
async fn panicking_action_is_reported_not_propagated() {
    let map = RuleMap::new().with(
        ".",
        action_fn(|_ctx, _m| {
            taskroute::engine::TaskOutput::pending(async {
                let boom = true;
                if boom {
                    panic!("action panicked");
                }
                Ok(())
            })
        }),
    );
    let orchestrator = Orchestrator::new(&map, RunOptions::default()).unwrap();

    let report = orchestrator.run(&mut pending(&["p"])).await.unwrap();

    assert!(matches!(
        report.failure,
        Some(TaskrouteError::ActionPanicked { .. })
    ));
}
