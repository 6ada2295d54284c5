mod common;

use std::time::Duration;

use common::*;
use taskroute::engine::{hook_fn, Hooks, Orchestrator, TaskOutput};
use taskroute::errors::TaskrouteError;
use taskroute::rules::RuleMap;
use taskroute::types::RunOptions;

#[tokio::test]
async fn watch_with_commit_is_fatal_before_anything_runs() {
    let rec = Recorder::new();
    let map = RuleMap::new().with(".", RecordingAction::new(&rec));
    let options = RunOptions {
        watch: true,
        commit: true,
        ..RunOptions::default()
    };
    let orchestrator = Orchestrator::new(&map, options)
        .unwrap()
        .with_hooks(Hooks::new().with_before(CountingHook::new("before", &rec)));

    let mut set = pending(&["a.src", "b.md"]);
    let err = orchestrator.run(&mut set).await.unwrap_err();

    assert!(matches!(err, TaskrouteError::WatchWithCommit));
    assert!(rec.events().is_empty());
    assert_eq!(remaining(&set), vec!["a.src", "b.md"]);
}

#[tokio::test(start_paused = true)]
async fn second_concurrent_run_is_refused() {
    let rec = Recorder::new();
    let slow_before = hook_fn(|_ctx| {
        TaskOutput::pending(async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
    });
    let map = RuleMap::new().with(".", RecordingAction::new(&rec));
    let orchestrator = Orchestrator::new(&map, RunOptions::default())
        .unwrap()
        .with_hooks(Hooks::new().with_before(slow_before));

    let mut first = pending(&["a"]);
    let mut second = pending(&["b"]);
    let (a, b) = tokio::join!(orchestrator.run(&mut first), orchestrator.run(&mut second));

    assert!(a.unwrap().is_success());
    assert!(matches!(b, Err(TaskrouteError::RunInProgress)));
    assert_eq!(remaining(&second), vec!["b"]);

    // Once the first run is over the orchestrator is usable again.
    assert!(orchestrator.run(&mut second).await.unwrap().is_success());
}
