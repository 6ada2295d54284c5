use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskroute::engine::{Action, Hook, RunContext, TaskOutput};
use taskroute::rules::RuleMatch;

/// Shared, ordered log of what actions and hooks did.
///
/// Entries look like `"start:src/a.src"`, `"end:src/a.src"`, `"before"`,
/// `"after"`.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == event)
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

/// Action that records `start:<path>` when invoked and `end:<path>` when
/// its future settles.
///
/// `start` is recorded synchronously inside `invoke`, so it reflects the
/// dispatch order; `end` reflects when the work actually finished.
#[derive(Debug, Clone)]
pub struct RecordingAction {
    recorder: Recorder,
    tag: Option<String>,
    delay: Option<Duration>,
    per_path_delay: Vec<(String, Duration)>,
    fail_on: Vec<String>,
}

impl RecordingAction {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            recorder: recorder.clone(),
            tag: None,
            delay: None,
            per_path_delay: Vec::new(),
            fail_on: Vec::new(),
        }
    }

    /// Prefix events with `tag`, e.g. `"start:r1:src/a.src"`.
    pub fn tagged(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_delay_for(mut self, path: &str, delay: Duration) -> Self {
        self.per_path_delay.push((path.to_string(), delay));
        self
    }

    /// Fail (after any delay) for the given path.
    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on.push(path.to_string());
        self
    }

    fn label(&self, kind: &str, path: &str) -> String {
        match &self.tag {
            Some(tag) => format!("{kind}:{tag}:{path}"),
            None => format!("{kind}:{path}"),
        }
    }
}

impl Action for RecordingAction {
    fn invoke(&self, _ctx: &RunContext, rule_match: &RuleMatch) -> TaskOutput {
        let path = rule_match.subject().to_string();
        self.recorder.push(self.label("start", &path));

        let delay = self
            .per_path_delay
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, d)| *d)
            .or(self.delay);
        let fail = self.fail_on.contains(&path);
        let end = self.label("end", &path);
        let recorder = self.recorder.clone();

        TaskOutput::pending(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            recorder.push(end);
            if fail {
                anyhow::bail!("action failed for {path}");
            }
            Ok(())
        })
    }
}

/// Hook that records its name and counts invocations.
#[derive(Debug, Clone)]
pub struct CountingHook {
    name: String,
    recorder: Recorder,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingHook {
    pub fn new(name: &str, recorder: &Recorder) -> Self {
        Self {
            name: name.to_string(),
            recorder: recorder.clone(),
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Shared call counter; clones of the hook share it.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Hook for CountingHook {
    fn call(&self, _ctx: &RunContext) -> TaskOutput {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorder.push(self.name.clone());
        if self.fail {
            TaskOutput::failed(anyhow::anyhow!("{} hook failed", self.name))
        } else {
            TaskOutput::done()
        }
    }
}
