#![allow(dead_code)]

pub use taskroute_test_utils::builders::ConfigFileBuilder;
pub use taskroute_test_utils::{init_tracing, with_timeout, CountingHook, Recorder, RecordingAction};

use std::path::PathBuf;

use taskroute::engine::PendingSet;

pub fn pending(files: &[&str]) -> PendingSet {
    files.iter().map(PathBuf::from).collect()
}

pub fn remaining(set: &PendingSet) -> Vec<String> {
    set.remaining()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect()
}
