use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Local, TimeZone};
use reach_core::{SceneId, TrialRecord, Vec3};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh path under the system temp dir; the file itself is not created.
pub fn temp_path(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("reach-record-{}-{n}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

pub fn record(cycle: usize, label: &str) -> TrialRecord {
    TrialRecord {
        cycle,
        trial_index: 2,
        scene: SceneId::new(1, "Pointing"),
        timestamp: Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
        elapsed_secs: 1.23456,
        controller_position: Vec3::new(0.1, 1.2, -0.3),
        target_label: label.to_string(),
        target_position: Vec3::new(0.25, 1.0, 0.125),
        start_object_position: None,
        first_touch_position: None,
        subregion: None,
    }
}
