//! Narrow interfaces between the trial engine and whatever hosts it.
//!
//! The engine never polls devices, touches the filesystem or loads scenes
//! itself; it calls out through these traits.

use crate::error::{RecordError, StoreError};
use crate::geometry::Vec3;
use crate::trial::{SceneId, TrialRecord};

/// Tracked controller state, sampled by the host each frame.
pub trait ControllerProvider {
    fn right_hand_position(&self) -> Vec3;
    fn primary_button_pressed(&self) -> bool;
}

/// Sink for completed trials. Owns the file or stream lifecycle.
pub trait Recorder {
    fn record(&mut self, record: &TrialRecord) -> Result<(), RecordError>;
}

pub trait SceneTransition {
    /// Called once when the last cycle finishes.
    fn on_sequence_complete(&mut self, scene: &SceneId);
}

pub trait LabelDisplay {
    fn show_label(&mut self, text: &str);

    /// Start object feedback while the timer runs.
    fn show_timer_running(&mut self, _running: bool) {}
}

/// Small persisted key-value store, passed explicitly to whoever needs it.
pub trait KeyValueStore {
    fn get_int(&self, key: &str) -> Option<i64>;
    fn set_int(&mut self, key: &str, value: i64);
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: &str);
    fn has_key(&self, key: &str) -> bool;
    fn delete_key(&mut self, key: &str);
    fn save(&mut self) -> Result<(), StoreError>;
}
