use reach_core::Vec3;

/// A trial between timer start and confirmation. Never logged unless finished.
#[derive(Debug, Clone)]
pub struct Trial {
    pub cycle: usize,
    pub trial_index: usize,
    pub target_label: String,
    pub target_position: Vec3,
    /// Monotonic nanoseconds.
    pub started_at: u64,
    pub first_touch_position: Option<Vec3>,
}
