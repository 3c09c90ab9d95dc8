use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reach_core::{RecordError, Recorder, TrialRecord};

/// Keeps records in memory. Clones share storage, so a handle kept by the
/// host sees what the sequencer recorded.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    records: Rc<RefCell<Vec<TrialRecord>>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TrialRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Makes every following `record` call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl Recorder for MemoryRecorder {
    fn record(&mut self, record: &TrialRecord) -> Result<(), RecordError> {
        if self.failing.get() {
            return Err(RecordError::Format("recorder set to fail".into()));
        }
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }
}

/// Sends each record to every inner recorder; reports the first failure.
#[derive(Default)]
pub struct FanoutRecorder {
    inner: Vec<Box<dyn Recorder>>,
}

impl FanoutRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, recorder: impl Recorder + 'static) -> Self {
        self.inner.push(Box::new(recorder));
        self
    }
}

impl Recorder for FanoutRecorder {
    fn record(&mut self, record: &TrialRecord) -> Result<(), RecordError> {
        let mut first_err = None;
        for recorder in &mut self.inner {
            if let Err(err) = recorder.record(record) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::record;

    #[test]
    fn clones_share_storage() {
        let handle = MemoryRecorder::new();
        let mut sink = handle.clone();
        sink.record(&record(0, "Ant")).unwrap();
        assert_eq!(handle.len(), 1);
        handle.set_failing(true);
        assert!(sink.record(&record(0, "Bee")).is_err());
        assert_eq!(handle.records()[0].target_label, "Ant");
    }

    #[test]
    fn fanout_reaches_all_despite_failure() {
        let broken = MemoryRecorder::new();
        broken.set_failing(true);
        let healthy = MemoryRecorder::new();
        let mut fanout = FanoutRecorder::new().with(broken).with(healthy.clone());
        assert!(fanout.record(&record(0, "Ant")).is_err());
        assert_eq!(healthy.len(), 1);
    }
}
