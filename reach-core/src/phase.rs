use serde::{Deserialize, Serialize};

/// Trial sequencer states
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SequencerPhase {
    #[default]
    Uninitialized,
    Ready,
    TimerRunning,
    SequenceComplete,
    Aborted,
}

impl SequencerPhase {
    /// No further signal changes anything.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SequenceComplete | Self::Aborted)
    }

    pub fn is_timing(&self) -> bool {
        matches!(self, Self::TimerRunning)
    }

    pub fn accepts_signals(&self) -> bool {
        matches!(self, Self::Ready | Self::TimerRunning)
    }
}
