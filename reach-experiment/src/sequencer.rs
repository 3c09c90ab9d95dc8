//! Trial sequencing: which target is asked for, when the timer runs, and
//! when the scene is done.
//!
//! The sequencer is driven by discrete host signals, one at a time:
//!
//! - `on_interaction_start` / `on_interaction_end` come from grabbing and
//!   releasing the start object. Releasing starts the timer.
//! - `poll_confirm_button` is fed the primary button state every frame.
//!   Only a release-then-press edge confirms, so a held button finishes at
//!   most one trial.
//!
//! Every finished trial goes to the recorder. After the last label of the
//! last cycle the scene-transition hook fires exactly once.

use reach_core::{
    BoundingVolume, ControllerProvider, LabelDisplay, RecordError, Recorder, SceneId,
    SceneTransition, SequencerPhase, Subdivision, Target, TrialRecord, Vec3,
};
use reach_timing::Clock;

use crate::error::SequencerError;
use crate::names::shuffle;
use crate::random::RandomSource;
use crate::trial::Trial;

/// Host-side collaborators the sequencer calls into.
pub struct Hooks {
    pub controller: Box<dyn ControllerProvider>,
    pub recorder: Box<dyn Recorder>,
    pub scene: Box<dyn SceneTransition>,
    pub display: Box<dyn LabelDisplay>,
}

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// With the gated start policy a value of 0 never starts a trial.
    pub max_cycles: usize,
    pub scene: SceneId,
    pub start_object_position: Option<Vec3>,
    pub subregions: Option<(BoundingVolume, Subdivision)>,
}

impl SequencerConfig {
    pub fn new(max_cycles: usize, scene: SceneId) -> Self {
        Self {
            max_cycles,
            scene,
            start_object_position: None,
            subregions: None,
        }
    }

    pub fn with_start_object(mut self, position: Vec3) -> Self {
        self.start_object_position = Some(position);
        self
    }

    pub fn with_subregions(mut self, volume: BoundingVolume, subdivision: Subdivision) -> Self {
        self.subregions = Some((volume, subdivision));
        self
    }
}

/// Result of a confirmed trial.
#[derive(Debug)]
pub struct TrialOutcome {
    pub record: TrialRecord,
    /// Set when the recorder failed. The sequence carries on regardless.
    pub recorder_error: Option<RecordError>,
    pub sequence_complete: bool,
}

pub struct TrialSequencer<C: Clock, R: RandomSource> {
    config: SequencerConfig,
    clock: C,
    rng: R,
    hooks: Hooks,
    phase: SequencerPhase,
    targets: Vec<Target>,
    index: usize,
    cycle: usize,
    current: Option<Trial>,
    first_touch: Option<Vec3>,
    button_released: bool,
}

impl<C: Clock, R: RandomSource> TrialSequencer<C, R> {
    pub fn new(config: SequencerConfig, clock: C, rng: R, hooks: Hooks) -> Self {
        Self {
            config,
            clock,
            rng,
            hooks,
            phase: SequencerPhase::Uninitialized,
            targets: Vec::new(),
            index: 0,
            cycle: 0,
            current: None,
            first_touch: None,
            button_released: false,
        }
    }

    /// Binds the named targets in their already shuffled order.
    pub fn initialize(&mut self, targets: Vec<Target>) -> Result<(), SequencerError> {
        if self.phase != SequencerPhase::Uninitialized {
            return Err(SequencerError::InvalidTransition {
                action: "initialize",
                phase: self.phase,
            });
        }
        if targets.is_empty() {
            return Err(SequencerError::InvalidTargets("no targets".into()));
        }
        for (i, target) in targets.iter().enumerate() {
            if targets[..i].iter().any(|t| t.label == target.label) {
                return Err(SequencerError::InvalidTargets(format!(
                    "duplicate label {:?}",
                    target.label
                )));
            }
        }
        self.targets = targets;
        self.index = 0;
        self.cycle = 0;
        self.phase = SequencerPhase::Ready;
        let label = self.current_target().label.clone();
        self.hooks.display.show_label(&label);
        log::info!(
            "sequencer ready in scene {:?} with {} targets, {} cycles",
            self.config.scene.name,
            self.targets.len(),
            self.config.max_cycles
        );
        Ok(())
    }

    /// Start object grabbed.
    pub fn on_interaction_start(&mut self) {
        if !self.phase.accepts_signals() {
            return;
        }
        self.button_released = false;
        let position = self.hooks.controller.right_hand_position();
        log::debug!("first touch at {position:?}");
        self.first_touch = Some(position);
    }

    /// Start object released. Returns true when this started the timer.
    pub fn on_interaction_end(&mut self) -> bool {
        if self.phase != SequencerPhase::Ready || self.cycle >= self.config.max_cycles {
            return false;
        }
        let (target_label, target_position) = {
            let target = self.current_target();
            (target.label.clone(), target.position())
        };
        let trial = Trial {
            cycle: self.cycle,
            trial_index: self.index,
            target_label,
            target_position,
            started_at: self.clock.now(),
            first_touch_position: self.first_touch.take(),
        };
        log::info!(
            "timer started: cycle {} trial {} target {}",
            trial.cycle,
            trial.trial_index,
            trial.target_label
        );
        self.current = Some(trial);
        self.phase = SequencerPhase::TimerRunning;
        // a button held through the release must be let go before it counts
        self.button_released = false;
        self.hooks.display.show_timer_running(true);
        true
    }

    /// Feeds this frame's confirm button state through the edge latch.
    pub fn poll_confirm_button(&mut self, pressed: bool) -> Option<TrialOutcome> {
        if !pressed {
            self.button_released = true;
            return None;
        }
        if !self.button_released {
            return None;
        }
        self.button_released = false;
        self.on_confirm_signal()
    }

    /// Samples the controller hook and polls the confirm edge.
    pub fn poll(&mut self) -> Option<TrialOutcome> {
        let pressed = self.hooks.controller.primary_button_pressed();
        self.poll_confirm_button(pressed)
    }

    /// A confirmed press edge. Only does anything while the timer runs.
    pub fn on_confirm_signal(&mut self) -> Option<TrialOutcome> {
        if self.phase != SequencerPhase::TimerRunning {
            return None;
        }
        let trial = self.current.take()?;
        let elapsed = self.clock.elapsed(trial.started_at);
        self.hooks.display.show_timer_running(false);

        let subregion = self
            .config
            .subregions
            .and_then(|(volume, sub)| volume.subregion_index(trial.target_position, sub));
        let record = TrialRecord {
            cycle: trial.cycle,
            trial_index: trial.trial_index,
            scene: self.config.scene.clone(),
            timestamp: self.clock.wall_clock_now(),
            elapsed_secs: elapsed.as_secs_f64(),
            controller_position: self.hooks.controller.right_hand_position(),
            target_label: trial.target_label,
            target_position: trial.target_position,
            start_object_position: self.config.start_object_position,
            first_touch_position: trial.first_touch_position,
            subregion,
        };
        log::info!(
            "timer stopped: {} in {:.3}s",
            record.target_label,
            record.elapsed_secs
        );

        let recorder_error = self.hooks.recorder.record(&record).err();
        if let Some(err) = &recorder_error {
            log::warn!("failed to record trial, continuing: {err}");
        }

        let sequence_complete = self.advance();
        Some(TrialOutcome {
            record,
            recorder_error,
            sequence_complete,
        })
    }

    /// Moves to the next target. Returns true when the sequence is done.
    fn advance(&mut self) -> bool {
        let previous = self.current_target().label.clone();
        self.phase = SequencerPhase::Ready;
        self.index += 1;
        if self.index == self.targets.len() {
            self.index = 0;
            self.cycle += 1;
            if self.cycle >= self.config.max_cycles {
                self.phase = SequencerPhase::SequenceComplete;
                log::info!("max cycles reached, requesting scene transition");
                self.hooks.scene.on_sequence_complete(&self.config.scene);
                return true;
            }
            shuffle(&mut self.targets, &mut self.rng);
            log::debug!("cycle {} order: {:?}", self.cycle, self.labels());
        }
        let label = self.current_target().label.clone();
        if label != previous {
            self.hooks.display.show_label(&label);
        }
        false
    }

    /// Stops sequencing from any state. An unfinished trial is dropped unlogged.
    pub fn abort(&mut self) {
        if self.phase == SequencerPhase::Aborted {
            return;
        }
        if let Some(trial) = self.current.take() {
            log::info!("aborted during trial for {}", trial.target_label);
            self.hooks.display.show_timer_running(false);
        }
        self.phase = SequencerPhase::Aborted;
    }

    pub fn current_target(&self) -> &Target {
        assert!(
            self.index < self.targets.len(),
            "target index {} out of range for {} targets",
            self.index,
            self.targets.len()
        );
        &self.targets[self.index]
    }

    pub fn current_label(&self) -> Option<&str> {
        match self.phase {
            SequencerPhase::Ready | SequencerPhase::TimerRunning => {
                Some(self.current_target().label.as_str())
            }
            _ => None,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.label.as_str()).collect()
    }

    pub fn phase(&self) -> SequencerPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn max_cycles(&self) -> usize {
        self.config.max_cycles
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn current_trial(&self) -> Option<&Trial> {
        self.current.as_ref()
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
