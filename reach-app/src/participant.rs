//! Scripted stand-in for a participant, so sessions can run headless.

use std::cell::Cell;
use std::rc::Rc;

use reach_core::{ControllerProvider, Vec3};
use reach_experiment::{RandomSource, SeededRandom};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantProfile {
    pub grab_secs: f32,
    pub reach_secs: f32,
    pub reach_jitter_secs: f32,
    /// Pointing error per axis, metres.
    pub pointing_noise: f32,
    pub press_frames: u32,
    pub panel_read_secs: f32,
}

impl Default for ParticipantProfile {
    fn default() -> Self {
        Self {
            grab_secs: 0.3,
            reach_secs: 0.8,
            reach_jitter_secs: 0.2,
            pointing_noise: 0.01,
            press_frames: 3,
            panel_read_secs: 2.0,
        }
    }
}

/// Controller state shared between the participant and the sequencer.
#[derive(Debug, Clone, Default)]
pub struct HandHandle {
    position: Rc<Cell<Vec3>>,
    pressed: Rc<Cell<bool>>,
}

impl ControllerProvider for HandHandle {
    fn right_hand_position(&self) -> Vec3 {
        self.position.get()
    }

    fn primary_button_pressed(&self) -> bool {
        self.pressed.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantAction {
    None,
    Grab,
    Release,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Idle,
    Grabbing {
        target: Vec3,
        left: f32,
        announced: bool,
    },
    Reaching {
        from: Vec3,
        to: Vec3,
        elapsed: f32,
        total: f32,
    },
    Pressing {
        frames_left: u32,
    },
}

pub struct SimulatedParticipant {
    profile: ParticipantProfile,
    rng: SeededRandom,
    hand: HandHandle,
    home: Vec3,
    stage: Stage,
}

impl SimulatedParticipant {
    pub fn new(profile: ParticipantProfile, home: Vec3, seed: u64) -> Self {
        let hand = HandHandle::default();
        hand.position.set(home);
        Self {
            profile,
            rng: SeededRandom::new(seed),
            hand,
            home,
            stage: Stage::Idle,
        }
    }

    pub fn hand(&self) -> HandHandle {
        self.hand.clone()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.stage, Stage::Idle)
    }

    /// Walks to the start object and will reach for `target` after releasing it.
    pub fn begin_trial(&mut self, target: Vec3) {
        self.hand.position.set(self.home);
        self.hand.pressed.set(false);
        self.stage = Stage::Grabbing {
            target,
            left: self.profile.grab_secs,
            announced: false,
        };
    }

    pub fn step(&mut self, dt: f32) -> ParticipantAction {
        match self.stage {
            Stage::Idle => ParticipantAction::None,
            Stage::Grabbing {
                target,
                left,
                announced,
            } => {
                if !announced {
                    self.stage = Stage::Grabbing {
                        target,
                        left,
                        announced: true,
                    };
                    return ParticipantAction::Grab;
                }
                let left = left - dt;
                if left > 0.0 {
                    self.stage = Stage::Grabbing {
                        target,
                        left,
                        announced,
                    };
                    return ParticipantAction::None;
                }
                let noise = self.profile.pointing_noise;
                let aim = target
                    + Vec3::new(
                        self.rng.uniform(-noise, noise),
                        self.rng.uniform(-noise, noise),
                        self.rng.uniform(-noise, noise),
                    );
                let jitter = self.profile.reach_jitter_secs;
                let total = (self.profile.reach_secs + self.rng.uniform(-jitter, jitter)).max(dt);
                self.stage = Stage::Reaching {
                    from: self.home,
                    to: aim,
                    elapsed: 0.0,
                    total,
                };
                ParticipantAction::Release
            }
            Stage::Reaching {
                from,
                to,
                elapsed,
                total,
            } => {
                let elapsed = elapsed + dt;
                let t = (elapsed / total).min(1.0);
                self.hand.position.set(from.lerp(to, t));
                self.stage = if elapsed >= total {
                    Stage::Pressing {
                        frames_left: self.profile.press_frames.max(1),
                    }
                } else {
                    Stage::Reaching {
                        from,
                        to,
                        elapsed,
                        total,
                    }
                };
                ParticipantAction::None
            }
            Stage::Pressing { frames_left } => {
                if frames_left == 0 {
                    self.hand.pressed.set(false);
                    self.stage = Stage::Idle;
                } else {
                    self.hand.pressed.set(true);
                    self.stage = Stage::Pressing {
                        frames_left: frames_left - 1,
                    };
                }
                ParticipantAction::None
            }
        }
    }
}
