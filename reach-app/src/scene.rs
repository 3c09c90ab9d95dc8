use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use reach_core::{SceneId, SceneTransition};
use reach_timing::{Countdown, CountdownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    None,
    Load(usize),
    /// Faded out of the last scene.
    SessionEnd,
}

/// Timed countdowns and fade-outs between scenes, driven by `tick`.
#[derive(Debug)]
pub struct SceneTransitionManager {
    current: usize,
    scene_count: usize,
    fade_duration: Duration,
    countdown: Option<Countdown>,
    fade: Option<(Countdown, usize)>,
}

impl SceneTransitionManager {
    pub fn new(current: usize, scene_count: usize, fade_duration: Duration) -> Self {
        Self {
            current,
            scene_count,
            fade_duration,
            countdown: None,
            fade: None,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Leaves the scene automatically once `duration` runs out.
    pub fn start_countdown(&mut self, duration: Duration) {
        self.countdown = Some(Countdown::new(duration));
    }

    pub fn countdown_text(&self) -> Option<String> {
        self.countdown
            .as_ref()
            .filter(|c| !c.is_finished())
            .map(|c| format!("Transition in: {}s", c.display_seconds()))
    }

    /// Starts fading towards `index`. Ignored while a fade is running.
    pub fn go_to_scene(&mut self, index: usize) {
        if self.fade.is_some() {
            log::debug!("transition to {index} ignored, already fading");
            return;
        }
        log::info!("fading out of scene {} towards {index}", self.current);
        self.countdown = None;
        self.fade = Some((Countdown::new(self.fade_duration), index));
    }

    pub fn go_to_next(&mut self) {
        self.go_to_scene(self.current + 1);
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Screen darkness in `[0, 1]`.
    pub fn fade_level(&self) -> f32 {
        self.fade.as_ref().map_or(0.0, |(c, _)| c.progress())
    }

    pub fn tick(&mut self, delta: Duration) -> SceneEvent {
        if let Some(countdown) = &mut self.countdown {
            if countdown.tick(delta) == CountdownStatus::Expired {
                log::info!("scene {} countdown expired", self.current);
                self.go_to_next();
            }
        }

        let Some((fade, target)) = &mut self.fade else {
            return SceneEvent::None;
        };
        if fade.tick(delta) != CountdownStatus::Expired {
            return SceneEvent::None;
        }
        let target = *target;
        self.fade = None;
        if target >= self.scene_count {
            SceneEvent::SessionEnd
        } else {
            self.current = target;
            SceneEvent::Load(target)
        }
    }
}

/// Shared handle so the sequencer can request the transition.
#[derive(Debug, Clone)]
pub struct SceneHandle(Rc<RefCell<SceneTransitionManager>>);

impl SceneHandle {
    pub fn new(manager: SceneTransitionManager) -> Self {
        Self(Rc::new(RefCell::new(manager)))
    }

    pub fn tick(&self, delta: Duration) -> SceneEvent {
        self.0.borrow_mut().tick(delta)
    }

    pub fn start_countdown(&self, duration: Duration) {
        self.0.borrow_mut().start_countdown(duration)
    }

    pub fn go_to_next(&self) {
        self.0.borrow_mut().go_to_next()
    }

    pub fn is_fading(&self) -> bool {
        self.0.borrow().is_fading()
    }

    pub fn current(&self) -> usize {
        self.0.borrow().current()
    }

    pub fn countdown_text(&self) -> Option<String> {
        self.0.borrow().countdown_text()
    }

    pub fn fade_level(&self) -> f32 {
        self.0.borrow().fade_level()
    }
}

impl SceneTransition for SceneHandle {
    fn on_sequence_complete(&mut self, scene: &SceneId) {
        log::info!("trials in {} complete, initiating scene transition", scene.name);
        self.go_to_next();
    }
}
