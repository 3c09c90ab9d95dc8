use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use reach_core::{
    ControllerProvider, KeyValueStore, SceneId, SequencerPhase, TrialRecord, Vec3,
};
use reach_experiment::{
    ExperimentConfig, Hooks, SeededRandom, SequencerConfig, TrialSequencer,
    generate_with_retries,
};
use reach_record::{
    CsvRecorder, Delimiter, FanoutRecorder, InteractionLogger, JsonFileStore, MemoryRecorder,
    RecordColumns, VisitTracker,
};
use reach_timing::{Clock, FrameStats, HighPrecisionClock, ManualClock};
use serde::{Deserialize, Serialize};

use crate::panel::{LabelBoard, TextPanel};
use crate::participant::{ParticipantAction, ParticipantProfile, SimulatedParticipant};
use crate::scene::{SceneEvent, SceneHandle, SceneTransitionManager};

const TRIAL_LOG: &str = "interactionTimes.csv";
const INTERACTION_LOG: &str = "objectInteractions.csv";
const PREFERENCES: &str = "preferences.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    pub name: String,
    /// Shown on the first visit only.
    pub intro_texts: Vec<String>,
    pub countdown_secs: Option<f32>,
    pub trials: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub experiment: ExperimentConfig,
    pub scenes: Vec<SceneSpec>,
    pub frame_rate_hz: f32,
    pub fade_duration_secs: f32,
    /// A scene still running after this long aborts the session.
    pub max_scene_secs: f32,
    pub delimiter: Delimiter,
    pub columns: RecordColumns,
    pub participant: ParticipantProfile,
    pub realtime: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            experiment: ExperimentConfig::default(),
            scenes: vec![
                SceneSpec {
                    name: "Welcome".into(),
                    intro_texts: vec![
                        "Welcome to the VR Experience!".into(),
                        "Use the button to switch texts.".into(),
                        "This is the last viewable text, the panel will close after this."
                            .into(),
                    ],
                    ..Default::default()
                },
                SceneSpec {
                    name: "Countdown".into(),
                    countdown_secs: Some(30.0),
                    ..Default::default()
                },
                SceneSpec {
                    name: "Pointing".into(),
                    trials: true,
                    ..Default::default()
                },
            ],
            frame_rate_hz: 72.0,
            fade_duration_secs: 1.0,
            max_scene_secs: 600.0,
            delimiter: Delimiter::Comma,
            columns: RecordColumns::all(),
            participant: ParticipantProfile::default(),
            realtime: false,
        }
    }
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.experiment.validate()?;
        if self.scenes.is_empty() {
            bail!("session has no scenes");
        }
        if !(self.frame_rate_hz.is_finite() && self.frame_rate_hz > 0.0) {
            bail!("frame_rate_hz must be positive, got {}", self.frame_rate_hz);
        }
        if self.frame_duration()?.is_zero() {
            bail!("frame_rate_hz of {} rounds to zero-length frames", self.frame_rate_hz);
        }
        self.fade_duration()?;
        if !(self.max_scene_secs.is_finite() && self.max_scene_secs > 0.0) {
            bail!("max_scene_secs must be positive");
        }
        for scene in &self.scenes {
            scene.countdown()?;
        }
        Ok(())
    }

    fn frame_duration(&self) -> Result<Duration> {
        secs_to_duration("frame time", 1.0 / self.frame_rate_hz)
    }

    fn fade_duration(&self) -> Result<Duration> {
        secs_to_duration("fade_duration_secs", self.fade_duration_secs)
    }
}

impl SceneSpec {
    fn countdown(&self) -> Result<Option<Duration>> {
        self.countdown_secs
            .map(|secs| secs_to_duration("countdown_secs", secs))
            .transpose()
            .with_context(|| format!("scene {:?}", self.name))
    }
}

fn secs_to_duration(field: &str, secs: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(secs)
        .with_context(|| format!("{field} of {secs}s is not a usable duration"))
}

/// Real time paced with sleeps, or simulated time advanced one frame per tick.
#[derive(Debug, Clone)]
pub enum SessionClock {
    Realtime(HighPrecisionClock),
    Simulated(ManualClock),
}

impl Clock for SessionClock {
    fn now(&self) -> u64 {
        match self {
            SessionClock::Realtime(c) => c.now(),
            SessionClock::Simulated(c) => c.now(),
        }
    }

    fn wall_clock_now(&self) -> DateTime<Local> {
        match self {
            SessionClock::Realtime(c) => c.wall_clock_now(),
            SessionClock::Simulated(c) => c.wall_clock_now(),
        }
    }
}

impl SessionClock {
    fn end_frame(&mut self, frame: Duration, frame_started: u64) {
        match self {
            SessionClock::Realtime(c) => {
                let spent = c.elapsed(frame_started);
                if spent < frame {
                    c.sleep(frame - spent);
                }
                let total = c.elapsed(frame_started);
                c.record_frame(total);
            }
            SessionClock::Simulated(c) => c.advance(frame),
        }
    }

    fn frame_stats(&self) -> Option<FrameStats> {
        match self {
            SessionClock::Realtime(c) => Some(c.frame_stats()),
            SessionClock::Simulated(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub seed: u64,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub trials: usize,
    pub frames: u64,
    pub labels_shown: usize,
    pub records: Vec<TrialRecord>,
}

/// One scene's trial block: the sequencer plus whoever drives it.
struct TrialRun {
    sequencer: TrialSequencer<SessionClock, SeededRandom>,
    participant: SimulatedParticipant,
}

impl TrialRun {
    fn step(&mut self, dt: f32, interactions: &mut InteractionLogger) {
        if self.sequencer.phase() == SequencerPhase::Ready && self.participant.is_idle() {
            let target = self.sequencer.current_target().position();
            self.participant.begin_trial(target);
        }

        match self.participant.step(dt) {
            ParticipantAction::Grab => {
                let hand = self.participant.hand().right_hand_position();
                let now = self.sequencer.clock().wall_clock_now();
                if let Err(e) = interactions.log_interaction("StartObject", hand, now) {
                    log::warn!("could not log interaction: {e}");
                }
                self.sequencer.on_interaction_start();
            }
            ParticipantAction::Release => {
                self.sequencer.on_interaction_end();
            }
            ParticipantAction::None => {}
        }

        if let Some(outcome) = self.sequencer.poll() {
            let r = &outcome.record;
            log::info!(
                "trial {}.{} {} confirmed after {:.3}s",
                r.cycle,
                r.trial_index,
                r.target_label,
                r.elapsed_secs
            );
        }
    }
}

pub struct App {
    config: SessionConfig,
    output: PathBuf,
    seed: u64,
    clock: SessionClock,
    store: JsonFileStore,
    records: MemoryRecorder,
    board: LabelBoard,
    interactions: InteractionLogger,
    frames: u64,
}

impl App {
    pub fn new(config: SessionConfig, output: PathBuf) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&output)
            .with_context(|| format!("creating output directory {}", output.display()))?;
        let seed = config
            .experiment
            .seed
            .unwrap_or_else(|| SeededRandom::from_os_entropy().seed());
        let store = JsonFileStore::open(output.join(PREFERENCES)).context("opening preferences")?;
        let clock = if config.realtime {
            SessionClock::Realtime(HighPrecisionClock::new())
        } else {
            SessionClock::Simulated(ManualClock::new())
        };
        log::info!(
            "session seed {seed}, {} scenes, {} Hz, {}",
            config.scenes.len(),
            config.frame_rate_hz,
            if config.realtime { "real time" } else { "simulated time" }
        );

        Ok(Self {
            interactions: InteractionLogger::new(output.join(INTERACTION_LOG)),
            config,
            output,
            seed,
            clock,
            store,
            records: MemoryRecorder::new(),
            board: LabelBoard::default(),
            frames: 0,
        })
    }

    pub fn run(&mut self) -> Result<SessionSummary> {
        let started = self.clock.wall_clock_now();
        let fade = self.config.fade_duration()?;
        let scenes = SceneHandle::new(SceneTransitionManager::new(
            0,
            self.config.scenes.len(),
            fade,
        ));

        let mut index = 0;
        loop {
            match self.run_scene(index, &scenes)? {
                SceneEvent::Load(next) => index = next,
                SceneEvent::SessionEnd => break,
                SceneEvent::None => unreachable!("run_scene returns on a scene event"),
            }
        }

        self.store.save().context("saving preferences")?;
        let summary = SessionSummary {
            seed: self.seed,
            started,
            finished: self.clock.wall_clock_now(),
            trials: self.records.len(),
            frames: self.frames,
            labels_shown: self.board.label_changes(),
            records: self.records.records(),
        };
        self.write_summary(&summary)?;
        if let Some(stats) = self.clock.frame_stats() {
            log::info!(
                "frames: avg {:.3}ms, jitter {:.3}ms, min {:.3}ms, max {:.3}ms, {:.1} fps",
                stats.average_frame_time_ns / 1e6,
                stats.jitter_ns / 1e6,
                stats.min_frame_time_ns / 1e6,
                stats.max_frame_time_ns / 1e6,
                stats.effective_fps
            );
        }
        Ok(summary)
    }

    fn run_scene(&mut self, index: usize, scenes: &SceneHandle) -> Result<SceneEvent> {
        let spec = self.config.scenes[index].clone();
        let scene = SceneId::new(index, spec.name.clone());
        debug_assert_eq!(scenes.current(), index);
        let visit = VisitTracker::record_visit(&mut self.store, &scene);
        log::info!("scene {index} {:?} loaded, visit {}", spec.name, visit.count);

        let mut panel = (visit.first && !spec.intro_texts.is_empty())
            .then(|| TextPanel::new(spec.intro_texts.clone()));
        if let Some(countdown) = spec.countdown()? {
            scenes.start_countdown(countdown);
        }
        let mut trials = if spec.trials {
            Some(self.prepare_trials(&scene, scenes)?)
        } else {
            None
        };
        let passive = !spec.trials && spec.countdown_secs.is_none();
        if passive && panel.is_none() {
            scenes.go_to_next();
        }

        let frame = self.config.frame_duration()?;
        let dt = frame.as_secs_f32();
        let read_secs = self.config.participant.panel_read_secs;
        let mut reading = read_secs;
        let max_frames = (self.config.max_scene_secs * self.config.frame_rate_hz).ceil() as u64;
        let mut shown_countdown = None;
        let mut was_fading = false;

        for _ in 0..max_frames {
            let frame_started = self.clock.now();
            if let Some(p) = &mut panel {
                reading -= dt;
                if reading <= 0.0 {
                    reading = read_secs;
                    if !p.next() {
                        panel = None;
                        if passive {
                            scenes.go_to_next();
                        }
                    }
                }
            } else if let Some(run) = &mut trials {
                run.step(dt, &mut self.interactions);
            }

            let event = scenes.tick(frame);
            let countdown = scenes.countdown_text();
            if countdown != shown_countdown {
                if let Some(text) = &countdown {
                    log::info!("{text}");
                }
                shown_countdown = countdown;
            }
            let fading = scenes.is_fading();
            if fading && !was_fading {
                log::debug!("fading out of scene {:?}", spec.name);
            }
            if fading {
                log::trace!("fade level {:.2}", scenes.fade_level());
            }
            was_fading = fading;

            self.clock.end_frame(frame, frame_started);
            self.frames += 1;
            if event != SceneEvent::None {
                if let Some(run) = &mut trials {
                    if self.board.timer_running() {
                        log::warn!("left scene {:?} with a trial timer running", spec.name);
                    }
                    if run.sequencer.phase() != SequencerPhase::SequenceComplete {
                        run.sequencer.abort();
                    }
                    log::info!(
                        "scene {:?} showed {} target labels, last {:?}",
                        spec.name,
                        self.board.label_changes(),
                        self.board.label()
                    );
                }
                return Ok(event);
            }
        }
        bail!(
            "scene {:?} did not finish within {}s",
            spec.name,
            self.config.max_scene_secs
        )
    }

    fn prepare_trials(&mut self, scene: &SceneId, scenes: &SceneHandle) -> Result<TrialRun> {
        let exp = &self.config.experiment;
        let scene_seed = self.seed.wrapping_add(scene.build_index as u64 * 3);
        let mut rng = SeededRandom::new(scene_seed);

        let volume = exp.bounding_volume()?;
        let names = exp.name_source.resolve(&exp.name_sets, &mut rng)?;
        let points = generate_with_retries(
            names.len(),
            &volume,
            exp.min_distance,
            exp.max_attempts,
            exp.max_layout_retries,
            &mut rng,
        )
        .with_context(|| format!("placing targets in scene {:?}", scene.name))?;
        let catalog = exp.spawn_catalog()?;
        let targets = catalog.assign_targets(&points, &names)?;
        for target in &targets {
            match catalog.get(&target.label) {
                Some(def) => log::debug!(
                    "spawning {} ({}) at {:?}",
                    target.label,
                    def.prefab,
                    target.position()
                ),
                None => log::debug!("placing {} at {:?}", target.label, target.position()),
            }
        }

        let home = exp.start_object_position.unwrap_or(Vec3::ZERO);
        let mut seq_config = SequencerConfig::new(exp.max_cycles, scene.clone());
        if let Some(start) = exp.start_object_position {
            seq_config = seq_config.with_start_object(start);
        }
        if let Some(subdivision) = exp.subdivision {
            seq_config = seq_config.with_subregions(volume, subdivision);
        }

        let participant =
            SimulatedParticipant::new(self.config.participant, home, scene_seed.wrapping_add(1));
        let csv = CsvRecorder::new(self.output.join(TRIAL_LOG))
            .with_delimiter(self.config.delimiter)
            .with_columns(self.config.columns);
        let hooks = Hooks {
            controller: Box::new(participant.hand()),
            recorder: Box::new(FanoutRecorder::new().with(csv).with(self.records.clone())),
            scene: Box::new(scenes.clone()),
            display: Box::new(self.board.clone()),
        };
        let mut sequencer = TrialSequencer::new(
            seq_config,
            self.clock.clone(),
            SeededRandom::new(scene_seed.wrapping_add(2)),
            hooks,
        );
        sequencer.initialize(targets)?;
        Ok(TrialRun {
            sequencer,
            participant,
        })
    }

    fn write_summary(&self, summary: &SessionSummary) -> Result<()> {
        let name = format!("session-{}.json", summary.started.format("%Y%m%d-%H%M%S"));
        let path = self.output.join(name);
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing session summary {}", path.display()))?;
        log::info!("summary written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_dir(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "reach-app-{}-{name}-{n}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn quick_config(max_cycles: usize) -> SessionConfig {
        let mut config = SessionConfig::default();
        config.experiment.seed = Some(11);
        config.experiment.max_cycles = max_cycles;
        config.scenes[1].countdown_secs = Some(2.0);
        config.participant.panel_read_secs = 0.5;
        config
    }

    #[test]
    fn default_session_runs_to_the_end() {
        let dir = temp_dir("default");
        let mut app = App::new(quick_config(2), dir.clone()).unwrap();
        let summary = app.run().unwrap();

        assert_eq!(summary.trials, 8);
        let cycles: Vec<_> = summary.records.iter().map(|r| r.cycle).collect();
        assert_eq!(cycles, [0, 0, 0, 0, 1, 1, 1, 1]);
        assert!(summary.records.iter().all(|r| r.elapsed_secs > 0.0));

        let csv = std::fs::read_to_string(dir.join(TRIAL_LOG)).unwrap();
        assert_eq!(csv.lines().count(), 9);
        assert!(csv.starts_with("Cycle, Trial"));
        let interactions = std::fs::read_to_string(dir.join(INTERACTION_LOG)).unwrap();
        assert_eq!(interactions.matches("Session Start").count(), 1);
        assert!(dir.join(PREFERENCES).exists());
    }

    #[test]
    fn board_follows_single_cycle() {
        let dir = temp_dir("board");
        let mut app = App::new(quick_config(1), dir).unwrap();
        let summary = app.run().unwrap();
        assert_eq!(summary.trials, 4);
        // one label per target, no repeats within a cycle
        assert_eq!(summary.labels_shown, 4);
        let last = summary.records.last().map(|r| r.target_label.clone());
        assert_eq!(app.board.label(), last);
        assert!(!app.board.timer_running());
    }

    #[test]
    fn intro_panel_only_on_first_visit() {
        let dir = temp_dir("revisit");
        let first = App::new(quick_config(1), dir.clone()).unwrap().run().unwrap();
        let second = App::new(quick_config(1), dir.clone()).unwrap().run().unwrap();
        // three pages are read the first time only
        assert!(second.frames < first.frames);

        let store = JsonFileStore::open(dir.join(PREFERENCES)).unwrap();
        assert_eq!(store.get_int("visits.Welcome"), Some(2));
    }

    #[test]
    fn same_seed_same_targets() {
        let a = App::new(quick_config(1), temp_dir("seed-a")).unwrap().run().unwrap();
        let b = App::new(quick_config(1), temp_dir("seed-b")).unwrap().run().unwrap();
        let positions = |s: &SessionSummary| -> Vec<(String, Vec3)> {
            s.records
                .iter()
                .map(|r| (r.target_label.clone(), r.target_position))
                .collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn rejects_bad_frame_rate() {
        let mut config = SessionConfig::default();
        config.frame_rate_hz = 0.0;
        assert!(config.validate().is_err());
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_durations_out_of_range() {
        let mut config = SessionConfig::default();
        config.scenes[1].countdown_secs = Some(1e30);
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("Countdown"));

        let mut config = SessionConfig::default();
        config.fade_duration_secs = f32::MAX;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.fade_duration_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.frame_rate_hz = 1e-40;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.frame_rate_hz = 1e30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn impossible_layout_fails_the_session() {
        let mut config = quick_config(1);
        config.experiment.min_distance = 5.0;
        config.experiment.max_attempts = 50;
        config.experiment.max_layout_retries = 1;
        let err = App::new(config, temp_dir("layout")).unwrap().run().unwrap_err();
        assert!(format!("{err:#}").contains("placing targets"));
    }
}
