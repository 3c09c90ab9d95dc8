use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Time source for the trial engine.
///
/// `now` is monotonic and the only input to elapsed-time arithmetic.
/// `wall_clock_now` labels log rows and may jump with the system clock.
pub trait Clock {
    /// Nanoseconds since the clock's origin.
    fn now(&self) -> u64;
    fn wall_clock_now(&self) -> DateTime<Local>;

    fn elapsed(&self, since: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(since))
    }
}

#[derive(Debug, Clone)]
pub struct FrameStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

impl FrameStats {
    fn empty() -> Self {
        Self {
            average_frame_time_ns: 0.0,
            jitter_ns: 0.0,
            min_frame_time_ns: 0.0,
            max_frame_time_ns: 0.0,
            effective_fps: 0.0,
        }
    }
}

/// `Instant`-backed clock with frame pacing and frame-time statistics.
#[derive(Debug, Clone)]
pub struct HighPrecisionClock {
    start: Instant,
    frame_times: Vec<Duration>,
    max_samples: usize,
}

impl Clock for HighPrecisionClock {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn wall_clock_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl HighPrecisionClock {
    pub fn new() -> Self {
        Self::with_max_samples(1000)
    }

    pub fn with_max_samples(max_samples: usize) -> Self {
        Self {
            start: Instant::now(),
            frame_times: Vec::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record_frame(&mut self, d: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.remove(0);
        }
        self.frame_times.push(d);
    }

    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }

    pub fn frame_stats(&self) -> FrameStats {
        frame_stats(&self.frame_times)
    }

    pub fn sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, EINTR, clock_nanosleep, timespec};

        let mut req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };
        let mut rem = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        loop {
            // SAFETY: both pointers refer to live, initialised timespecs.
            let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) };
            match rc {
                0 => return,
                EINTR => req = rem,
                _ => {
                    let left = timespec_to_duration(&req);
                    log::debug!("clock_nanosleep returned {rc}, sleeping {left:?} with thread::sleep");
                    std::thread::sleep(left);
                    return;
                }
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn timespec_to_duration(ts: &libc::timespec) -> Duration {
    Duration::new(ts.tv_sec.max(0) as u64, ts.tv_nsec.clamp(0, 999_999_999) as u32)
}

impl Default for HighPrecisionClock {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_stats(frame_times: &[Duration]) -> FrameStats {
    if frame_times.is_empty() {
        return FrameStats::empty();
    }
    let times: Vec<f64> = frame_times.iter().map(|d| d.as_nanos() as f64).collect();
    let avg = times.iter().sum::<f64>() / times.len() as f64;
    let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
    let min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    FrameStats {
        average_frame_time_ns: avg,
        jitter_ns: var.sqrt(),
        min_frame_time_ns: min,
        max_frame_time_ns: max,
        effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ns: Rc<Cell<u64>>,
    wall_origin: DateTime<Local>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    pub fn starting_at(wall_origin: DateTime<Local>) -> Self {
        Self {
            now_ns: Rc::new(Cell::new(0)),
            wall_origin,
        }
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.set(self.now_ns.get() + d.as_nanos() as u64);
    }

    pub fn set(&self, now_ns: u64) {
        self.now_ns.set(now_ns);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now_ns.get()
    }

    fn wall_clock_now(&self) -> DateTime<Local> {
        self.wall_origin + chrono::Duration::nanoseconds(self.now_ns.get() as i64)
    }
}
