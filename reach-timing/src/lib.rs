pub mod clock;
pub mod countdown;

pub use clock::{Clock, FrameStats, HighPrecisionClock, ManualClock};
pub use countdown::{Countdown, CountdownStatus};
