pub mod config;
pub mod error;
pub mod layout;
pub mod names;
pub mod random;
pub mod sequencer;
pub mod spawn;
pub mod trial;

pub use config::{BoxCenterMode, ExperimentConfig};
pub use error::{ConfigError, LayoutError, SequencerError};
pub use layout::{generate, generate_with_retries};
pub use names::{NameSource, select_name_set, shuffle, shuffle_name_set};
pub use random::{RandomSource, SeededRandom};
pub use sequencer::{Hooks, SequencerConfig, TrialOutcome, TrialSequencer};
pub use spawn::SpawnCatalog;
pub use trial::Trial;
