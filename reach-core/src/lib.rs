pub mod collaborators;
pub mod error;
pub mod geometry;
pub mod label;
pub mod phase;
pub mod trial;

pub use collaborators::{ControllerProvider, KeyValueStore, LabelDisplay, Recorder, SceneTransition};
pub use error::{GeometryError, NameSetError, RecordError, StoreError};
pub use geometry::{BoundingVolume, Subdivision, Vec3};
pub use label::{NameSet, NameSetPool};
pub use phase::SequencerPhase;
pub use trial::{SceneId, SpawnDefinition, Target, TargetPoint, TrialRecord};
