pub mod csv;
pub mod interaction;
pub mod memory;
pub mod store;

#[cfg(test)]
pub(crate) mod test_util;

pub use csv::{CsvRecorder, Delimiter, RecordColumns};
pub use interaction::InteractionLogger;
pub use memory::{FanoutRecorder, MemoryRecorder};
pub use store::{JsonFileStore, MemoryStore, Visit, VisitTracker};
