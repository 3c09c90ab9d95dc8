use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use reach_core::{RecordError, Vec3};

/// Logs which object was grabbed and where the hand was.
///
/// Each logger instance is one session: its first write opens a block with a
/// timestamp and header, separated from earlier sessions by blank lines.
#[derive(Debug)]
pub struct InteractionLogger {
    path: PathBuf,
    session_started: bool,
}

impl InteractionLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session_started: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log_interaction(
        &mut self,
        object_name: &str,
        hand_position: Vec3,
        now: DateTime<Local>,
    ) -> Result<(), RecordError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if !self.session_started {
            if file.metadata()?.len() > 0 {
                writeln!(file, "\n\n")?;
            }
            writeln!(file, "Session Start, {}", now.format("%Y-%m-%d %H:%M:%S"))?;
            writeln!(file, "ObjectName, X, Y, Z")?;
            self.session_started = true;
        }
        writeln!(
            file,
            "{}, {:.3}, {:.3}, {:.3}",
            object_name, hand_position.x, hand_position.y, hand_position.z
        )?;
        log::debug!("object {object_name} grabbed at {hand_position:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_path;
    use chrono::TimeZone;

    #[test]
    fn sessions_are_separated() {
        let path = temp_path("interactions.csv");
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let mut first = InteractionLogger::new(&path);
        first.log_interaction("Cube", Vec3::new(0.5, 1.0, 0.25), now).unwrap();
        first.log_interaction("Cube", Vec3::ZERO, now).unwrap();
        let mut second = InteractionLogger::new(&path);
        second.log_interaction("Sphere", Vec3::ZERO, now).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Session Start, 2024-01-02 03:04:05").count(), 2);
        assert!(text.starts_with("Session Start"));
        assert!(text.contains("Cube, 0.500, 1.000, 0.250\n"));
        assert!(text.contains("0.000\n\n\n\nSession Start"));
        assert!(!text.contains("\n\n\n\n\n"));
    }
}
