//! Delimited trial log, one row per confirmed trial.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use reach_core::{RecordError, Recorder, TrialRecord, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }
}

/// Optional column groups. Fixed per file so header and rows agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordColumns {
    pub start_object: bool,
    pub first_touch: bool,
    pub subregion: bool,
}

impl RecordColumns {
    pub fn all() -> Self {
        Self {
            start_object: true,
            first_touch: true,
            subregion: true,
        }
    }
}

/// Appends rows to a file, writing the header only when the file is new or empty.
#[derive(Debug, Clone)]
pub struct CsvRecorder {
    path: PathBuf,
    delimiter: Delimiter,
    columns: RecordColumns,
}

impl CsvRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: Delimiter::default(),
            columns: RecordColumns::default(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_columns(mut self, columns: RecordColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> String {
        let mut cols: Vec<&str> = vec![
            "Cycle",
            "Trial",
            "Scene Index",
            "Scene Name",
            "Timestamp",
            "Elapsed Time (s)",
            "Controller X",
            "Controller Y",
            "Controller Z",
            "Target Name",
            "Target X",
            "Target Y",
            "Target Z",
        ];
        if self.columns.start_object {
            cols.extend(["Start X", "Start Y", "Start Z"]);
        }
        if self.columns.first_touch {
            cols.extend(["First Touch X", "First Touch Y", "First Touch Z"]);
        }
        if self.columns.subregion {
            cols.push("Subregion");
        }
        self.join(cols.into_iter().map(String::from))
    }

    pub fn format_row(&self, r: &TrialRecord) -> String {
        let mut fields = vec![
            r.cycle.to_string(),
            r.trial_index.to_string(),
            r.scene.build_index.to_string(),
            self.escape(&r.scene.name),
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.3}", r.elapsed_secs),
        ];
        fields.extend(vec3_fields(Some(r.controller_position)));
        fields.push(self.escape(&r.target_label));
        fields.extend(vec3_fields(Some(r.target_position)));
        if self.columns.start_object {
            fields.extend(vec3_fields(r.start_object_position));
        }
        if self.columns.first_touch {
            fields.extend(vec3_fields(r.first_touch_position));
        }
        if self.columns.subregion {
            fields.push(r.subregion.map(|s| s.to_string()).unwrap_or_default());
        }
        self.join(fields.into_iter())
    }

    fn join(&self, fields: impl Iterator<Item = String>) -> String {
        let sep = format!("{} ", self.delimiter.as_char());
        fields.collect::<Vec<_>>().join(&sep)
    }

    fn escape(&self, field: &str) -> String {
        if field.contains(self.delimiter.as_char()) || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

fn vec3_fields(v: Option<Vec3>) -> [String; 3] {
    match v {
        Some(v) => [
            format!("{:.3}", v.x),
            format!("{:.3}", v.y),
            format!("{:.3}", v.z),
        ],
        None => Default::default(),
    }
}

impl Recorder for CsvRecorder {
    fn record(&mut self, record: &TrialRecord) -> Result<(), RecordError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", self.header())?;
        }
        writeln!(file, "{}", self.format_row(record))?;
        log::debug!("appended trial row to {}", self.path.display());
        Ok(())
    }
}
