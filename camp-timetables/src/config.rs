//! Run configuration, read from a JSON file.
//!
//! ```json
//! {
//!   "days": [
//!     { "name": "Monday", "grid": "grids/monday.csv", "merges": ["B2:B3", "C4:E4"] }
//!   ],
//!   "roster": "student_mapping.csv",
//!   "groups": "group_mapping.csv",
//!   "start_date": "2025-07-14",
//!   "day_end": "17:00"
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};
use crate::schedule::matcher::{
    Matchers, DEFAULT_COMMON_ACTIVITIES, DEFAULT_GROUP_PATTERN, DEFAULT_GROUP_PREFIX,
    DEFAULT_INDIVIDUAL_PATTERN,
};
use crate::schedule::slot_utils::parse_clock_time;
use crate::schedule::{SheetLayout, TimetableOptions};

/// One sheet of the master grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayConfig {
    pub name: String,
    pub grid: PathBuf,
    #[serde(default)]
    pub merges: Vec<String>, // A1 ranges, e.g. "B3:B5"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub days: Vec<DayConfig>,
    #[serde(default)]
    pub roster: Option<PathBuf>,
    #[serde(default)]
    pub groups: Option<PathBuf>,
    #[serde(default)]
    pub rooms: Option<PathBuf>,
    #[serde(default)]
    pub layout: SheetLayout,
    #[serde(default = "default_individual_pattern")]
    pub individual_pattern: String,
    #[serde(default = "default_group_pattern")]
    pub group_pattern: String,
    #[serde(default = "default_group_prefix")]
    pub group_prefix: String,
    #[serde(default = "default_common_activities")]
    pub common_activities: Vec<String>,
    /// Instructor columns to check first when an individual is double-booked.
    #[serde(default)]
    pub column_priority: Vec<String>,
    /// Label for a cell holding nothing but the individual's ID, e.g. "Private Lesson with {instructor}".
    #[serde(default)]
    pub lesson_label: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub day_end: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_instructor_output_dir")]
    pub instructor_output_dir: PathBuf,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_individual_pattern() -> String {
    DEFAULT_INDIVIDUAL_PATTERN.to_string()
}

fn default_group_pattern() -> String {
    DEFAULT_GROUP_PATTERN.to_string()
}

fn default_group_prefix() -> String {
    DEFAULT_GROUP_PREFIX.to_string()
}

fn default_common_activities() -> Vec<String> {
    DEFAULT_COMMON_ACTIVITIES.iter().map(|s| s.to_string()).collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("student_timetables")
}

fn default_instructor_output_dir() -> PathBuf {
    PathBuf::from("teacher_timetables")
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_json(&text, base_dir)
    }

    pub fn from_json(text: &str, base_dir: PathBuf) -> Result<Self> {
        let mut config: RunConfig = serde_json::from_str(text)?;
        config.base_dir = base_dir;
        if config.days.is_empty() {
            return Err(TimetableError::Config("no days configured".to_string()));
        }
        Ok(config)
    }

    /// Resolves a configured path against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn matchers(&self) -> Result<Matchers> {
        Matchers::new(
            &self.individual_pattern,
            &self.group_pattern,
            &self.group_prefix,
            self.common_activities.clone(),
        )
    }

    pub fn options(&self) -> Result<TimetableOptions> {
        let day_end = match self.day_end.as_deref() {
            Some(text) => Some(parse_clock_time(text).ok_or_else(|| {
                TimetableError::Config(format!("day_end '{}' is not a HH:MM time", text))
            })?),
            None => None,
        };
        Ok(TimetableOptions {
            matchers: self.matchers()?,
            layout: self.layout,
            column_priority: self.column_priority.clone(),
            lesson_label: self.lesson_label.clone(),
            start_date: self.start_date,
            day_end,
        })
    }
}
