//! Error types for timetable generation.

/// Everything that can abort a timetable run.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// The grid of a day cannot be resolved (overlapping merges, no slots, no instructors).
    #[error("Malformed grid for day '{day}': {reason}")]
    MalformedGrid { day: String, reason: String },

    /// A merged-range declaration such as `B3:B5` could not be parsed.
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// A configured matcher is not a valid regular expression.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Run configuration is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TimetableError {
    pub fn malformed(day: &str, reason: impl Into<String>) -> Self {
        Self::MalformedGrid {
            day: day.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TimetableError>;
