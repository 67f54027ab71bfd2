use serde::{Deserialize, Serialize};

/// Label given to a slot where nothing in the grid applies to an individual.
pub const FREE_TIME: &str = "Free Time";

/// Title of the single sheet every personal timetable is written to.
pub const TIMETABLE_TITLE: &str = "Full Timetable";

/// One row of a day's grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub label: String,
    pub position: usize, // index within the day, defines the order
}

/// A normalized day: every (slot, instructor) pair holds exactly one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub name: String,
    pub index: usize,
    pub slots: Vec<TimeSlot>,
    pub instructors: Vec<String>,
    pub cells: Vec<Vec<String>>, // cells[slot.position][column]
}

impl Day {
    /// Text at (slot, column); out-of-range lookups read as empty.
    pub fn cell(&self, position: usize, column: usize) -> &str {
        self.cells
            .get(position)
            .and_then(|row| row.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn instructor(&self, column: usize) -> &str {
        self.instructors.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Where the instructor header, slot labels and slot rows live on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub header_row: usize,
    pub first_slot_row: usize,
    pub label_col: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 0,
            first_slot_row: 1,
            label_col: 0,
        }
    }
}

/// Resolved activity for one (individual, day, slot)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub individual: String,
    pub day: usize,
    pub slot: TimeSlot,
    pub activity: String,
}

/// Maximal run of slots in one day sharing a single activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub individual: String,
    pub day: usize,
    pub start: TimeSlot,
    pub end: TimeSlot,
    pub activity: String,
}

/// A span as laid out in the assembled table: the label sits on its first
/// row and covers `rows` rows downwards (a merged cell for the writer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanCell {
    pub activity: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableRow {
    pub label: String,
    pub cells: Vec<Option<SpanCell>>, // one per day column
}

/// Personal timetable of one individual: rows are slot labels, columns are days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub individual: String,
    pub display_name: String,
    pub title: String,
    pub days: Vec<String>,
    pub rows: Vec<TimetableRow>,
}

impl Timetable {
    /// Iterates the placed spans of one day column as (row index, cell).
    pub fn column(&self, day: usize) -> impl Iterator<Item = (usize, &SpanCell)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(move |(i, row)| row.cells.get(day).and_then(Option::as_ref).map(|c| (i, c)))
    }
}
