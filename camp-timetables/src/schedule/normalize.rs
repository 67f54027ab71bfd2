//! Grid normalization: merged-range expansion and day extraction.
//!
//! A merged range stores its text in a single cell. Before any lookup the range
//! is materialized so every cell in it carries that text; nothing downstream
//! knows merges exist.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TimetableError};

use super::slot_utils::slot_start_time;
use super::types::{Day, SheetLayout, TimeSlot};

/// Largest grid a day may normalize to. Camp sheets run to a few hundred rows and
/// a few dozen instructor columns; a region reaching past these is a typo.
pub const MAX_GRID_ROWS: usize = 10_000;
pub const MAX_GRID_COLS: usize = 1_000;

/// Rectangular merged region, 0-based and inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRegion {
    pub first_row: usize,
    pub last_row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

impl MergedRegion {
    pub fn new(first_row: usize, last_row: usize, first_col: usize, last_col: usize) -> Self {
        Self {
            first_row,
            last_row,
            first_col,
            last_col,
        }
    }

    /// Parses an A1-style range such as "B3:B5" (or a single cell "C2").
    pub fn parse(range: &str) -> Result<Self> {
        parse_cell_range(range)
            .map(|(first_row, first_col, last_row, last_col)| {
                Self::new(first_row, last_row, first_col, last_col)
            })
            .ok_or_else(|| TimetableError::InvalidRange(range.to_string()))
    }

    pub fn overlaps(&self, other: &MergedRegion) -> bool {
        self.first_row <= other.last_row
            && other.first_row <= self.last_row
            && self.first_col <= other.last_col
            && other.first_col <= self.last_col
    }

    fn is_inverted(&self) -> bool {
        self.first_row > self.last_row || self.first_col > self.last_col
    }
}

/// A sheet as read from disk: ragged rows plus its merged-range declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
    pub merges: Vec<MergedRegion>,
}

/// Parse a cell reference like "A1" into (col, row), both 0-indexed.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(usize, usize)> {
    let mut col: usize = 0;
    let mut row: usize = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for ch in cell_ref.trim().chars() {
        match ch {
            '$' => continue,
            c if c.is_ascii_alphabetic() && !saw_row => {
                let upper = c.to_ascii_uppercase();
                col = col.checked_mul(26)?.checked_add(upper as usize - 'A' as usize + 1)?;
                saw_col = true;
            }
            c if c.is_ascii_digit() => {
                row = row.checked_mul(10)?.checked_add(c as usize - '0' as usize)?;
                saw_row = true;
            }
            _ => return None,
        }
    }

    if !saw_col || !saw_row || col == 0 || row == 0 {
        return None;
    }
    Some((col - 1, row - 1))
}

/// Parse "A1:B10" or "A1" into (start_row, start_col, end_row, end_col).
pub fn parse_cell_range(range: &str) -> Option<(usize, usize, usize, usize)> {
    if let Some((start, end)) = range.split_once(':') {
        let (start_col, start_row) = parse_cell_ref(start)?;
        let (end_col, end_row) = parse_cell_ref(end)?;
        Some((start_row, start_col, end_row, end_col))
    } else {
        let (col, row) = parse_cell_ref(range)?;
        Some((row, col, row, col))
    }
}

/// Expands merged regions into a dense rectangular grid.
///
/// Ragged rows are padded with empty cells, and the grid grows to cover every
/// region. Each region takes the text of its first non-empty cell (row-major);
/// an all-empty region stays empty. Normalizing a dense grid again is a no-op.
pub fn normalize_grid(
    day: &str,
    rows: &[Vec<String>],
    merges: &[MergedRegion],
) -> Result<Vec<Vec<String>>> {
    for (i, region) in merges.iter().enumerate() {
        if region.is_inverted() {
            return Err(TimetableError::malformed(
                day,
                format!("merged region {:?} ends before it starts", region),
            ));
        }
        if let Some(other) = merges.iter().skip(i + 1).find(|o| o.overlaps(region)) {
            return Err(TimetableError::malformed(
                day,
                format!("merged regions {:?} and {:?} overlap", region, other),
            ));
        }
        if region.last_row >= MAX_GRID_ROWS || region.last_col >= MAX_GRID_COLS {
            return Err(TimetableError::malformed(
                day,
                format!(
                    "merged region {:?} reaches past the {}x{} grid limit",
                    region, MAX_GRID_ROWS, MAX_GRID_COLS
                ),
            ));
        }
    }

    let height = merges
        .iter()
        .map(|r| r.last_row + 1)
        .chain(std::iter::once(rows.len()))
        .max()
        .unwrap_or(0);
    let width = merges
        .iter()
        .map(|r| r.last_col + 1)
        .chain(rows.iter().map(Vec::len))
        .max()
        .unwrap_or(0);

    let mut grid: Vec<Vec<String>> = (0..height)
        .map(|r| {
            let mut row = rows.get(r).cloned().unwrap_or_default();
            row.resize(width, String::new());
            row
        })
        .collect();

    for region in merges {
        let anchor = grid[region.first_row..=region.last_row]
            .iter()
            .flat_map(|row| row[region.first_col..=region.last_col].iter())
            .find(|text| !text.trim().is_empty())
            .cloned()
            .unwrap_or_default();
        for row in &mut grid[region.first_row..=region.last_row] {
            for cell in &mut row[region.first_col..=region.last_col] {
                cell.clone_from(&anchor);
            }
        }
    }

    debug!(day, rows = height, cols = width, merges = merges.len(), "normalized grid");
    Ok(grid)
}

/// Normalizes a raw sheet and cuts it into a [`Day`].
///
/// Rows with a blank slot label are skipped, as are slots starting at or after
/// `day_end` when one is given. A day left without slots or instructors is malformed.
pub fn build_day(
    index: usize,
    sheet: &RawSheet,
    layout: &SheetLayout,
    day_end: Option<NaiveTime>,
) -> Result<Day> {
    let grid = normalize_grid(&sheet.name, &sheet.rows, &sheet.merges)?;

    let columns: Vec<usize> = grid
        .get(layout.header_row)
        .map(|row| (0..row.len()).filter(|&c| c != layout.label_col).collect())
        .unwrap_or_default();
    let instructors: Vec<String> = columns
        .iter()
        .map(|&c| grid[layout.header_row][c].trim().to_string())
        .collect();
    if instructors.is_empty() {
        return Err(TimetableError::malformed(&sheet.name, "no instructor columns"));
    }

    let mut slots = Vec::new();
    let mut cells = Vec::new();
    for row in grid.iter().skip(layout.first_slot_row) {
        let label = row.get(layout.label_col).map(|s| s.trim()).unwrap_or("");
        if label.is_empty() {
            continue;
        }
        if let (Some(end), Some(start)) = (day_end, slot_start_time(label)) {
            if start >= end {
                continue;
            }
        }
        slots.push(TimeSlot {
            label: label.to_string(),
            position: slots.len(),
        });
        cells.push(columns.iter().map(|&c| row[c].trim().to_string()).collect());
    }
    if slots.is_empty() {
        return Err(TimetableError::malformed(&sheet.name, "no time slots"));
    }

    Ok(Day {
        name: sheet.name.clone(),
        index,
        slots,
        instructors,
        cells,
    })
}
