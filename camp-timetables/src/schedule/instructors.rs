//! The grid read column-wise: one timetable per instructor.
//!
//! An instructor's column is their day as written, with every individual ID
//! swapped for the participant's display name and empty cells read as free time.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::Result;

use super::assembler::assemble;
use super::compactor::compact_days;
use super::normalize::RawSheet;
use super::pipeline::{build_days, TimetableOptions};
use super::roster::RosterIndex;
use super::slot_utils::{day_header, ordered_row_labels};
use super::types::{Assignment, Day, Timetable, FREE_TIME};

/// Every named instructor column across all days, sorted and without repeats.
pub fn instructor_names(days: &[Day]) -> BTreeSet<String> {
    days.iter()
        .flat_map(|day| day.instructors.iter())
        .filter(|name| !name.is_empty())
        .cloned()
        .collect()
}

/// One assignment per slot of `day` for the instructor's column.
/// A day without that column has no assignments.
fn instructor_day(
    instructor: &str,
    day: &Day,
    roster: &RosterIndex,
    options: &TimetableOptions,
) -> Vec<Assignment> {
    let Some(column) = day.instructors.iter().position(|i| i == instructor) else {
        debug!(instructor, day = %day.name, "no column on this day");
        return Vec::new();
    };
    day.slots
        .iter()
        .map(|slot| {
            let text = day.cell(slot.position, column);
            let activity = if text.is_empty() {
                FREE_TIME.to_string()
            } else {
                options
                    .matchers
                    .replace_individuals(text, |id| roster.display_name(id).to_string())
            };
            Assignment {
                individual: instructor.to_string(),
                day: day.index,
                slot: slot.clone(),
                activity,
            }
        })
        .collect()
}

/// Builds one timetable per instructor, ordered by name. Fails like
/// [`build_timetables`](super::pipeline::build_timetables) on a malformed grid.
pub fn build_instructor_timetables(
    sheets: &[RawSheet],
    roster: &RosterIndex,
    options: &TimetableOptions,
) -> Result<Vec<Timetable>> {
    let days = build_days(sheets, options)?;

    let headers: Vec<String> = days.iter().map(|d| day_header(d, options.start_date)).collect();
    let row_labels = ordered_row_labels(&days);
    let slot_labels: Vec<Vec<String>> = days
        .iter()
        .map(|d| d.slots.iter().map(|s| s.label.clone()).collect())
        .collect();

    let timetables: Vec<Timetable> = instructor_names(&days)
        .iter()
        .map(|instructor| {
            let assignments: Vec<Assignment> = days
                .iter()
                .flat_map(|day| instructor_day(instructor, day, roster, options))
                .collect();
            let spans = compact_days(&assignments, days.len());
            assemble(instructor, instructor, &headers, &row_labels, &spans, &slot_labels)
        })
        .collect();

    info!(
        days = days.len(),
        instructors = timetables.len(),
        "built instructor timetables"
    );
    Ok(timetables)
}
