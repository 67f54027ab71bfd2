use tracing::debug;

use super::slot_utils::row_index;
use super::types::{Span, SpanCell, Timetable, TimetableRow, TIMETABLE_TITLE};

/// Lays one individual's spans out as a table: rows are `row_labels`, columns are days.
///
/// A span's slots are mapped to their rows and each run of adjacent rows becomes
/// one cell, so a span never covers a row the day has no slot for. Rows a day has
/// no slot for stay blank.
pub fn assemble(
    individual: &str,
    display_name: &str,
    day_headers: &[String],
    row_labels: &[String],
    day_spans: &[Vec<Span>],
    day_slot_labels: &[Vec<String>],
) -> Timetable {
    let rows_by_label = row_index(row_labels);
    let mut rows: Vec<TimetableRow> = row_labels
        .iter()
        .map(|label| TimetableRow {
            label: label.clone(),
            cells: vec![None; day_headers.len()],
        })
        .collect();

    for (column, spans) in day_spans.iter().enumerate().take(day_headers.len()) {
        let labels = day_slot_labels.get(column).map(Vec::as_slice).unwrap_or(&[]);
        for span in spans {
            let span_rows: Vec<usize> = (span.start.position..=span.end.position)
                .filter_map(|p| labels.get(p))
                .filter_map(|label| rows_by_label.get(label.as_str()).copied())
                .collect();
            for (row, height) in row_runs(&span_rows) {
                let Some(cell) = rows.get_mut(row).and_then(|r| r.cells.get_mut(column)) else {
                    continue;
                };
                if cell.is_some() {
                    debug!(individual, column, row, "row already taken by an earlier span");
                    continue;
                }
                *cell = Some(SpanCell {
                    activity: span.activity.clone(),
                    rows: height,
                });
            }
        }
    }

    Timetable {
        individual: individual.to_string(),
        display_name: display_name.to_string(),
        title: TIMETABLE_TITLE.to_string(),
        days: day_headers.to_vec(),
        rows,
    }
}

/// Splits row indices into (first row, height) runs of consecutive rows.
fn row_runs(rows: &[usize]) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &row in rows {
        match runs.last_mut() {
            Some((first, height)) if *first + *height == row => *height += 1,
            _ => runs.push((row, 1)),
        }
    }
    runs
}
