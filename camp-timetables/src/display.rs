use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use csv::WriterBuilder;

use crate::error::Result;
use crate::schedule::Timetable;

/// Output flavour of the per-individual files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Removes characters that are not allowed in file names
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// File name for a timetable: "<display name>_timetable.<ext>", falling back to the ID
pub fn timetable_filename(timetable: &Timetable, format: OutputFormat) -> String {
    let mut stem = sanitize_filename(&timetable.display_name);
    if stem.is_empty() {
        stem = sanitize_filename(&timetable.individual);
    }
    format!("{}_timetable.{}", stem, format.extension())
}

/// Writes the table as CSV: a "Time" column then one column per day.
/// A span's label sits on its first row; the rows it covers below are left blank.
pub fn write_timetable_csv<W: Write>(timetable: &Timetable, out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().flexible(false).from_writer(out);

    let mut header = vec!["Time".to_string()];
    header.extend(timetable.days.iter().cloned());
    wtr.write_record(&header)?;

    for row in &timetable.rows {
        let mut record = vec![row.label.clone()];
        record.extend(
            row.cells
                .iter()
                .map(|cell| cell.as_ref().map(|c| c.activity.clone()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the table as text, one line per span:
/// ```text
/// ** Full Timetable **
/// == Monday ==
/// 09:00-09:30 Piano
/// 10:00 Lunch
/// ```
pub fn write_timetable_text<W: Write>(timetable: &Timetable, mut out: W) -> Result<()> {
    writeln!(out, "** {} **", timetable.title)?;
    writeln!(out, "{}", timetable.display_name)?;

    for (column, day) in timetable.days.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "== {} ==", day)?;
        for (row, cell) in timetable.column(column) {
            let start = timetable.rows.get(row).map(|r| r.label.as_str()).unwrap_or("");
            let end = timetable
                .rows
                .get(row + cell.rows - 1)
                .map(|r| r.label.as_str())
                .unwrap_or(start);
            let activity = cell.activity.replace('\n', " ");
            if cell.rows > 1 && end != start {
                writeln!(out, "{}-{} {}", start, end, activity)?;
            } else {
                writeln!(out, "{} {}", start, activity)?;
            }
        }
    }

    Ok(())
}

/// Writes one file per timetable into `output_dir`, creating it if needed.
/// Returns the paths written, in timetable order.
pub fn write_timetables(
    timetables: &[Timetable],
    output_dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(timetables.len());
    for timetable in timetables {
        let path = output_dir.join(timetable_filename(timetable, format));
        let file = File::create(&path)?;
        match format {
            OutputFormat::Csv => write_timetable_csv(timetable, file)?,
            OutputFormat::Text => write_timetable_text(timetable, file)?,
        }
        written.push(path);
    }
    Ok(written)
}

/// Prints a short overview of the run; `heading` names what the timetables are for
pub fn print_run_summary(heading: &str, timetables: &[Timetable]) {
    println!("\n=== Timetables ===");
    println!("{}: {}", heading, timetables.len());
    for timetable in timetables {
        let busy = timetable
            .rows
            .iter()
            .flat_map(|r| r.cells.iter().flatten())
            .filter(|c| c.activity != crate::schedule::FREE_TIME)
            .count();
        if timetable.display_name == timetable.individual {
            println!("  - {} ({} activities)", timetable.individual, busy);
        } else {
            println!(
                "  - {} (ID: {}, {} activities)",
                timetable.display_name, timetable.individual, busy
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{SpanCell, TimetableRow};

    fn timetable() -> Timetable {
        let cell = |a: &str, rows| {
            Some(SpanCell {
                activity: a.to_string(),
                rows,
            })
        };
        Timetable {
            individual: "F1".to_string(),
            display_name: "Alice: Chan?".to_string(),
            title: "Full Timetable".to_string(),
            days: vec!["Monday".to_string(), "Tuesday".to_string()],
            rows: vec![
                TimetableRow {
                    label: "09:00".to_string(),
                    cells: vec![cell("Piano", 2), cell("Free Time", 1)],
                },
                TimetableRow {
                    label: "09:30".to_string(),
                    cells: vec![None, None],
                },
                TimetableRow {
                    label: "10:00".to_string(),
                    cells: vec![cell("Lunch", 1), cell("Lunch", 1)],
                },
            ],
        }
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_filename("Alice: Chan?"), "Alice Chan");
        assert_eq!(sanitize_filename("a/b\\c\n"), "abc");
        assert_eq!(timetable_filename(&timetable(), OutputFormat::Csv), "Alice Chan_timetable.csv");
    }

    #[test]
    fn csv_leaves_span_continuations_blank() {
        let mut out = Vec::new();
        write_timetable_csv(&timetable(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Time,Monday,Tuesday\n09:00,Piano,Free Time\n09:30,,\n10:00,Lunch,Lunch\n"
        );
    }

    #[test]
    fn text_lists_spans_per_day() {
        let mut out = Vec::new();
        write_timetable_text(&timetable(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("** Full Timetable **\n"));
        assert!(text.contains("== Monday ==\n09:00-09:30 Piano\n10:00 Lunch\n"));
        assert!(text.contains("== Tuesday ==\n09:00 Free Time\n10:00 Lunch\n"));
    }
}
