use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use crate::error::Result;

use super::assembler::assemble;
use super::compactor::compact_days;
use super::matcher::Matchers;
use super::normalize::{build_day, RawSheet};
use super::resolver::AssignmentResolver;
use super::roster::RosterIndex;
use super::scanner::scan_individuals;
use super::slot_utils::{day_header, ordered_row_labels};
use super::types::{Day, SheetLayout, Timetable};

/// Everything about a run that is not data.
#[derive(Debug, Clone)]
pub struct TimetableOptions {
    pub matchers: Matchers,
    pub layout: SheetLayout,
    pub column_priority: Vec<String>,
    pub lesson_label: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub day_end: Option<NaiveTime>,
}

impl TimetableOptions {
    pub fn camp_defaults() -> Result<Self> {
        Ok(Self {
            matchers: Matchers::camp_defaults()?,
            layout: SheetLayout::default(),
            column_priority: Vec::new(),
            lesson_label: None,
            start_date: None,
            day_end: None,
        })
    }
}

/// Normalizes every sheet into a day. Fails on the first malformed sheet.
pub fn build_days(sheets: &[RawSheet], options: &TimetableOptions) -> Result<Vec<Day>> {
    sheets
        .iter()
        .enumerate()
        .map(|(index, sheet)| build_day(index, sheet, &options.layout, options.day_end))
        .collect()
}

/// Runs the whole reconciliation and returns one timetable per individual,
/// ordered by ID. All days are normalized before anything is resolved, so a
/// malformed grid fails the run before any timetable exists.
pub fn build_timetables(
    sheets: &[RawSheet],
    roster: &RosterIndex,
    options: &TimetableOptions,
) -> Result<Vec<Timetable>> {
    let days = build_days(sheets, options)?;
    let individuals = scan_individuals(&days, &options.matchers, roster);

    let resolver = AssignmentResolver::new(
        &days,
        roster,
        &options.matchers,
        &options.column_priority,
        options.lesson_label.as_deref(),
    );

    let headers: Vec<String> = days.iter().map(|d| day_header(d, options.start_date)).collect();
    let row_labels = ordered_row_labels(&days);
    let slot_labels: Vec<Vec<String>> = days
        .iter()
        .map(|d| d.slots.iter().map(|s| s.label.clone()).collect())
        .collect();

    let timetables: Vec<Timetable> = individuals
        .iter()
        .map(|individual| {
            let assignments = resolver.resolve_all(std::iter::once(individual.as_str()));
            let spans = compact_days(&assignments, days.len());
            assemble(
                individual,
                roster.display_name(individual),
                &headers,
                &row_labels,
                &spans,
                &slot_labels,
            )
        })
        .collect();

    info!(
        days = days.len(),
        individuals = timetables.len(),
        rows = row_labels.len(),
        "built timetables"
    );
    Ok(timetables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimetableError;
    use crate::schedule::normalize::MergedRegion;
    use crate::schedule::types::SpanCell;

    fn sheet(name: &str, data: &[&[&str]], merges: Vec<MergedRegion>) -> RawSheet {
        RawSheet {
            name: name.to_string(),
            rows: data
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            merges,
        }
    }

    fn cell(activity: &str, rows: usize) -> Option<SpanCell> {
        Some(SpanCell {
            activity: activity.to_string(),
            rows,
        })
    }

    #[test]
    fn monday_example() {
        let sheets = vec![sheet(
            "Monday",
            &[&["Time", "Teacher A"], &["09:00", "F1"], &["09:30", ""], &["10:00", "Lunch"]],
            vec![MergedRegion::new(1, 2, 1, 1)],
        )];
        let options = TimetableOptions::camp_defaults().unwrap();
        let tables = build_timetables(&sheets, &RosterIndex::default(), &options).unwrap();

        assert_eq!(tables.len(), 1);
        let f1 = &tables[0];
        assert_eq!(f1.individual, "F1");
        assert_eq!(f1.display_name, "F1");
        assert_eq!(f1.days, vec!["Monday"]);
        assert_eq!(f1.rows[0].cells[0], cell("F1", 2));
        assert_eq!(f1.rows[1].cells[0], None);
        assert_eq!(f1.rows[2].cells[0], cell("Lunch", 1));
    }

    #[test]
    fn roster_only_individual_gets_free_time() {
        let sheets = vec![sheet("Monday", &[&["Time", "Teacher A"], &["09:00", "F1"]], vec![])];
        let roster = RosterIndex::build(
            vec![("F9".to_string(), "Nina".to_string())],
            Vec::<(String, Vec<String>)>::new(),
        );
        let options = TimetableOptions::camp_defaults().unwrap();
        let tables = build_timetables(&sheets, &roster, &options).unwrap();

        let ids: Vec<&str> = tables.iter().map(|t| t.individual.as_str()).collect();
        assert_eq!(ids, vec!["F1", "F9"]);
        assert_eq!(tables[1].display_name, "Nina");
        assert_eq!(tables[1].rows[0].cells[0], cell("Free Time", 1));
    }

    #[test]
    fn unreferenced_id_is_not_fabricated() {
        let sheets = vec![sheet("Monday", &[&["Time", "Teacher A"], &["09:00", "F1"]], vec![])];
        let options = TimetableOptions::camp_defaults().unwrap();
        let tables = build_timetables(&sheets, &RosterIndex::default(), &options).unwrap();
        assert!(tables.iter().all(|t| t.individual != "F5"));
    }

    #[test]
    fn malformed_day_aborts_whole_run() {
        let sheets = vec![
            sheet("Monday", &[&["Time", "Teacher A"], &["09:00", "F1"]], vec![]),
            sheet(
                "Tuesday",
                &[&["Time", "Teacher A"], &["09:00", "F1"]],
                vec![MergedRegion::new(0, 1, 1, 1), MergedRegion::new(1, 1, 0, 1)],
            ),
        ];
        let options = TimetableOptions::camp_defaults().unwrap();
        let err = build_timetables(&sheets, &RosterIndex::default(), &options).unwrap_err();
        assert!(matches!(err, TimetableError::MalformedGrid { ref day, .. } if day == "Tuesday"));
    }

    #[test]
    fn start_date_names_columns() {
        let sheets = vec![
            sheet("Day 1", &[&["Time", "Teacher A"], &["09:00", "F1"]], vec![]),
            sheet("Day 2", &[&["Time", "Teacher A"], &["09:00", "Lunch"]], vec![]),
        ];
        let mut options = TimetableOptions::camp_defaults().unwrap();
        options.start_date = NaiveDate::from_ymd_opt(2025, 7, 14);
        let tables = build_timetables(&sheets, &RosterIndex::default(), &options).unwrap();
        assert_eq!(tables[0].days, vec!["14 July (Monday)", "15 July (Tuesday)"]);
    }
}
