use std::collections::BTreeSet;

use tracing::info;

use super::matcher::Matchers;
use super::roster::RosterIndex;
use super::types::Day;

/// Every individual that gets a timetable: IDs found in any cell of any day,
/// plus everyone the roster knows. Sorted so iteration order is reproducible.
pub fn scan_individuals(days: &[Day], matchers: &Matchers, roster: &RosterIndex) -> BTreeSet<String> {
    let mut found: BTreeSet<String> = days
        .iter()
        .flat_map(|day| day.cells.iter().flatten())
        .flat_map(|text| matchers.individuals_in(text))
        .collect();
    let in_grid = found.len();

    found.extend(roster.individuals().map(str::to_string));
    info!(in_grid, total = found.len(), "scanned individuals");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::TimeSlot;

    fn day(cells: &[&str]) -> Day {
        Day {
            name: "Monday".to_string(),
            index: 0,
            slots: cells
                .iter()
                .enumerate()
                .map(|(position, _)| TimeSlot {
                    label: format!("{:02}:00", 9 + position),
                    position,
                })
                .collect(),
            instructors: vec!["Teacher A".to_string()],
            cells: cells.iter().map(|c| vec![c.to_string()]).collect(),
        }
    }

    #[test]
    fn unions_grid_and_roster_sorted() {
        let days = vec![day(&["F2 & F10 Duet", "Lunch"]), day(&["F1"])];
        let roster = RosterIndex::build(
            vec![("F3".to_string(), "Carol".to_string())],
            vec![("Group 1".to_string(), vec!["F4".to_string()])],
        );
        let m = Matchers::camp_defaults().unwrap();
        let ids: Vec<String> = scan_individuals(&days, &m, &roster).into_iter().collect();
        assert_eq!(ids, vec!["F1", "F10", "F2", "F3", "F4"]);
    }

    #[test]
    fn never_fabricates_ids() {
        let days = vec![day(&["F1", "F1", "Lunch"])];
        let m = Matchers::camp_defaults().unwrap();
        let ids = scan_individuals(&days, &m, &RosterIndex::default());
        assert!(!ids.contains("F5"));
        assert_eq!(ids.len(), 1);
    }
}
