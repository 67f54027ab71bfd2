use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::matcher::{strip_token, CellClass, Matchers};
use super::roster::RosterIndex;
use super::types::{Assignment, Day, FREE_TIME};

/// Column scan order for a day: instructors named in `priority` first, in that
/// order, then the remaining columns in sheet order.
pub fn column_order(day: &Day, priority: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = Vec::with_capacity(day.instructors.len());
    for name in priority {
        if let Some(column) = day.instructors.iter().position(|i| i == name.trim()) {
            if !order.contains(&column) {
                order.push(column);
            }
        }
    }
    for column in 0..day.instructors.len() {
        if !order.contains(&column) {
            order.push(column);
        }
    }
    order
}

/// Decides the activity of every (individual, day, slot).
///
/// For one slot the columns are walked in their configured order and the first
/// cell that names the individual, directly or through a known group, wins. Within
/// one cell a direct match is preferred, so the individual's own token is stripped.
/// Only when no column names the individual does a camp-wide activity apply, and
/// failing that [`FREE_TIME`].
///
/// A double booking resolves to the first column in order; it is logged, not rejected.
pub struct AssignmentResolver<'a> {
    days: &'a [Day],
    roster: &'a RosterIndex,
    lesson_label: Option<&'a str>,
    classified: Vec<Vec<Vec<CellClass>>>, // [day][slot][column]
    orders: Vec<Vec<usize>>,
}

impl<'a> AssignmentResolver<'a> {
    pub fn new(
        days: &'a [Day],
        roster: &'a RosterIndex,
        matchers: &Matchers,
        column_priority: &[String],
        lesson_label: Option<&'a str>,
    ) -> Self {
        let classified: Vec<Vec<Vec<CellClass>>> = days
            .iter()
            .map(|day| {
                day.cells
                    .iter()
                    .map(|row| row.iter().map(|text| matchers.classify(text)).collect())
                    .collect()
            })
            .collect();

        let mut unknown_groups: BTreeMap<&str, &str> = BTreeMap::new();
        for (day, slots) in days.iter().zip(&classified) {
            for class in slots.iter().flatten() {
                if let CellClass::Referenced { groups, .. } = class {
                    for group in groups {
                        if !roster.contains_group(group) {
                            unknown_groups.entry(group.as_str()).or_insert(day.name.as_str());
                        }
                    }
                }
            }
        }
        for (group, day) in unknown_groups {
            warn!(group, day, "grid references a group missing from the roster; treating as no match");
        }

        let orders = days.iter().map(|day| column_order(day, column_priority)).collect();

        Self {
            days,
            roster,
            lesson_label,
            classified,
            orders,
        }
    }

    /// Activity label for one individual at one slot of one day.
    pub fn resolve_slot(&self, individual: &str, day: usize, position: usize) -> String {
        let (Some(cells), Some(order)) = (
            self.classified.get(day).and_then(|d| d.get(position)),
            self.orders.get(day),
        ) else {
            return FREE_TIME.to_string();
        };
        let columns: Vec<(usize, &CellClass)> = order
            .iter()
            .filter_map(|&c| cells.get(c).map(|class| (c, class)))
            .collect();

        for (i, &(column, class)) in columns.iter().enumerate() {
            if !self.names(class, individual) {
                continue;
            }
            if let Some(&(other, _)) = columns[i + 1..]
                .iter()
                .find(|(_, later)| self.names(later, individual))
            {
                debug!(individual, day, position, column, other, "double-booked; first column wins");
            }
            return match class {
                CellClass::Referenced { individuals, text, .. }
                    if individuals.iter().any(|id| id == individual) =>
                {
                    self.direct_label(individual, text, day, column)
                }
                CellClass::Referenced { text, .. } => text.clone(),
                _ => FREE_TIME.to_string(),
            };
        }

        columns
            .iter()
            .find_map(|(_, class)| match class {
                CellClass::Common(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_else(|| FREE_TIME.to_string())
    }

    /// True when the cell references the individual, directly or through a group.
    fn names(&self, class: &CellClass, individual: &str) -> bool {
        match class {
            CellClass::Referenced { individuals, groups, .. } => {
                individuals.iter().any(|id| id == individual)
                    || groups.iter().any(|g| self.roster.is_member(individual, g))
            }
            _ => false,
        }
    }

    fn direct_label(&self, individual: &str, text: &str, day: usize, column: usize) -> String {
        let stripped = strip_token(text, individual);
        if !stripped.is_empty() {
            return stripped;
        }
        let instructor = self.days.get(day).map(|d| d.instructor(column)).unwrap_or("");
        match self.lesson_label {
            Some(template) if !instructor.is_empty() => {
                let mut label = template.replace("{instructor}", instructor);
                if let Some(room) = self.roster.room_for(instructor) {
                    label.push_str(&format!(" ({})", room));
                }
                label
            }
            _ => text.to_string(),
        }
    }

    /// One assignment per slot of the day, in slot order.
    pub fn resolve_day(&self, individual: &str, day: usize) -> Vec<Assignment> {
        let Some(d) = self.days.get(day) else {
            return Vec::new();
        };
        d.slots
            .iter()
            .map(|slot| Assignment {
                individual: individual.to_string(),
                day,
                slot: slot.clone(),
                activity: self.resolve_slot(individual, day, slot.position),
            })
            .collect()
    }

    /// Assignments for every individual over every day; |individuals| × Σ|slots| entries.
    pub fn resolve_all<'i, I>(&self, individuals: I) -> Vec<Assignment>
    where
        I: IntoIterator<Item = &'i str>,
    {
        individuals
            .into_iter()
            .flat_map(|individual| {
                (0..self.days.len()).flat_map(move |day| self.resolve_day(individual, day))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::TimeSlot;

    fn day(instructors: &[&str], rows: &[(&str, &[&str])]) -> Day {
        Day {
            name: "Monday".to_string(),
            index: 0,
            slots: rows
                .iter()
                .enumerate()
                .map(|(position, (label, _))| TimeSlot {
                    label: label.to_string(),
                    position,
                })
                .collect(),
            instructors: instructors.iter().map(|s| s.to_string()).collect(),
            cells: rows
                .iter()
                .map(|(_, cells)| cells.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn roster() -> RosterIndex {
        RosterIndex::build(
            Vec::<(String, String)>::new(),
            vec![
                ("Group 1".to_string(), vec!["F1".to_string(), "F2".to_string()]),
                ("Group 2".to_string(), vec!["F3".to_string()]),
            ],
        )
        .with_rooms(vec![("Teacher B".to_string(), "Room 12".to_string())])
    }

    fn matchers() -> Matchers {
        Matchers::camp_defaults().unwrap()
    }

    #[test]
    fn earlier_group_column_beats_later_direct_column() {
        let days = vec![day(&["Teacher A", "Teacher B"], &[("09:00", &["Group 1 Orchestra", "F1 Piano"])])];
        let (r, m) = (roster(), matchers());
        let resolver = AssignmentResolver::new(&days, &r, &m, &[], None);
        assert_eq!(resolver.resolve_slot("F1", 0, 0), "Group 1 Orchestra");
        assert_eq!(resolver.resolve_slot("F2", 0, 0), "Group 1 Orchestra");

        let priority = vec!["Teacher B".to_string()];
        let reordered = AssignmentResolver::new(&days, &r, &m, &priority, None);
        assert_eq!(reordered.resolve_slot("F1", 0, 0), "Piano");
    }

    #[test]
    fn earlier_direct_column_beats_later_group_column() {
        let days = vec![day(&["Teacher A", "Teacher B"], &[("09:00", &["F1 Piano", "Group 1 Orchestra"])])];
        let (r, m) = (roster(), matchers());
        let resolver = AssignmentResolver::new(&days, &r, &m, &[], None);
        assert_eq!(resolver.resolve_slot("F1", 0, 0), "Piano");
        assert_eq!(resolver.resolve_slot("F2", 0, 0), "Group 1 Orchestra");
    }

    #[test]
    fn same_cell_with_id_and_group_is_direct_for_named_individual() {
        let days = vec![day(&["Teacher A"], &[("09:00", &["F1 Group 1 Sectional"])])];
        let (r, m) = (roster(), matchers());
        let resolver = AssignmentResolver::new(&days, &r, &m, &[], None);
        assert_eq!(resolver.resolve_slot("F1", 0, 0), "Group 1 Sectional");
        assert_eq!(resolver.resolve_slot("F2", 0, 0), "F1 Group 1 Sectional");
        assert_eq!(resolver.resolve_slot("F3", 0, 0), FREE_TIME);
    }

    #[test]
    fn group_and_direct_beat_common_in_earlier_column() {
        let days = vec![day(&["Teacher A", "Teacher B"], &[("12:00", &["Lunch", "Group 2 Theory"])])];
        let (r, m) = (roster(), matchers());
        let resolver = AssignmentResolver::new(&days, &r, &m, &[], None);
        assert_eq!(resolver.resolve_slot("F3", 0, 0), "Group 2 Theory");
        assert_eq!(resolver.resolve_slot("F1", 0, 0), "Lunch");
    }

    #[test]
    fn unknown_group_falls_through() {
        let days = vec![day(&["Teacher A", "Teacher B"], &[("09:00", &["Group 7 Choir", "Welcome Speech"])])];
        let (r, m) = (roster(), matchers());
        let resolver = AssignmentResolver::new(&days, &r, &m, &[], None);
        assert_eq!(resolver.resolve_slot("F1", 0, 0), "Welcome Speech");
    }

    #[test]
    fn no_match_is_free_time() {
        let days = vec![day(&["Teacher A"], &[("09:00", &["F2"]), ("09:30", &[""])])];
        let (r, m) = (roster(), matchers());
        let resolver = AssignmentResolver::new(&days, &r, &m, &[], None);
        assert_eq!(resolver.resolve_slot("F1", 0, 0), FREE_TIME);
        assert_eq!(resolver.resolve_slot("F1", 0, 1), FREE_TIME);
    }

    #[test]
    fn double_booking_follows_column_order() {
        let days = vec![day(&["Teacher A", "Teacher B"], &[("09:00", &["F1 Cello", "F1 Theory"])])];
        let (r, m) = (roster(), matchers());
        let sheet_order = AssignmentResolver::new(&days, &r, &m, &[], None);
        assert_eq!(sheet_order.resolve_slot("F1", 0, 0), "Cello");

        let priority = vec!["Teacher B".to_string()];
        let reordered = AssignmentResolver::new(&days, &r, &m, &priority, None);
        assert_eq!(reordered.resolve_slot("F1", 0, 0), "Theory");
    }

    #[test]
    fn bare_id_keeps_text_or_uses_lesson_label() {
        let days = vec![day(&["Teacher A", "Teacher B"], &[("09:00", &["F1", "F2"])])];
        let (r, m) = (roster(), matchers());
        let plain = AssignmentResolver::new(&days, &r, &m, &[], None);
        assert_eq!(plain.resolve_slot("F1", 0, 0), "F1");

        let labelled = AssignmentResolver::new(&days, &r, &m, &[], Some("Private Lesson with {instructor}"));
        assert_eq!(labelled.resolve_slot("F1", 0, 0), "Private Lesson with Teacher A");
        assert_eq!(labelled.resolve_slot("F2", 0, 0), "Private Lesson with Teacher B (Room 12)");
    }

    #[test]
    fn assignments_are_total() {
        let days = vec![
            day(&["Teacher A"], &[("09:00", &["F1"]), ("09:30", &["Lunch"])]),
            day(&["Teacher A", "Teacher B"], &[("10:00", &["", "F2"])]),
        ];
        let (r, m) = (roster(), matchers());
        let resolver = AssignmentResolver::new(&days, &r, &m, &[], None);
        let individuals = ["F1", "F2", "F3"];
        let all = resolver.resolve_all(individuals.iter().copied());
        assert_eq!(all.len(), 3 * 3);
        for individual in individuals {
            for (d, dd) in days.iter().enumerate() {
                for slot in &dd.slots {
                    let count = all
                        .iter()
                        .filter(|a| a.individual == individual && a.day == d && a.slot == *slot)
                        .count();
                    assert_eq!(count, 1);
                }
            }
        }
    }
}
