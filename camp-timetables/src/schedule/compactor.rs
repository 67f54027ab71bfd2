use super::types::{Assignment, Span};

/// Merges the assignments of one (individual, day), given in slot order, into maximal spans.
///
/// Labels are compared exactly after trimming; the spans cover every slot once.
pub fn compact_day(assignments: &[Assignment]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for assignment in assignments {
        let activity = assignment.activity.trim();
        match spans.last_mut() {
            Some(current) if current.activity == activity => {
                current.end = assignment.slot.clone();
            }
            _ => spans.push(Span {
                individual: assignment.individual.clone(),
                day: assignment.day,
                start: assignment.slot.clone(),
                end: assignment.slot.clone(),
                activity: activity.to_string(),
            }),
        }
    }
    spans
}

/// Splits an individual's assignments by day and compacts each day.
/// `day_count` days are returned even when some have no assignments.
pub fn compact_days(assignments: &[Assignment], day_count: usize) -> Vec<Vec<Span>> {
    (0..day_count)
        .map(|day| {
            let mut todays: Vec<Assignment> = assignments
                .iter()
                .filter(|a| a.day == day)
                .cloned()
                .collect();
            todays.sort_by_key(|a| a.slot.position);
            compact_day(&todays)
        })
        .collect()
}
