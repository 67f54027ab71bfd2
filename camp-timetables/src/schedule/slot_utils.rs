use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveTime};

use super::types::Day;

/// Parses a clock time such as "09:00", "9:30" or "09:00:00"
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

/// Start time of a slot label; ranges like "09:00-09:30" or "09:00–09:30" use their first half
pub fn slot_start_time(label: &str) -> Option<NaiveTime> {
    let start = label.split(['-', '–', '—']).next().unwrap_or(label);
    parse_clock_time(start)
}

/// Column header for a day: the calendar date when the camp start is known, else the sheet name
pub fn day_header(day: &Day, start_date: Option<NaiveDate>) -> String {
    match start_date {
        Some(start) => {
            let date = start + Duration::days(day.index as i64);
            date.format("%d %B (%A)").to_string()
        }
        None => day.name.clone(),
    }
}

/// Union of the slot labels of all days, in display order.
///
/// Labels are collected by (position, day order) of first appearance. When every
/// label reads as a clock time the rows are sorted chronologically instead, which
/// interleaves days whose slot grids differ.
pub fn ordered_row_labels(days: &[Day]) -> Vec<String> {
    let mut keyed: Vec<(usize, usize, &str)> = days
        .iter()
        .flat_map(|day| {
            day.slots
                .iter()
                .map(move |slot| (slot.position, day.index, slot.label.as_str()))
        })
        .collect();
    keyed.sort_by_key(|(position, day, _)| (*position, *day));

    let mut labels: Vec<String> = Vec::new();
    for (_, _, label) in keyed {
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }

    let times: Option<Vec<NaiveTime>> = labels.iter().map(|l| slot_start_time(l)).collect();
    if let Some(times) = times {
        let mut paired: Vec<(NaiveTime, String)> = times.into_iter().zip(labels).collect();
        paired.sort_by_key(|(time, _)| *time);
        labels = paired.into_iter().map(|(_, label)| label).collect();
    }
    labels
}

/// Maps each row label to its row index
pub fn row_index(labels: &[String]) -> HashMap<&str, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect()
}
