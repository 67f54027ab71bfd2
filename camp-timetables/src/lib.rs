//! Personal camp timetables from a shared multi-day activity grid.
//!
//! The master grid has one sheet per day, one row per time slot and one column per
//! instructor. Each individual's timetable is resolved slot by slot from the cells
//! that name them, their groups or the whole camp, then compacted into spans.

pub mod config;
pub mod display;
pub mod error;
pub mod parser;
pub mod schedule;

pub use error::{Result, TimetableError};
