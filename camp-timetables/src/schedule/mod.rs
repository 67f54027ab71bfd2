pub mod types;
pub mod slot_utils;
pub mod normalize;
pub mod roster;
pub mod matcher;
pub mod scanner;
pub mod resolver;
pub mod compactor;
pub mod assembler;
pub mod pipeline;
pub mod instructors;

pub use types::{Assignment, Day, SheetLayout, Span, SpanCell, Timetable, TimetableRow, TimeSlot, FREE_TIME};
pub use normalize::{build_day, normalize_grid, MergedRegion, RawSheet};
pub use roster::RosterIndex;
pub use matcher::{CellClass, Matchers};
pub use scanner::scan_individuals;
pub use resolver::AssignmentResolver;
pub use compactor::{compact_day, compact_days};
pub use assembler::assemble;
pub use pipeline::{build_days, build_timetables, TimetableOptions};
pub use instructors::{build_instructor_timetables, instructor_names};
