use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::error::Result;
use crate::schedule::{Matchers, MergedRegion, RawSheet, RosterIndex};

/// Reads a file as text, dropping a UTF-8 byte-order mark if the spreadsheet export left one
fn read_text(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)?;
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

/// Loads one day of the master grid from CSV.
///
/// Rows may have different lengths; normalization pads them later. `merges`
/// holds A1 ranges such as "B3:B5".
pub fn load_day_sheet<P: AsRef<Path>>(name: &str, csv_path: P, merges: &[String]) -> Result<RawSheet> {
    let text = read_text(csv_path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<String>>());
    }

    let merges = merges
        .iter()
        .map(|range| MergedRegion::parse(range))
        .collect::<Result<Vec<_>>>()?;

    debug!(day = name, rows = rows.len(), merges = merges.len(), "loaded grid");
    Ok(RawSheet {
        name: name.to_string(),
        rows,
        merges,
    })
}

/// Loads every day listed in the config, in config order
pub fn load_sheets(config: &RunConfig) -> Result<Vec<RawSheet>> {
    config
        .days
        .iter()
        .map(|day| load_day_sheet(&day.name, config.resolve(&day.grid), &day.merges))
        .collect()
}

#[derive(Debug, Deserialize)]
struct NameRecord {
    #[serde(alias = "id", alias = "individual")]
    student_no: String,
    #[serde(alias = "name", alias = "display_name")]
    student_name: String,
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    #[serde(alias = "group", alias = "group_id")]
    group_number: String,
    #[serde(alias = "members")]
    student_no: String,
}

#[derive(Debug, Deserialize)]
struct RoomRecord {
    #[serde(alias = "instructor")]
    teacher_name: String,
    #[serde(alias = "room")]
    room_number: String,
}

fn read_records<T, P>(path: P) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let text = read_text(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

/// Optional mapping files degrade to empty when missing, with a warning
fn read_optional<T, P>(path: Option<P>, what: &str) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "{} file not found; continuing without it", what);
        return Ok(Vec::new());
    }
    read_records(path)
}

/// (individual ID, display name) pairs
pub fn load_name_mapping<P: AsRef<Path>>(path: Option<P>) -> Result<Vec<(String, String)>> {
    let records: Vec<NameRecord> = read_optional(path, "roster")?;
    Ok(records
        .into_iter()
        .filter(|r| !r.student_no.is_empty() && !r.student_name.is_empty())
        .map(|r| (r.student_no, r.student_name))
        .collect())
}

/// (group ID, member IDs) pairs. Member IDs are pulled out of free text with the
/// individual matcher; bare group numbers get the configured prefix.
pub fn load_group_mapping<P: AsRef<Path>>(
    path: Option<P>,
    matchers: &Matchers,
) -> Result<Vec<(String, Vec<String>)>> {
    let records: Vec<GroupRecord> = read_optional(path, "group")?;
    Ok(records
        .into_iter()
        .filter(|r| !r.group_number.is_empty())
        .map(|r| (matchers.group_id(&r.group_number), matchers.individuals_in(&r.student_no)))
        .filter(|(_, members)| !members.is_empty())
        .collect())
}

/// (instructor, room) pairs
pub fn load_room_mapping<P: AsRef<Path>>(path: Option<P>) -> Result<Vec<(String, String)>> {
    let records: Vec<RoomRecord> = read_optional(path, "room")?;
    Ok(records
        .into_iter()
        .filter(|r| !r.teacher_name.is_empty() && !r.room_number.is_empty())
        .map(|r| (r.teacher_name, r.room_number))
        .collect())
}

/// Builds the roster index from the mapping files named in the config
pub fn load_roster(config: &RunConfig, matchers: &Matchers) -> Result<RosterIndex> {
    let names = load_name_mapping(config.roster.as_ref().map(|p| config.resolve(p)))?;
    let groups = load_group_mapping(config.groups.as_ref().map(|p| config.resolve(p)), matchers)?;
    let rooms = load_room_mapping(config.rooms.as_ref().map(|p| config.resolve(p)))?;
    Ok(RosterIndex::build(names, groups).with_rooms(rooms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_ragged_grid_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "monday.csv",
            "\u{feff}Time,Teacher A,Teacher B\n09:00,F1\n09:30,,\"Lunch, canteen\"\n",
        );
        let sheet = load_day_sheet("Monday", &path, &["B2:B3".to_string()]).unwrap();
        assert_eq!(sheet.rows[0][0], "Time");
        assert_eq!(sheet.rows[1].len(), 2);
        assert_eq!(sheet.rows[2][2], "Lunch, canteen");
        assert_eq!(sheet.merges, vec![MergedRegion::new(1, 2, 1, 1)]);
    }

    #[test]
    fn bad_merge_range_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "monday.csv", "Time,A\n");
        assert!(load_day_sheet("Monday", &path, &["nope".to_string()]).is_err());
    }

    #[test]
    fn reads_mappings() {
        let dir = tempfile::tempdir().unwrap();
        let names = write_file(dir.path(), "names.csv", "student_no,student_name\nF1, Alice Chan \nF2,\n");
        let groups = write_file(dir.path(), "groups.csv", "group_number,student_no\n1,\"F1, F2\"\n2,none\n");
        let m = Matchers::camp_defaults().unwrap();

        assert_eq!(
            load_name_mapping(Some(&names)).unwrap(),
            vec![("F1".to_string(), "Alice Chan".to_string())]
        );
        assert_eq!(
            load_group_mapping(Some(&groups), &m).unwrap(),
            vec![("Group 1".to_string(), vec!["F1".to_string(), "F2".to_string()])]
        );
    }

    #[test]
    fn missing_mapping_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.csv");
        assert!(load_name_mapping(Some(&missing)).unwrap().is_empty());
        assert!(load_room_mapping(None::<&Path>).unwrap().is_empty());
    }
}
