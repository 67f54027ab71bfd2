use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

/// Who belongs to which group, plus display names and instructor rooms.
///
/// Lookups for unknown IDs return empty sets: an individual may be real but ungrouped.
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    names: BTreeMap<String, String>,
    groups_of: HashMap<String, BTreeSet<String>>,
    members: BTreeMap<String, BTreeSet<String>>,
    rooms: HashMap<String, String>,
}

static EMPTY: BTreeSet<String> = BTreeSet::new();

impl RosterIndex {
    /// Builds the index from (individual, display name) pairs and (group, members) pairs.
    /// Blank IDs are skipped; a group listed twice accumulates its members.
    pub fn build<N, G, M>(names: N, groups: G) -> Self
    where
        N: IntoIterator<Item = (String, String)>,
        G: IntoIterator<Item = (String, M)>,
        M: IntoIterator<Item = String>,
    {
        let mut index = RosterIndex::default();

        for (id, name) in names {
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            let name = name.trim();
            let name = if name.is_empty() { id } else { name };
            index.names.insert(id.to_string(), name.to_string());
        }

        for (group, group_members) in groups {
            let group = group.trim().to_string();
            if group.is_empty() {
                continue;
            }
            let entry = index.members.entry(group.clone()).or_default();
            for member in group_members {
                let member = member.trim();
                if member.is_empty() {
                    continue;
                }
                entry.insert(member.to_string());
                index
                    .groups_of
                    .entry(member.to_string())
                    .or_default()
                    .insert(group.clone());
            }
        }

        debug!(
            individuals = index.names.len(),
            groups = index.members.len(),
            "built roster index"
        );
        index
    }

    /// Attaches the instructor → room directory.
    pub fn with_rooms<R>(mut self, rooms: R) -> Self
    where
        R: IntoIterator<Item = (String, String)>,
    {
        self.rooms = rooms
            .into_iter()
            .map(|(instructor, room)| (instructor.trim().to_string(), room.trim().to_string()))
            .filter(|(instructor, room)| !instructor.is_empty() && !room.is_empty())
            .collect();
        self
    }

    pub fn member_of(&self, individual: &str) -> &BTreeSet<String> {
        self.groups_of.get(individual).unwrap_or(&EMPTY)
    }

    pub fn members_of(&self, group: &str) -> &BTreeSet<String> {
        self.members.get(group).unwrap_or(&EMPTY)
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.members.contains_key(group)
    }

    pub fn is_member(&self, individual: &str, group: &str) -> bool {
        self.member_of(individual).contains(group)
    }

    /// Display name from the roster, falling back to the ID itself.
    pub fn display_name<'a>(&'a self, individual: &'a str) -> &'a str {
        self.names
            .get(individual)
            .map(String::as_str)
            .unwrap_or(individual)
    }

    pub fn room_for(&self, instructor: &str) -> Option<&str> {
        self.rooms.get(instructor.trim()).map(String::as_str)
    }

    /// Every individual the roster knows about: named ones and group members.
    pub fn individuals(&self) -> impl Iterator<Item = &str> {
        self.names
            .keys()
            .chain(self.groups_of.keys())
            .map(String::as_str)
    }
}
