//! Recognition of individual IDs, group references and camp-wide activities in cell text.
//!
//! Every cell is classified once into a [`CellClass`]; resolution dispatches on
//! the class instead of re-matching strings per individual.

use regex::{Captures, Regex};

use crate::error::Result;

pub const DEFAULT_INDIVIDUAL_PATTERN: &str = r"\bF\d+\b";
pub const DEFAULT_GROUP_PATTERN: &str = r"(?i)\bgroups?\s+(\d+(?:\s*(?:,|&|and)\s*\d+)*)\b";
pub const DEFAULT_GROUP_PREFIX: &str = "Group";

/// Camp-wide activities seen on the master grids.
pub const DEFAULT_COMMON_ACTIVITIES: &[&str] = &[
    "Welcome",
    "Lunch",
    "Break",
    "Ensemble Coaching",
    "Workshop",
    "Toilet Break",
    "Rehearsal for Students and Friends Concert",
    "Students & Friends Concert",
    "After concert refreshment",
    "Group Activity",
    "Briefing for Saturday",
    "Master class with",
];

/// What a cell means before any individual is considered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellClass {
    Empty,
    /// Names individuals and/or groups; only those can pick it up.
    Referenced {
        individuals: Vec<String>,
        groups: Vec<String>,
        text: String,
    },
    /// Applies to everyone.
    Common(String),
    Unrecognized(String),
}

#[derive(Debug, Clone)]
pub struct Matchers {
    individual: Regex,
    group: Regex,
    group_prefix: String,
    common: Vec<String>,
}

impl Matchers {
    pub fn new(
        individual_pattern: &str,
        group_pattern: &str,
        group_prefix: &str,
        common: Vec<String>,
    ) -> Result<Self> {
        Ok(Self {
            individual: Regex::new(individual_pattern)?,
            group: Regex::new(group_pattern)?,
            group_prefix: group_prefix.trim().to_string(),
            common: common
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        })
    }

    pub fn camp_defaults() -> Result<Self> {
        Self::new(
            DEFAULT_INDIVIDUAL_PATTERN,
            DEFAULT_GROUP_PATTERN,
            DEFAULT_GROUP_PREFIX,
            DEFAULT_COMMON_ACTIVITIES.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Individual IDs in `text`, in order of appearance, without repeats.
    pub fn individuals_in(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for m in self.individual.find_iter(text) {
            let id = m.as_str().trim();
            if !id.is_empty() && !found.iter().any(|f| f == id) {
                found.push(id.to_string());
            }
        }
        found
    }

    /// Rewrites every individual ID in `text` with `name(id)`.
    pub fn replace_individuals<F>(&self, text: &str, name: F) -> String
    where
        F: Fn(&str) -> String,
    {
        self.individual
            .replace_all(text, |caps: &Captures| name(&caps[0]))
            .into_owned()
    }

    /// Group IDs referenced by `text`.
    ///
    /// With a capture group the capture is read as a list of numbers, each becoming
    /// "{prefix} {n}" ("Group 1, 2" names two groups). Without one the whole match is the ID.
    pub fn groups_in(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for caps in self.group.captures_iter(text) {
            let ids: Vec<String> = match caps.get(1) {
                Some(list) => list
                    .as_str()
                    .split(|c: char| !c.is_ascii_digit())
                    .filter(|n| !n.is_empty())
                    .map(|n| self.group_id(n))
                    .collect(),
                None => caps
                    .get(0)
                    .map(|m| vec![m.as_str().trim().to_string()])
                    .unwrap_or_default(),
            };
            for id in ids {
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }
        found
    }

    /// Canonical group ID for a roster entry: bare numbers get the group prefix.
    pub fn group_id(&self, raw: &str) -> String {
        let raw = raw.trim();
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) && !self.group_prefix.is_empty() {
            let n = raw.trim_start_matches('0');
            format!("{} {}", self.group_prefix, if n.is_empty() { "0" } else { n })
        } else {
            raw.to_string()
        }
    }

    pub fn is_common(&self, text: &str) -> bool {
        self.common.iter().any(|c| text.contains(c.as_str()))
    }

    pub fn classify(&self, text: &str) -> CellClass {
        let text = text.trim();
        if text.is_empty() {
            return CellClass::Empty;
        }
        let individuals = self.individuals_in(text);
        let groups = self.groups_in(text);
        if !individuals.is_empty() || !groups.is_empty() {
            return CellClass::Referenced {
                individuals,
                groups,
                text: text.to_string(),
            };
        }
        if self.is_common(text) {
            CellClass::Common(text.to_string())
        } else {
            CellClass::Unrecognized(text.to_string())
        }
    }
}

/// Removes every standalone occurrence of `token` from `text` and tidies what is left.
///
/// A standalone occurrence is not flanked by letters, digits or underscores, so
/// removing "F1" leaves "F12" alone.
pub fn strip_token(text: &str, token: &str) -> String {
    if token.is_empty() {
        return tidy(text);
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(token) {
        let before = rest[..at].chars().next_back();
        let after = rest[at + token.len()..].chars().next();
        let standalone = !before.is_some_and(is_word) && !after.is_some_and(is_word);
        out.push_str(&rest[..at]);
        if !standalone {
            out.push_str(token);
        } else {
            out.push(' ');
        }
        rest = &rest[at + token.len()..];
    }
    out.push_str(rest);
    tidy(&out)
}

fn tidy(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '&' | '/' | '-' | ':'))
        .to_string()
}
