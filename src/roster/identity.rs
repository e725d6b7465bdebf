use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::RosterError;

/// Separator used only for the textual form of a [`MemberId`] (config and logs).
pub const KEY_DELIMITER: char = '|';

/// Stable identity of a member: the group it belongs to plus its name.
///
/// Independent of where the member currently sits in the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId {
    pub group: String,
    pub member: String,
}

impl MemberId {
    pub fn new(group: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            member: member.into(),
        }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.group, KEY_DELIMITER, self.member)
    }
}

/// Parses `"Group|Member"`. Exactly one delimiter, neither side empty.
impl FromStr for MemberId {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(KEY_DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(group), Some(member), None) if !group.is_empty() && !member.is_empty() => {
                Ok(Self::new(group, member))
            }
            _ => Err(RosterError::MalformedKey(s.to_string())),
        }
    }
}

/// A (section, row) coordinate in the list as currently ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub section: usize,
    pub row: usize,
}

impl Position {
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.row)
    }
}
