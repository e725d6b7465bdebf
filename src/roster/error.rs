use thiserror::Error;

use super::identity::Position;

/// Invariant violations raised by the roster model.
///
/// Every variant is a caller bug, not an environmental failure. Hosts are
/// expected to propagate these and exit rather than recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("section {section} out of range (have {count} sections)")]
    SectionOutOfRange { section: usize, count: usize },

    #[error("position {position} out of range (section has {count} rows)")]
    IndexOutOfRange { position: Position, count: usize },

    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("group listed twice: {0}")]
    DuplicateGroup(String),

    #[error("member {member:?} appears twice in group {group:?}")]
    DuplicateMember { group: String, member: String },

    #[error("invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("malformed identity key: {0:?}")]
    MalformedKey(String),
}
