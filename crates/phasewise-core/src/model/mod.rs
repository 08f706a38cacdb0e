//! Domain records for projects, phases and users.
//!
//! These are the validated, typed shapes the rest of the crate works with.
//! Stored JSON is converted into them by [`crate::record`]; nothing in this
//! module touches the filesystem.

pub mod phase;
pub mod project;
pub mod user;

use rand::Rng;
use std::fmt;

pub use phase::{Attachment, NewAttachment, Phase, PhaseReviewer, PhaseUpdate, ReviewStatus};
pub use project::{Budget, Communication, Meeting, Project, Risk, RiskLevel, TeamMember};
pub use user::{User, UserRole};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Generate a fresh 9-character base-36 identifier.
#[must_use]
pub fn new_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect()
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_base36_and_fixed_length() {
        for _ in 0..64 {
            let id = new_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)), "bad id {id}");
        }
    }

    #[test]
    fn ids_do_not_repeat_in_practice() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_enum_error_display() {
        let err = ParseEnumError {
            expected: "risk level",
            got: "severe".into(),
        };
        assert_eq!(err.to_string(), "invalid risk level: 'severe'");
    }
}
