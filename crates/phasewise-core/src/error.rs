use std::fmt;

/// Machine-readable error codes surfaced by the CLI and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    ProjectNotFound,
    AmbiguousId,
    PhaseIndexOutOfRange,
    RiskIndexOutOfRange,
    UnknownReviewer,
    InvalidEnumValue,
    DuplicateReviewerRole,
    UnknownUser,
    TimelineEditDenied,
    MalformedRecord,
    InvalidDate,
    StoreWriteFailed,
    StoreReadFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// The `E####` tag shown in `error[...]` and in JSON errors.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::ProjectNotFound => "E2001",
            Self::AmbiguousId => "E2002",
            Self::PhaseIndexOutOfRange => "E2003",
            Self::RiskIndexOutOfRange => "E2004",
            Self::UnknownReviewer => "E2005",
            Self::InvalidEnumValue => "E2006",
            Self::DuplicateReviewerRole => "E2007",
            Self::UnknownUser => "E4001",
            Self::TimelineEditDenied => "E4002",
            Self::MalformedRecord => "E3001",
            Self::InvalidDate => "E3002",
            Self::StoreWriteFailed => "E5001",
            Self::StoreReadFailed => "E5002",
            Self::LockContention => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// One-line summary of the failure class.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Workspace not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::ProjectNotFound => "Project not found",
            Self::AmbiguousId => "Ambiguous project ID",
            Self::PhaseIndexOutOfRange => "Phase index out of range",
            Self::RiskIndexOutOfRange => "Risk index out of range",
            Self::UnknownReviewer => "Reviewer not found on phase",
            Self::InvalidEnumValue => "Invalid role/status/level value",
            Self::DuplicateReviewerRole => "Role already has a reviewer slot",
            Self::UnknownUser => "User not found",
            Self::TimelineEditDenied => "Role may not edit the timeline",
            Self::MalformedRecord => "Malformed stored record",
            Self::InvalidDate => "Date is not ISO-8601",
            Self::StoreWriteFailed => "Project store write failed",
            Self::StoreReadFailed => "Project store read failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `pw init` to create a .phasewise/ workspace."),
            Self::ConfigParseError => Some("Fix syntax in .phasewise/config.toml and retry."),
            Self::ProjectNotFound => Some("Run `pw project list` to see known project IDs."),
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::PhaseIndexOutOfRange | Self::RiskIndexOutOfRange => {
                Some("Indexes start at 0; run `pw project show <id>` to list them.")
            }
            Self::UnknownReviewer => None,
            Self::InvalidEnumValue => Some("Use one of the documented values."),
            Self::DuplicateReviewerRole => {
                Some("Each role reviews a phase once; decide on the existing slot instead.")
            }
            Self::UnknownUser => Some("Run `pw users` to list known usernames."),
            Self::TimelineEditDenied => {
                Some("Only admins, product managers and sponsors can change phases.")
            }
            Self::MalformedRecord => {
                Some("Inspect .phasewise/projects.json; the record was skipped or repaired.")
            }
            Self::InvalidDate => Some("Use YYYY-MM-DD or an RFC 3339 timestamp."),
            Self::StoreWriteFailed | Self::StoreReadFailed => {
                Some("Check disk space and permissions on .phasewise/.")
            }
            Self::LockContention => Some("Retry after the other `pw` process releases its lock."),
            Self::InternalUnexpected => Some("Rerun with -v and report the log if it happens again."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 17] = [
        ErrorCode::NotInitialized,
        ErrorCode::ConfigParseError,
        ErrorCode::ProjectNotFound,
        ErrorCode::AmbiguousId,
        ErrorCode::PhaseIndexOutOfRange,
        ErrorCode::RiskIndexOutOfRange,
        ErrorCode::UnknownReviewer,
        ErrorCode::InvalidEnumValue,
        ErrorCode::DuplicateReviewerRole,
        ErrorCode::UnknownUser,
        ErrorCode::TimelineEditDenied,
        ErrorCode::MalformedRecord,
        ErrorCode::InvalidDate,
        ErrorCode::StoreWriteFailed,
        ErrorCode::StoreReadFailed,
        ErrorCode::LockContention,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let text = code.code();
            assert_eq!(text.len(), 5);
            assert!(text.starts_with('E'));
            assert!(text.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_matches_code() {
        assert_eq!(ErrorCode::InvalidDate.to_string(), "E3002");
    }
}
