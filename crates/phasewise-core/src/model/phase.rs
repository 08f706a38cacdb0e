use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ParseEnumError;

/// Review decision recorded by a phase reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseEnumError {
                expected: "review status",
                got: s.to_string(),
            }),
        }
    }
}

/// A reviewer slot on a phase, keyed by role rather than by person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseReviewer {
    pub id: String,
    pub role: String,
    pub status: ReviewStatus,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// A file reference attached to a phase. Only metadata is kept; the bytes
/// live wherever `url` points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Caller-supplied attachment metadata; id and timestamp are assigned on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub url: String,
}

/// A named, optionally dated stage of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Free-text label. Authoritative only while a date is missing.
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub attachments: Vec<Attachment>,
    pub reviewers: Vec<PhaseReviewer>,
}

impl Phase {
    pub fn new(name: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_date: None,
            end_date: None,
            duration: duration.into(),
            content: None,
            attachments: Vec::new(),
            reviewers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Both dates, when the phase has both.
    #[must_use]
    pub const fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_dated(&self) -> bool {
        self.dates().is_some()
    }

    #[must_use]
    pub fn approved_reviewers(&self) -> usize {
        self.reviewers
            .iter()
            .filter(|r| r.status == ReviewStatus::Approved)
            .count()
    }

    /// Overwrite the editable fields with a committed draft.
    pub fn apply(&mut self, update: PhaseUpdate) {
        self.name = update.name;
        self.start_date = update.start_date;
        self.end_date = update.end_date;
        self.duration = update.duration;
        self.content = update.content;
        self.reviewers = update.reviewers;
    }
}

/// The full set of editable phase fields produced by committing a draft.
///
/// Attachments are not part of an update; they are appended separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseUpdate {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration: String,
    pub content: Option<String>,
    pub reviewers: Vec<PhaseReviewer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn dates_requires_both_ends() {
        let mut phase = Phase::new("Design", "3 weeks");
        assert!(phase.dates().is_none());
        phase.start_date = Some(date(2024, 1, 1));
        assert!(!phase.is_dated());
        phase.end_date = Some(date(2024, 1, 9));
        assert_eq!(phase.dates(), Some((date(2024, 1, 1), date(2024, 1, 9))));
    }

    #[test]
    fn apply_keeps_attachments() {
        let mut phase = Phase::new("Build", "8 weeks");
        phase.attachments.push(Attachment {
            id: "a1".into(),
            name: "spec.pdf".into(),
            media_type: "application/pdf".into(),
            size: 10,
            url: "file:///tmp/spec.pdf".into(),
            uploaded_at: Utc::now(),
        });

        phase.apply(PhaseUpdate {
            name: "Build v2".into(),
            start_date: Some(date(2024, 3, 1)),
            end_date: None,
            duration: "2 weeks".into(),
            content: Some("core work".into()),
            reviewers: Vec::new(),
        });

        assert_eq!(phase.name, "Build v2");
        assert_eq!(phase.attachments.len(), 1);
        assert_eq!(phase.content.as_deref(), Some("core work"));
    }

    #[test]
    fn review_status_parses_case_insensitively() {
        assert_eq!("Approved".parse::<ReviewStatus>(), Ok(ReviewStatus::Approved));
        assert_eq!(" rejected ".parse::<ReviewStatus>(), Ok(ReviewStatus::Rejected));
        assert!("maybe".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn approved_count_ignores_pending_and_rejected() {
        let mut phase = Phase::new("QA", "2 weeks");
        for (id, status) in [
            ("r1", ReviewStatus::Approved),
            ("r2", ReviewStatus::Pending),
            ("r3", ReviewStatus::Rejected),
            ("r4", ReviewStatus::Approved),
        ] {
            phase.reviewers.push(PhaseReviewer {
                id: id.into(),
                role: "sponsor".into(),
                status,
                comment: String::new(),
                reviewed_at: None,
            });
        }
        assert_eq!(phase.approved_reviewers(), 2);
    }
}
