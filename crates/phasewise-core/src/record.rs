//! Stored record shapes and their conversion to the typed model.
//!
//! Everything read from disk passes through here. The `*Record` structs
//! mirror the JSON layout loosely: every field is optional or defaulted, and
//! dates, timestamps and enum values stay as strings. [`decode_project`]
//! turns a record into a [`Project`] and reports anything it had to repair
//! as a [`MalformedRecord`]:
//!
//! - a project without an id or name cannot be used and is rejected outright;
//! - a phase with an unparseable date keeps its other fields and loses only
//!   that date, so a single bad row never empties a whole timeline;
//! - an unknown risk level falls back to `Medium`, an unknown review status
//!   to `Pending`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ErrorCode;
use crate::model::{
    Attachment, Budget, Communication, Meeting, Phase, PhaseReviewer, Project, ReviewStatus, Risk,
    RiskLevel, TeamMember,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored value that could not be turned into its typed form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{record}: field `{field}` {problem}")]
pub struct MalformedRecord {
    /// Which record, e.g. `project k3j9x0a1b phase 2`.
    pub record: String,
    pub field: &'static str,
    pub problem: String,
}

impl MalformedRecord {
    pub fn new(record: impl Into<String>, field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            field,
            problem: problem.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::MalformedRecord
    }
}

/// A decoded value plus the repairs made on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub issues: Vec<MalformedRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub created_at: Option<String>,
    pub phases: Vec<PhaseRecord>,
    pub team_members: Vec<TeamMemberRecord>,
    pub budget: Option<BudgetRecord>,
    pub risks: Vec<RiskRecord>,
    pub communication: CommunicationRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub attachments: Vec<AttachmentRecord>,
    pub reviewers: Vec<ReviewerRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub size: u64,
    pub url: String,
    pub uploaded_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewerRecord {
    pub id: String,
    pub role: String,
    pub status: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskRecord {
    pub category: String,
    pub description: String,
    pub impact: String,
    pub probability: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMemberRecord {
    pub role: String,
    pub responsibilities: Vec<String>,
    pub allocation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingRecord {
    pub title: String,
    pub schedule: String,
    pub audience: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationRecord {
    pub stakeholders: Vec<String>,
    pub meetings: Vec<MeetingRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetRecord {
    pub personnel_costs: f64,
    pub technology_tools: f64,
    pub marketing_launch: f64,
    pub contingency: f64,
}

/// Parse an ISO-8601 calendar date.
///
/// Accepts `2024-01-31`, RFC 3339 timestamps and naive `2024-01-31T09:30:00`.
/// Any time of day is dropped.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|ts| ts.date())
        .map_err(|_| format!("is not an ISO-8601 date: {raw:?}"))
}

/// Empty strings count as "no date".
fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_date(text).map(Some),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| format!("is not an RFC 3339 timestamp: {raw:?}"))
}

/// Convert a stored project into the typed model.
///
/// Fails only when the record has no usable identity.
pub fn decode_project(record: ProjectRecord) -> Result<Decoded<Project>, MalformedRecord> {
    let id = record.id.trim().to_string();
    if id.is_empty() {
        return Err(MalformedRecord::new("project <unknown>", "id", "is missing"));
    }
    let label = format!("project {id}");
    if record.name.trim().is_empty() {
        return Err(MalformedRecord::new(label, "name", "is missing"));
    }

    let mut issues = Vec::new();

    let created_at = match record.created_at.as_deref() {
        None => DateTime::<Utc>::UNIX_EPOCH,
        Some(raw) => parse_timestamp(raw).unwrap_or_else(|problem| {
            issues.push(MalformedRecord::new(label.clone(), "created_at", problem));
            DateTime::<Utc>::UNIX_EPOCH
        }),
    };

    let phases = record
        .phases
        .into_iter()
        .enumerate()
        .map(|(index, phase)| decode_phase(&format!("{label} phase {index}"), phase, &mut issues))
        .collect();

    let risks = record
        .risks
        .into_iter()
        .enumerate()
        .map(|(index, risk)| decode_risk(&format!("{label} risk {index}"), risk, &mut issues))
        .collect();

    let team_members = record
        .team_members
        .into_iter()
        .map(|m| TeamMember {
            role: m.role,
            responsibilities: m.responsibilities,
            allocation: m.allocation,
        })
        .collect();

    let budget = record.budget.map_or_else(Budget::default, |b| Budget {
        personnel_costs: b.personnel_costs,
        technology_tools: b.technology_tools,
        marketing_launch: b.marketing_launch,
        contingency: b.contingency,
    });

    let communication = Communication {
        stakeholders: record.communication.stakeholders,
        meetings: record
            .communication
            .meetings
            .into_iter()
            .map(|m| Meeting {
                title: m.title,
                schedule: m.schedule,
                audience: m.audience,
                content: m.content,
            })
            .collect(),
    };

    Ok(Decoded {
        value: Project {
            id,
            name: record.name,
            phases,
            team_members,
            budget,
            risks,
            communication,
            created_at,
        },
        issues,
    })
}

fn decode_phase(label: &str, record: PhaseRecord, issues: &mut Vec<MalformedRecord>) -> Phase {
    let mut date_field = |field: &'static str, raw: Option<&str>| {
        parse_optional_date(raw).unwrap_or_else(|problem| {
            issues.push(MalformedRecord::new(label, field, problem));
            None
        })
    };
    let start_date = date_field("start_date", record.start_date.as_deref());
    let end_date = date_field("end_date", record.end_date.as_deref());

    let attachments = record
        .attachments
        .into_iter()
        .map(|a| Attachment {
            uploaded_at: a
                .uploaded_at
                .as_deref()
                .map_or(Ok(DateTime::<Utc>::UNIX_EPOCH), parse_timestamp)
                .unwrap_or_else(|problem| {
                    issues.push(MalformedRecord::new(label, "attachments.uploaded_at", problem));
                    DateTime::<Utc>::UNIX_EPOCH
                }),
            id: a.id,
            name: a.name,
            media_type: a.media_type,
            size: a.size,
            url: a.url,
        })
        .collect();

    let reviewers = record
        .reviewers
        .into_iter()
        .map(|r| {
            let status = if r.status.trim().is_empty() {
                ReviewStatus::Pending
            } else {
                r.status.parse::<ReviewStatus>().unwrap_or_else(|err| {
                    issues.push(MalformedRecord::new(label, "reviewers.status", err.to_string()));
                    ReviewStatus::Pending
                })
            };
            let reviewed_at = r.reviewed_at.as_deref().and_then(|raw| {
                parse_timestamp(raw)
                    .map_err(|problem| {
                        issues.push(MalformedRecord::new(label, "reviewers.reviewed_at", problem));
                    })
                    .ok()
            });
            PhaseReviewer {
                id: r.id,
                role: r.role,
                status,
                comment: r.comment,
                reviewed_at,
            }
        })
        .collect();

    Phase {
        name: record.name,
        start_date,
        end_date,
        duration: record.duration,
        content: record.content,
        attachments,
        reviewers,
    }
}

fn decode_risk(label: &str, record: RiskRecord, issues: &mut Vec<MalformedRecord>) -> Risk {
    let mut level = |field: &'static str, raw: &str| {
        raw.parse::<RiskLevel>().unwrap_or_else(|err| {
            issues.push(MalformedRecord::new(label, field, err.to_string()));
            RiskLevel::Medium
        })
    };
    let impact = level("impact", &record.impact);
    let probability = level("probability", &record.probability);
    Risk {
        category: record.category,
        description: record.description,
        impact,
        probability,
        mitigation: record.mitigation,
    }
}

/// Decode every project in a stored list, skipping unusable entries.
///
/// Each entry is decoded on its own; a bad entry is logged and reported but
/// never prevents the others from loading.
#[must_use]
pub fn decode_projects(entries: Vec<serde_json::Value>) -> Decoded<Vec<Project>> {
    let mut projects = Vec::with_capacity(entries.len());
    let mut issues = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let record = match serde_json::from_value::<ProjectRecord>(entry) {
            Ok(record) => record,
            Err(err) => {
                issues.push(MalformedRecord::new(
                    format!("entry {index}"),
                    "<record>",
                    err.to_string(),
                ));
                continue;
            }
        };
        match decode_project(record) {
            Ok(decoded) => {
                issues.extend(decoded.issues);
                projects.push(decoded.value);
            }
            Err(err) => issues.push(err),
        }
    }

    for issue in &issues {
        warn!(code = %issue.code(), "{issue}");
    }

    Decoded {
        value: projects,
        issues,
    }
}

/// Convert a project back to its stored form.
#[must_use]
pub fn encode_project(project: &Project) -> ProjectRecord {
    let date = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string());

    ProjectRecord {
        id: project.id.clone(),
        name: project.name.clone(),
        created_at: Some(project.created_at.to_rfc3339()),
        phases: project
            .phases
            .iter()
            .map(|p| PhaseRecord {
                name: p.name.clone(),
                start_date: date(p.start_date),
                end_date: date(p.end_date),
                duration: p.duration.clone(),
                content: p.content.clone(),
                attachments: p
                    .attachments
                    .iter()
                    .map(|a| AttachmentRecord {
                        id: a.id.clone(),
                        name: a.name.clone(),
                        media_type: a.media_type.clone(),
                        size: a.size,
                        url: a.url.clone(),
                        uploaded_at: Some(a.uploaded_at.to_rfc3339()),
                    })
                    .collect(),
                reviewers: p
                    .reviewers
                    .iter()
                    .map(|r| ReviewerRecord {
                        id: r.id.clone(),
                        role: r.role.clone(),
                        status: r.status.as_str().to_string(),
                        comment: r.comment.clone(),
                        reviewed_at: r.reviewed_at.map(|ts| ts.to_rfc3339()),
                    })
                    .collect(),
            })
            .collect(),
        team_members: project
            .team_members
            .iter()
            .map(|m| TeamMemberRecord {
                role: m.role.clone(),
                responsibilities: m.responsibilities.clone(),
                allocation: m.allocation.clone(),
            })
            .collect(),
        budget: Some(BudgetRecord {
            personnel_costs: project.budget.personnel_costs,
            technology_tools: project.budget.technology_tools,
            marketing_launch: project.budget.marketing_launch,
            contingency: project.budget.contingency,
        }),
        risks: project
            .risks
            .iter()
            .map(|r| RiskRecord {
                category: r.category.clone(),
                description: r.description.clone(),
                impact: r.impact.as_str().to_string(),
                probability: r.probability.as_str().to_string(),
                mitigation: r.mitigation.clone(),
            })
            .collect(),
        communication: CommunicationRecord {
            stakeholders: project.communication.stakeholders.clone(),
            meetings: project
                .communication
                .meetings
                .iter()
                .map(|m| MeetingRecord {
                    title: m.title.clone(),
                    schedule: m.schedule.clone(),
                    audience: m.audience.clone(),
                    content: m.content.clone(),
                })
                .collect(),
        },
    }
}
