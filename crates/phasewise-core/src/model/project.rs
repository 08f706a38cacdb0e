use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{ParseEnumError, Phase, new_id};

/// Impact and probability scale for risks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseEnumError {
                expected: "risk level",
                got: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Risk {
    pub category: String,
    pub description: String,
    pub impact: RiskLevel,
    pub probability: RiskLevel,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub role: String,
    pub responsibilities: Vec<String>,
    pub allocation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meeting {
    pub title: String,
    pub schedule: String,
    pub audience: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Communication {
    pub stakeholders: Vec<String>,
    pub meetings: Vec<Meeting>,
}

/// Four fixed budget lines, in the project's currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Budget {
    pub personnel_costs: f64,
    pub technology_tools: f64,
    pub marketing_launch: f64,
    pub contingency: f64,
}

impl Budget {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.personnel_costs + self.technology_tools + self.marketing_launch + self.contingency
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub phases: Vec<Phase>,
    pub team_members: Vec<TeamMember>,
    pub budget: Budget,
    pub risks: Vec<Risk>,
    pub communication: Communication,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// A new project seeded with the standard five-phase template, a
    /// two-person team and a kickoff meeting.
    pub fn from_template(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let phases = [
            ("Planning Phase", "2 weeks", "Initial project planning and requirement gathering"),
            ("Design Phase", "3 weeks", "System design and architecture planning"),
            ("Development Phase", "8 weeks", "Core development and implementation"),
            ("Testing Phase", "2 weeks", "Quality assurance and testing"),
            ("Deployment Phase", "1 week", "Production deployment and launch"),
        ]
        .into_iter()
        .map(|(name, duration, content)| Phase::new(name, duration).with_content(content))
        .collect();

        let team_members = vec![
            TeamMember {
                role: "Project Manager".into(),
                responsibilities: vec!["Project coordination".into(), "Timeline management".into()],
                allocation: "100%".into(),
            },
            TeamMember {
                role: "Developer".into(),
                responsibilities: vec![
                    "Code development".into(),
                    "Technical implementation".into(),
                ],
                allocation: "100%".into(),
            },
        ];

        let communication = Communication {
            stakeholders: vec!["Project Sponsor".into(), "Team Lead".into()],
            meetings: vec![Meeting {
                title: "Project Kickoff".into(),
                schedule: "Week 1 - Monday 10:00 AM".into(),
                audience: "All Team Members".into(),
                content: "Project introduction, goals overview, and team introductions".into(),
            }],
        };

        Self {
            id: new_id(),
            name: name.into(),
            phases,
            team_members,
            budget: Budget::default(),
            risks: Vec::new(),
            communication,
            created_at,
        }
    }

    /// The phase appended by "add phase".
    #[must_use]
    pub fn blank_phase() -> Phase {
        Phase::new("New Phase", "1 week").with_content("Phase description")
    }

    #[must_use]
    pub fn reviewer_totals(&self) -> (usize, usize) {
        self.phases.iter().fold((0, 0), |(total, approved), phase| {
            (total + phase.reviewers.len(), approved + phase.approved_reviewers())
        })
    }

    #[must_use]
    pub fn has_high_impact_risk(&self) -> bool {
        self.risks.iter().any(|r| r.impact == RiskLevel::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_five_undated_phases() {
        let project = Project::from_template("Apollo", Utc::now());
        let names: Vec<&str> = project.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Planning Phase",
                "Design Phase",
                "Development Phase",
                "Testing Phase",
                "Deployment Phase"
            ]
        );
        assert!(project.phases.iter().all(|p| !p.is_dated()));
        assert_eq!(project.phases[2].duration, "8 weeks");
        assert_eq!(project.team_members.len(), 2);
        assert_eq!(project.communication.meetings[0].title, "Project Kickoff");
        assert!(project.risks.is_empty());
        assert!(project.budget.total().abs() < f64::EPSILON);
    }

    #[test]
    fn budget_total_sums_all_lines() {
        let budget = Budget {
            personnel_costs: 1000.0,
            technology_tools: 250.5,
            marketing_launch: 100.0,
            contingency: 49.5,
        };
        assert!((budget.total() - 1400.0).abs() < 1e-9);
    }

    #[test]
    fn risk_level_round_trips_through_text() {
        for level in [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low] {
            assert_eq!(level.as_str().parse::<RiskLevel>(), Ok(level));
        }
        assert_eq!("HIGH".parse::<RiskLevel>(), Ok(RiskLevel::High));
        assert!("critical".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn blank_phase_matches_defaults() {
        let phase = Project::blank_phase();
        assert_eq!(phase.name, "New Phase");
        assert_eq!(phase.duration, "1 week");
        assert_eq!(phase.content.as_deref(), Some("Phase description"));
    }
}
