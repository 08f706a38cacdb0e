//! Portfolio-wide aggregates across every project in a store.

use serde::Serialize;

use crate::duration::leading_count;
use crate::model::{Project, RiskLevel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskCounts {
    const fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }
}

/// One project's row in the overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub phases: usize,
    pub team_members: usize,
    pub risks: usize,
    pub budget: f64,
    pub budget_share_percent: f64,
    pub weeks: u64,
    pub weeks_share_percent: f64,
    pub reviewers_total: usize,
    pub reviewers_approved: usize,
    pub completion_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub total_phases: usize,
    pub total_team_members: usize,
    pub total_risks: usize,
    pub total_budget: f64,
    pub average_budget: f64,
    /// Sum of the leading number of every phase's duration label.
    pub total_weeks: u64,
    pub average_weeks: f64,
    pub risks_by_impact: RiskCounts,
    pub high_risk_projects: Vec<String>,
    pub projects: Vec<ProjectSummary>,
}

fn project_weeks(project: &Project) -> u64 {
    project
        .phases
        .iter()
        .map(|phase| u64::from(leading_count(&phase.duration)))
        .sum()
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

impl PortfolioSummary {
    #[must_use]
    pub fn from_projects(projects: &[Project]) -> Self {
        let total_projects = projects.len();
        let total_budget: f64 = projects.iter().map(|p| p.budget.total()).sum();
        let total_weeks: u64 = projects.iter().map(project_weeks).sum();

        let mut risks_by_impact = RiskCounts::default();
        for risk in projects.iter().flat_map(|p| &p.risks) {
            risks_by_impact.record(risk.impact);
        }

        let rows = projects
            .iter()
            .map(|project| {
                let budget = project.budget.total();
                let weeks = project_weeks(project);
                let (reviewers_total, reviewers_approved) = project.reviewer_totals();
                ProjectSummary {
                    id: project.id.clone(),
                    name: project.name.clone(),
                    phases: project.phases.len(),
                    team_members: project.team_members.len(),
                    risks: project.risks.len(),
                    budget,
                    budget_share_percent: percent(budget, total_budget),
                    weeks,
                    weeks_share_percent: percent(weeks as f64, total_weeks as f64),
                    reviewers_total,
                    reviewers_approved,
                    completion_percent: percent(
                        reviewers_approved as f64,
                        reviewers_total as f64,
                    ),
                }
            })
            .collect();

        let average = |total: f64| {
            if total_projects == 0 {
                0.0
            } else {
                total / total_projects as f64
            }
        };

        Self {
            total_projects,
            total_phases: projects.iter().map(|p| p.phases.len()).sum(),
            total_team_members: projects.iter().map(|p| p.team_members.len()).sum(),
            total_risks: projects.iter().map(|p| p.risks.len()).sum(),
            total_budget,
            average_budget: average(total_budget),
            total_weeks,
            average_weeks: average(total_weeks as f64),
            risks_by_impact,
            high_risk_projects: projects
                .iter()
                .filter(|p| p.has_high_impact_risk())
                .map(|p| p.name.clone())
                .collect(),
            projects: rows,
        }
    }
}
