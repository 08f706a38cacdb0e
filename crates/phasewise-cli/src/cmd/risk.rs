//! `pw risk`: the project's risk register.

use crate::output::{ListRow, OutputMode, render, render_list};
use anyhow::Result;
use clap::{Args, Subcommand};
use phasewise_core::model::{Risk, RiskLevel};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::{open_project, parse_enum_arg, store_failure};

#[derive(Subcommand, Debug)]
pub enum RiskCommand {
    #[command(about = "List risks with their indexes")]
    List {
        /// Project id or unique prefix.
        project: String,
    },

    #[command(
        about = "Add a risk",
        after_help = "EXAMPLES:\n    pw risk add k3f --category Technical --impact high --probability medium \\\n        --description \"Vendor API changes\" --mitigation \"Pin the API version\""
    )]
    Add {
        /// Project id or unique prefix.
        project: String,
        #[command(flatten)]
        fields: RiskFields,
    },

    #[command(about = "Change fields of a risk")]
    Update {
        /// Project id or unique prefix.
        project: String,
        /// Risk index (0-based).
        index: usize,
        #[command(flatten)]
        fields: RiskFields,
    },

    #[command(about = "Remove a risk")]
    Delete {
        /// Project id or unique prefix.
        project: String,
        /// Risk index (0-based).
        index: usize,
    },
}

#[derive(Args, Debug)]
pub struct RiskFields {
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// `high`, `medium` or `low`.
    #[arg(long)]
    pub impact: Option<String>,
    /// `high`, `medium` or `low`.
    #[arg(long)]
    pub probability: Option<String>,
    #[arg(long)]
    pub mitigation: Option<String>,
}

/// One row of `pw risk list`.
#[derive(Debug, Serialize)]
pub struct RiskRow {
    pub index: usize,
    #[serde(flatten)]
    pub risk: Risk,
}

impl ListRow for RiskRow {
    const COLUMNS: &'static [&'static str] = &["INDEX", "CATEGORY", "IMPACT", "PROBABILITY", "DESCRIPTION", "MITIGATION"];

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "[{}] {:<12} impact {:<6} probability {:<6} {}",
            self.index,
            self.risk.category,
            self.risk.impact.as_str(),
            self.risk.probability.as_str(),
            self.risk.description
        )?;
        if !self.risk.mitigation.is_empty() {
            writeln!(w, "    mitigation: {}", self.risk.mitigation)?;
        }
        Ok(())
    }

    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.index,
            self.risk.category,
            self.risk.impact,
            self.risk.probability,
            self.risk.description,
            self.risk.mitigation
        )
    }
}

fn level(raw: Option<&String>, fallback: RiskLevel, output: OutputMode) -> Result<RiskLevel> {
    raw.map_or(Ok(fallback), |raw| parse_enum_arg(raw, output))
}

/// Overlay the given fields onto `base`.
fn merge(base: Risk, args: &RiskFields, output: OutputMode) -> Result<Risk> {
    Ok(Risk {
        category: args.category.clone().unwrap_or(base.category),
        description: args.description.clone().unwrap_or(base.description),
        impact: level(args.impact.as_ref(), base.impact, output)?,
        probability: level(args.probability.as_ref(), base.probability, output)?,
        mitigation: args.mitigation.clone().unwrap_or(base.mitigation),
    })
}

fn new_risk_defaults() -> Risk {
    Risk {
        category: "General".into(),
        description: String::new(),
        impact: RiskLevel::Medium,
        probability: RiskLevel::Medium,
        mitigation: String::new(),
    }
}

pub fn run_risk(command: &RiskCommand, output: OutputMode, project_root: &Path) -> Result<()> {
    match command {
        RiskCommand::List { project } => {
            let (repo, id) = open_project(project_root, project, output)?;
            let rows: Vec<RiskRow> = repo
                .get(&id)
                .map_err(|err| store_failure(output, &err))?
                .risks
                .iter()
                .cloned()
                .enumerate()
                .map(|(index, risk)| RiskRow { index, risk })
                .collect();
            if rows.is_empty() && !output.is_json() {
                println!("No risks recorded.");
                return Ok(());
            }
            render_list(&rows, output)?;
            Ok(())
        }
        RiskCommand::Add { project, fields } => {
            let risk = merge(new_risk_defaults(), fields, output)?;
            let (mut repo, id) = open_project(project_root, project, output)?;
            let index = repo
                .add_risk(&id, risk.clone())
                .map_err(|err| store_failure(output, &err))?;
            render(output, &RiskRow { index, risk }, |r, w| {
                writeln!(w, "✓ Added risk {} ({}, impact {})", r.index, r.risk.category, r.risk.impact)
            })
        }
        RiskCommand::Update {
            project,
            index,
            fields,
        } => {
            let (mut repo, id) = open_project(project_root, project, output)?;
            let current = repo
                .get(&id)
                .map_err(|err| store_failure(output, &err))?
                .risks
                .get(*index)
                .cloned();
            // Out-of-range indexes fall through to the store's error.
            let risk = merge(current.unwrap_or_else(new_risk_defaults), fields, output)?;
            repo.update_risk(&id, *index, risk.clone())
                .map_err(|err| store_failure(output, &err))?;
            render(output, &RiskRow { index: *index, risk }, |r, w| {
                writeln!(w, "✓ Updated risk {}", r.index)
            })
        }
        RiskCommand::Delete { project, index } => {
            let (mut repo, id) = open_project(project_root, project, output)?;
            let risk = repo
                .delete_risk(&id, *index)
                .map_err(|err| store_failure(output, &err))?;
            render(output, &RiskRow { index: *index, risk }, |r, w| {
                writeln!(w, "✓ Deleted risk {} ({})", r.index, r.risk.category)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RiskFields {
        RiskFields {
            category: None,
            description: None,
            impact: None,
            probability: None,
            mitigation: None,
        }
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let base = Risk {
            category: "Technical".into(),
            description: "API drift".into(),
            impact: RiskLevel::High,
            probability: RiskLevel::Low,
            mitigation: "Pin versions".into(),
        };
        let mut overlay = args();
        overlay.probability = Some("MEDIUM".into());
        let merged = merge(base.clone(), &overlay, OutputMode::Json).expect("merge");
        assert_eq!(merged.probability, RiskLevel::Medium);
        assert_eq!(merged.impact, RiskLevel::High);
        assert_eq!(merged.category, base.category);
        assert_eq!(merged.mitigation, base.mitigation);
    }

    #[test]
    fn new_risks_default_to_medium() {
        let risk = merge(new_risk_defaults(), &args(), OutputMode::Json).expect("merge");
        assert_eq!(risk.impact, RiskLevel::Medium);
        assert_eq!(risk.category, "General");
    }
}
