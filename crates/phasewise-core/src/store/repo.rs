use chrono::{DateTime, Utc};
use tracing::info;

use super::{ProjectStore, StoreError};
use crate::model::{
    Attachment, Budget, Communication, NewAttachment, Phase, PhaseUpdate, Project, Risk,
    TeamMember, new_id,
};

/// Project operations over any [`ProjectStore`].
///
/// Every mutation loads the stored list afresh, changes one project, saves
/// the whole list and re-fetches. Concurrent writers resolve as last write
/// wins. The cached list is ordered newest first.
#[derive(Debug)]
pub struct ProjectRepo<S> {
    store: S,
    projects: Vec<Project>,
}

impl<S: ProjectStore> ProjectRepo<S> {
    pub fn open(store: S) -> Result<Self, StoreError> {
        let mut repo = Self {
            store,
            projects: Vec::new(),
        };
        repo.refresh()?;
        Ok(repo)
    }

    pub fn refresh(&mut self) -> Result<(), StoreError> {
        let mut projects = self.store.load()?;
        sort_newest_first(&mut projects);
        self.projects = projects;
        Ok(())
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn get(&self, id: &str) -> Result<&Project, StoreError> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))
    }

    /// Resolve an exact id, or a prefix matching exactly one project.
    pub fn resolve_id(&self, query: &str) -> Result<String, StoreError> {
        if self.projects.iter().any(|p| p.id == query) {
            return Ok(query.to_string());
        }
        let mut matches = self.projects.iter().filter(|p| p.id.starts_with(query));
        match (matches.next(), matches.count()) {
            (None, _) => Err(StoreError::ProjectNotFound(query.to_string())),
            (Some(project), 0) if !query.is_empty() => Ok(project.id.clone()),
            (Some(_), rest) => Err(StoreError::AmbiguousId {
                prefix: query.to_string(),
                count: rest + 1,
            }),
        }
    }

    /// Create a project from the standard template.
    pub fn create_project(
        &mut self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        let project = Project::from_template(name, now);
        let mut projects = self.store.load()?;
        projects.insert(0, project.clone());
        self.store.save(&projects)?;
        self.refresh()?;
        info!(id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    pub fn rename_project(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        self.mutate(id, |project| {
            project.name = name.to_string();
            Ok(())
        })?;
        info!(id, name, "project renamed");
        Ok(())
    }

    pub fn delete_project(&mut self, id: &str) -> Result<Project, StoreError> {
        let mut projects = self.store.load()?;
        let pos = projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))?;
        let removed = projects.remove(pos);
        self.store.save(&projects)?;
        self.refresh()?;
        info!(id, "project deleted");
        Ok(removed)
    }

    /// Replace the editable fields of one phase. Attachments are kept.
    pub fn update_phase(
        &mut self,
        id: &str,
        index: usize,
        update: PhaseUpdate,
    ) -> Result<Phase, StoreError> {
        let phase = self.mutate(id, |project| {
            let phase = phase_mut(project, index)?;
            phase.apply(update);
            Ok(phase.clone())
        })?;
        info!(id, index, phase = %phase.name, duration = %phase.duration, "phase updated");
        Ok(phase)
    }

    /// Append the blank "New Phase" and return its index.
    pub fn add_phase(&mut self, id: &str) -> Result<usize, StoreError> {
        let index = self.mutate(id, |project| {
            project.phases.push(Project::blank_phase());
            Ok(project.phases.len() - 1)
        })?;
        info!(id, index, "phase added");
        Ok(index)
    }

    pub fn delete_phase(&mut self, id: &str, index: usize) -> Result<Phase, StoreError> {
        let removed = self.mutate(id, |project| {
            phase_mut(project, index)?;
            Ok(project.phases.remove(index))
        })?;
        info!(id, index, phase = %removed.name, "phase deleted");
        Ok(removed)
    }

    pub fn add_phase_attachment(
        &mut self,
        id: &str,
        index: usize,
        upload: NewAttachment,
        now: DateTime<Utc>,
    ) -> Result<Attachment, StoreError> {
        let attachment = self.mutate(id, |project| {
            let attachment = Attachment {
                id: new_id(),
                name: upload.name,
                media_type: upload.media_type,
                size: upload.size,
                url: upload.url,
                uploaded_at: now,
            };
            phase_mut(project, index)?
                .attachments
                .push(attachment.clone());
            Ok(attachment)
        })?;
        info!(id, index, attachment = %attachment.name, "attachment added");
        Ok(attachment)
    }

    pub fn update_budget(&mut self, id: &str, budget: Budget) -> Result<(), StoreError> {
        self.mutate(id, |project| {
            project.budget = budget;
            Ok(())
        })?;
        info!(id, total = budget.total(), "budget updated");
        Ok(())
    }

    /// Append a risk and return its index.
    pub fn add_risk(&mut self, id: &str, risk: Risk) -> Result<usize, StoreError> {
        let index = self.mutate(id, |project| {
            project.risks.push(risk);
            Ok(project.risks.len() - 1)
        })?;
        info!(id, index, "risk added");
        Ok(index)
    }

    pub fn update_risk(&mut self, id: &str, index: usize, risk: Risk) -> Result<(), StoreError> {
        self.mutate(id, |project| {
            *risk_mut(project, index)? = risk;
            Ok(())
        })?;
        info!(id, index, "risk updated");
        Ok(())
    }

    pub fn delete_risk(&mut self, id: &str, index: usize) -> Result<Risk, StoreError> {
        let removed = self.mutate(id, |project| {
            risk_mut(project, index)?;
            Ok(project.risks.remove(index))
        })?;
        info!(id, index, "risk deleted");
        Ok(removed)
    }

    pub fn update_communication(
        &mut self,
        id: &str,
        communication: Communication,
    ) -> Result<(), StoreError> {
        self.mutate(id, |project| {
            project.communication = communication;
            Ok(())
        })?;
        info!(id, "communication plan updated");
        Ok(())
    }

    pub fn update_team(&mut self, id: &str, team: Vec<TeamMember>) -> Result<(), StoreError> {
        let size = team.len();
        self.mutate(id, |project| {
            project.team_members = team;
            Ok(())
        })?;
        info!(id, size, "team updated");
        Ok(())
    }

    fn mutate<T>(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut Project) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut projects = self.store.load()?;
        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))?;
        let out = change(project)?;
        self.store.save(&projects)?;
        self.refresh()?;
        Ok(out)
    }
}

fn sort_newest_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn phase_mut(project: &mut Project, index: usize) -> Result<&mut Phase, StoreError> {
    let len = project.phases.len();
    project
        .phases
        .get_mut(index)
        .ok_or_else(|| StoreError::PhaseIndexOutOfRange {
            project: project.id.clone(),
            index,
            len,
        })
}

fn risk_mut(project: &mut Project, index: usize) -> Result<&mut Risk, StoreError> {
    let len = project.risks.len();
    project
        .risks
        .get_mut(index)
        .ok_or_else(|| StoreError::RiskIndexOutOfRange {
            project: project.id.clone(),
            index,
            len,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::RiskLevel;
    use crate::store::MemoryStore;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn repo() -> ProjectRepo<MemoryStore> {
        ProjectRepo::open(MemoryStore::new()).expect("open")
    }

    fn risk(description: &str) -> Risk {
        Risk {
            category: "Technical".into(),
            description: description.into(),
            impact: RiskLevel::High,
            probability: RiskLevel::Low,
            mitigation: "Spike early".into(),
        }
    }

    #[test]
    fn create_lists_newest_first() {
        let mut repo = repo();
        repo.create_project("Older", at(9)).expect("create");
        repo.create_project("Newer", at(10)).expect("create");
        let names: Vec<&str> = repo.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Newer", "Older"]);
    }

    #[test]
    fn ordering_follows_created_at_not_insertion() {
        let old = Project::from_template("Old", at(1));
        let new = Project::from_template("New", at(1) + Duration::days(3));
        let repo = ProjectRepo::open(MemoryStore::with_projects(vec![old, new])).expect("open");
        assert_eq!(repo.projects()[0].name, "New");
    }

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let mut repo = repo();
        let project = repo.create_project("Atlas", at(9)).expect("create");
        assert_eq!(repo.resolve_id(&project.id).expect("exact"), project.id);
        assert_eq!(repo.resolve_id(&project.id[..4]).expect("prefix"), project.id);
        assert_eq!(
            repo.resolve_id("zzzzzzzzzz").expect_err("none").code(),
            ErrorCode::ProjectNotFound
        );
    }

    #[test]
    fn resolve_id_rejects_ambiguous_prefix() {
        let mut a = Project::from_template("A", at(1));
        a.id = "abc111111".into();
        let mut b = Project::from_template("B", at(2));
        b.id = "abc222222".into();
        let repo = ProjectRepo::open(MemoryStore::with_projects(vec![a, b])).expect("open");

        let err = repo.resolve_id("abc").expect_err("two matches");
        assert!(matches!(err, StoreError::AmbiguousId { count: 2, .. }));
        assert_eq!(repo.resolve_id("abc1").expect("unique"), "abc111111");
        assert!(repo.resolve_id("").is_err());
    }

    #[test]
    fn update_phase_persists_and_keeps_attachments() {
        let mut repo = repo();
        let id = repo.create_project("Atlas", at(9)).expect("create").id;
        repo.add_phase_attachment(
            &id,
            0,
            NewAttachment {
                name: "brief.pdf".into(),
                media_type: "application/pdf".into(),
                size: 2048,
                url: "https://files.example/brief.pdf".into(),
            },
            at(10),
        )
        .expect("attach");

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
        let end = NaiveDate::from_ymd_opt(2024, 1, 14).expect("date");
        let phase = repo
            .update_phase(
                &id,
                0,
                PhaseUpdate {
                    name: "Kickoff".into(),
                    start_date: Some(start),
                    end_date: Some(end),
                    duration: "1 week 6 days".into(),
                    content: None,
                    reviewers: Vec::new(),
                },
            )
            .expect("update");

        assert_eq!(phase.name, "Kickoff");
        let stored = &repo.store().load().expect("load")[0].phases[0];
        assert_eq!(stored.dates(), Some((start, end)));
        assert_eq!(stored.attachments.len(), 1);
        assert_eq!(stored.attachments[0].uploaded_at, at(10));
    }

    #[test]
    fn add_and_delete_phase() {
        let mut repo = repo();
        let id = repo.create_project("Atlas", at(9)).expect("create").id;
        let index = repo.add_phase(&id).expect("add");
        assert_eq!(index, 5);
        assert_eq!(repo.get(&id).expect("get").phases[5].name, "New Phase");

        let removed = repo.delete_phase(&id, 0).expect("delete");
        assert_eq!(removed.name, "Planning Phase");
        assert_eq!(repo.get(&id).expect("get").phases.len(), 5);
    }

    #[test]
    fn out_of_range_indexes_are_errors() {
        let mut repo = repo();
        let id = repo.create_project("Atlas", at(9)).expect("create").id;

        let err = repo.delete_phase(&id, 42).expect_err("no phase 42");
        assert!(matches!(
            err,
            StoreError::PhaseIndexOutOfRange { index: 42, len: 5, .. }
        ));
        let err = repo.delete_risk(&id, 0).expect_err("no risks");
        assert_eq!(err.code(), ErrorCode::RiskIndexOutOfRange);
    }

    #[test]
    fn risk_lifecycle() {
        let mut repo = repo();
        let id = repo.create_project("Atlas", at(9)).expect("create").id;
        assert_eq!(repo.add_risk(&id, risk("Vendor slips")).expect("add"), 0);
        assert_eq!(repo.add_risk(&id, risk("Key person leaves")).expect("add"), 1);

        let mut changed = risk("Vendor slips badly");
        changed.impact = RiskLevel::Medium;
        repo.update_risk(&id, 0, changed.clone()).expect("update");
        assert_eq!(repo.get(&id).expect("get").risks[0], changed);

        let removed = repo.delete_risk(&id, 1).expect("delete");
        assert_eq!(removed.description, "Key person leaves");
        assert_eq!(repo.get(&id).expect("get").risks.len(), 1);
    }

    #[test]
    fn budget_team_and_communication_replace_wholesale() {
        let mut repo = repo();
        let id = repo.create_project("Atlas", at(9)).expect("create").id;

        let budget = Budget {
            personnel_costs: 1000.0,
            technology_tools: 200.0,
            marketing_launch: 50.0,
            contingency: 10.0,
        };
        repo.update_budget(&id, budget).expect("budget");
        repo.update_team(&id, Vec::new()).expect("team");
        repo.update_communication(&id, Communication::default())
            .expect("comms");

        let project = repo.get(&id).expect("get");
        assert_eq!(project.budget, budget);
        assert!(project.team_members.is_empty());
        assert!(project.communication.meetings.is_empty());
    }

    #[test]
    fn rename_and_delete_project() {
        let mut repo = repo();
        let id = repo.create_project("Atlas", at(9)).expect("create").id;
        repo.rename_project(&id, "Atlas II").expect("rename");
        assert_eq!(repo.get(&id).expect("get").name, "Atlas II");

        let removed = repo.delete_project(&id).expect("delete");
        assert_eq!(removed.name, "Atlas II");
        assert!(repo.projects().is_empty());
        assert_eq!(
            repo.rename_project(&id, "x").expect_err("gone").code(),
            ErrorCode::ProjectNotFound
        );
    }

    #[test]
    fn mutations_see_writes_from_other_handles() {
        let store = MemoryStore::new();
        let mut first = ProjectRepo::open(&store).expect("open");
        let mut second = ProjectRepo::open(&store).expect("open");

        let id = first.create_project("Shared", at(9)).expect("create").id;
        assert!(second.projects().is_empty());
        second.rename_project(&id, "Shared v2").expect("rename via stale handle");
        first.refresh().expect("refresh");
        assert_eq!(first.get(&id).expect("get").name, "Shared v2");
    }
}
