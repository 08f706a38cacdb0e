//! In-progress edits to a single phase.
//!
//! A [`PhaseDraft`] is what a form holds between "edit" and "save". Its one
//! rule: whenever a date change leaves both dates filled in, the duration
//! label is recomputed and any hand-typed value is discarded. A typed label
//! survives only while one of the dates is missing.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::duration::compute_duration;
use crate::error::ErrorCode;
use crate::model::{Phase, PhaseReviewer, PhaseUpdate, ReviewStatus, UserRole, new_id};

/// Content shown for a phase that never had any.
pub const DEFAULT_DRAFT_CONTENT: &str = "Content of Project(New)";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no reviewer with id {0} on this phase")]
    UnknownReviewer(String),
    #[error("a decision must be approved or rejected, not pending")]
    PendingDecision,
    #[error("role {0} does not review phases")]
    NotAReviewerRole(UserRole),
    #[error("role {0} already has a reviewer slot on this phase")]
    DuplicateReviewerRole(UserRole),
}

impl EditError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownReviewer(_) => ErrorCode::UnknownReviewer,
            Self::PendingDecision | Self::NotAReviewerRole(_) => ErrorCode::InvalidEnumValue,
            Self::DuplicateReviewerRole(_) => ErrorCode::DuplicateReviewerRole,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDraft {
    name: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    duration: String,
    content: String,
    reviewers: Vec<PhaseReviewer>,
}

impl PhaseDraft {
    /// Start editing `phase`.
    #[must_use]
    pub fn begin(phase: &Phase) -> Self {
        Self {
            name: phase.name.clone(),
            start_date: phase.start_date,
            end_date: phase.end_date,
            duration: phase.duration.clone(),
            content: phase
                .content
                .clone()
                .unwrap_or_else(|| DEFAULT_DRAFT_CONTENT.to_string()),
            reviewers: phase.reviewers.clone(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    #[must_use]
    pub fn duration(&self) -> &str {
        &self.duration
    }

    #[must_use]
    pub fn reviewers(&self) -> &[PhaseReviewer] {
        &self.reviewers
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>) {
        self.start_date = date;
        self.sync_duration();
    }

    pub fn set_end_date(&mut self, date: Option<NaiveDate>) {
        self.end_date = date;
        self.sync_duration();
    }

    /// Hand-typed label. Overwritten by the next date change or by
    /// [`commit`](Self::commit) if both dates are set.
    pub fn set_duration(&mut self, label: impl Into<String>) {
        self.duration = label.into();
    }

    /// Add a pending reviewer slot for `role` and return its id. Each
    /// reviewing role gets at most one slot per phase; admins never review.
    pub fn add_reviewer(&mut self, role: UserRole) -> Result<String, EditError> {
        if !role.can_review() {
            return Err(EditError::NotAReviewerRole(role));
        }
        if self.reviewers.iter().any(|r| r.role == role.as_str()) {
            return Err(EditError::DuplicateReviewerRole(role));
        }
        let id = new_id();
        self.reviewers.push(PhaseReviewer {
            id: id.clone(),
            role: role.as_str().to_string(),
            status: ReviewStatus::Pending,
            comment: String::new(),
            reviewed_at: None,
        });
        Ok(id)
    }

    pub fn remove_reviewer(&mut self, id: &str) -> Result<PhaseReviewer, EditError> {
        let pos = self
            .reviewers
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| EditError::UnknownReviewer(id.to_string()))?;
        Ok(self.reviewers.remove(pos))
    }

    /// Record an approve/reject decision, stamped with `now`.
    pub fn set_reviewer_status(
        &mut self,
        id: &str,
        status: ReviewStatus,
        now: DateTime<Utc>,
    ) -> Result<(), EditError> {
        if status == ReviewStatus::Pending {
            return Err(EditError::PendingDecision);
        }
        let reviewer = self.reviewer_mut(id)?;
        reviewer.status = status;
        reviewer.reviewed_at = Some(now);
        Ok(())
    }

    pub fn set_reviewer_comment(
        &mut self,
        id: &str,
        comment: impl Into<String>,
    ) -> Result<(), EditError> {
        self.reviewer_mut(id)?.comment = comment.into();
        Ok(())
    }

    /// Finish editing. Dates win over any typed duration.
    #[must_use]
    pub fn commit(mut self) -> PhaseUpdate {
        self.sync_duration();
        PhaseUpdate {
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            duration: self.duration,
            content: Some(self.content),
            reviewers: self.reviewers,
        }
    }

    fn reviewer_mut(&mut self, id: &str) -> Result<&mut PhaseReviewer, EditError> {
        self.reviewers
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| EditError::UnknownReviewer(id.to_string()))
    }

    fn sync_duration(&mut self) {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            let label = compute_duration(start, end);
            debug!(%start, %end, %label, "duration recomputed from dates");
            self.duration = label;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn draft() -> PhaseDraft {
        PhaseDraft::begin(&Phase::new("Design Phase", "3 weeks"))
    }

    #[test]
    fn begin_fills_default_content() {
        let update = draft().commit();
        assert_eq!(update.content.as_deref(), Some(DEFAULT_DRAFT_CONTENT));
        assert_eq!(update.duration, "3 weeks");
    }

    #[test]
    fn second_date_triggers_recompute() {
        let mut d = draft();
        d.set_start_date(Some(date(2024, 1, 1)));
        assert_eq!(d.duration(), "3 weeks");
        d.set_end_date(Some(date(2024, 1, 10)));
        assert_eq!(d.duration(), "1 week 2 days");
    }

    #[test]
    fn manual_label_survives_while_a_date_is_missing() {
        let mut d = draft();
        d.set_start_date(Some(date(2024, 1, 1)));
        d.set_duration("about a month");
        let update = d.commit();
        assert_eq!(update.duration, "about a month");
    }

    #[test]
    fn manual_label_is_overwritten_when_both_dates_present() {
        let mut d = draft();
        d.set_start_date(Some(date(2024, 1, 1)));
        d.set_end_date(Some(date(2024, 1, 31)));
        d.set_duration("forever");
        assert_eq!(d.duration(), "forever");
        assert_eq!(d.commit().duration, "1 month");
    }

    #[test]
    fn clearing_a_date_keeps_last_label() {
        let mut d = draft();
        d.set_start_date(Some(date(2024, 1, 1)));
        d.set_end_date(Some(date(2024, 1, 3)));
        d.set_end_date(None);
        assert_eq!(d.duration(), "2 days");
        assert_eq!(d.end_date(), None);
    }

    #[test]
    fn reviewer_lifecycle() {
        let mut d = draft();
        let id = d.add_reviewer(UserRole::Sponsor).expect("free role");
        assert_eq!(d.reviewers()[0].status, ReviewStatus::Pending);

        let now = Utc::now();
        d.set_reviewer_status(&id, ReviewStatus::Approved, now)
            .expect("known reviewer");
        d.set_reviewer_comment(&id, "looks good").expect("known reviewer");

        let reviewer = &d.reviewers()[0];
        assert_eq!(reviewer.status, ReviewStatus::Approved);
        assert_eq!(reviewer.reviewed_at, Some(now));
        assert_eq!(reviewer.comment, "looks good");

        let removed = d.remove_reviewer(&id).expect("known reviewer");
        assert_eq!(removed.role, "sponsor");
        assert!(d.reviewers().is_empty());
    }

    #[test]
    fn unknown_reviewer_is_an_error() {
        let mut d = draft();
        let err = d
            .set_reviewer_comment("nope", "x")
            .expect_err("no reviewers yet");
        assert_eq!(err, EditError::UnknownReviewer("nope".into()));
        assert_eq!(err.code(), ErrorCode::UnknownReviewer);
    }

    #[test]
    fn pending_is_not_a_decision() {
        let mut d = draft();
        let id = d.add_reviewer(UserRole::Designer).expect("free role");
        assert_eq!(
            d.set_reviewer_status(&id, ReviewStatus::Pending, Utc::now()),
            Err(EditError::PendingDecision)
        );
    }

    #[test]
    fn each_role_reviews_once() {
        let mut d = draft();
        d.add_reviewer(UserRole::Sponsor).expect("first slot");
        assert_eq!(
            d.add_reviewer(UserRole::Sponsor),
            Err(EditError::DuplicateReviewerRole(UserRole::Sponsor))
        );
        assert_eq!(d.reviewers().len(), 1);

        // Removing the slot frees the role again.
        let id = d.reviewers()[0].id.clone();
        d.remove_reviewer(&id).expect("known reviewer");
        d.add_reviewer(UserRole::Sponsor).expect("freed slot");
        assert_eq!(
            EditError::DuplicateReviewerRole(UserRole::Sponsor).code(),
            ErrorCode::DuplicateReviewerRole
        );
    }

    #[test]
    fn admins_and_unknown_roles_cannot_review() {
        let mut d = draft();
        let err = d.add_reviewer(UserRole::Admin).expect_err("admin");
        assert_eq!(err.code(), ErrorCode::InvalidEnumValue);
        assert!("janitor".parse::<UserRole>().is_err());
        assert!(d.reviewers().is_empty());
    }
}
