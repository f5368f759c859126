use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, CategoryId, CheckId, DocumentId, LicensingError, ReviewStage, ReviewState,
    ReviewerStamp,
};
use super::stages::{ReviewProgressView, ReviewTrack, StageRecord};

/// Review progress of a single submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCheck {
    pub id: CheckId,
    pub application_id: ApplicationId,
    pub category_id: CategoryId,
    pub document_id: DocumentId,
    pub title: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub uploaded: Option<ReviewerStamp>,
    #[serde(default)]
    pub review: ReviewTrack,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stage comment with the reviewer who left it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageComment {
    pub stage: ReviewStage,
    pub comment: String,
    pub checked_by: Option<String>,
    pub passed: Option<bool>,
}

impl DocumentCheck {
    pub fn new(
        id: CheckId,
        application_id: ApplicationId,
        category_id: CategoryId,
        document_id: DocumentId,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            application_id,
            category_id,
            document_id,
            title: title.into(),
            file_url: None,
            info: None,
            uploaded: None,
            review: ReviewTrack::default(),
            deadline: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.uploaded.is_some()
    }

    pub fn mark_as_uploaded(&mut self, stamp: ReviewerStamp) -> &mut Self {
        self.updated_at = stamp.at;
        self.uploaded = Some(stamp);
        self
    }

    pub fn mark_first_check(
        &mut self,
        stamp: ReviewerStamp,
        passed: bool,
        comment: Option<String>,
    ) -> Result<&mut Self, LicensingError> {
        self.mark(ReviewStage::FirstCheck, stamp, passed, comment)
    }

    pub fn mark_industry_check(
        &mut self,
        stamp: ReviewerStamp,
        passed: bool,
        comment: Option<String>,
    ) -> Result<&mut Self, LicensingError> {
        self.mark(ReviewStage::IndustryCheck, stamp, passed, comment)
    }

    pub fn mark_control_check(
        &mut self,
        stamp: ReviewerStamp,
        passed: bool,
        comment: Option<String>,
    ) -> Result<&mut Self, LicensingError> {
        self.mark(ReviewStage::ControlCheck, stamp, passed, comment)
    }

    pub fn mark(
        &mut self,
        stage: ReviewStage,
        stamp: ReviewerStamp,
        passed: bool,
        comment: Option<String>,
    ) -> Result<&mut Self, LicensingError> {
        let at = stamp.at;
        self.review
            .mark(stage, self.uploaded.is_some(), stamp, passed, comment)?;
        self.updated_at = at;
        Ok(self)
    }

    pub fn stage(&self, stage: ReviewStage) -> &StageRecord {
        self.review.stage(stage)
    }

    pub fn is_industry_passed(&self) -> Option<bool> {
        self.review.industry.passed
    }

    pub fn is_final_passed(&self) -> Option<bool> {
        self.review.control.passed
    }

    pub fn get_current_stage(&self) -> ReviewState {
        self.review.current_state(self.is_uploaded())
    }

    pub fn get_next_stage(&self) -> Option<ReviewStage> {
        self.review.next_stage(self.is_uploaded())
    }

    pub fn progress(&self) -> ReviewProgressView {
        ReviewProgressView::of(&self.review, self.is_uploaded())
    }

    pub fn get_failed_stages(&self) -> Vec<ReviewStage> {
        self.review.failed_stages()
    }

    pub fn completion_percentage(&self) -> f64 {
        self.review.completion_percentage()
    }

    pub fn is_fully_passed(&self) -> bool {
        self.review.is_fully_passed()
    }

    pub fn is_partially_passed(&self) -> bool {
        self.review.is_partially_passed()
    }

    pub fn has_failed_checks(&self) -> bool {
        self.review.has_failed_checks()
    }

    /// Some stage still awaits an outcome.
    pub fn needs_review(&self) -> bool {
        ReviewStage::ordered()
            .into_iter()
            .any(|stage| self.stage(stage).passed.is_none())
    }

    pub fn can_be_rechecked(&self) -> bool {
        self.has_failed_checks()
    }

    pub fn all_comments(&self) -> Vec<StageComment> {
        ReviewStage::ordered()
            .into_iter()
            .filter_map(|stage| {
                let record = self.stage(stage);
                record.non_empty_comment().map(|comment| StageComment {
                    stage,
                    comment: comment.to_string(),
                    checked_by: record
                        .reviewer
                        .as_ref()
                        .map(|reviewer| reviewer.display_name.clone()),
                    passed: record.passed,
                })
            })
            .collect()
    }

    /// Latest non-empty comment: control, then industry, then first check.
    pub fn latest_comment(&self) -> Option<&str> {
        ReviewStage::ordered()
            .into_iter()
            .rev()
            .find_map(|stage| self.stage(stage).non_empty_comment())
    }

    pub fn set_deadline(
        &mut self,
        deadline: NaiveDate,
        today: NaiveDate,
    ) -> Result<&mut Self, LicensingError> {
        if deadline < today {
            return Err(LicensingError::validation(format!(
                "deadline {deadline} is in the past"
            )));
        }
        self.deadline = Some(deadline);
        Ok(self)
    }

    pub fn extend_deadline(&mut self, days: i64) -> Result<&mut Self, LicensingError> {
        if days <= 0 {
            return Err(LicensingError::validation(
                "deadline extension must be a positive number of days",
            ));
        }
        let deadline = self.deadline.ok_or_else(|| {
            LicensingError::validation(format!("document check {} has no deadline", self.id))
        })?;
        let extended = u64::try_from(days)
            .ok()
            .and_then(|days| deadline.checked_add_days(Days::new(days)))
            .ok_or_else(|| {
                LicensingError::validation(format!(
                    "extending deadline {deadline} by {days} days is out of range"
                ))
            })?;
        self.deadline = Some(extended);
        Ok(self)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.deadline.is_some_and(|deadline| today > deadline)
    }

    /// Negative once the deadline passed.
    pub fn days_until_deadline(&self, today: NaiveDate) -> Option<i64> {
        self.deadline
            .map(|deadline| deadline.signed_duration_since(today).num_days())
    }

    /// Clear outcomes and comments ahead of a reupload cycle.
    pub fn reset_checks(&mut self) -> &mut Self {
        self.review.reset(true);
        self
    }

    pub fn update_file(&mut self, file_url: impl Into<String>) -> &mut Self {
        self.file_url = Some(file_url.into());
        self
    }

    pub fn update_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn update_info(&mut self, info: Option<String>) -> &mut Self {
        self.info = info;
        self
    }

    pub fn has_file(&self) -> bool {
        self.file_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// Orders checks for reports and solutions: the explicit list verbatim when present,
/// otherwise category id then reference document id ascending.
pub fn ordered_checks<'a>(
    documents: &'a [DocumentCheck],
    explicit: Option<&[CheckId]>,
) -> Result<Vec<&'a DocumentCheck>, LicensingError> {
    match explicit {
        Some(ids) => {
            let by_id: HashMap<CheckId, &DocumentCheck> =
                documents.iter().map(|document| (document.id, document)).collect();
            ids.iter()
                .map(|id| {
                    by_id
                        .get(id)
                        .copied()
                        .ok_or_else(|| LicensingError::not_found("document check", id.0))
                })
                .collect()
        }
        None => {
            let mut ordered: Vec<&DocumentCheck> = documents.iter().collect();
            ordered.sort_by_key(|document| {
                (document.category_id, document.document_id, document.id)
            });
            Ok(ordered)
        }
    }
}
