use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, CategoryId, CriteriaId, DocumentId, LicensingError, ReviewStage, ReviewState,
    ReviewerStamp,
};
use super::stages::{ReviewProgressView, ReviewTrack, StageRecord};

/// Review progress of one document category within an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationCriteria {
    pub id: CriteriaId,
    pub application_id: ApplicationId,
    pub category_id: CategoryId,
    #[serde(default)]
    pub status_id: Option<u64>,
    #[serde(default)]
    pub uploaded: Option<ReviewerStamp>,
    #[serde(default)]
    pub review: ReviewTrack,
    #[serde(default)]
    pub is_ready: bool,
    #[serde(default)]
    pub can_reupload_after_ending: bool,
    /// Explicit documents allowed for reupload. Empty means every document.
    #[serde(default)]
    pub reuploadable_documents: BTreeSet<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationCriteria {
    pub fn new(
        id: CriteriaId,
        application_id: ApplicationId,
        category_id: CategoryId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            application_id,
            category_id,
            status_id: None,
            uploaded: None,
            review: ReviewTrack::default(),
            is_ready: false,
            can_reupload_after_ending: false,
            reuploadable_documents: BTreeSet::new(),
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
    ) -> Result<&mut Self, LicensingError> {
        self.mark(ReviewStage::FirstCheck, stamp, passed)
    }

    pub fn mark_regular_check(
        &mut self,
        stamp: ReviewerStamp,
        passed: bool,
    ) -> Result<&mut Self, LicensingError> {
        self.mark(ReviewStage::IndustryCheck, stamp, passed)
    }

    pub fn mark_control_check(
        &mut self,
        stamp: ReviewerStamp,
        passed: bool,
    ) -> Result<&mut Self, LicensingError> {
        self.mark(ReviewStage::ControlCheck, stamp, passed)
    }

    pub fn mark(
        &mut self,
        stage: ReviewStage,
        stamp: ReviewerStamp,
        passed: bool,
    ) -> Result<&mut Self, LicensingError> {
        let at = stamp.at;
        self.review
            .mark(stage, self.uploaded.is_some(), stamp, passed, None)?;
        self.updated_at = at;
        Ok(self)
    }

    pub fn first_check(&self) -> &StageRecord {
        &self.review.first
    }

    pub fn regular_check(&self) -> &StageRecord {
        &self.review.industry
    }

    pub fn control_check(&self) -> &StageRecord {
        &self.review.control
    }

    pub fn first_checked_by(&self) -> Option<&ReviewerStamp> {
        self.review.first.reviewer.as_ref()
    }

    pub fn regular_checked_by(&self) -> Option<&ReviewerStamp> {
        self.review.industry.reviewer.as_ref()
    }

    pub fn control_checked_by(&self) -> Option<&ReviewerStamp> {
        self.review.control.reviewer.as_ref()
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

    pub fn can_proceed_to_next_stage(&self) -> bool {
        self.get_next_stage().is_some()
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

    pub fn completion_percentage(&self) -> f64 {
        self.review.completion_percentage()
    }

    /// Allow reuploads after the review window closed. A non-empty `documents` list
    /// replaces the allowed set; `None` or an empty list leaves it untouched.
    pub fn enable_reupload(&mut self, documents: Option<Vec<DocumentId>>) -> &mut Self {
        self.can_reupload_after_ending = true;
        if let Some(documents) = documents.filter(|documents| !documents.is_empty()) {
            self.reuploadable_documents = documents.into_iter().collect();
        }
        self
    }

    pub fn disable_reupload(&mut self) -> &mut Self {
        self.can_reupload_after_ending = false;
        self.reuploadable_documents.clear();
        self
    }

    pub fn can_reupload(&self, document: DocumentId) -> bool {
        self.can_reupload_after_ending
            && (self.reuploadable_documents.is_empty()
                || self.reuploadable_documents.contains(&document))
    }

    pub fn add_reuploadable_document(&mut self, document: DocumentId) -> &mut Self {
        self.reuploadable_documents.insert(document);
        self
    }

    pub fn remove_reuploadable_document(&mut self, document: DocumentId) -> &mut Self {
        self.reuploadable_documents.remove(&document);
        self
    }

    pub fn mark_as_ready(&mut self) -> &mut Self {
        self.is_ready = true;
        self
    }

    pub fn mark_as_not_ready(&mut self) -> &mut Self {
        self.is_ready = false;
        self
    }

    /// Clear outcomes and the ready flag. Reviewer stamps remain as history.
    pub fn reset_checks(&mut self) -> &mut Self {
        self.review.reset(false);
        self.is_ready = false;
        self
    }
}
