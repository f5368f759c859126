use serde::{Deserialize, Serialize};

use super::domain::{LicensingError, ReviewStage, ReviewState, ReviewerStamp};

/// Outcome of one verification stage together with the reviewer who recorded it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<ReviewerStamp>,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl StageRecord {
    pub fn is_passed(&self) -> bool {
        self.passed == Some(true)
    }

    pub fn is_failed(&self) -> bool {
        self.passed == Some(false)
    }

    /// Comment text when one was left and is not blank.
    pub fn non_empty_comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|comment| !comment.is_empty())
    }
}

/// Three ordered verification stages shared by criteria and document checks.
///
/// Ordering rules:
/// - a stage can be marked only when the previous stage passed (the first stage needs an upload);
/// - a passed stage is never re-marked, and no stage is re-marked once a later one has an outcome;
/// - a failed stage may be re-marked, but until then it blocks [`ReviewTrack::next_stage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTrack {
    #[serde(default)]
    pub first: StageRecord,
    #[serde(default)]
    pub industry: StageRecord,
    #[serde(default)]
    pub control: StageRecord,
}

impl ReviewTrack {
    pub fn stage(&self, stage: ReviewStage) -> &StageRecord {
        match stage {
            ReviewStage::FirstCheck => &self.first,
            ReviewStage::IndustryCheck => &self.industry,
            ReviewStage::ControlCheck => &self.control,
        }
    }

    fn stage_mut(&mut self, stage: ReviewStage) -> &mut StageRecord {
        match stage {
            ReviewStage::FirstCheck => &mut self.first,
            ReviewStage::IndustryCheck => &mut self.industry,
            ReviewStage::ControlCheck => &mut self.control,
        }
    }

    pub fn ensure_can_mark(
        &self,
        stage: ReviewStage,
        uploaded: bool,
    ) -> Result<(), LicensingError> {
        match stage.previous() {
            None if !uploaded => {
                return Err(LicensingError::validation(format!(
                    "{} requires an uploaded submission",
                    stage.label()
                )));
            }
            Some(previous) if !self.stage(previous).is_passed() => {
                return Err(LicensingError::validation(format!(
                    "{} requires {} to pass first",
                    stage.label(),
                    previous.label()
                )));
            }
            _ => {}
        }

        if self.stage(stage).is_passed() {
            return Err(LicensingError::validation(format!(
                "{} has already passed",
                stage.label()
            )));
        }

        let mut later = stage.next();
        while let Some(next) = later {
            if self.stage(next).passed.is_some() {
                return Err(LicensingError::validation(format!(
                    "{} cannot be changed after {} was recorded",
                    stage.label(),
                    next.label()
                )));
            }
            later = next.next();
        }

        Ok(())
    }

    pub fn mark(
        &mut self,
        stage: ReviewStage,
        uploaded: bool,
        reviewer: ReviewerStamp,
        passed: bool,
        comment: Option<String>,
    ) -> Result<(), LicensingError> {
        self.ensure_can_mark(stage, uploaded)?;
        let record = self.stage_mut(stage);
        record.reviewer = Some(reviewer);
        record.passed = Some(passed);
        record.comment = comment;
        Ok(())
    }

    pub fn current_state(&self, uploaded: bool) -> ReviewState {
        if !uploaded {
            ReviewState::NotUploaded
        } else if self.control.passed.is_some() {
            ReviewState::ControlChecked
        } else if self.industry.passed.is_some() {
            ReviewState::IndustryChecked
        } else if self.first.passed.is_some() {
            ReviewState::FirstChecked
        } else {
            ReviewState::Uploaded
        }
    }

    /// The stage awaiting a decision, or `None` when nothing is uploaded, every stage
    /// passed, or a failed stage blocks progress.
    pub fn next_stage(&self, uploaded: bool) -> Option<ReviewStage> {
        if !uploaded {
            return None;
        }
        for stage in ReviewStage::ordered() {
            match self.stage(stage).passed {
                Some(true) => continue,
                Some(false) => return None,
                None => return Some(stage),
            }
        }
        None
    }

    pub fn passed_count(&self) -> usize {
        ReviewStage::ordered()
            .into_iter()
            .filter(|stage| self.stage(*stage).is_passed())
            .count()
    }

    pub fn completion_percentage(&self) -> f64 {
        self.passed_count() as f64 / 3.0 * 100.0
    }

    pub fn is_fully_passed(&self) -> bool {
        self.passed_count() == 3
    }

    pub fn is_partially_passed(&self) -> bool {
        self.passed_count() > 0
    }

    pub fn has_failed_checks(&self) -> bool {
        !self.failed_stages().is_empty()
    }

    pub fn failed_stages(&self) -> Vec<ReviewStage> {
        ReviewStage::ordered()
            .into_iter()
            .filter(|stage| self.stage(*stage).is_failed())
            .collect()
    }

    /// Clears every outcome. Reviewer stamps stay as history; comments go only when asked.
    pub fn reset(&mut self, clear_comments: bool) {
        for stage in ReviewStage::ordered() {
            let record = self.stage_mut(stage);
            record.passed = None;
            if clear_comments {
                record.comment = None;
            }
        }
    }
}

/// Progress snapshot exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewProgressView {
    pub current_stage: ReviewState,
    pub current_stage_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<ReviewStage>,
    pub completion_percentage: f64,
    pub fully_passed: bool,
    pub failed_stages: Vec<ReviewStage>,
}

impl ReviewProgressView {
    pub(crate) fn of(track: &ReviewTrack, uploaded: bool) -> Self {
        let current_stage = track.current_state(uploaded);
        Self {
            current_stage,
            current_stage_label: current_stage.label(),
            next_stage: track.next_stage(uploaded),
            completion_percentage: track.completion_percentage(),
            fully_passed: track.is_fully_passed(),
            failed_stages: track.failed_stages(),
        }
    }
}
