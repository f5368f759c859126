use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, CategoryId, CheckId, LicensingError, ReportId, SolutionId};

/// Lifecycle shared by reports and solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Approved,
    Rejected,
    RequiresRevision,
    Cancelled,
}

impl SnapshotStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::RequiresRevision => "requires_revision",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }

    pub fn allowed_transitions(self) -> &'static [SnapshotStatus] {
        use SnapshotStatus::*;
        match self {
            Pending => &[InProgress, Cancelled],
            InProgress => &[Completed, RequiresRevision, Rejected, Cancelled],
            Completed => &[Approved, Rejected, RequiresRevision],
            RequiresRevision => &[InProgress, Cancelled],
            Approved | Rejected | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: SnapshotStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Move to `next`, rejecting edits of terminal snapshots and undeclared transitions.
    pub fn transition(&mut self, next: SnapshotStatus) -> Result<(), LicensingError> {
        if self.is_terminal() {
            return Err(LicensingError::validation(format!(
                "snapshot is {} and can no longer change",
                self.label()
            )));
        }
        if !self.can_transition_to(next) {
            return Err(LicensingError::validation(format!(
                "cannot move snapshot from {} to {}",
                self.label(),
                next.label()
            )));
        }
        *self = next;
        Ok(())
    }
}

/// What a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ReportScope {
    Category(CategoryId),
    Documents(Vec<CheckId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub application_id: ApplicationId,
    pub scope: ReportScope,
    #[serde(default)]
    pub status: SnapshotStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn explicit_documents(&self) -> Option<&[CheckId]> {
        match &self.scope {
            ReportScope::Documents(ids) => Some(ids.as_slice()),
            ReportScope::Category(_) => None,
        }
    }

    pub fn transition_to(
        &mut self,
        next: SnapshotStatus,
        at: DateTime<Utc>,
    ) -> Result<&mut Self, LicensingError> {
        self.status.transition(next)?;
        self.updated_at = Some(at);
        Ok(self)
    }
}

/// Formal licensing decision snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub id: SolutionId,
    pub application_id: ApplicationId,
    #[serde(default)]
    pub list_documents: Option<Vec<CheckId>>,
    #[serde(default)]
    pub secretary: Option<String>,
    #[serde(default)]
    pub meeting_date: Option<NaiveDate>,
    #[serde(default)]
    pub meeting_place: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub status: SnapshotStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Solution {
    pub fn transition_to(
        &mut self,
        next: SnapshotStatus,
        at: DateTime<Utc>,
    ) -> Result<&mut Self, LicensingError> {
        self.status.transition(next)?;
        self.updated_at = Some(at);
        Ok(self)
    }
}
