use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::decision::StatusCodes;
use super::repository::RepositoryError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Licensing application submitted by a club for one license and season.
    ApplicationId
);
entity_id!(
    /// Document category (a licensing criteria section such as legal or financial).
    CategoryId
);
entity_id!(
    /// Reference document a club must provide within a category.
    DocumentId
);
entity_id!(
    /// Per-application document check record.
    CheckId
);
entity_id!(
    /// Per-application, per-category criteria record.
    CriteriaId
);
entity_id!(
    /// Platform user acting as uploader or reviewer.
    UserId
);
entity_id!(ReportId);
entity_id!(SolutionId);
entity_id!(CertificateId);

/// Languages carried by workflow titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Ru,
    Kk,
    En,
}

/// Titles kept per language; English is optional and falls back to Russian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedTitle {
    pub ru: String,
    pub kk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
}

impl LocalizedTitle {
    pub fn new(ru: impl Into<String>, kk: impl Into<String>) -> Self {
        Self {
            ru: ru.into(),
            kk: kk.into(),
            en: None,
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Ru => &self.ru,
            Language::Kk => &self.kk,
            Language::En => self.en.as_deref().unwrap_or(&self.ru),
        }
    }
}

/// Who performed a mutation and when. The display name is captured at mutation time
/// and never re-resolved from the live user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerStamp {
    pub user_id: UserId,
    pub display_name: String,
    pub at: DateTime<Utc>,
}

impl ReviewerStamp {
    pub fn new(user_id: UserId, display_name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            at,
        }
    }
}

/// Ordered verification stages shared by criteria and document checks.
///
/// For criteria the middle stage is historically called the "regular" check; documents
/// call it the "industry" check. Both map to [`ReviewStage::IndustryCheck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    FirstCheck,
    #[serde(alias = "regular_check")]
    IndustryCheck,
    ControlCheck,
}

impl ReviewStage {
    pub const fn ordered() -> [Self; 3] {
        [Self::FirstCheck, Self::IndustryCheck, Self::ControlCheck]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstCheck => "first_check",
            Self::IndustryCheck => "industry_check",
            Self::ControlCheck => "control_check",
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::FirstCheck => None,
            Self::IndustryCheck => Some(Self::FirstCheck),
            Self::ControlCheck => Some(Self::IndustryCheck),
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::FirstCheck => Some(Self::IndustryCheck),
            Self::IndustryCheck => Some(Self::ControlCheck),
            Self::ControlCheck => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "first_check" | "first" => Some(Self::FirstCheck),
            "industry_check" | "industry" | "regular_check" | "regular" => {
                Some(Self::IndustryCheck)
            }
            "control_check" | "control" => Some(Self::ControlCheck),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position of a reviewed entity in the upload → first → industry → control lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    NotUploaded,
    Uploaded,
    FirstChecked,
    IndustryChecked,
    ControlChecked,
}

impl ReviewState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotUploaded => "not_uploaded",
            Self::Uploaded => "uploaded",
            Self::FirstChecked => "first_check_completed",
            Self::IndustryChecked => "industry_check_completed",
            Self::ControlChecked => "control_check_completed",
        }
    }
}

/// Application as seen by the aggregators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub club_id: u64,
    pub license_id: u64,
    pub status_code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: u64,
    pub full_name: String,
    pub short_name: String,
    pub bin: String,
    #[serde(default)]
    pub full_name_kk: Option<String>,
    #[serde(default)]
    pub full_name_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub id: u64,
    pub title: String,
    pub season_id: u64,
    #[serde(default)]
    pub end_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: u64,
    pub title: String,
}

/// Fully resolved upstream entities an aggregation run depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDossier {
    pub application: Application,
    pub club: Club,
    pub license: License,
    pub season: Season,
}

/// Criteria section documents are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCategory {
    pub id: CategoryId,
    pub title: String,
    /// Stable key used by the expert title mapping (e.g. `legal-documents`).
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub id: DocumentId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiblePerson {
    pub full_name: String,
    #[serde(default)]
    pub position: Option<String>,
}

/// Control step recorded by the licensing committee chair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlStep {
    pub application_id: ApplicationId,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub responsible: Option<ResponsiblePerson>,
    pub created_at: DateTime<Utc>,
}

/// Application-level decision status resolved from a stored status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Approved,
    Rejected,
    Revoked,
    InReview(i32),
}

impl ApplicationStatus {
    pub fn from_code(code: i32, codes: &StatusCodes) -> Self {
        if code == codes.rejected {
            Self::Rejected
        } else if code == codes.revoked {
            Self::Revoked
        } else if code == codes.approved {
            Self::Approved
        } else {
            Self::InReview(code)
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Revoked => "revoked",
            Self::InReview(_) => "in_review",
        }
    }
}

/// Errors raised by the licensing review core.
#[derive(Debug, thiserror::Error)]
pub enum LicensingError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("workflow cycle detected at node {node}")]
    Cycle { node: u64 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LicensingError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }
}
