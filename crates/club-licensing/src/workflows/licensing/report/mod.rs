//! Category reports, the department roll-up and the initial intake report.

mod builder;
mod department;
mod initial;
pub mod views;

pub use builder::{ReportBuilder, ReportInput};
pub use department::{DepartmentReportBuilder, DepartmentReportInput};
pub use initial::{InitialReportBuilder, InitialReportInput};

use serde::{Deserialize, Serialize};

/// Aggregate verdict of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportVerdict {
    Approved,
    PartiallyApproved,
    Rejected,
}

impl ReportVerdict {
    /// All accepted ⇒ approved, some ⇒ partially approved, none or nothing to judge ⇒ rejected.
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let (accepted, total) = outcomes
            .into_iter()
            .fold((0usize, 0usize), |(accepted, total), outcome| {
                (accepted + usize::from(outcome), total + 1)
            });
        match accepted {
            0 => Self::Rejected,
            count if count == total => Self::Approved,
            _ => Self::PartiallyApproved,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::PartiallyApproved => "partially_approved",
            Self::Rejected => "rejected",
        }
    }

    pub(crate) const fn summary_ending(self) -> &'static str {
        match self {
            Self::Approved => {
                "все предоставленные документы соответствуют требованиям процедуры лицензирования."
            }
            Self::PartiallyApproved => {
                "некоторые документы не соответствуют требованиям и были отклонены."
            }
            Self::Rejected => "все документы были отклонены как не соответствующие требованиям.",
        }
    }

    pub(crate) const fn criterion_sentence(self) -> &'static str {
        match self {
            Self::Approved => "критерий выполнен;",
            Self::PartiallyApproved => "критерий выполнен частично;",
            Self::Rejected => "критерий не выполнен;",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    Accepted,
    Rejected,
}

impl LineItemStatus {
    pub const fn from_outcome(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Accepted => "Принят",
            Self::Rejected => "Отклонен",
        }
    }
}

pub(crate) const UNTITLED_DOCUMENT: &str = "Документ";
