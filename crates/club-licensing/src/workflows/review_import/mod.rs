//! Offline review sheets: CSV exports filled in by reviewers away from the system and
//! replayed against document checks in one batch.

mod parser;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::workflows::licensing::{
    CheckId, DocumentReview, LicensingError, LicensingReviewService, LicensingStore,
    ReviewBatchError, ReviewBatchSummary, ReviewerDirectory,
};

#[derive(Debug)]
pub enum ReviewImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { row: usize, message: String },
    Licensing { row: usize, source: LicensingError },
}

impl std::fmt::Display for ReviewImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewImportError::Io(err) => write!(f, "failed to read review sheet: {}", err),
            ReviewImportError::Csv(err) => write!(f, "invalid review sheet data: {}", err),
            ReviewImportError::Row { row, message } => {
                write!(f, "review sheet row {}: {}", row, message)
            }
            ReviewImportError::Licensing { row, source } => write!(
                f,
                "could not apply review sheet row {}: {}",
                row, source
            ),
        }
    }
}

impl std::error::Error for ReviewImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReviewImportError::Io(err) => Some(err),
            ReviewImportError::Csv(err) => Some(err),
            ReviewImportError::Row { .. } => None,
            ReviewImportError::Licensing { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for ReviewImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ReviewImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ReviewBatchError> for ReviewImportError {
    fn from(err: ReviewBatchError) -> Self {
        Self::Licensing {
            row: err.row,
            source: err.source,
        }
    }
}

/// Parsed review sheet, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSheet {
    reviews: Vec<DocumentReview>,
}

impl ReviewSheet {
    pub fn reviews(&self) -> &[DocumentReview] {
        &self.reviews
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Distinct document checks the sheet touches.
    pub fn check_ids(&self) -> BTreeSet<CheckId> {
        self.reviews.iter().map(|review| review.check_id).collect()
    }

    /// Replay every row through the review service. A failing row aborts the whole
    /// sheet and nothing is persisted.
    pub fn apply<S, D>(
        &self,
        service: &LicensingReviewService<S, D>,
    ) -> Result<ReviewBatchSummary, ReviewImportError>
    where
        S: LicensingStore + 'static,
        D: ReviewerDirectory + 'static,
    {
        Ok(service.apply_document_reviews(&self.reviews)?)
    }
}

pub struct ReviewSheetImporter;

impl ReviewSheetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ReviewSheet, ReviewImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ReviewSheet, ReviewImportError> {
        let reviews = parser::parse_reviews(reader)?;
        tracing::debug!(rows = reviews.len(), "parsed review sheet");
        Ok(ReviewSheet { reviews })
    }
}
