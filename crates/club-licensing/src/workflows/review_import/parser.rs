use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::licensing::{CheckId, DocumentReview, ReviewStage, UserId};

use super::ReviewImportError;

pub(crate) fn parse_reviews<R: Read>(reader: R) -> Result<Vec<DocumentReview>, ReviewImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut reviews = Vec::new();

    for (index, record) in csv_reader.deserialize::<ReviewRow>().enumerate() {
        let row = index + 1;
        let parsed = record?;
        reviews.push(parsed.into_review(row)?);
    }

    Ok(reviews)
}

#[derive(Debug, Deserialize)]
struct ReviewRow {
    #[serde(rename = "Check ID")]
    check_id: u64,
    #[serde(rename = "Stage")]
    stage: String,
    #[serde(rename = "Passed")]
    passed: String,
    #[serde(rename = "Reviewer ID")]
    reviewer_id: u64,
    #[serde(rename = "Reviewer", default, deserialize_with = "empty_string_as_none")]
    reviewer: Option<String>,
    #[serde(rename = "Comment", default, deserialize_with = "empty_string_as_none")]
    comment: Option<String>,
    #[serde(rename = "Reviewed At")]
    reviewed_at: String,
}

impl ReviewRow {
    fn into_review(self, row: usize) -> Result<DocumentReview, ReviewImportError> {
        let stage = ReviewStage::parse(&self.stage).ok_or_else(|| ReviewImportError::Row {
            row,
            message: format!("unknown stage `{}`", self.stage),
        })?;
        let passed = parse_passed(&self.passed).ok_or_else(|| ReviewImportError::Row {
            row,
            message: format!("unrecognised pass flag `{}`", self.passed),
        })?;
        let reviewed_at = parse_datetime(&self.reviewed_at).ok_or_else(|| ReviewImportError::Row {
            row,
            message: format!("invalid review timestamp `{}`", self.reviewed_at),
        })?;

        Ok(DocumentReview {
            row,
            check_id: CheckId(self.check_id),
            stage,
            passed,
            reviewer_id: UserId(self.reviewer_id),
            reviewer_name: self.reviewer,
            comment: self.comment,
            reviewed_at,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_passed(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_datetime_supports_rfc3339_and_date_strings() {
        let rfc = parse_datetime("2025-03-04T10:00:00+05:00").expect("parse rfc");
        assert_eq!(rfc, Utc.with_ymd_and_hms(2025, 3, 4, 5, 0, 0).unwrap());

        let date = parse_datetime("2025-03-05").expect("parse date");
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap());

        assert!(parse_datetime("  ").is_none());
        assert!(parse_datetime("05.03.2025").is_none());
    }

    #[test]
    fn pass_flags_accept_words_and_digits() {
        assert_eq!(parse_passed("Yes"), Some(true));
        assert_eq!(parse_passed("0"), Some(false));
        assert_eq!(parse_passed("maybe"), None);
    }

    #[test]
    fn blank_cells_become_none() {
        let reviews = parse_reviews(Cursor::new(
            "Check ID,Stage,Passed,Reviewer ID,Reviewer,Comment,Reviewed At\n\
             11,industry,no,4,  ,missing seal,2025-03-05\n",
        ))
        .expect("parse");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].stage, ReviewStage::IndustryCheck);
        assert_eq!(reviews[0].reviewer_name, None);
        assert_eq!(reviews[0].comment.as_deref(), Some("missing seal"));
    }

    #[test]
    fn bad_stage_reports_row_number() {
        let error = parse_reviews(Cursor::new(
            "Check ID,Stage,Passed,Reviewer ID,Reviewer,Comment,Reviewed At\n\
             11,first_check,yes,4,,,2025-03-05\n\
             11,audit,yes,4,,,2025-03-05\n",
        ))
        .expect_err("unknown stage");
        assert!(matches!(error, ReviewImportError::Row { row: 2, .. }));
    }
}
