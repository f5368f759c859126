use serde::Serialize;

use crate::workflows::licensing::domain::{CheckId, DocumentId};

use super::{LineItemStatus, ReportVerdict};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLineItem {
    pub check_id: CheckId,
    pub name: String,
    pub status: LineItemStatus,
    pub status_label: &'static str,
    pub note: String,
}

/// Line items under one reference document, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportArticle {
    pub document_id: DocumentId,
    pub title: String,
    pub documents: Vec<ReportLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportData {
    pub director: String,
    pub expert: String,
    pub date: String,
    pub club: String,
    pub category: String,
    pub items: Vec<ReportLineItem>,
    pub articles: Vec<ReportArticle>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,
    pub signed_date: String,
    pub verdict: ReportVerdict,
    pub verdict_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentDocumentLine {
    pub document_id: DocumentId,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentReportItem {
    pub date: String,
    pub expert: String,
    pub category: String,
    pub verdict: ReportVerdict,
    pub documents: Vec<DepartmentDocumentLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentReportData {
    pub department: String,
    pub position: String,
    pub date: String,
    pub club: String,
    pub reports: Vec<DepartmentReportItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialReportDocument {
    pub number: usize,
    pub name: String,
    pub document_title: String,
    pub submission_date: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialReportData {
    pub expert: String,
    pub director: String,
    pub date: String,
    pub club: String,
    pub documents: Vec<InitialReportDocument>,
}
