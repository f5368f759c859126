use std::collections::BTreeMap;

use crate::workflows::licensing::criteria::ApplicationCriteria;
use crate::workflows::licensing::decision::ExpertTitles;
use crate::workflows::licensing::document::DocumentCheck;
use crate::workflows::licensing::domain::{
    ApplicationDossier, DocumentCategory, LicensingError, ReferenceDocument,
};
use crate::workflows::licensing::repository::ReviewerProfile;
use crate::workflows::licensing::snapshot::{Report, ReportScope, SnapshotStatus};

use super::views::{DepartmentDocumentLine, DepartmentReportData, DepartmentReportItem};
use super::{ReportVerdict, UNTITLED_DOCUMENT};

#[derive(Debug, Clone, Copy)]
pub struct DepartmentReportInput<'a> {
    /// Report the roll-up is printed for; supplies the header date.
    pub anchor: &'a Report,
    pub dossier: &'a ApplicationDossier,
    pub reports: &'a [Report],
    pub categories: &'a [DocumentCategory],
    pub criteria: &'a [ApplicationCriteria],
    pub documents: &'a [DocumentCheck],
    pub reference_documents: &'a [ReferenceDocument],
    /// Department head who ran the first checks.
    pub department: Option<&'a ReviewerProfile>,
}

/// Rolls every finished category report of an application into one department report.
pub struct DepartmentReportBuilder<'t> {
    expert_titles: &'t ExpertTitles,
}

impl<'t> DepartmentReportBuilder<'t> {
    pub fn new(expert_titles: &'t ExpertTitles) -> Self {
        Self { expert_titles }
    }

    pub fn build(
        &self,
        input: &DepartmentReportInput<'_>,
    ) -> Result<DepartmentReportData, LicensingError> {
        let mut finished: Vec<(&Report, _)> = input
            .reports
            .iter()
            .filter(|report| {
                matches!(
                    report.status,
                    SnapshotStatus::Completed | SnapshotStatus::Approved
                )
            })
            .filter_map(|report| match report.scope {
                ReportScope::Category(category_id) => Some((report, category_id)),
                ReportScope::Documents(_) => None,
            })
            .collect();
        finished.sort_by_key(|(report, _)| report.id);

        let mut reports = Vec::with_capacity(finished.len());
        for (report, category_id) in finished {
            let category = input
                .categories
                .iter()
                .find(|category| category.id == category_id)
                .ok_or_else(|| LicensingError::not_found("category", category_id.0))?;
            let criteria = input
                .criteria
                .iter()
                .find(|criteria| {
                    criteria.application_id == report.application_id
                        && criteria.category_id == category_id
                })
                .ok_or_else(|| LicensingError::not_found("criteria", category_id.0))?;

            let documents: Vec<&DocumentCheck> = input
                .documents
                .iter()
                .filter(|document| document.category_id == category_id)
                .collect();
            let verdict = ReportVerdict::from_outcomes(
                documents
                    .iter()
                    .map(|document| document.is_industry_passed() == Some(true)),
            );

            let mut lines = BTreeMap::new();
            for document in &documents {
                lines.entry(document.document_id).or_insert_with(|| {
                    let title = input
                        .reference_documents
                        .iter()
                        .find(|reference| reference.id == document.document_id)
                        .map_or(UNTITLED_DOCUMENT, |reference| reference.title.as_str());
                    format!("{title} - {}", verdict.criterion_sentence())
                });
            }

            reports.push(DepartmentReportItem {
                date: report.created_at.format("%d.%m.%Y").to_string(),
                expert: self.expert_line(category, criteria),
                category: category.title.clone(),
                verdict,
                documents: lines
                    .into_iter()
                    .map(|(document_id, line)| DepartmentDocumentLine { document_id, line })
                    .collect(),
            });
        }

        Ok(DepartmentReportData {
            department: input
                .department
                .map(|profile| profile.display_name.clone())
                .unwrap_or_default(),
            position: input
                .department
                .and_then(|profile| profile.position.clone())
                .unwrap_or_default(),
            date: input.anchor.created_at.format("%d/%m/%Y").to_string(),
            club: input.dossier.club.full_name.clone(),
            reports,
        })
    }

    fn expert_line(&self, category: &DocumentCategory, criteria: &ApplicationCriteria) -> String {
        let Some(reviewer) = criteria.regular_checked_by() else {
            return "Эксперт".to_string();
        };
        match self.expert_titles.get(&category.value) {
            Some(title) => format!("{title} - {}", reviewer.display_name),
            None => format!(
                "Эксперт по разделу «{}» - {}",
                category.title, reviewer.display_name
            ),
        }
    }
}
