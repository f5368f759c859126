use crate::workflows::licensing::criteria::ApplicationCriteria;
use crate::workflows::licensing::document::{ordered_checks, DocumentCheck};
use crate::workflows::licensing::domain::{
    ApplicationDossier, DocumentCategory, LicensingError, ReferenceDocument,
};

use super::views::{InitialReportData, InitialReportDocument};
use super::UNTITLED_DOCUMENT;

#[derive(Debug, Clone, Copy)]
pub struct InitialReportInput<'a> {
    pub dossier: &'a ApplicationDossier,
    pub category: &'a DocumentCategory,
    pub criteria: &'a ApplicationCriteria,
    pub documents: &'a [DocumentCheck],
    pub reference_documents: &'a [ReferenceDocument],
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Numbered intake list handed to the category expert.
pub struct InitialReportBuilder;

impl InitialReportBuilder {
    pub fn build(input: &InitialReportInput<'_>) -> Result<InitialReportData, LicensingError> {
        let documents = ordered_checks(input.documents, None)?
            .into_iter()
            .filter(|document| document.category_id == input.category.id)
            .enumerate()
            .map(|(index, document)| {
                let document_title = input
                    .reference_documents
                    .iter()
                    .find(|reference| reference.id == document.document_id)
                    .map_or(UNTITLED_DOCUMENT, |reference| reference.title.as_str());
                let name = match document.title.trim() {
                    "" => document_title,
                    title => title,
                };
                InitialReportDocument {
                    number: index + 1,
                    name: name.to_string(),
                    document_title: document_title.to_string(),
                    submission_date: document.created_at.format("%d.%m.%Y").to_string(),
                    notes: document.info.clone().unwrap_or_default(),
                }
            })
            .collect();

        Ok(InitialReportData {
            expert: format!("Эксперту по отделу - {}", input.category.title),
            director: input
                .criteria
                .first_checked_by()
                .map(|stamp| stamp.display_name.clone())
                .unwrap_or_default(),
            date: input.created_at.format("%d.%m.%Y").to_string(),
            club: input.dossier.club.full_name.clone(),
            documents,
        })
    }
}
