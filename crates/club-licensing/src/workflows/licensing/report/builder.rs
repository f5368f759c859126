use crate::workflows::licensing::criteria::ApplicationCriteria;
use crate::workflows::licensing::decision::ExpertTitles;
use crate::workflows::licensing::document::{ordered_checks, DocumentCheck};
use crate::workflows::licensing::domain::{
    ApplicationDossier, DocumentCategory, LicensingError, ReferenceDocument, ReviewStage,
};
use crate::workflows::licensing::snapshot::{Report, ReportScope};

use super::views::{ReportArticle, ReportData, ReportLineItem};
use super::{LineItemStatus, ReportVerdict, UNTITLED_DOCUMENT};

const ACCEPTED_NOTE: &str =
    "Соответствует требованиям процедуры лицензирования. Не противоречит действующему законодательству РК.";
const MISSING_NOTE: &str = "Не указано";

/// Loaded entities for one report run. `documents` may hold every check of the
/// application; the report scope decides which ones are printed.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub report: &'a Report,
    pub dossier: &'a ApplicationDossier,
    pub category: &'a DocumentCategory,
    pub criteria: &'a ApplicationCriteria,
    pub documents: &'a [DocumentCheck],
    pub reference_documents: &'a [ReferenceDocument],
}

/// Builds accepted/rejected line items and a verdict for a report snapshot.
/// A document counts as accepted when its industry check passed.
pub struct ReportBuilder<'t> {
    expert_titles: &'t ExpertTitles,
}

impl<'t> ReportBuilder<'t> {
    pub fn new(expert_titles: &'t ExpertTitles) -> Self {
        Self { expert_titles }
    }

    pub fn select<'a>(input: &ReportInput<'a>) -> Result<Vec<&'a DocumentCheck>, LicensingError> {
        match &input.report.scope {
            ReportScope::Documents(ids) => ordered_checks(input.documents, Some(ids.as_slice())),
            ReportScope::Category(category_id) => {
                let ordered = ordered_checks(input.documents, None)?;
                Ok(ordered
                    .into_iter()
                    .filter(|document| document.category_id == *category_id)
                    .collect())
            }
        }
    }

    pub fn verdict(documents: &[&DocumentCheck]) -> ReportVerdict {
        ReportVerdict::from_outcomes(documents.iter().map(|document| accepted(document)))
    }

    pub fn line_items(documents: &[&DocumentCheck]) -> Vec<ReportLineItem> {
        documents
            .iter()
            .map(|document| {
                let status = LineItemStatus::from_outcome(accepted(document));
                let note = match status {
                    LineItemStatus::Accepted => ACCEPTED_NOTE.to_string(),
                    LineItemStatus::Rejected => document
                        .stage(ReviewStage::IndustryCheck)
                        .non_empty_comment()
                        .unwrap_or(MISSING_NOTE)
                        .to_string(),
                };
                let name = document.title.trim();
                ReportLineItem {
                    check_id: document.id,
                    name: if name.is_empty() {
                        UNTITLED_DOCUMENT.to_string()
                    } else {
                        name.to_string()
                    },
                    status,
                    status_label: status.label(),
                    note,
                }
            })
            .collect()
    }

    pub fn build(&self, input: &ReportInput<'_>) -> Result<ReportData, LicensingError> {
        let documents = Self::select(input)?;
        let items = Self::line_items(&documents);
        let verdict = Self::verdict(&documents);

        let mut articles: Vec<ReportArticle> = Vec::new();
        for (document, item) in documents.iter().zip(&items) {
            match articles
                .iter_mut()
                .find(|article| article.document_id == document.document_id)
            {
                Some(article) => article.documents.push(item.clone()),
                None => articles.push(ReportArticle {
                    document_id: document.document_id,
                    title: input
                        .reference_documents
                        .iter()
                        .find(|reference| reference.id == document.document_id)
                        .map_or(UNTITLED_DOCUMENT, |reference| reference.title.as_str())
                        .to_string(),
                    documents: vec![item.clone()],
                }),
            }
        }

        let club = &input.dossier.club.full_name;
        let category = &input.category.title;
        let summary = format!(
            "В результате проведенного анализа документов, предоставленных Соискателем лицензии – {club} в Департамент лицензирования, на предмет их соответствия разделу \"{category}\", согласно требованиям «Правил по лицензированию футбольных клубов для участия в соревнованиях, организуемых КФФ», выпуск {season} г., {ending}",
            season = input.dossier.season.title,
            ending = verdict.summary_ending(),
        );

        let regular = input.criteria.regular_checked_by();
        let created_at = input.report.created_at;

        Ok(ReportData {
            director: input
                .criteria
                .first_checked_by()
                .map(|stamp| stamp.display_name.clone())
                .unwrap_or_default(),
            expert: regular
                .map(|stamp| {
                    format!(
                        "{} - {}",
                        self.expert_titles.resolve(input.category),
                        stamp.display_name
                    )
                })
                .unwrap_or_default(),
            date: created_at.format("%d/%m/%Y").to_string(),
            club: club.clone(),
            category: category.clone(),
            items,
            articles,
            summary,
            signed_by: regular.map(|stamp| stamp.display_name.clone()),
            signed_date: created_at.format("%d.%m.%Y").to_string(),
            verdict,
            verdict_label: verdict.label(),
        })
    }
}

fn accepted(document: &DocumentCheck) -> bool {
    document.is_industry_passed() == Some(true)
}
