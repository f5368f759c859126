mod conclusion;
mod config;
mod experts;

pub use conclusion::{build_conclusion, ConclusionContext};
pub use config::{DecisionConfig, ExpertTitles, SolutionDefaults, StatusCodes};

pub(crate) use conclusion::deadline_sentence;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::criteria::ApplicationCriteria;
use super::document::{ordered_checks, DocumentCheck};
use super::domain::{
    ApplicationDossier, ApplicationStatus, CheckId, ControlStep, DocumentCategory, LicensingError,
};
use super::snapshot::Solution;

const UNTITLED_DOCUMENT: &str = "Документ";

/// Everything one aggregation run reads. All entities must be loaded up front.
#[derive(Debug, Clone, Copy)]
pub struct SolutionInput<'a> {
    pub dossier: &'a ApplicationDossier,
    pub criteria: &'a [ApplicationCriteria],
    pub documents: &'a [DocumentCheck],
    pub categories: &'a [DocumentCategory],
    pub explicit_order: Option<&'a [CheckId]>,
    pub control_step: Option<&'a ControlStep>,
    pub solution: Option<&'a Solution>,
    /// Meeting date used when no solution snapshot provides one.
    pub generated_on: NaiveDate,
}

/// Documents of one category together with the criteria record they belong to.
#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub category: &'a DocumentCategory,
    pub criteria: &'a ApplicationCriteria,
    pub documents: Vec<&'a DocumentCheck>,
}

impl<'a> CategoryGroup<'a> {
    /// Documents without a passing control check.
    pub fn failing(&self) -> impl Iterator<Item = &'a DocumentCheck> + '_ {
        self.documents
            .iter()
            .copied()
            .filter(|document| document.is_final_passed() != Some(true))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaLine {
    pub title: String,
    pub description: String,
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDocument {
    pub title: String,
    pub comment: Option<String>,
    pub deadline: String,
}

/// Remediation section for a category with failing documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub category: String,
    pub documents: Vec<ArticleDocument>,
}

/// Data printed on a licensing committee solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionData {
    pub application_status: ApplicationStatus,
    pub meeting_date: String,
    pub meeting_place: String,
    pub department_name: String,
    pub secretary_name: String,
    pub control_position: String,
    pub control_name: String,
    pub club_fullname: String,
    pub club_shortname: String,
    pub license: String,
    pub season: String,
    pub summary: String,
    pub experts: Vec<String>,
    pub criteria: Vec<CriteriaLine>,
    pub articles: Vec<Article>,
    pub conclusion: BTreeMap<u8, String>,
}

/// Turns per-category review outcomes into a formal licensing decision.
pub struct DecisionAggregator {
    config: DecisionConfig,
}

impl DecisionAggregator {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn status_of(&self, dossier: &ApplicationDossier) -> ApplicationStatus {
        ApplicationStatus::from_code(dossier.application.status_code, &self.config.status_codes)
    }

    /// Group ordered documents by category, first-seen order. Every document needs its
    /// category and the application's criteria record for that category.
    pub fn group_documents<'a>(
        &self,
        input: &SolutionInput<'a>,
    ) -> Result<Vec<CategoryGroup<'a>>, LicensingError> {
        let application_id = input.dossier.application.id;
        let ordered = ordered_checks(input.documents, input.explicit_order)?;
        let mut groups: Vec<CategoryGroup<'a>> = Vec::new();

        for document in ordered {
            if let Some(group) = groups
                .iter_mut()
                .find(|group| group.category.id == document.category_id)
            {
                group.documents.push(document);
                continue;
            }

            let category = input
                .categories
                .iter()
                .find(|category| category.id == document.category_id)
                .ok_or_else(|| LicensingError::not_found("category", document.category_id.0))?;
            let criteria = input
                .criteria
                .iter()
                .find(|criteria| {
                    criteria.application_id == application_id
                        && criteria.category_id == document.category_id
                })
                .ok_or_else(|| LicensingError::not_found("criteria", document.category_id.0))?;

            groups.push(CategoryGroup {
                category,
                criteria,
                documents: vec![document],
            });
        }

        Ok(groups)
    }

    pub fn build_criteria(&self, groups: &[CategoryGroup<'_>]) -> Vec<CriteriaLine> {
        groups
            .iter()
            .map(|group| {
                let failing: Vec<&str> = group.failing().map(document_title).collect();
                let status = failing.is_empty();
                let description = if status {
                    conclusion::ALL_REQUIREMENTS_MET.to_string()
                } else {
                    conclusion::failed_requirements(&failing)
                };
                CriteriaLine {
                    title: group.category.title.clone(),
                    description,
                    status,
                }
            })
            .collect()
    }

    pub fn build_articles(&self, groups: &[CategoryGroup<'_>]) -> Vec<Article> {
        groups
            .iter()
            .filter_map(|group| {
                let documents: Vec<ArticleDocument> = group
                    .failing()
                    .map(|document| ArticleDocument {
                        title: document_title(document).to_string(),
                        comment: document.latest_comment().map(str::to_string),
                        deadline: deadline_sentence(document.deadline),
                    })
                    .collect();
                (!documents.is_empty()).then(|| Article {
                    category: group.category.title.clone(),
                    documents,
                })
            })
            .collect()
    }

    pub fn build_experts(&self, groups: &[CategoryGroup<'_>]) -> Vec<String> {
        experts::expert_lines(groups, &self.config.expert_titles)
    }

    /// Full solution data. Any missing upstream entity aborts the whole run.
    pub fn aggregate(&self, input: &SolutionInput<'_>) -> Result<SolutionData, LicensingError> {
        let dossier = input.dossier;
        let status = self.status_of(dossier);
        let groups = self.group_documents(input)?;

        let criteria = self.build_criteria(&groups);
        let articles = self.build_articles(&groups);
        let experts = self.build_experts(&groups);

        let club = dossier.club.full_name.as_str();
        let license = dossier.license.title.as_str();
        let season = dossier.season.title.as_str();
        let conclusion = build_conclusion(
            status,
            &articles,
            &ConclusionContext {
                club,
                license,
                season,
                cancel_reason: input.control_step.and_then(|step| step.result.as_deref()),
            },
        );

        let defaults = &self.config.solution_defaults;
        let solution = input.solution;
        let meeting_date = solution
            .and_then(|solution| solution.meeting_date)
            .or_else(|| solution.map(|solution| solution.created_at.date_naive()))
            .unwrap_or(input.generated_on);
        let responsible = input.control_step.and_then(|step| step.responsible.as_ref());

        Ok(SolutionData {
            application_status: status,
            meeting_date: meeting_date.format("%d/%m/%Y").to_string(),
            meeting_place: non_blank(solution.and_then(|s| s.meeting_place.as_deref()))
                .unwrap_or(&defaults.meeting_place)
                .to_string(),
            department_name: non_blank(solution.and_then(|s| s.department_name.as_deref()))
                .unwrap_or(&defaults.department_name)
                .to_string(),
            secretary_name: non_blank(solution.and_then(|s| s.secretary.as_deref()))
                .unwrap_or(&defaults.secretary_name)
                .to_string(),
            control_position: non_blank(responsible.and_then(|person| person.position.as_deref()))
                .unwrap_or(&defaults.control_position)
                .to_string(),
            control_name: responsible
                .map(|person| person.full_name.clone())
                .unwrap_or_default(),
            club_fullname: format!("{} (БИН {})", dossier.club.full_name, dossier.club.bin),
            club_shortname: dossier.club.short_name.clone(),
            license: license.to_string(),
            season: season.to_string(),
            summary: conclusion::solution_summary(club, license, season),
            experts,
            criteria,
            articles,
            conclusion,
        })
    }
}

fn document_title(document: &DocumentCheck) -> &str {
    let title = document.title.trim();
    if title.is_empty() {
        UNTITLED_DOCUMENT
    } else {
        title
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
