use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::certificate::{CertificateBuilder, CertificateData, CertificateInput};
use super::criteria::ApplicationCriteria;
use super::decision::{DecisionAggregator, DecisionConfig, SolutionData, SolutionInput};
use super::document::{ordered_checks, DocumentCheck};
use super::domain::{
    ApplicationDossier, ApplicationId, CategoryId, CertificateId, CheckId, CriteriaId,
    DocumentCategory, DocumentId, Language, LicensingError, ReportId, ReviewStage, ReviewerStamp,
    SolutionId, UserId,
};
use super::report::views::{DepartmentReportData, InitialReportData, ReportData};
use super::report::{
    DepartmentReportBuilder, DepartmentReportInput, InitialReportBuilder, InitialReportInput,
    ReportBuilder, ReportInput,
};
use super::repository::{
    CriteriaRepository, DocumentCheckRepository, DossierRepository, LicensingStore,
    ReviewerDirectory, ReviewerProfile, WorkflowRepository,
};
use super::snapshot::{Report, ReportScope, SnapshotStatus, Solution};
use super::status_graph::{Status, StatusCategory, WorkflowGraph, WorkflowNode, WorkflowPosition};

/// Orchestrates repository reads, reviewer stamping, state machine mutations and
/// aggregation runs.
pub struct LicensingReviewService<S, D> {
    store: Arc<S>,
    reviewers: Arc<D>,
    aggregator: Arc<DecisionAggregator>,
}

impl<S, D> LicensingReviewService<S, D>
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    pub fn new(store: Arc<S>, reviewers: Arc<D>, config: DecisionConfig) -> Self {
        Self {
            store,
            reviewers,
            aggregator: Arc::new(DecisionAggregator::new(config)),
        }
    }

    pub fn config(&self) -> &DecisionConfig {
        self.aggregator.config()
    }

    fn criteria_store(&self) -> &dyn CriteriaRepository {
        self.store.as_ref()
    }

    fn document_store(&self) -> &dyn DocumentCheckRepository {
        self.store.as_ref()
    }

    fn workflow_store(&self) -> &dyn WorkflowRepository {
        self.store.as_ref()
    }

    fn dossier_store(&self) -> &dyn DossierRepository {
        self.store.as_ref()
    }

    fn reviewer(&self, user: UserId) -> Result<ReviewerProfile, LicensingError> {
        self.reviewers
            .profile(user)?
            .ok_or_else(|| LicensingError::not_found("reviewer", user.0))
    }

    /// Snapshot the reviewer's current display name.
    pub fn stamp(&self, user: UserId, at: DateTime<Utc>) -> Result<ReviewerStamp, LicensingError> {
        let profile = self.reviewer(user)?;
        Ok(ReviewerStamp::new(user, profile.display_name, at))
    }

    pub fn criteria(&self, id: CriteriaId) -> Result<ApplicationCriteria, LicensingError> {
        self.criteria_store()
            .get_by_id(id)?
            .ok_or_else(|| LicensingError::not_found("criteria", id.0))
    }

    fn update_criteria<F>(
        &self,
        id: CriteriaId,
        mutate: F,
    ) -> Result<ApplicationCriteria, LicensingError>
    where
        F: FnOnce(&mut ApplicationCriteria) -> Result<(), LicensingError>,
    {
        let mut criteria = self.criteria(id)?;
        mutate(&mut criteria)?;
        self.criteria_store().save(criteria.clone())?;
        Ok(criteria)
    }

    pub fn upload_criteria(
        &self,
        id: CriteriaId,
        user: UserId,
        at: DateTime<Utc>,
    ) -> Result<ApplicationCriteria, LicensingError> {
        let stamp = self.stamp(user, at)?;
        self.update_criteria(id, |criteria| {
            criteria.mark_as_uploaded(stamp);
            Ok(())
        })
    }

    pub fn mark_criteria(
        &self,
        id: CriteriaId,
        stage: ReviewStage,
        user: UserId,
        passed: bool,
        at: DateTime<Utc>,
    ) -> Result<ApplicationCriteria, LicensingError> {
        let stamp = self.stamp(user, at)?;
        let result = self.update_criteria(id, |criteria| {
            criteria.mark(stage, stamp, passed).map(|_| ())
        });
        match &result {
            Ok(criteria) => debug!(
                criteria_id = %id,
                stage = stage.label(),
                passed,
                current = criteria.get_current_stage().label(),
                "criteria stage marked"
            ),
            Err(error) => warn!(
                criteria_id = %id,
                stage = stage.label(),
                %error,
                "criteria mark rejected"
            ),
        }
        result
    }

    pub fn enable_reupload(
        &self,
        id: CriteriaId,
        documents: Option<Vec<DocumentId>>,
    ) -> Result<ApplicationCriteria, LicensingError> {
        self.update_criteria(id, |criteria| {
            criteria.enable_reupload(documents);
            Ok(())
        })
    }

    pub fn disable_reupload(&self, id: CriteriaId) -> Result<ApplicationCriteria, LicensingError> {
        self.update_criteria(id, |criteria| {
            criteria.disable_reupload();
            Ok(())
        })
    }

    pub fn set_criteria_ready(
        &self,
        id: CriteriaId,
        ready: bool,
    ) -> Result<ApplicationCriteria, LicensingError> {
        self.update_criteria(id, |criteria| {
            if ready {
                criteria.mark_as_ready();
            } else {
                criteria.mark_as_not_ready();
            }
            Ok(())
        })
    }

    pub fn reset_criteria(&self, id: CriteriaId) -> Result<ApplicationCriteria, LicensingError> {
        self.update_criteria(id, |criteria| {
            criteria.reset_checks();
            Ok(())
        })
    }

    pub fn document(&self, id: CheckId) -> Result<DocumentCheck, LicensingError> {
        self.document_store()
            .get_by_id(id)?
            .ok_or_else(|| LicensingError::not_found("document check", id.0))
    }

    fn update_document<F>(&self, id: CheckId, mutate: F) -> Result<DocumentCheck, LicensingError>
    where
        F: FnOnce(&mut DocumentCheck) -> Result<(), LicensingError>,
    {
        let mut document = self.document(id)?;
        mutate(&mut document)?;
        self.document_store().save(document.clone())?;
        Ok(document)
    }

    pub fn upload_document(
        &self,
        id: CheckId,
        user: UserId,
        file_url: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<DocumentCheck, LicensingError> {
        let stamp = self.stamp(user, at)?;
        self.update_document(id, |document| {
            if let Some(url) = file_url {
                document.update_file(url);
            }
            document.mark_as_uploaded(stamp);
            Ok(())
        })
    }

    pub fn mark_document(
        &self,
        id: CheckId,
        stage: ReviewStage,
        user: UserId,
        passed: bool,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<DocumentCheck, LicensingError> {
        let stamp = self.stamp(user, at)?;
        let result = self.update_document(id, |document| {
            document.mark(stage, stamp, passed, comment).map(|_| ())
        });
        match &result {
            Ok(_) => debug!(
                check_id = %id,
                stage = stage.label(),
                passed,
                "document stage marked"
            ),
            Err(error) => warn!(
                check_id = %id,
                stage = stage.label(),
                %error,
                "document mark rejected"
            ),
        }
        result
    }

    pub fn reset_document(&self, id: CheckId) -> Result<DocumentCheck, LicensingError> {
        self.update_document(id, |document| {
            document.reset_checks();
            Ok(())
        })
    }

    pub fn set_deadline(
        &self,
        id: CheckId,
        deadline: NaiveDate,
        today: NaiveDate,
    ) -> Result<DocumentCheck, LicensingError> {
        self.update_document(id, |document| {
            document.set_deadline(deadline, today).map(|_| ())
        })
    }

    pub fn extend_deadline(&self, id: CheckId, days: i64) -> Result<DocumentCheck, LicensingError> {
        self.update_document(id, |document| document.extend_deadline(days).map(|_| ()))
    }

    /// Apply a batch of offline reviews to document checks in order. Every entry is
    /// applied in memory before the first save, so a rejected entry leaves storage
    /// untouched. Saves are not transactional: a storage failure part way through keeps
    /// the documents already written and is reported against the last row of the
    /// document that failed to save.
    pub fn apply_document_reviews(
        &self,
        reviews: &[DocumentReview],
    ) -> Result<ReviewBatchSummary, ReviewBatchError> {
        let mut touched: HashMap<CheckId, DocumentCheck> = HashMap::new();
        let mut last_rows: HashMap<CheckId, usize> = HashMap::new();
        let mut summary = ReviewBatchSummary::default();

        for review in reviews {
            last_rows.insert(review.check_id, review.row);
            let fail = |source| ReviewBatchError {
                row: review.row,
                source,
            };

            if !touched.contains_key(&review.check_id) {
                let document = self.document(review.check_id).map_err(fail)?;
                touched.insert(review.check_id, document);
            }
            let document = touched.get_mut(&review.check_id).ok_or_else(|| {
                fail(LicensingError::not_found(
                    "document check",
                    review.check_id.0,
                ))
            })?;

            if document.stage(review.stage).is_passed() {
                summary.skipped += 1;
                continue;
            }

            let stamp = match review.reviewer_name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => {
                    ReviewerStamp::new(review.reviewer_id, name, review.reviewed_at)
                }
                _ => self
                    .stamp(review.reviewer_id, review.reviewed_at)
                    .map_err(fail)?,
            };
            document
                .mark(review.stage, stamp, review.passed, review.comment.clone())
                .map_err(fail)?;
            summary.applied += 1;
        }

        summary.documents = touched.len();
        let mut documents: Vec<DocumentCheck> = touched.into_values().collect();
        documents.sort_by_key(|document| document.id);
        for document in documents {
            let row = last_rows.get(&document.id).copied().unwrap_or_default();
            self.document_store()
                .save(document)
                .map_err(|error| ReviewBatchError {
                    row,
                    source: error.into(),
                })?;
        }

        info!(
            applied = summary.applied,
            skipped = summary.skipped,
            documents = summary.documents,
            "review batch applied"
        );
        Ok(summary)
    }

    /// Resolve application, club, license and season. Any gap is a NotFound.
    pub fn load_dossier(
        &self,
        application_id: ApplicationId,
    ) -> Result<ApplicationDossier, LicensingError> {
        let store = self.dossier_store();
        let application = store
            .application(application_id)?
            .ok_or_else(|| LicensingError::not_found("application", application_id.0))?;
        let club = store
            .club(application.club_id)?
            .ok_or_else(|| LicensingError::not_found("club", application.club_id))?;
        let license = store
            .license(application.license_id)?
            .ok_or_else(|| LicensingError::not_found("license", application.license_id))?;
        let season = store
            .season(license.season_id)?
            .ok_or_else(|| LicensingError::not_found("season", license.season_id))?;

        Ok(ApplicationDossier {
            application,
            club,
            license,
            season,
        })
    }

    pub fn solution(&self, id: SolutionId) -> Result<Solution, LicensingError> {
        self.dossier_store()
            .solution(id)?
            .ok_or_else(|| LicensingError::not_found("solution", id.0))
    }

    pub fn report(&self, id: ReportId) -> Result<Report, LicensingError> {
        self.dossier_store()
            .report(id)?
            .ok_or_else(|| LicensingError::not_found("report", id.0))
    }

    pub fn generate_solution(
        &self,
        id: SolutionId,
        today: NaiveDate,
    ) -> Result<SolutionData, LicensingError> {
        let solution = self.solution(id)?;
        let dossier = self.load_dossier(solution.application_id)?;
        let criteria = self
            .criteria_store()
            .get_by_application(solution.application_id)?;
        let documents = self
            .document_store()
            .get_by_application(solution.application_id)?;
        let categories = self.dossier_store().categories()?;
        let control_step = self
            .dossier_store()
            .latest_control_step(solution.application_id)?;

        let data = self.aggregator.aggregate(&SolutionInput {
            dossier: &dossier,
            criteria: &criteria,
            documents: &documents,
            categories: &categories,
            explicit_order: solution.list_documents.as_deref(),
            control_step: control_step.as_ref(),
            solution: Some(&solution),
            generated_on: today,
        })?;

        info!(
            solution_id = %id,
            application_id = %solution.application_id,
            status = data.application_status.label(),
            articles = data.articles.len(),
            "solution generated"
        );
        Ok(data)
    }

    fn category(
        &self,
        categories: &[DocumentCategory],
        id: CategoryId,
    ) -> Result<DocumentCategory, LicensingError> {
        categories
            .iter()
            .find(|category| category.id == id)
            .cloned()
            .ok_or_else(|| LicensingError::not_found("category", id.0))
    }

    fn criteria_for(
        &self,
        application: ApplicationId,
        category: CategoryId,
    ) -> Result<ApplicationCriteria, LicensingError> {
        self.criteria_store()
            .get_by_application(application)?
            .into_iter()
            .find(|criteria| criteria.category_id == category)
            .ok_or_else(|| LicensingError::not_found("criteria", category.0))
    }

    pub fn generate_report(&self, id: ReportId) -> Result<ReportData, LicensingError> {
        let report = self.report(id)?;
        let dossier = self.load_dossier(report.application_id)?;
        let documents = self
            .document_store()
            .get_by_application(report.application_id)?;

        let category_id = match &report.scope {
            ReportScope::Category(category_id) => *category_id,
            ReportScope::Documents(ids) => {
                let first = ids.first().ok_or_else(|| {
                    LicensingError::validation(format!("report {id} lists no documents"))
                })?;
                documents
                    .iter()
                    .find(|document| document.id == *first)
                    .map(|document| document.category_id)
                    .ok_or_else(|| LicensingError::not_found("document check", first.0))?
            }
        };
        let categories = self.dossier_store().categories()?;
        let category = self.category(&categories, category_id)?;
        let criteria = self.criteria_for(report.application_id, category_id)?;
        let reference_documents = self.dossier_store().reference_documents()?;

        let data = ReportBuilder::new(&self.config().expert_titles).build(&ReportInput {
            report: &report,
            dossier: &dossier,
            category: &category,
            criteria: &criteria,
            documents: &documents,
            reference_documents: &reference_documents,
        })?;

        info!(
            report_id = %id,
            application_id = %report.application_id,
            verdict = data.verdict.label(),
            items = data.items.len(),
            "report generated"
        );
        Ok(data)
    }

    pub fn generate_department_report(
        &self,
        id: ReportId,
    ) -> Result<DepartmentReportData, LicensingError> {
        let anchor = self.report(id)?;
        let dossier = self.load_dossier(anchor.application_id)?;
        let reports = self
            .dossier_store()
            .reports_by_application(anchor.application_id)?;
        let criteria = self
            .criteria_store()
            .get_by_application(anchor.application_id)?;
        let documents = self
            .document_store()
            .get_by_application(anchor.application_id)?;
        let categories = self.dossier_store().categories()?;
        let reference_documents = self.dossier_store().reference_documents()?;

        let department = match ordered_checks(&documents, None)?
            .into_iter()
            .find_map(|document| document.stage(ReviewStage::FirstCheck).reviewer.clone())
        {
            Some(stamp) => Some(self.reviewers.profile(stamp.user_id)?.unwrap_or(
                ReviewerProfile {
                    user_id: stamp.user_id,
                    display_name: stamp.display_name,
                    position: None,
                },
            )),
            None => None,
        };

        let data = DepartmentReportBuilder::new(&self.config().expert_titles).build(
            &DepartmentReportInput {
                anchor: &anchor,
                dossier: &dossier,
                reports: &reports,
                categories: &categories,
                criteria: &criteria,
                documents: &documents,
                reference_documents: &reference_documents,
                department: department.as_ref(),
            },
        )?;

        info!(
            report_id = %id,
            application_id = %anchor.application_id,
            sections = data.reports.len(),
            "department report generated"
        );
        Ok(data)
    }

    pub fn generate_initial_report(
        &self,
        application_id: ApplicationId,
        category_id: CategoryId,
        at: DateTime<Utc>,
    ) -> Result<InitialReportData, LicensingError> {
        let dossier = self.load_dossier(application_id)?;
        let categories = self.dossier_store().categories()?;
        let category = self.category(&categories, category_id)?;
        let criteria = self.criteria_for(application_id, category_id)?;
        let documents = self.document_store().get_by_application(application_id)?;
        let reference_documents = self.dossier_store().reference_documents()?;

        InitialReportBuilder::build(&InitialReportInput {
            dossier: &dossier,
            category: &category,
            criteria: &criteria,
            documents: &documents,
            reference_documents: &reference_documents,
            created_at: at,
        })
    }

    /// Certificate data for a licensed club, dated by the application's first solution.
    pub fn generate_certificate(&self, id: CertificateId) -> Result<CertificateData, LicensingError> {
        let store = self.dossier_store();
        let certificate = store
            .certificate(id)?
            .ok_or_else(|| LicensingError::not_found("certificate", id.0))?;
        let club = store
            .club(certificate.club_id)?
            .ok_or_else(|| LicensingError::not_found("club", certificate.club_id))?;
        let license = store
            .license(certificate.license_id)?
            .ok_or_else(|| LicensingError::not_found("license", certificate.license_id))?;
        let solutions = store.solutions_by_application(certificate.application_id)?;
        let solution = CertificateBuilder::first_solution(&solutions).ok_or_else(|| {
            LicensingError::not_found("application solution", certificate.application_id.0)
        })?;

        let data = CertificateBuilder::build(&CertificateInput {
            certificate: &certificate,
            club: &club,
            license: &license,
            solution,
        });
        info!(certificate_id = %id, solution_id = %solution.id, "certificate generated");
        Ok(data)
    }

    pub fn transition_report(
        &self,
        id: ReportId,
        next: SnapshotStatus,
        at: DateTime<Utc>,
    ) -> Result<Report, LicensingError> {
        let mut report = self.report(id)?;
        let from = report.status;
        if let Err(error) = report.transition_to(next, at) {
            warn!(
                report_id = %id,
                from = from.label(),
                to = next.label(),
                %error,
                "report transition rejected"
            );
            return Err(error);
        }
        self.dossier_store().save_report(report.clone())?;
        info!(report_id = %id, from = from.label(), to = next.label(), "report transitioned");
        Ok(report)
    }

    pub fn transition_solution(
        &self,
        id: SolutionId,
        next: SnapshotStatus,
        at: DateTime<Utc>,
    ) -> Result<Solution, LicensingError> {
        let mut solution = self.solution(id)?;
        let from = solution.status;
        if let Err(error) = solution.transition_to(next, at) {
            warn!(
                solution_id = %id,
                from = from.label(),
                to = next.label(),
                %error,
                "solution transition rejected"
            );
            return Err(error);
        }
        self.dossier_store().save_solution(solution.clone())?;
        info!(solution_id = %id, from = from.label(), to = next.label(), "solution transitioned");
        Ok(solution)
    }

    pub fn workflow_graph(&self) -> Result<WorkflowGraph<StatusCategory>, LicensingError> {
        let graph = WorkflowGraph::from_nodes(self.workflow_store().list_categories()?)?;
        graph.validate_acyclic()?;
        Ok(graph)
    }

    /// Link two status categories and persist every node whose pointers changed.
    pub fn link_categories(&self, from: u64, to: u64) -> Result<(), LicensingError> {
        let mut graph = self.workflow_graph()?;
        for category in relink(&mut graph, from, to)? {
            self.workflow_store().save_category(category)?;
        }
        info!(from, to, "status categories linked");
        Ok(())
    }

    /// Status categories visible to `role`, chain by chain from every head.
    pub fn workflow_chain(
        &self,
        role: &str,
        language: Language,
    ) -> Result<Vec<WorkflowStepView>, LicensingError> {
        visible_steps(&self.workflow_graph()?, role, language)
    }

    pub fn status_graph(&self, category_id: u64) -> Result<WorkflowGraph<Status>, LicensingError> {
        self.workflow_store()
            .get_category_by_id(category_id)?
            .ok_or_else(|| LicensingError::not_found("status category", category_id))?;
        let graph = WorkflowGraph::from_nodes(self.workflow_store().list_by_category(category_id)?)?;
        graph.validate_acyclic()?;
        Ok(graph)
    }

    /// Link two statuses of one category. Statuses filed under another category are
    /// rejected even when they exist.
    pub fn link_statuses(&self, category_id: u64, from: u64, to: u64) -> Result<(), LicensingError> {
        for id in [from, to] {
            let status = self
                .workflow_store()
                .get_status_by_id(id)?
                .ok_or_else(|| LicensingError::not_found("status", id))?;
            if status.category_id != category_id {
                warn!(
                    status_id = id,
                    category_id, "status link rejected across categories"
                );
                return Err(LicensingError::validation(format!(
                    "status {id} belongs to category {}, not {category_id}",
                    status.category_id
                )));
            }
        }

        let mut graph = self.status_graph(category_id)?;
        for status in relink(&mut graph, from, to)? {
            self.workflow_store().save_status(status)?;
        }
        info!(category_id, from, to, "statuses linked");
        Ok(())
    }

    /// Statuses of one category visible to `role`.
    pub fn status_chain(
        &self,
        category_id: u64,
        role: &str,
        language: Language,
    ) -> Result<Vec<WorkflowStepView>, LicensingError> {
        visible_steps(&self.status_graph(category_id)?, role, language)
    }
}

/// Link `from -> to` and hand back every node whose pointers changed.
fn relink<N>(graph: &mut WorkflowGraph<N>, from: u64, to: u64) -> Result<Vec<N>, LicensingError>
where
    N: WorkflowNode + Clone,
{
    let before: HashMap<u64, (Option<u64>, Option<u64>)> = graph
        .nodes()
        .map(|node| (node.id(), (node.node().previous_id, node.node().next_id)))
        .collect();
    graph.link(from, to)?;
    Ok(graph
        .nodes()
        .filter(|node| {
            before.get(&node.id()) != Some(&(node.node().previous_id, node.node().next_id))
        })
        .cloned()
        .collect())
}

fn visible_steps<N: WorkflowNode>(
    graph: &WorkflowGraph<N>,
    role: &str,
    language: Language,
) -> Result<Vec<WorkflowStepView>, LicensingError> {
    let mut steps = Vec::new();
    for head in graph.heads() {
        for node in graph.visible_chain(head, role)? {
            let position = node.node().position();
            steps.push(WorkflowStepView {
                id: node.id(),
                value: node.node().value.clone(),
                title: node.node().title(language).to_string(),
                position,
                position_label: position.label(),
            });
        }
    }
    Ok(steps)
}

/// One offline review decision for a document check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReview {
    /// Source row, 1-based, used in error reports.
    pub row: usize,
    pub check_id: CheckId,
    pub stage: ReviewStage,
    pub passed: bool,
    pub reviewer_id: UserId,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewBatchSummary {
    pub applied: usize,
    pub skipped: usize,
    pub documents: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("review row {row}: {source}")]
pub struct ReviewBatchError {
    pub row: usize,
    #[source]
    pub source: LicensingError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStepView {
    pub id: u64,
    pub value: String,
    pub title: String,
    pub position: WorkflowPosition,
    pub position_label: &'static str,
}
