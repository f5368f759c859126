use serde::{Deserialize, Serialize};

use super::certificate::LicenseCertificate;
use super::criteria::ApplicationCriteria;
use super::document::DocumentCheck;
use super::domain::{
    Application, ApplicationId, CategoryId, CertificateId, CheckId, Club, ControlStep, CriteriaId,
    DocumentCategory, License, ReferenceDocument, ReportId, Season, SolutionId, UserId,
};
use super::snapshot::{Report, Solution};
use super::status_graph::{Status, StatusCategory};

/// Criteria records, one per application and category.
pub trait CriteriaRepository: Send + Sync {
    fn get_by_id(&self, id: CriteriaId) -> Result<Option<ApplicationCriteria>, RepositoryError>;
    fn get_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<ApplicationCriteria>, RepositoryError>;
    fn list_by_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ApplicationCriteria>, RepositoryError>;
    fn save(&self, criteria: ApplicationCriteria) -> Result<(), RepositoryError>;
}

pub trait DocumentCheckRepository: Send + Sync {
    fn get_by_id(&self, id: CheckId) -> Result<Option<DocumentCheck>, RepositoryError>;
    fn get_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<DocumentCheck>, RepositoryError>;
    fn list_by_category(&self, category: CategoryId)
        -> Result<Vec<DocumentCheck>, RepositoryError>;
    fn save(&self, document: DocumentCheck) -> Result<(), RepositoryError>;
}

/// Status categories and the statuses scoped within them.
pub trait WorkflowRepository: Send + Sync {
    fn get_category_by_id(&self, id: u64) -> Result<Option<StatusCategory>, RepositoryError>;
    fn list_categories(&self) -> Result<Vec<StatusCategory>, RepositoryError>;
    fn get_status_by_id(&self, id: u64) -> Result<Option<Status>, RepositoryError>;
    fn list_by_category(&self, category_id: u64) -> Result<Vec<Status>, RepositoryError>;
    fn save_category(&self, category: StatusCategory) -> Result<(), RepositoryError>;
    fn save_status(&self, status: Status) -> Result<(), RepositoryError>;
}

/// Read access to upstream entities plus report and solution snapshots.
pub trait DossierRepository: Send + Sync {
    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn club(&self, id: u64) -> Result<Option<Club>, RepositoryError>;
    fn license(&self, id: u64) -> Result<Option<License>, RepositoryError>;
    fn season(&self, id: u64) -> Result<Option<Season>, RepositoryError>;
    fn categories(&self) -> Result<Vec<DocumentCategory>, RepositoryError>;
    fn reference_documents(&self) -> Result<Vec<ReferenceDocument>, RepositoryError>;
    fn latest_control_step(
        &self,
        application: ApplicationId,
    ) -> Result<Option<ControlStep>, RepositoryError>;
    fn report(&self, id: ReportId) -> Result<Option<Report>, RepositoryError>;
    fn reports_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<Report>, RepositoryError>;
    fn save_report(&self, report: Report) -> Result<(), RepositoryError>;
    fn solution(&self, id: SolutionId) -> Result<Option<Solution>, RepositoryError>;
    fn save_solution(&self, solution: Solution) -> Result<(), RepositoryError>;
    fn solutions_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<Solution>, RepositoryError>;
    fn certificate(&self, id: CertificateId) -> Result<Option<LicenseCertificate>, RepositoryError>;
}

/// Every storage contract the review service needs behind one handle.
pub trait LicensingStore:
    CriteriaRepository + DocumentCheckRepository + WorkflowRepository + DossierRepository
{
}

impl<T> LicensingStore for T where
    T: CriteriaRepository + DocumentCheckRepository + WorkflowRepository + DossierRepository
{
}

/// Reviewer identity as captured on stamps and signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerProfile {
    pub user_id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub position: Option<String>,
}

/// Identity lookup used only to stamp display names, never for authorization.
pub trait ReviewerDirectory: Send + Sync {
    fn profile(&self, user: UserId) -> Result<Option<ReviewerProfile>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
