//! Licensing review: staged checks of criteria and documents, the status workflow graph,
//! and the decision and report aggregation built on top of them.

pub mod certificate;
pub mod criteria;
pub mod decision;
pub mod document;
pub mod domain;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod snapshot;
pub mod stages;
pub mod status_graph;

#[cfg(test)]
mod tests;

pub use certificate::{CertificateBuilder, CertificateData, CertificateInput, LicenseCertificate};
pub use criteria::ApplicationCriteria;
pub use decision::{
    Article, ArticleDocument, CriteriaLine, DecisionAggregator, DecisionConfig, ExpertTitles,
    SolutionData, SolutionDefaults, SolutionInput, StatusCodes,
};
pub use document::{ordered_checks, DocumentCheck, StageComment};
pub use domain::{
    Application, ApplicationDossier, ApplicationId, ApplicationStatus, CategoryId, CertificateId,
    CheckId, Club, ControlStep, CriteriaId, DocumentCategory, DocumentId, Language, License,
    LicensingError, LocalizedTitle, ReferenceDocument, ReportId, ResponsiblePerson, ReviewStage,
    ReviewState, ReviewerStamp, Season, SolutionId, UserId,
};
pub use report::{LineItemStatus, ReportBuilder, ReportVerdict};
pub use repository::{
    CriteriaRepository, DocumentCheckRepository, DossierRepository, LicensingStore,
    RepositoryError, ReviewerDirectory, ReviewerProfile, WorkflowRepository,
};
pub use router::licensing_router;
pub use service::{
    DocumentReview, LicensingReviewService, ReviewBatchError, ReviewBatchSummary,
    WorkflowStepView,
};
pub use snapshot::{Report, ReportScope, SnapshotStatus, Solution};
pub use stages::{ReviewProgressView, ReviewTrack, StageRecord};
pub use status_graph::{
    Status, StatusCategory, StatusNode, WorkflowGraph, WorkflowNode, WorkflowPosition,
};
