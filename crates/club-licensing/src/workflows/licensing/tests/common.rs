use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::licensing::{
    Application, ApplicationCriteria, ApplicationDossier, ApplicationId, CategoryId, CertificateId,
    CheckId, Club, ControlStep, CriteriaId, CriteriaRepository, DecisionConfig, DocumentCategory,
    DocumentCheck, DocumentCheckRepository, DocumentId, DossierRepository, License,
    LicenseCertificate, LicensingReviewService, LocalizedTitle, ReferenceDocument, Report,
    ReportId, ReportScope, RepositoryError, ResponsiblePerson, ReviewerDirectory, ReviewerProfile,
    ReviewerStamp, Season, SnapshotStatus, Solution, SolutionId, Status, StatusCategory,
    StatusNode, UserId, WorkflowRepository,
};

pub(super) const APPLICATION: ApplicationId = ApplicationId(1);
pub(super) const LEGAL: CategoryId = CategoryId(1);
pub(super) const FINANCIAL: CategoryId = CategoryId(2);
pub(super) const DIRECTOR: UserId = UserId(1);
pub(super) const EXPERT: UserId = UserId(2);
pub(super) const CHAIR: UserId = UserId(3);

pub(super) fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn stamp(user: UserId, name: &str, day: u32) -> ReviewerStamp {
    ReviewerStamp::new(user, name, at(day))
}

pub(super) fn dossier(status_code: i32) -> ApplicationDossier {
    ApplicationDossier {
        application: Application {
            id: APPLICATION,
            club_id: 10,
            license_id: 20,
            status_code,
        },
        club: Club {
            id: 10,
            full_name: "ФК Кайрат".to_string(),
            short_name: "Кайрат".to_string(),
            bin: "990140000123".to_string(),
            full_name_kk: Some("«Қайрат» ФК".to_string()),
            full_name_en: Some("FC Kairat".to_string()),
        },
        license: License {
            id: 20,
            title: "Премьер-Лига".to_string(),
            season_id: 30,
            end_at: Some(date(2025, 12, 31)),
        },
        season: Season {
            id: 30,
            title: "2025".to_string(),
        },
    }
}

pub(super) fn categories() -> Vec<DocumentCategory> {
    vec![
        DocumentCategory {
            id: LEGAL,
            title: "Legal".to_string(),
            value: "legal-documents".to_string(),
        },
        DocumentCategory {
            id: FINANCIAL,
            title: "Financial".to_string(),
            value: "financial-documents".to_string(),
        },
    ]
}

pub(super) fn reference_documents() -> Vec<ReferenceDocument> {
    vec![
        ReferenceDocument {
            id: DocumentId(11),
            title: "Устав клуба".to_string(),
        },
        ReferenceDocument {
            id: DocumentId(12),
            title: "Свидетельство о регистрации".to_string(),
        },
        ReferenceDocument {
            id: DocumentId(21),
            title: "Аудиторское заключение".to_string(),
        },
    ]
}

/// Criteria record with upload, a director first check and an expert regular check.
pub(super) fn reviewed_criteria(id: u64, category: CategoryId) -> ApplicationCriteria {
    let mut criteria = ApplicationCriteria::new(CriteriaId(id), APPLICATION, category, at(1));
    criteria.mark_as_uploaded(stamp(UserId(50), "Club Officer", 1));
    criteria
        .mark_first_check(stamp(DIRECTOR, "Айгерим Садыкова", 2), true)
        .expect("first check");
    criteria
        .mark_regular_check(stamp(EXPERT, "Ержан Касымов", 3), true)
        .expect("regular check");
    criteria
}

pub(super) fn uploaded_document(
    id: u64,
    category: CategoryId,
    document: u64,
    title: &str,
) -> DocumentCheck {
    let mut check = DocumentCheck::new(
        CheckId(id),
        APPLICATION,
        category,
        DocumentId(document),
        title,
        at(1),
    );
    check.mark_as_uploaded(stamp(UserId(50), "Club Officer", 1));
    check
}

pub(super) fn passed_document(
    id: u64,
    category: CategoryId,
    document: u64,
    title: &str,
) -> DocumentCheck {
    let mut check = uploaded_document(id, category, document, title);
    check
        .mark_first_check(stamp(DIRECTOR, "Айгерим Садыкова", 2), true, None)
        .expect("first check");
    check
        .mark_industry_check(stamp(EXPERT, "Ержан Касымов", 3), true, None)
        .expect("industry check");
    check
        .mark_control_check(stamp(CHAIR, "Нурлан Ахметов", 4), true, None)
        .expect("control check");
    check
}

/// Passes first and industry checks, fails the control check with `comment`.
pub(super) fn failed_document(
    id: u64,
    category: CategoryId,
    document: u64,
    title: &str,
    comment: &str,
) -> DocumentCheck {
    let mut check = uploaded_document(id, category, document, title);
    check
        .mark_first_check(stamp(DIRECTOR, "Айгерим Садыкова", 2), true, None)
        .expect("first check");
    check
        .mark_industry_check(stamp(EXPERT, "Ержан Касымов", 3), true, None)
        .expect("industry check");
    check
        .mark_control_check(
            stamp(CHAIR, "Нурлан Ахметов", 4),
            false,
            Some(comment.to_string()),
        )
        .expect("control check");
    check
}

/// Fails the industry check with `comment`.
pub(super) fn rejected_document(
    id: u64,
    category: CategoryId,
    document: u64,
    title: &str,
    comment: &str,
) -> DocumentCheck {
    let mut check = uploaded_document(id, category, document, title);
    check
        .mark_first_check(stamp(DIRECTOR, "Айгерим Садыкова", 2), true, None)
        .expect("first check");
    check
        .mark_industry_check(
            stamp(EXPERT, "Ержан Касымов", 3),
            false,
            Some(comment.to_string()),
        )
        .expect("industry check");
    check
}

pub(super) fn workflow_category(id: u64, value: &str) -> StatusCategory {
    StatusCategory {
        node: StatusNode::new(
            id,
            value,
            LocalizedTitle::new(format!("Этап {id}"), format!("Кезең {id}")),
        ),
    }
}

pub(super) fn workflow_status(id: u64, category_id: u64, value: &str) -> Status {
    Status {
        category_id,
        node: StatusNode::new(
            id,
            value,
            LocalizedTitle::new(format!("Статус {id}"), format!("Мәртебе {id}")),
        ),
    }
}

pub(super) fn report(id: u64, scope: ReportScope, status: SnapshotStatus) -> Report {
    Report {
        id: ReportId(id),
        application_id: APPLICATION,
        scope,
        status,
        created_at: at(10),
        updated_at: None,
    }
}

pub(super) fn solution(id: u64, list_documents: Option<Vec<CheckId>>) -> Solution {
    Solution {
        id: SolutionId(id),
        application_id: APPLICATION,
        list_documents,
        secretary: None,
        meeting_date: Some(date(2025, 3, 20)),
        meeting_place: None,
        department_name: None,
        status: SnapshotStatus::InProgress,
        created_at: at(12),
        updated_at: None,
    }
}

pub(super) fn control_step(result: Option<&str>) -> ControlStep {
    ControlStep {
        application_id: APPLICATION,
        result: result.map(str::to_string),
        responsible: Some(ResponsiblePerson {
            full_name: "Нурлан Ахметов".to_string(),
            position: None,
        }),
        created_at: at(15),
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) criteria: Mutex<HashMap<CriteriaId, ApplicationCriteria>>,
    pub(super) documents: Mutex<HashMap<CheckId, DocumentCheck>>,
    pub(super) status_categories: Mutex<HashMap<u64, StatusCategory>>,
    pub(super) statuses: Mutex<HashMap<u64, Status>>,
    pub(super) applications: Mutex<HashMap<ApplicationId, Application>>,
    pub(super) clubs: Mutex<HashMap<u64, Club>>,
    pub(super) licenses: Mutex<HashMap<u64, License>>,
    pub(super) seasons: Mutex<HashMap<u64, Season>>,
    pub(super) document_categories: Mutex<Vec<DocumentCategory>>,
    pub(super) references: Mutex<Vec<ReferenceDocument>>,
    pub(super) control_steps: Mutex<Vec<ControlStep>>,
    pub(super) reports: Mutex<HashMap<ReportId, Report>>,
    pub(super) solutions: Mutex<HashMap<SolutionId, Solution>>,
    pub(super) certificates: Mutex<HashMap<CertificateId, LicenseCertificate>>,
    /// Document checks whose saves fail as if storage went away.
    pub(super) unavailable_checks: Mutex<Vec<CheckId>>,
}

impl MemoryStore {
    /// Store holding the dossier, both categories and the reference documents.
    pub(super) fn seeded(status_code: i32) -> Self {
        let store = Self::default();
        let dossier = dossier(status_code);
        store
            .applications
            .lock()
            .expect("store mutex poisoned")
            .insert(dossier.application.id, dossier.application);
        store
            .clubs
            .lock()
            .expect("store mutex poisoned")
            .insert(dossier.club.id, dossier.club);
        store
            .licenses
            .lock()
            .expect("store mutex poisoned")
            .insert(dossier.license.id, dossier.license);
        store
            .seasons
            .lock()
            .expect("store mutex poisoned")
            .insert(dossier.season.id, dossier.season);
        *store
            .document_categories
            .lock()
            .expect("store mutex poisoned") = categories();
        *store.references.lock().expect("store mutex poisoned") = reference_documents();
        store
    }

    pub(super) fn put_criteria(&self, criteria: ApplicationCriteria) {
        self.criteria
            .lock()
            .expect("store mutex poisoned")
            .insert(criteria.id, criteria);
    }

    pub(super) fn put_document(&self, document: DocumentCheck) {
        self.documents
            .lock()
            .expect("store mutex poisoned")
            .insert(document.id, document);
    }

    pub(super) fn put_report(&self, report: Report) {
        self.reports
            .lock()
            .expect("store mutex poisoned")
            .insert(report.id, report);
    }

    pub(super) fn put_solution(&self, solution: Solution) {
        self.solutions
            .lock()
            .expect("store mutex poisoned")
            .insert(solution.id, solution);
    }

    pub(super) fn put_control_step(&self, step: ControlStep) {
        self.control_steps
            .lock()
            .expect("store mutex poisoned")
            .push(step);
    }

    pub(super) fn put_certificate(&self, certificate: LicenseCertificate) {
        self.certificates
            .lock()
            .expect("store mutex poisoned")
            .insert(certificate.id, certificate);
    }

    pub(super) fn put_status(&self, status: Status) {
        self.statuses
            .lock()
            .expect("store mutex poisoned")
            .insert(status.node.id, status);
    }

    pub(super) fn put_status_category(&self, category: StatusCategory) {
        self.status_categories
            .lock()
            .expect("store mutex poisoned")
            .insert(category.node.id, category);
    }

    pub(super) fn stored_document(&self, id: CheckId) -> Option<DocumentCheck> {
        self.documents
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned()
    }
}

impl CriteriaRepository for MemoryStore {
    fn get_by_id(&self, id: CriteriaId) -> Result<Option<ApplicationCriteria>, RepositoryError> {
        Ok(self
            .criteria
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn get_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<ApplicationCriteria>, RepositoryError> {
        let mut records: Vec<_> = self
            .criteria
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|criteria| criteria.application_id == application)
            .cloned()
            .collect();
        records.sort_by_key(|criteria| criteria.id);
        Ok(records)
    }

    fn list_by_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ApplicationCriteria>, RepositoryError> {
        let mut records: Vec<_> = self
            .criteria
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|criteria| criteria.category_id == category)
            .cloned()
            .collect();
        records.sort_by_key(|criteria| criteria.id);
        Ok(records)
    }

    fn save(&self, criteria: ApplicationCriteria) -> Result<(), RepositoryError> {
        self.put_criteria(criteria);
        Ok(())
    }
}

impl DocumentCheckRepository for MemoryStore {
    fn get_by_id(&self, id: CheckId) -> Result<Option<DocumentCheck>, RepositoryError> {
        Ok(self.stored_document(id))
    }

    fn get_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<DocumentCheck>, RepositoryError> {
        let mut records: Vec<_> = self
            .documents
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|document| document.application_id == application)
            .cloned()
            .collect();
        records.sort_by_key(|document| document.id);
        Ok(records)
    }

    fn list_by_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<DocumentCheck>, RepositoryError> {
        let mut records: Vec<_> = self
            .documents
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|document| document.category_id == category)
            .cloned()
            .collect();
        records.sort_by_key(|document| document.id);
        Ok(records)
    }

    fn save(&self, document: DocumentCheck) -> Result<(), RepositoryError> {
        if self
            .unavailable_checks
            .lock()
            .expect("store mutex poisoned")
            .contains(&document.id)
        {
            return Err(RepositoryError::Unavailable(format!(
                "document check {} is locked",
                document.id
            )));
        }
        self.put_document(document);
        Ok(())
    }
}

impl WorkflowRepository for MemoryStore {
    fn get_category_by_id(&self, id: u64) -> Result<Option<StatusCategory>, RepositoryError> {
        Ok(self
            .status_categories
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn list_categories(&self) -> Result<Vec<StatusCategory>, RepositoryError> {
        let mut categories: Vec<_> = self
            .status_categories
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect();
        categories.sort_by_key(|category| category.node.id);
        Ok(categories)
    }

    fn get_status_by_id(&self, id: u64) -> Result<Option<Status>, RepositoryError> {
        Ok(self
            .statuses
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn list_by_category(&self, category_id: u64) -> Result<Vec<Status>, RepositoryError> {
        let mut statuses: Vec<_> = self
            .statuses
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|status| status.category_id == category_id)
            .cloned()
            .collect();
        statuses.sort_by_key(|status| status.node.id);
        Ok(statuses)
    }

    fn save_category(&self, category: StatusCategory) -> Result<(), RepositoryError> {
        self.put_status_category(category);
        Ok(())
    }

    fn save_status(&self, status: Status) -> Result<(), RepositoryError> {
        self.statuses
            .lock()
            .expect("store mutex poisoned")
            .insert(status.node.id, status);
        Ok(())
    }
}

impl DossierRepository for MemoryStore {
    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self
            .applications
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn club(&self, id: u64) -> Result<Option<Club>, RepositoryError> {
        Ok(self
            .clubs
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn license(&self, id: u64) -> Result<Option<License>, RepositoryError> {
        Ok(self
            .licenses
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn season(&self, id: u64) -> Result<Option<Season>, RepositoryError> {
        Ok(self
            .seasons
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn categories(&self) -> Result<Vec<DocumentCategory>, RepositoryError> {
        Ok(self
            .document_categories
            .lock()
            .expect("store mutex poisoned")
            .clone())
    }

    fn reference_documents(&self) -> Result<Vec<ReferenceDocument>, RepositoryError> {
        Ok(self.references.lock().expect("store mutex poisoned").clone())
    }

    fn latest_control_step(
        &self,
        application: ApplicationId,
    ) -> Result<Option<ControlStep>, RepositoryError> {
        Ok(self
            .control_steps
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|step| step.application_id == application)
            .max_by_key(|step| step.created_at)
            .cloned())
    }

    fn report(&self, id: ReportId) -> Result<Option<Report>, RepositoryError> {
        Ok(self
            .reports
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn reports_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<Report>, RepositoryError> {
        let mut reports: Vec<_> = self
            .reports
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|report| report.application_id == application)
            .cloned()
            .collect();
        reports.sort_by_key(|report| report.id);
        Ok(reports)
    }

    fn save_report(&self, report: Report) -> Result<(), RepositoryError> {
        self.put_report(report);
        Ok(())
    }

    fn solution(&self, id: SolutionId) -> Result<Option<Solution>, RepositoryError> {
        Ok(self
            .solutions
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn save_solution(&self, solution: Solution) -> Result<(), RepositoryError> {
        self.put_solution(solution);
        Ok(())
    }

    fn solutions_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<Solution>, RepositoryError> {
        Ok(self
            .solutions
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|solution| solution.application_id == application)
            .cloned()
            .collect())
    }

    fn certificate(&self, id: CertificateId) -> Result<Option<LicenseCertificate>, RepositoryError> {
        Ok(self
            .certificates
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    profiles: HashMap<UserId, ReviewerProfile>,
}

impl MemoryDirectory {
    pub(super) fn staff() -> Self {
        let mut directory = Self::default();
        for (user_id, display_name, position) in [
            (
                DIRECTOR,
                "Айгерим Садыкова",
                Some("Директор департамента лицензирования"),
            ),
            (EXPERT, "Ержан Касымов", None),
            (CHAIR, "Нурлан Ахметов", Some("Председатель КЛФК")),
        ] {
            directory.profiles.insert(
                user_id,
                ReviewerProfile {
                    user_id,
                    display_name: display_name.to_string(),
                    position: position.map(str::to_string),
                },
            );
        }
        directory
    }
}

impl ReviewerDirectory for MemoryDirectory {
    fn profile(&self, user: UserId) -> Result<Option<ReviewerProfile>, RepositoryError> {
        Ok(self.profiles.get(&user).cloned())
    }
}

/// Every read fails, for exercising the repository error path.
pub(super) struct OfflineDirectory;

impl ReviewerDirectory for OfflineDirectory {
    fn profile(&self, _user: UserId) -> Result<Option<ReviewerProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("directory offline".to_string()))
    }
}

pub(super) type MemoryService = LicensingReviewService<MemoryStore, MemoryDirectory>;

pub(super) fn build_service(store: MemoryStore) -> (MemoryService, Arc<MemoryStore>) {
    let store = Arc::new(store);
    let service = LicensingReviewService::new(
        store.clone(),
        Arc::new(MemoryDirectory::staff()),
        DecisionConfig::default(),
    );
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
