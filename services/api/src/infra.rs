use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use club_licensing::workflows::licensing::{
    Application, ApplicationCriteria, ApplicationId, CategoryId, CertificateId, CheckId, Club,
    ControlStep, CriteriaId, CriteriaRepository, DocumentCategory, DocumentCheck,
    DocumentCheckRepository, DocumentId, DossierRepository, License, LicenseCertificate,
    LocalizedTitle, ReferenceDocument, Report, ReportId,
    ReportScope, RepositoryError, ResponsiblePerson, ReviewerDirectory, ReviewerProfile, Season,
    SnapshotStatus, Solution, SolutionId, Status, StatusCategory, StatusNode, UserId,
    WorkflowRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type Table<K, V> = Arc<Mutex<BTreeMap<K, V>>>;

fn lock<T>(table: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    table
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory table mutex poisoned".to_string()))
}

/// Process-local storage for every licensing table. Ordered maps keep listings stable.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLicensingStore {
    criteria: Table<CriteriaId, ApplicationCriteria>,
    documents: Table<CheckId, DocumentCheck>,
    status_categories: Table<u64, StatusCategory>,
    statuses: Table<u64, Status>,
    applications: Table<ApplicationId, Application>,
    clubs: Table<u64, Club>,
    licenses: Table<u64, License>,
    seasons: Table<u64, Season>,
    categories: Table<CategoryId, DocumentCategory>,
    reference_documents: Table<DocumentId, ReferenceDocument>,
    control_steps: Arc<Mutex<Vec<ControlStep>>>,
    reports: Table<ReportId, Report>,
    solutions: Table<SolutionId, Solution>,
    certificates: Table<CertificateId, LicenseCertificate>,
}

impl CriteriaRepository for InMemoryLicensingStore {
    fn get_by_id(&self, id: CriteriaId) -> Result<Option<ApplicationCriteria>, RepositoryError> {
        Ok(lock(&self.criteria)?.get(&id).cloned())
    }

    fn get_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<ApplicationCriteria>, RepositoryError> {
        Ok(lock(&self.criteria)?
            .values()
            .filter(|criteria| criteria.application_id == application)
            .cloned()
            .collect())
    }

    fn list_by_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ApplicationCriteria>, RepositoryError> {
        Ok(lock(&self.criteria)?
            .values()
            .filter(|criteria| criteria.category_id == category)
            .cloned()
            .collect())
    }

    fn save(&self, criteria: ApplicationCriteria) -> Result<(), RepositoryError> {
        lock(&self.criteria)?.insert(criteria.id, criteria);
        Ok(())
    }
}

impl DocumentCheckRepository for InMemoryLicensingStore {
    fn get_by_id(&self, id: CheckId) -> Result<Option<DocumentCheck>, RepositoryError> {
        Ok(lock(&self.documents)?.get(&id).cloned())
    }

    fn get_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<DocumentCheck>, RepositoryError> {
        Ok(lock(&self.documents)?
            .values()
            .filter(|document| document.application_id == application)
            .cloned()
            .collect())
    }

    fn list_by_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<DocumentCheck>, RepositoryError> {
        Ok(lock(&self.documents)?
            .values()
            .filter(|document| document.category_id == category)
            .cloned()
            .collect())
    }

    fn save(&self, document: DocumentCheck) -> Result<(), RepositoryError> {
        lock(&self.documents)?.insert(document.id, document);
        Ok(())
    }
}

impl WorkflowRepository for InMemoryLicensingStore {
    fn get_category_by_id(&self, id: u64) -> Result<Option<StatusCategory>, RepositoryError> {
        Ok(lock(&self.status_categories)?.get(&id).cloned())
    }

    fn list_categories(&self) -> Result<Vec<StatusCategory>, RepositoryError> {
        Ok(lock(&self.status_categories)?.values().cloned().collect())
    }

    fn get_status_by_id(&self, id: u64) -> Result<Option<Status>, RepositoryError> {
        Ok(lock(&self.statuses)?.get(&id).cloned())
    }

    fn list_by_category(&self, category_id: u64) -> Result<Vec<Status>, RepositoryError> {
        Ok(lock(&self.statuses)?
            .values()
            .filter(|status| status.category_id == category_id)
            .cloned()
            .collect())
    }

    fn save_category(&self, category: StatusCategory) -> Result<(), RepositoryError> {
        lock(&self.status_categories)?.insert(category.node.id, category);
        Ok(())
    }

    fn save_status(&self, status: Status) -> Result<(), RepositoryError> {
        lock(&self.statuses)?.insert(status.node.id, status);
        Ok(())
    }
}

impl DossierRepository for InMemoryLicensingStore {
    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.applications)?.get(&id).cloned())
    }

    fn club(&self, id: u64) -> Result<Option<Club>, RepositoryError> {
        Ok(lock(&self.clubs)?.get(&id).cloned())
    }

    fn license(&self, id: u64) -> Result<Option<License>, RepositoryError> {
        Ok(lock(&self.licenses)?.get(&id).cloned())
    }

    fn season(&self, id: u64) -> Result<Option<Season>, RepositoryError> {
        Ok(lock(&self.seasons)?.get(&id).cloned())
    }

    fn categories(&self) -> Result<Vec<DocumentCategory>, RepositoryError> {
        Ok(lock(&self.categories)?.values().cloned().collect())
    }

    fn reference_documents(&self) -> Result<Vec<ReferenceDocument>, RepositoryError> {
        Ok(lock(&self.reference_documents)?.values().cloned().collect())
    }

    fn latest_control_step(
        &self,
        application: ApplicationId,
    ) -> Result<Option<ControlStep>, RepositoryError> {
        Ok(lock(&self.control_steps)?
            .iter()
            .filter(|step| step.application_id == application)
            .max_by_key(|step| step.created_at)
            .cloned())
    }

    fn report(&self, id: ReportId) -> Result<Option<Report>, RepositoryError> {
        Ok(lock(&self.reports)?.get(&id).cloned())
    }

    fn reports_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<Report>, RepositoryError> {
        Ok(lock(&self.reports)?
            .values()
            .filter(|report| report.application_id == application)
            .cloned()
            .collect())
    }

    fn save_report(&self, report: Report) -> Result<(), RepositoryError> {
        lock(&self.reports)?.insert(report.id, report);
        Ok(())
    }

    fn solution(&self, id: SolutionId) -> Result<Option<Solution>, RepositoryError> {
        Ok(lock(&self.solutions)?.get(&id).cloned())
    }

    fn save_solution(&self, solution: Solution) -> Result<(), RepositoryError> {
        lock(&self.solutions)?.insert(solution.id, solution);
        Ok(())
    }

    fn solutions_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<Solution>, RepositoryError> {
        Ok(lock(&self.solutions)?
            .values()
            .filter(|solution| solution.application_id == application)
            .cloned()
            .collect())
    }

    fn certificate(&self, id: CertificateId) -> Result<Option<LicenseCertificate>, RepositoryError> {
        Ok(lock(&self.certificates)?.get(&id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewerDirectory {
    profiles: Arc<Mutex<HashMap<UserId, ReviewerProfile>>>,
}

impl InMemoryReviewerDirectory {
    pub(crate) fn register(&self, profile: ReviewerProfile) -> Result<(), RepositoryError> {
        lock(&self.profiles)?.insert(profile.user_id, profile);
        Ok(())
    }
}

impl ReviewerDirectory for InMemoryReviewerDirectory {
    fn profile(&self, user: UserId) -> Result<Option<ReviewerProfile>, RepositoryError> {
        Ok(lock(&self.profiles)?.get(&user).cloned())
    }
}

pub(crate) const DEMO_APPLICATION: ApplicationId = ApplicationId(1);
pub(crate) const DEMO_LEGAL: CategoryId = CategoryId(1);
pub(crate) const DEMO_FINANCIAL: CategoryId = CategoryId(2);
pub(crate) const DEMO_DIRECTOR: UserId = UserId(1);
pub(crate) const DEMO_EXPERT: UserId = UserId(2);
pub(crate) const DEMO_CHAIR: UserId = UserId(3);
pub(crate) const DEMO_CERTIFICATE: CertificateId = CertificateId(1);
/// Status category whose statuses track document review.
pub(crate) const DEMO_REVIEW_CATEGORY: u64 = 2;

fn demo_timestamp(date: NaiveDate) -> Result<DateTime<Utc>, RepositoryError> {
    date.and_hms_opt(9, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| RepositoryError::Unavailable(format!("invalid demo date {date}")))
}

/// Seed one application with two document categories, four uploaded documents, a
/// category report, a document-list report, a pending solution, a license certificate,
/// a three-step linked category workflow and the statuses of its review step. Reviews
/// are left for the caller to record.
pub(crate) fn seed_demo_store(
    store: &InMemoryLicensingStore,
    directory: &InMemoryReviewerDirectory,
    submitted: NaiveDate,
    status_code: i32,
) -> Result<(), RepositoryError> {
    let at = demo_timestamp(submitted)?;

    for (user_id, display_name, position) in [
        (
            DEMO_DIRECTOR,
            "Айгерим Садыкова",
            Some("Директор департамента лицензирования"),
        ),
        (DEMO_EXPERT, "Ержан Касымов", None),
        (DEMO_CHAIR, "Нурлан Ахметов", Some("Председатель КЛФК")),
    ] {
        directory.register(ReviewerProfile {
            user_id,
            display_name: display_name.to_string(),
            position: position.map(str::to_string),
        })?;
    }

    lock(&store.applications)?.insert(
        DEMO_APPLICATION,
        Application {
            id: DEMO_APPLICATION,
            club_id: 10,
            license_id: 20,
            status_code,
        },
    );
    lock(&store.clubs)?.insert(
        10,
        Club {
            id: 10,
            full_name: "ФК Кайрат".to_string(),
            short_name: "Кайрат".to_string(),
            bin: "990140000123".to_string(),
            full_name_kk: Some("«Қайрат» футбол клубы".to_string()),
            full_name_en: Some("FC Kairat".to_string()),
        },
    );
    lock(&store.licenses)?.insert(
        20,
        License {
            id: 20,
            title: "Премьер-Лига".to_string(),
            season_id: 30,
            end_at: NaiveDate::from_ymd_opt(2025, 12, 31),
        },
    );
    lock(&store.seasons)?.insert(
        30,
        Season {
            id: 30,
            title: "2025".to_string(),
        },
    );

    {
        let mut categories = lock(&store.categories)?;
        for (id, title, value) in [
            (DEMO_LEGAL, "Правовые критерии", "legal-documents"),
            (DEMO_FINANCIAL, "Финансовые критерии", "financial-documents"),
        ] {
            categories.insert(
                id,
                DocumentCategory {
                    id,
                    title: title.to_string(),
                    value: value.to_string(),
                },
            );
        }
    }

    {
        let mut references = lock(&store.reference_documents)?;
        for (id, title) in [
            (11, "Устав клуба"),
            (12, "Свидетельство о государственной регистрации"),
            (21, "Аудиторское заключение"),
            (22, "Справка об отсутствии задолженности"),
        ] {
            references.insert(
                DocumentId(id),
                ReferenceDocument {
                    id: DocumentId(id),
                    title: title.to_string(),
                },
            );
        }
    }

    {
        let mut criteria = lock(&store.criteria)?;
        for (id, category) in [(100, DEMO_LEGAL), (101, DEMO_FINANCIAL)] {
            criteria.insert(
                CriteriaId(id),
                ApplicationCriteria::new(CriteriaId(id), DEMO_APPLICATION, category, at),
            );
        }
    }

    {
        let mut documents = lock(&store.documents)?;
        for (id, category, document, title) in [
            (1, DEMO_LEGAL, 11, "Устав ТОО «ФК Кайрат»"),
            (2, DEMO_LEGAL, 12, "Свидетельство о регистрации"),
            (3, DEMO_FINANCIAL, 21, "Аудит за 2024 год"),
            (4, DEMO_FINANCIAL, 22, "Справка из налогового органа"),
        ] {
            documents.insert(
                CheckId(id),
                DocumentCheck::new(
                    CheckId(id),
                    DEMO_APPLICATION,
                    category,
                    DocumentId(document),
                    title,
                    at,
                ),
            );
        }
    }

    {
        let mut reports = lock(&store.reports)?;
        for (id, scope) in [
            (1, ReportScope::Category(DEMO_LEGAL)),
            (2, ReportScope::Documents(vec![CheckId(4), CheckId(3)])),
        ] {
            reports.insert(
                ReportId(id),
                Report {
                    id: ReportId(id),
                    application_id: DEMO_APPLICATION,
                    scope,
                    status: SnapshotStatus::Pending,
                    created_at: at,
                    updated_at: None,
                },
            );
        }
    }

    lock(&store.solutions)?.insert(
        SolutionId(1),
        Solution {
            id: SolutionId(1),
            application_id: DEMO_APPLICATION,
            list_documents: None,
            secretary: None,
            meeting_date: Some(submitted),
            meeting_place: None,
            department_name: None,
            status: SnapshotStatus::Pending,
            created_at: at,
            updated_at: None,
        },
    );

    lock(&store.certificates)?.insert(
        DEMO_CERTIFICATE,
        LicenseCertificate {
            id: DEMO_CERTIFICATE,
            application_id: DEMO_APPLICATION,
            license_id: 20,
            club_id: 10,
            type_en: None,
            type_kk: None,
        },
    );

    lock(&store.control_steps)?.push(ControlStep {
        application_id: DEMO_APPLICATION,
        result: None,
        responsible: Some(ResponsiblePerson {
            full_name: "Нурлан Ахметов".to_string(),
            position: Some("Председатель КЛФК".to_string()),
        }),
        created_at: at,
    });

    {
        let mut workflow = lock(&store.status_categories)?;
        for (id, value, ru, kk) in [
            (1, "submitted", "Заявка подана", "Өтінім берілді"),
            (2, "review", "Проверка документов", "Құжаттарды тексеру"),
            (3, "decision", "Решение комиссии", "Комиссия шешімі"),
        ] {
            let mut node = StatusNode::new(id, value, LocalizedTitle::new(ru, kk));
            node.previous_id = (id > 1).then(|| id - 1);
            node.next_id = (id < 3).then(|| id + 1);
            if id == 3 {
                node.set_roles(["licensing_director", "committee"]);
            }
            workflow.insert(id, StatusCategory { node });
        }
    }

    {
        let mut statuses = lock(&store.statuses)?;
        for (id, value, ru, kk) in [
            (21, "first_check", "Первичная проверка", "Бастапқы тексеру"),
            (22, "industry_check", "Отраслевая проверка", "Салалық тексеру"),
            (23, "control_check", "Контрольная проверка", "Бақылау тексеруі"),
        ] {
            let mut node = StatusNode::new(id, value, LocalizedTitle::new(ru, kk));
            node.previous_id = (id > 21).then(|| id - 1);
            node.next_id = (id < 23).then(|| id + 1);
            statuses.insert(
                id,
                Status {
                    category_id: DEMO_REVIEW_CATEGORY,
                    node,
                },
            );
        }
    }

    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
