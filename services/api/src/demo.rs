use crate::infra::{
    parse_date, seed_demo_store, InMemoryLicensingStore, InMemoryReviewerDirectory,
    DEMO_APPLICATION, DEMO_CERTIFICATE, DEMO_CHAIR, DEMO_DIRECTOR, DEMO_EXPERT, DEMO_LEGAL,
    DEMO_REVIEW_CATEGORY,
};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use club_licensing::config::AppConfig;
use club_licensing::error::AppError;
use club_licensing::workflows::licensing::{
    CheckId, CriteriaId, Language, LicensingError, LicensingReviewService, ReportId,
    ReviewStage, SnapshotStatus, SolutionData, SolutionId,
};
use club_licensing::workflows::review_import::ReviewSheetImporter;
use std::path::PathBuf;
use std::sync::Arc;

type DemoService = LicensingReviewService<InMemoryLicensingStore, InMemoryReviewerDirectory>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the application was submitted (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) submitted: Option<NaiveDate>,
    /// Seed the application with the configured rejected status code.
    #[arg(long)]
    pub(crate) rejected: bool,
    /// Print the generated solution as JSON after the text summary.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportReviewsArgs {
    /// CSV review sheet (Check ID, Stage, Passed, Reviewer ID, Reviewer, Comment, Reviewed At)
    #[arg(long)]
    pub(crate) sheet: PathBuf,
    /// Date the application was submitted (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) submitted: Option<NaiveDate>,
}

fn build_service(
    config: &AppConfig,
    submitted: NaiveDate,
    status_code: i32,
) -> Result<DemoService, AppError> {
    let store = Arc::new(InMemoryLicensingStore::default());
    let directory = Arc::new(InMemoryReviewerDirectory::default());
    seed_demo_store(&store, &directory, submitted, status_code).map_err(LicensingError::from)?;
    Ok(LicensingReviewService::new(
        store,
        directory,
        config.licensing.clone(),
    ))
}

fn day(submitted: NaiveDate, offset: i64) -> DateTime<Utc> {
    let date = submitted + chrono::Duration::days(offset);
    date.and_hms_opt(10, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(Utc::now)
}

/// Upload and pre-check both criteria so that documents can be reviewed.
fn prepare_criteria(service: &DemoService, submitted: NaiveDate) -> Result<(), LicensingError> {
    for id in [CriteriaId(100), CriteriaId(101)] {
        service.upload_criteria(id, DEMO_DIRECTOR, day(submitted, 0))?;
        service.mark_criteria(
            id,
            ReviewStage::FirstCheck,
            DEMO_DIRECTOR,
            true,
            day(submitted, 1),
        )?;
        service.mark_criteria(
            id,
            ReviewStage::IndustryCheck,
            DEMO_EXPERT,
            true,
            day(submitted, 2),
        )?;
    }
    Ok(())
}

fn upload_documents(service: &DemoService, submitted: NaiveDate) -> Result<(), LicensingError> {
    for id in 1..=4 {
        service.upload_document(
            CheckId(id),
            DEMO_DIRECTOR,
            Some(format!("https://files.example/club-licensing/{id}.pdf")),
            day(submitted, 0),
        )?;
    }
    Ok(())
}

fn review_documents(service: &DemoService, submitted: NaiveDate) -> Result<(), LicensingError> {
    for id in 1..=4 {
        let check = CheckId(id);
        service.mark_document(
            check,
            ReviewStage::FirstCheck,
            DEMO_DIRECTOR,
            true,
            None,
            day(submitted, 1),
        )?;
        service.mark_document(
            check,
            ReviewStage::IndustryCheck,
            DEMO_EXPERT,
            true,
            None,
            day(submitted, 2),
        )?;
        let (passed, comment) = if id == 3 {
            (
                false,
                Some("Аудиторское заключение не подписано аудитором".to_string()),
            )
        } else {
            (true, None)
        };
        service.mark_document(
            check,
            ReviewStage::ControlCheck,
            DEMO_CHAIR,
            passed,
            comment,
            day(submitted, 3),
        )?;
    }
    service.set_deadline(CheckId(3), submitted + chrono::Duration::days(14), submitted)?;
    Ok(())
}

fn render_solution(data: &SolutionData) {
    println!(
        "Solution for {} | license «{}» | season {}",
        data.club_fullname, data.license, data.season
    );
    println!(
        "- Status {} | meeting {} in {}",
        data.application_status.label(),
        data.meeting_date,
        data.meeting_place
    );
    println!("Criteria:");
    for line in &data.criteria {
        let mark = if line.status { "+" } else { "-" };
        println!("  {mark} {}: {}", line.title, line.description);
    }
    if !data.articles.is_empty() {
        println!("Remarks:");
        for article in &data.articles {
            println!("  {}", article.category);
            for document in &article.documents {
                println!(
                    "    - {} ({}) -> {}",
                    document.title,
                    document.comment.as_deref().unwrap_or("без комментария"),
                    document.deadline
                );
            }
        }
    }
    println!("Experts:");
    for expert in &data.experts {
        println!("  - {expert}");
    }
    println!("Conclusion:");
    for (number, paragraph) in &data.conclusion {
        println!("  {number}. {paragraph}");
    }
    println!(
        "Signed: {} ({}), secretary {}",
        data.control_name, data.control_position, data.secretary_name
    );
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        submitted,
        rejected,
        json,
    } = args;

    let config = AppConfig::load()?;
    let submitted = submitted.unwrap_or_else(|| Local::now().date_naive());
    let codes = config.licensing.status_codes;
    let status_code = if rejected { codes.rejected } else { codes.approved };
    let service = build_service(&config, submitted, status_code)?;

    println!("Club licensing review demo");
    let steps = service.workflow_chain("licensing_director", Language::Ru)?;
    println!("Workflow:");
    for step in &steps {
        println!("  [{}] {} ({})", step.position_label, step.title, step.value);
    }
    println!("Document review statuses:");
    for step in service.status_chain(DEMO_REVIEW_CATEGORY, "licensing_director", Language::Kk)? {
        println!("  [{}] {}", step.position_label, step.title);
    }

    prepare_criteria(&service, submitted)?;
    upload_documents(&service, submitted)?;
    review_documents(&service, submitted)?;

    let audit = service.document(CheckId(3))?;
    println!(
        "\nDocument «{}» deadline {} ({} days left)",
        audit.title,
        audit
            .deadline
            .map(|deadline| deadline.format("%d.%m.%Y").to_string())
            .unwrap_or_default(),
        audit.days_until_deadline(submitted).unwrap_or_default()
    );

    let initial =
        service.generate_initial_report(DEMO_APPLICATION, DEMO_LEGAL, day(submitted, 0))?;
    println!("\nInitial report for {} ({})", initial.club, initial.expert);
    for document in &initial.documents {
        println!(
            "  {}. {} [{}] submitted {}",
            document.number, document.name, document.document_title, document.submission_date
        );
    }

    for report_id in [ReportId(1), ReportId(2)] {
        let report = service.generate_report(report_id)?;
        println!(
            "\nReport {report_id}: {} | verdict {}",
            report.category, report.verdict_label
        );
        for item in &report.items {
            println!("  - {} [{}] {}", item.name, item.status_label, item.note);
        }
        for next in [SnapshotStatus::InProgress, SnapshotStatus::Completed] {
            service.transition_report(report_id, next, day(submitted, 4))?;
        }
    }

    let department = service.generate_department_report(ReportId(1))?;
    println!(
        "\nDepartment report signed by {} ({})",
        department.department, department.position
    );
    for section in &department.reports {
        println!("  {} - {}", section.category, section.expert);
        for document in &section.documents {
            println!("    {}", document.line);
        }
    }

    service.transition_solution(SolutionId(1), SnapshotStatus::InProgress, day(submitted, 5))?;
    let solution = service.generate_solution(SolutionId(1), submitted)?;
    println!();
    render_solution(&solution);

    let certificate = service.generate_certificate(DEMO_CERTIFICATE)?;
    println!(
        "\nCertificate {} for {} (BIN {}) valid until {}, decided {}.{}.{}",
        certificate.certificate_id,
        certificate.club_full_name_en,
        certificate.club_bin,
        certificate.license_end_at,
        certificate.solution_day,
        certificate.solution_month,
        certificate.solution_year
    );

    if json {
        match serde_json::to_string_pretty(&solution) {
            Ok(payload) => println!("\n{payload}"),
            Err(err) => println!("\nSolution payload unavailable: {err}"),
        }
    }

    Ok(())
}

pub(crate) fn run_import_reviews(args: ImportReviewsArgs) -> Result<(), AppError> {
    let ImportReviewsArgs { sheet, submitted } = args;

    let config = AppConfig::load()?;
    let submitted = submitted.unwrap_or_else(|| Local::now().date_naive());
    let service = build_service(&config, submitted, config.licensing.status_codes.approved)?;
    prepare_criteria(&service, submitted)?;
    upload_documents(&service, submitted)?;

    let reviews = ReviewSheetImporter::from_path(&sheet)?;
    println!(
        "Loaded {} review rows for {} document checks from {}",
        reviews.len(),
        reviews.check_ids().len(),
        sheet.display()
    );

    let summary = reviews.apply(&service)?;
    println!(
        "- {} stage decisions applied | {} already passed and skipped | {} documents touched",
        summary.applied, summary.skipped, summary.documents
    );

    for check_id in reviews.check_ids() {
        let document = service.document(check_id)?;
        let progress = document.progress();
        println!(
            "  - {} «{}»: {} ({:.0}%)",
            check_id,
            document.title,
            progress.current_stage_label,
            progress.completion_percentage
        );
        if let Some(comment) = document.latest_comment() {
            println!("      {comment}");
        }
    }

    let solution = service.generate_solution(SolutionId(1), submitted)?;
    println!();
    render_solution(&solution);
    Ok(())
}
