//! License certificate data: bilingual club names, the license end date and the date of
//! the application's first solution.

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, CertificateId, Club, License};
use super::snapshot::Solution;

const DEFAULT_TYPE_EN: &str = "to participate in UEFA club tournaments";
const DEFAULT_TYPE_KK: &str =
    "«Қазақстан Футбол федерациясы» Қауымдастығы ЗТБ-мен ұйымдастырылатын жарыстарына қатысу үшін";

/// Certificate issued to a club for one licensed application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseCertificate {
    pub id: CertificateId,
    pub application_id: ApplicationId,
    pub license_id: u64,
    pub club_id: u64,
    #[serde(default)]
    pub type_en: Option<String>,
    #[serde(default)]
    pub type_kk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateData {
    pub certificate_id: CertificateId,
    pub type_en: String,
    pub type_kk: String,
    pub club_full_name_kk: String,
    pub club_full_name_en: String,
    pub club_bin: String,
    /// `dd/mm/yyyy`, empty when the license has no end date.
    pub license_end_at: String,
    pub solution_day: String,
    pub solution_month: String,
    pub solution_year: String,
}

#[derive(Debug, Clone, Copy)]
pub struct CertificateInput<'a> {
    pub certificate: &'a LicenseCertificate,
    pub club: &'a Club,
    pub license: &'a License,
    pub solution: &'a Solution,
}

pub struct CertificateBuilder;

impl CertificateBuilder {
    /// Earliest solution by creation time, lowest id on ties.
    pub fn first_solution(solutions: &[Solution]) -> Option<&Solution> {
        solutions
            .iter()
            .min_by_key(|solution| (solution.created_at, solution.id))
    }

    pub fn build(input: &CertificateInput<'_>) -> CertificateData {
        let decided = input.solution.created_at.date_naive();
        CertificateData {
            certificate_id: input.certificate.id,
            type_en: text_or(input.certificate.type_en.as_deref(), DEFAULT_TYPE_EN),
            type_kk: text_or(input.certificate.type_kk.as_deref(), DEFAULT_TYPE_KK),
            club_full_name_kk: text_or(input.club.full_name_kk.as_deref(), ""),
            club_full_name_en: text_or(input.club.full_name_en.as_deref(), ""),
            club_bin: input.club.bin.clone(),
            license_end_at: input
                .license
                .end_at
                .map(|end| end.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
            solution_day: decided.format("%d").to_string(),
            solution_month: decided.format("%m").to_string(),
            solution_year: decided.format("%Y").to_string(),
        }
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}
