use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::workflows::licensing::domain::ApplicationStatus;

use super::Article;

pub(crate) const APPEAL_RIGHTS: &str = "Настоящее решение может быть обжаловано в Апелляционном комитете КФФ в порядке и сроки, установленные Правилами по лицензированию футбольных клубов.";

pub(crate) const ESCALATION_WARNING: &str = "В случае невыполнения решения в установленный срок, Комиссией по лицензированию будут приняты дополнительные дисциплинарные санкции (штраф, снятие турнирных очков, отзыв Лицензии) в соответствии с Приложением III Правил по лицензированию.";

pub(crate) const ALL_REQUIREMENTS_MET: &str = "выполнены все требования;";

/// Names the parties printed inside conclusion sentences.
pub struct ConclusionContext<'a> {
    pub club: &'a str,
    pub license: &'a str,
    pub season: &'a str,
    pub cancel_reason: Option<&'a str>,
}

/// Conclusion paragraphs keyed by print order.
pub fn build_conclusion(
    status: ApplicationStatus,
    articles: &[Article],
    context: &ConclusionContext<'_>,
) -> BTreeMap<u8, String> {
    let ConclusionContext {
        club,
        license,
        season,
        cancel_reason,
    } = context;

    let paragraphs = match status {
        ApplicationStatus::Rejected => vec![
            format!("Отказать в выдаче лицензии «{club}», организуемый КФФ в сезоне «{season}» года."),
            format!("Причина отказа: «{}»", cancel_reason.unwrap_or_default()),
        ],
        ApplicationStatus::Revoked => vec![
            format!("Отозвать лицензию у «{club}», организованного КФФ в сезоне «{season}» года."),
            APPEAL_RIGHTS.to_string(),
        ],
        _ if articles.is_empty() => vec![issuance(club, license, season), APPEAL_RIGHTS.to_string()],
        _ => {
            let sections = articles
                .iter()
                .map(|article| article.category.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                format!(
                    "Согласно Приложению III Правил по лицензированию: за невыполнение требований по разделам «{sections}» применить санкцию «Замечание»."
                ),
                issuance(club, license, season),
                ESCALATION_WARNING.to_string(),
                APPEAL_RIGHTS.to_string(),
            ]
        }
    };

    (1u8..).zip(paragraphs).collect()
}

fn issuance(club: &str, license: &str, season: &str) -> String {
    format!("Выдать «{club}» Лицензию «{license}», организуемый КФФ в сезоне «{season}» года.")
}

pub(crate) fn failed_requirements(titles: &[&str]) -> String {
    format!("не выполнены требования - {};", titles.join(", "))
}

pub(crate) fn deadline_sentence(deadline: Option<NaiveDate>) -> String {
    match deadline {
        Some(date) => format!(
            "Устранить несоответствие в срок до {}",
            date.format("%d.%m.%Y")
        ),
        None => "Устранить несоответствие в установленный срок".to_string(),
    }
}

pub(crate) fn solution_summary(club: &str, license: &str, season: &str) -> String {
    format!(
        "Комиссия по лицензированию футбольных клубов (далее по тексту - КЛФК), рассмотрев представленные Директором Департамента лицензирования отчет и учетное дело «{club}» для получения Лицензии «{license}», организуемый Казахстанской Федерацией футбола в сезоне «{season}» года (далее по тексту - «Лицензия»)"
    )
}
