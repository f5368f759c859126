use super::common::*;

use crate::workflows::licensing::{
    ordered_checks, CheckId, DocumentCheck, DocumentId, LicensingError, ReviewStage, ReviewState,
};

#[test]
fn industry_check_requires_first_check() {
    let mut check = uploaded_document(1, LEGAL, 11, "Устав");
    let error = check
        .mark_industry_check(stamp(EXPERT, "Ержан Касымов", 3), true, None)
        .expect_err("first check missing");
    assert!(matches!(error, LicensingError::Validation(_)));
    assert_eq!(check.get_current_stage(), ReviewState::Uploaded);
}

#[test]
fn control_check_cannot_run_after_failed_industry_check() {
    let mut check = rejected_document(1, LEGAL, 11, "Устав", "нет печати");
    assert_eq!(check.get_next_stage(), None);
    assert!(check.can_be_rechecked());
    assert_eq!(check.get_failed_stages(), vec![ReviewStage::IndustryCheck]);

    assert!(check
        .mark_control_check(stamp(CHAIR, "Нурлан Ахметов", 4), true, None)
        .is_err());
}

#[test]
fn failed_stage_can_be_marked_again() {
    let mut check = rejected_document(1, LEGAL, 11, "Устав", "нет печати");
    check
        .mark_industry_check(stamp(EXPERT, "Ержан Касымов", 5), true, None)
        .expect("industry re-check");
    assert_eq!(check.is_industry_passed(), Some(true));
    assert_eq!(check.get_next_stage(), Some(ReviewStage::ControlCheck));
}

#[test]
fn earlier_stage_is_frozen_once_a_later_one_is_recorded() {
    let mut check = uploaded_document(1, LEGAL, 11, "Устав");
    check
        .mark_first_check(stamp(DIRECTOR, "Айгерим Садыкова", 2), true, None)
        .expect("first check");
    check
        .mark_industry_check(stamp(EXPERT, "Ержан Касымов", 3), false, None)
        .expect("industry check");
    assert!(check
        .mark_first_check(stamp(DIRECTOR, "Айгерим Садыкова", 4), false, None)
        .is_err());
}

#[test]
fn comments_are_collected_per_stage() {
    let mut check = uploaded_document(1, LEGAL, 11, "Устав");
    check
        .mark_first_check(
            stamp(DIRECTOR, "Айгерим Садыкова", 2),
            true,
            Some("копия заверена".to_string()),
        )
        .expect("first check");
    check
        .mark_industry_check(
            stamp(EXPERT, "Ержан Касымов", 3),
            true,
            Some("   ".to_string()),
        )
        .expect("industry check");
    check
        .mark_control_check(
            stamp(CHAIR, "Нурлан Ахметов", 4),
            false,
            Some("missing seal".to_string()),
        )
        .expect("control check");

    let comments = check.all_comments();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].stage, ReviewStage::FirstCheck);
    assert_eq!(comments[0].checked_by.as_deref(), Some("Айгерим Садыкова"));
    assert_eq!(comments[1].passed, Some(false));
    assert_eq!(check.latest_comment(), Some("missing seal"));
    assert_eq!(check.is_final_passed(), Some(false));
}

#[test]
fn latest_comment_falls_back_to_earlier_stages() {
    let check = rejected_document(1, LEGAL, 11, "Устав", "нет подписи");
    assert_eq!(check.latest_comment(), Some("нет подписи"));

    let passed = passed_document(2, LEGAL, 12, "Свидетельство");
    assert_eq!(passed.latest_comment(), None);
}

#[test]
fn reset_clears_outcomes_and_comments() {
    let mut check = failed_document(1, LEGAL, 11, "Устав", "missing seal");
    check.reset_checks();
    assert!(check.needs_review());
    assert!(check.all_comments().is_empty());
    assert_eq!(check.get_next_stage(), Some(ReviewStage::FirstCheck));
    assert!(check.stage(ReviewStage::ControlCheck).reviewer.is_some());
}

#[test]
fn deadlines_cannot_be_set_in_the_past() {
    let mut check = uploaded_document(1, LEGAL, 11, "Устав");
    let today = date(2025, 3, 10);

    assert!(matches!(
        check.set_deadline(date(2025, 3, 9), today),
        Err(LicensingError::Validation(_))
    ));

    check
        .set_deadline(date(2025, 3, 15), today)
        .expect("future deadline");
    assert_eq!(check.days_until_deadline(today), Some(5));
    assert!(!check.is_overdue(today));
    assert!(check.is_overdue(date(2025, 3, 16)));
    assert_eq!(check.days_until_deadline(date(2025, 3, 17)), Some(-2));
}

#[test]
fn extending_a_deadline_needs_one_and_positive_days() {
    let mut check = uploaded_document(1, LEGAL, 11, "Устав");
    assert!(check.extend_deadline(5).is_err());

    check
        .set_deadline(date(2025, 3, 15), date(2025, 3, 10))
        .expect("deadline");
    assert!(check.extend_deadline(0).is_err());
    check.extend_deadline(10).expect("extension");
    assert_eq!(check.deadline, Some(date(2025, 3, 25)));
}

#[test]
fn oversized_extension_is_rejected_and_keeps_the_deadline() {
    let mut check = uploaded_document(1, LEGAL, 11, "Устав");
    check
        .set_deadline(date(2025, 3, 15), date(2025, 3, 10))
        .expect("deadline");

    for days in [1_000_000_000, i64::MAX] {
        let error = check.extend_deadline(days).expect_err("out of range");
        assert!(matches!(error, LicensingError::Validation(_)));
    }
    assert_eq!(check.deadline, Some(date(2025, 3, 15)));
}

#[test]
fn file_and_metadata_updates() {
    let mut check = DocumentCheck::new(
        CheckId(1),
        APPLICATION,
        LEGAL,
        DocumentId(11),
        "Устав",
        at(1),
    );
    assert!(!check.has_file());
    check
        .update_file("https://files.example/ustav.pdf")
        .update_title("Устав (редакция 2024)")
        .update_info(Some("нотариальная копия".to_string()));
    assert!(check.has_file());
    assert_eq!(check.title, "Устав (редакция 2024)");
    assert_eq!(check.info.as_deref(), Some("нотариальная копия"));
}

#[test]
fn natural_order_sorts_by_category_then_reference_document() {
    let documents = vec![
        uploaded_document(7, FINANCIAL, 21, "Аудит"),
        uploaded_document(3, LEGAL, 12, "Свидетельство"),
        uploaded_document(9, LEGAL, 11, "Устав"),
    ];
    let ordered: Vec<CheckId> = ordered_checks(&documents, None)
        .expect("ordering")
        .into_iter()
        .map(|document| document.id)
        .collect();
    assert_eq!(ordered, vec![CheckId(9), CheckId(3), CheckId(7)]);
}

#[test]
fn explicit_order_is_kept_verbatim() {
    let documents = vec![
        uploaded_document(3, LEGAL, 11, "a"),
        uploaded_document(5, LEGAL, 12, "b"),
        uploaded_document(9, FINANCIAL, 21, "c"),
    ];
    let explicit = [CheckId(5), CheckId(3), CheckId(9)];
    let ordered: Vec<CheckId> = ordered_checks(&documents, Some(&explicit[..]))
        .expect("ordering")
        .into_iter()
        .map(|document| document.id)
        .collect();
    assert_eq!(ordered, explicit.to_vec());

    let error = ordered_checks(&documents, Some(&[CheckId(4)][..])).expect_err("unknown id");
    assert!(matches!(
        error,
        LicensingError::NotFound {
            entity: "document check",
            id: 4
        }
    ));
}
