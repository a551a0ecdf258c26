//! Status state-machine tests: every legal pair, self-transition rejection,
//! and the audit history contract.

use chrono::NaiveDateTime;
use ecodenuncias_core::{
    complaint_repository::{ComplaintRepository, NewComplaint},
    error::ApiError,
    types::{Category, ComplaintStatus},
    Clock, RepoConfig, Store,
};
use std::rc::Rc;

fn store() -> Rc<Store> {
    let store = Store::in_memory().unwrap();
    store.migrate().unwrap();
    Rc::new(store)
}

fn repo_at(store: Rc<Store>, datetime: &str) -> ComplaintRepository {
    let at = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S").unwrap();
    ComplaintRepository::new(store, RepoConfig::default(), Clock::Fixed(at))
}

fn sample_complaint() -> NewComplaint {
    NewComplaint {
        category: Category::SolidWaste,
        description: "Basura acumulada varios días en la vereda".into(),
        location_address: "Calle 10 y Av. Central, Durán".into(),
        latitude: None,
        longitude: None,
        image_url: None,
        reporter_name: None,
        reporter_email: None,
        reporter_phone: None,
    }
}

#[test]
fn every_legal_pair_transitions_and_appends_one_history_row() {
    let pairs = [
        (ComplaintStatus::Pending, ComplaintStatus::InProgress),
        (ComplaintStatus::Pending, ComplaintStatus::Resolved),
        (ComplaintStatus::InProgress, ComplaintStatus::Pending),
        (ComplaintStatus::InProgress, ComplaintStatus::Resolved),
        (ComplaintStatus::Resolved, ComplaintStatus::Pending),
        (ComplaintStatus::Resolved, ComplaintStatus::InProgress),
    ];

    for (from, to) in pairs {
        let store = store();
        let repo = repo_at(store.clone(), "2025-03-01 09:00:00");
        let id = repo.create(&sample_complaint()).unwrap();

        // Put the complaint into the `from` state first (new rows start
        // pending).
        let mut expected_rows = 0;
        if from != ComplaintStatus::Pending {
            repo.transition_status(id, from, None, None).unwrap();
            expected_rows += 1;
        }

        let t = repo
            .transition_status(id, to, Some("revisión de campo"), Some("Inspector Vera"))
            .unwrap();
        expected_rows += 1;

        assert_eq!(t.previous_status, from, "{from} -> {to}");
        assert_eq!(t.new_status, to);

        let history = repo.history(id).unwrap();
        assert_eq!(history.len(), expected_rows, "{from} -> {to}");
        let latest = &history[0];
        assert_eq!(latest.previous_status, from);
        assert_eq!(latest.new_status, to);
        assert_eq!(latest.responsible_actor, "Inspector Vera");
        assert_eq!(latest.notes.as_deref(), Some("revisión de campo"));
    }
}

#[test]
fn self_transition_is_rejected_without_history() {
    let store = store();
    let repo = repo_at(store.clone(), "2025-03-01 09:00:00");
    let id = repo.create(&sample_complaint()).unwrap();

    let err = repo
        .transition_status(id, ComplaintStatus::Pending, None, None)
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::SameStatus {
            current: ComplaintStatus::Pending,
            ..
        }
    ));
    assert!(repo.history(id).unwrap().is_empty());
}

#[test]
fn transition_on_missing_complaint_is_not_found() {
    let repo = repo_at(store(), "2025-03-01 09:00:00");
    let err = repo
        .transition_status(999, ComplaintStatus::Resolved, None, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(999)));
}

#[test]
fn never_transitioned_complaint_has_empty_history() {
    let repo = repo_at(store(), "2025-03-01 09:00:00");
    let id = repo.create(&sample_complaint()).unwrap();
    assert!(repo.history(id).unwrap().is_empty());
}

#[test]
fn history_of_missing_complaint_is_not_found() {
    let repo = repo_at(store(), "2025-03-01 09:00:00");
    assert!(matches!(repo.history(42), Err(ApiError::NotFound(42))));
}

#[test]
fn transition_updates_status_and_timestamp_but_not_created_at() {
    let store = store();
    let created = repo_at(store.clone(), "2025-03-01 09:00:00");
    let id = created.create(&sample_complaint()).unwrap();

    let later = repo_at(store.clone(), "2025-03-04 15:30:00");
    later
        .transition_status(id, ComplaintStatus::InProgress, None, None)
        .unwrap();

    let detail = later.get_by_id(id).unwrap();
    assert_eq!(detail.complaint.status, ComplaintStatus::InProgress);
    assert_eq!(
        detail.complaint.created_at.to_string(),
        "2025-03-01 09:00:00"
    );
    assert_eq!(
        detail.complaint.updated_at.to_string(),
        "2025-03-04 15:30:00"
    );
}

#[test]
fn actor_defaults_to_sistema() {
    let store = store();
    let repo = repo_at(store.clone(), "2025-03-01 09:00:00");
    let id = repo.create(&sample_complaint()).unwrap();

    repo.transition_status(id, ComplaintStatus::InProgress, None, None)
        .unwrap();
    let history = repo.history(id).unwrap();
    assert_eq!(history[0].responsible_actor, "Sistema");
}

#[test]
fn history_is_ordered_newest_first() {
    let store = store();
    let id = repo_at(store.clone(), "2025-03-01 09:00:00")
        .create(&sample_complaint())
        .unwrap();

    repo_at(store.clone(), "2025-03-02 10:00:00")
        .transition_status(id, ComplaintStatus::InProgress, None, None)
        .unwrap();
    repo_at(store.clone(), "2025-03-05 10:00:00")
        .transition_status(id, ComplaintStatus::Resolved, None, None)
        .unwrap();
    repo_at(store.clone(), "2025-03-09 10:00:00")
        .transition_status(id, ComplaintStatus::Pending, Some("reabierta"), None)
        .unwrap();

    let repo = repo_at(store, "2025-03-10 00:00:00");
    let history = repo.history(id).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].new_status, ComplaintStatus::Pending);
    assert_eq!(history[1].new_status, ComplaintStatus::Resolved);
    assert_eq!(history[2].new_status, ComplaintStatus::InProgress);
    assert!(history[0].changed_at > history[1].changed_at);
}
