//! Comment repository tests: existence check, length bounds, pagination.

use chrono::NaiveDateTime;
use ecodenuncias_core::{
    comment_repository::CommentRepository,
    complaint_repository::{ComplaintRepository, NewComplaint},
    error::ApiError,
    types::Category,
    Clock, RepoConfig, Store,
};
use std::rc::Rc;

const LONG_DESCRIPTION: &str =
    "Quema de llantas y basura todas las noches detrás del mercado mayorista del sector";

fn store() -> Rc<Store> {
    let store = Store::in_memory().unwrap();
    store.migrate().unwrap();
    Rc::new(store)
}

fn clock(datetime: &str) -> Clock {
    Clock::Fixed(NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S").unwrap())
}

fn create_complaint(store: Rc<Store>) -> i64 {
    create_complaint_described(store, "Humo constante desde la fábrica vecina")
}

fn create_complaint_described(store: Rc<Store>, description: &str) -> i64 {
    let repo = ComplaintRepository::new(
        store,
        RepoConfig::default(),
        clock("2025-05-01 08:00:00"),
    );
    repo.create(&NewComplaint {
        category: Category::AirPollution,
        description: description.into(),
        location_address: "Parque Industrial, Norte de Quito".into(),
        latitude: None,
        longitude: None,
        image_url: None,
        reporter_name: None,
        reporter_email: None,
        reporter_phone: None,
    })
    .unwrap()
}

#[test]
fn comment_on_missing_complaint_is_not_found() {
    let comments = CommentRepository::new(
        store(),
        RepoConfig::default(),
        clock("2025-05-01 09:00:00"),
    );
    let err = comments.create(77, "Vecina", "Esto sigue igual").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(77)));
}

#[test]
fn author_and_body_bounds_are_enforced() {
    let store = store();
    let id = create_complaint(store.clone());
    let comments =
        CommentRepository::new(store, RepoConfig::default(), clock("2025-05-01 09:00:00"));

    assert!(matches!(
        comments.create(id, "A", "Comentario válido"),
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        comments.create(id, "Ana", "hola"),
        Err(ApiError::Validation(_))
    ));
    assert!(comments.create(id, "Ana", "Comentario válido").is_ok());
}

#[test]
fn pagination_returns_chronological_pages_with_totals() {
    let store = store();
    let id = create_complaint(store.clone());

    // 25 comments, one per minute, so insertion order is chronological.
    for i in 1..=25 {
        let comments = CommentRepository::new(
            store.clone(),
            RepoConfig::default(),
            clock(&format!("2025-05-01 10:{:02}:00", i)),
        );
        comments
            .create(id, "Vecino", &format!("Comentario número {i}"))
            .unwrap();
    }

    let comments =
        CommentRepository::new(store, RepoConfig::default(), clock("2025-05-02 00:00:00"));
    let page = comments.list_by_complaint(id, 2, Some(10)).unwrap();

    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page, 2);
    assert_eq!(page.comments.len(), 10);
    assert_eq!(page.comments[0].body, "Comentario número 11");
    assert_eq!(page.comments[9].body, "Comentario número 20");

    let last = comments.list_by_complaint(id, 3, Some(10)).unwrap();
    assert_eq!(last.comments.len(), 5);
    assert_eq!(last.comments[4].body, "Comentario número 25");
}

#[test]
fn page_size_is_clamped_and_page_floors_at_one() {
    let store = store();
    let id = create_complaint(store.clone());
    let comments = CommentRepository::new(
        store,
        RepoConfig::default(),
        clock("2025-05-01 12:00:00"),
    );
    comments.create(id, "Ana", "Primer comentario").unwrap();

    let page = comments.list_by_complaint(id, 0, Some(500)).unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 50);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.comments.len(), 1);
}

#[test]
fn oversized_page_number_yields_an_empty_page() {
    let store = store();
    let id = create_complaint(store.clone());
    let comments = CommentRepository::new(
        store,
        RepoConfig::default(),
        clock("2025-05-01 12:00:00"),
    );
    comments.create(id, "Ana", "Primer comentario").unwrap();

    let page = comments.list_by_complaint(id, 100_000_000, Some(50)).unwrap();
    assert_eq!(page.page, 100_000_000);
    assert_eq!(page.total, 1);
    assert!(page.comments.is_empty());
}

#[test]
fn recent_feed_is_newest_first_with_complaint_summary() {
    let store = store();
    let long = create_complaint_described(store.clone(), LONG_DESCRIPTION);
    let short = create_complaint(store.clone());

    for (minute, complaint_id, body) in [
        (1, long, "Primera observación del vecindario"),
        (2, short, "El humo sigue igual que ayer"),
        (3, long, "Anoche volvieron a quemar llantas"),
    ] {
        let comments = CommentRepository::new(
            store.clone(),
            RepoConfig::default(),
            clock(&format!("2025-05-01 10:{minute:02}:00")),
        );
        comments.create(complaint_id, "Vecino", body).unwrap();
    }

    let comments = CommentRepository::new(
        store,
        RepoConfig::default(),
        clock("2025-05-02 00:00:00"),
    );
    let feed = comments.recent(Some(2)).unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].comment.body, "Anoche volvieron a quemar llantas");
    assert_eq!(feed[0].comment.complaint_id, long);
    assert_eq!(feed[0].complaint_category, Category::AirPollution);
    assert_eq!(
        feed[0].complaint_summary,
        LONG_DESCRIPTION.chars().take(50).collect::<String>()
    );
    assert_eq!(feed[1].comment.body, "El humo sigue igual que ayer");

    let all = comments.recent(None).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn comment_stats_track_first_and_last_timestamps() {
    let store = store();
    let id = create_complaint(store.clone());

    let fresh = CommentRepository::new(
        store.clone(),
        RepoConfig::default(),
        clock("2025-05-01 09:00:00"),
    );
    let stats = fresh.stats_for_complaint(id).unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.first_comment_at, None);
    assert_eq!(stats.last_comment_at, None);

    for minute in [5, 30] {
        let comments = CommentRepository::new(
            store.clone(),
            RepoConfig::default(),
            clock(&format!("2025-05-01 09:{minute:02}:00")),
        );
        comments.create(id, "Ana", "Comentario de seguimiento").unwrap();
    }

    let stats = fresh.stats_for_complaint(id).unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(
        stats.first_comment_at.unwrap().to_string(),
        "2025-05-01 09:05:00"
    );
    assert_eq!(
        stats.last_comment_at.unwrap().to_string(),
        "2025-05-01 09:30:00"
    );

    assert!(matches!(
        fresh.stats_for_complaint(9000),
        Err(ApiError::NotFound(9000))
    ));
}

#[test]
fn empty_page_reports_zero_totals() {
    let store = store();
    let id = create_complaint(store.clone());
    let comments = CommentRepository::new(
        store,
        RepoConfig::default(),
        clock("2025-05-01 12:00:00"),
    );

    let page = comments.list_by_complaint(id, 1, None).unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.comments.is_empty());
}
