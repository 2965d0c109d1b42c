use hireboard_core::AppError;

use crate::integration::common::{ADA, ada, id, linus, marketplace};

#[tokio::test]
async fn save_then_unsave_flips_is_saved() {
    let (board, _) = marketplace();
    let bookmarks = board.bookmarks();

    assert!(!bookmarks.is_saved(id(10), id(ADA)).await);
    bookmarks.save(id(10), id(ADA)).await.unwrap();
    assert!(bookmarks.is_saved(id(10), id(ADA)).await);

    bookmarks.unsave(id(10), id(ADA)).await.unwrap();
    assert!(!bookmarks.is_saved(id(10), id(ADA)).await);
}

#[tokio::test]
async fn second_save_is_a_duplicate() {
    let (board, client) = marketplace();
    let bookmarks = board.bookmarks();

    bookmarks.save(id(13), id(ADA)).await.unwrap();
    let err = bookmarks.save(id(13), id(ADA)).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateError(_)));

    let rows = client.records("saved_job_c");
    let pairs = rows
        .iter()
        .filter(|r| r["job_id_c"] == 13 && r["candidate_id_c"] == ADA)
        .count();
    assert_eq!(pairs, 1);
}

#[tokio::test]
async fn unsaving_an_unsaved_job_is_not_found() {
    let (board, _) = marketplace();
    let err = board.bookmarks().unsave(id(10), id(ADA)).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn saved_jobs_materialize_with_employers() {
    let (board, _) = marketplace();
    board.toggle_saved(&ada(), id(10)).await.unwrap();

    let saved = board.saved_jobs(&ada()).await.unwrap();
    let titles: Vec<_> = saved.iter().map(|s| s.job.title.as_str()).collect();
    // Newest bookmark first.
    assert_eq!(titles, vec!["Rust Engineer", "Kernel Hacker"]);
    assert_eq!(saved[0].company_name, "Acme");
    assert_eq!(saved[1].company_name, "Initech");

    assert!(board.saved_jobs(&linus()).await.unwrap().is_empty());
}

#[tokio::test]
async fn job_detail_tracks_toggle() {
    let (board, _) = marketplace();

    let detail = board.job_detail(&linus(), id(10)).await.unwrap();
    assert!(!detail.saved);
    assert_eq!(detail.employer.unwrap().company_name, "Acme");

    assert!(board.toggle_saved(&linus(), id(10)).await.unwrap());
    assert!(board.job_detail(&linus(), id(10)).await.unwrap().saved);

    assert!(!board.toggle_saved(&linus(), id(10)).await.unwrap());
    assert!(!board.job_detail(&linus(), id(10)).await.unwrap().saved);
}
