use hireboard_core::models::{ApplicationStatus, JobFilters, JobStatus, NewJob};
use hireboard_core::{AppError, Session, UNKNOWN_COMPANY};

use crate::integration::common::{LINUS, acme, ada, id, linus, marketplace};

#[tokio::test]
async fn search_only_lists_active_jobs_with_company_names() {
    let (board, _) = marketplace();

    let listings = board.job_listings(&JobFilters::default()).await.unwrap();
    let titles: Vec<_> = listings.iter().map(|l| l.job.title.as_str()).collect();
    assert_eq!(titles, vec!["Rust Engineer", "Kernel Hacker", "Office Manager"]);
    assert!(listings.iter().all(|l| l.job.status == JobStatus::Active));

    let companies: Vec<_> = listings.iter().map(|l| l.company_name.as_str()).collect();
    assert_eq!(companies, vec!["Acme", "Initech", UNKNOWN_COMPANY]);
}

#[tokio::test]
async fn search_keyword_is_case_insensitive_substring() {
    let (board, _) = marketplace();
    let filters = JobFilters {
        keyword: Some("RUST".into()),
        ..JobFilters::default()
    };

    let listings = board.job_listings(&filters).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].job.id, id(10));
}

#[tokio::test]
async fn list_fields_are_trimmed_identically_across_lookups() {
    let (board, _) = marketplace();

    let single = board.jobs().get_by_id(id(10)).await.unwrap();
    assert_eq!(single.requirements, vec!["Rust", "Tokio", "Serde"]);
    assert_eq!(single.benefits, vec!["Remote", "Equity"]);

    let batch = board.jobs().get_by_ids(&[id(11), id(10)]).await.unwrap();
    let from_batch = batch.into_iter().find(|j| j.id == id(10)).unwrap();
    assert_eq!(from_batch, single);
}

#[tokio::test]
async fn embedded_references_resolve_like_bare_ids() {
    let (board, _) = marketplace();

    let kernel = board.jobs().get_by_id(id(11)).await.unwrap();
    assert_eq!(kernel.employer, Some(id(101)));

    let initech = board.employers().get_by_user_id(id(101)).await.unwrap();
    assert_eq!(initech.company_name, "Initech");
    assert!(!initech.verified);

    let linus = board.job_seekers().get_by_user_id(id(LINUS)).await.unwrap();
    assert_eq!(linus.experience_years, Some(20.0));
}

#[tokio::test]
async fn my_applications_are_newest_first_and_survive_orphans() {
    let (board, _) = marketplace();

    let views = board.my_applications(&ada()).await.unwrap();
    let ids: Vec<_> = views.iter().map(|v| v.application.id.get()).collect();
    assert_eq!(ids, vec![23, 21, 20]);

    assert!(views[0].job.is_none());
    assert_eq!(views[0].company_name, UNKNOWN_COMPANY);
    assert_eq!(views[1].company_name, "Initech");
    assert_eq!(views[2].application.status, ApplicationStatus::Reviewing);
    assert_eq!(views[2].company_name, "Acme");
}

#[tokio::test]
async fn employer_sees_applications_to_own_jobs_only() {
    let (board, _) = marketplace();

    let roster = board.candidate_roster(&acme()).await.unwrap();
    assert_eq!(roster.jobs.len(), 2);

    let entries: Vec<_> = roster
        .entries
        .iter()
        .map(|e| {
            (
                e.application.id.get(),
                e.candidate.as_ref().map(|c| c.full_name.clone()),
            )
        })
        .collect();
    assert_eq!(
        entries,
        vec![
            (22, Some("Linus Torvalds".to_string())),
            (20, Some("Ada Lovelace".to_string())),
        ]
    );

    assert_eq!(roster.for_job(Some(id(12))).len(), 0);
    assert_eq!(roster.for_job(Some(id(10))).len(), 2);
}

#[tokio::test]
async fn posting_a_job_validates_then_lists_it() {
    let (board, client) = marketplace();
    let before = client.records("job_listing_c").len();

    let blank = NewJob {
        title: String::new(),
        ..NewJob::new("x", "Ship it", "Engineering", "Remote", "full-time", "mid")
    };
    let err = board.post_job(&acme(), blank).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(client.records("job_listing_c").len(), before);

    let job = board
        .post_job(
            &acme(),
            NewJob::new("Staff Engineer", "Lead", "Engineering", "Remote", "full-time", "staff")
                .with_requirements(["Rust", "Leadership"]),
        )
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Active);
    assert_eq!(job.employer, Some(id(100)));

    let filters = JobFilters {
        keyword: Some("staff".into()),
        ..JobFilters::default()
    };
    let listings = board.job_listings(&filters).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].company_name, "Acme");
    assert_eq!(listings[0].job.requirements, vec!["Rust", "Leadership"]);
}

#[tokio::test]
async fn applying_shows_up_for_both_sides() {
    let (board, _) = marketplace();

    let application = board
        .apply(&linus(), id(11), "I wrote the kernel.", None)
        .await
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Applied);

    let mine = board.my_applications(&linus()).await.unwrap();
    assert_eq!(mine[0].application.id, application.id);
    assert_eq!(mine[0].company_name, "Initech");

    let initech = Session::employer(id(101));
    let roster = board.candidate_roster(&initech).await.unwrap();
    let entry = roster
        .entries
        .iter()
        .find(|e| e.application.id == application.id)
        .unwrap();
    assert_eq!(entry.candidate.as_ref().unwrap().user, Some(id(LINUS)));
}

#[tokio::test]
async fn applying_to_a_draft_job_is_rejected() {
    let (board, client) = marketplace();
    let before = client.records("application_c").len();

    let err = board.apply(&ada(), id(12), "Please", None).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(client.records("application_c").len(), before);
    let mine = board.my_applications(&ada()).await.unwrap();
    assert!(mine.iter().all(|v| v.application.job != id(12)));
}
