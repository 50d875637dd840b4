//! Integration tests for the interview repository.

use candor_core::interview::InterviewStatus;
use candor_db::models::interview::CreateInterview;
use candor_db::repositories::InterviewRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_interview(user_id: i64, video_url: &str) -> CreateInterview {
    CreateInterview {
        user_id,
        video_url: video_url.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_starts_recorded(pool: PgPool) {
    let interview = InterviewRepo::create(&pool, &new_interview(1, "videos/a.mp4"))
        .await
        .unwrap();

    assert_eq!(interview.user_id, 1);
    assert_eq!(interview.video_url, "videos/a.mp4");
    assert_eq!(interview.status().unwrap(), InterviewStatus::Recorded);
    assert!(interview.analysed_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_user_is_owner_scoped(pool: PgPool) {
    InterviewRepo::create(&pool, &new_interview(1, "a.mp4")).await.unwrap();
    InterviewRepo::create(&pool, &new_interview(1, "b.mp4")).await.unwrap();
    InterviewRepo::create(&pool, &new_interview(2, "c.mp4")).await.unwrap();

    let mine = InterviewRepo::list_by_user(&pool, 1).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|i| i.user_id == 1));

    let none = InterviewRepo::list_by_user(&pool, 99).await.unwrap();
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_missing_returns_none(pool: PgPool) {
    assert!(InterviewRepo::find_by_id(&pool, 424242).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_full_path(pool: PgPool) {
    let interview = InterviewRepo::create(&pool, &new_interview(1, "a.mp4")).await.unwrap();

    let analyzing = InterviewRepo::transition(
        &pool,
        interview.id,
        InterviewStatus::Recorded,
        InterviewStatus::Analyzing,
    )
    .await
    .unwrap()
    .expect("transition should apply");
    assert_eq!(analyzing.status, "analyzing");
    assert!(analyzing.analysed_at.is_none());

    let completed = InterviewRepo::transition(
        &pool,
        interview.id,
        InterviewStatus::Analyzing,
        InterviewStatus::Completed,
    )
    .await
    .unwrap()
    .expect("transition should apply");
    assert_eq!(completed.status, "completed");
    assert!(completed.analysed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_from_stale_status_does_nothing(pool: PgPool) {
    let interview = InterviewRepo::create(&pool, &new_interview(1, "a.mp4")).await.unwrap();

    let result = InterviewRepo::transition(
        &pool,
        interview.id,
        InterviewStatus::Analyzing,
        InterviewStatus::Failed,
    )
    .await
    .unwrap();
    assert!(result.is_none());

    let unchanged = InterviewRepo::find_by_id(&pool, interview.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, "recorded");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recompleting_refreshes_timestamp_only(pool: PgPool) {
    let interview = InterviewRepo::create(&pool, &new_interview(1, "a.mp4")).await.unwrap();
    let first = InterviewRepo::transition(
        &pool,
        interview.id,
        InterviewStatus::Recorded,
        InterviewStatus::Completed,
    )
    .await
    .unwrap()
    .unwrap();

    let second = InterviewRepo::transition(
        &pool,
        interview.id,
        InterviewStatus::Completed,
        InterviewStatus::Completed,
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(second.status, "completed");
    assert_eq!(second.video_url, first.video_url);
    assert!(second.analysed_at.unwrap() >= first.analysed_at.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_force_complete(pool: PgPool) {
    let interview = InterviewRepo::create(&pool, &new_interview(1, "a.mp4")).await.unwrap();

    assert!(InterviewRepo::force_complete(&pool, interview.id).await.unwrap());
    let completed = InterviewRepo::find_by_id(&pool, interview.id).await.unwrap().unwrap();
    assert_eq!(completed.status, "completed");
    assert!(completed.analysed_at.is_some());

    assert!(!InterviewRepo::force_complete(&pool, 987654).await.unwrap());
}
