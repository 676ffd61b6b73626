use std::sync::Arc;
use dioxus::prelude::ReadableExt;

use lingo_core::model::{ChallengeId, ChallengeOptionId, Course, CourseId};
use storage::repository::{CourseRepository, Storage, StorageError};
use storage::seed::seed_sample_content;

use super::test_harness::{ViewHarness, ViewKind, setup_view_harness, setup_view_harness_with_storage};
use crate::vm::{QuizIntent, QuizPhase, QuizVm};

async fn select_spanish(harness: &ViewHarness) {
    harness
        .services
        .progress()
        .select_course(&harness.user, CourseId::new(1), Some("Ana"), None)
        .await
        .expect("select course");
}

async fn complete(harness: &ViewHarness, challenges: &[u64]) {
    for &id in challenges {
        harness
            .services
            .progress()
            .complete_challenge(&harness.user, ChallengeId::new(id))
            .await
            .expect("complete challenge");
    }
}

fn dispatch(harness: &ViewHarness, intent: QuizIntent) {
    let handles = harness.quiz_handles.clone().expect("quiz handles");
    harness.dom.in_runtime(|| handles.dispatch().call(intent));
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_smoke_lists_seeded_courses() {
    let mut harness = setup_view_harness(ViewKind::Courses).await;
    harness.settle().await;

    let html = harness.render();
    for title in ["Spanish", "Italian", "French", "Croatian"] {
        assert!(html.contains(title), "missing {title} in {html}");
    }
    assert!(!html.contains("course-card active"), "nothing is active yet: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_smoke_highlights_active_course() {
    let mut harness = setup_view_harness(ViewKind::Courses).await;
    select_spanish(&harness).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("course-card active"), "missing active card in {html}");
    assert!(html.contains("course-1"), "missing card id in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn learn_view_smoke_renders_path_for_new_learner() {
    let mut harness = setup_view_harness(ViewKind::Learn).await;
    select_spanish(&harness).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Learn the basics of Spanish"), "missing unit in {html}");
    assert!(html.contains("lesson-button current"), "missing current lesson in {html}");
    assert!(html.contains("Start"), "missing start label in {html}");
    assert!(html.contains("lesson-button locked"), "missing locked lessons in {html}");
    assert!(html.contains("Hearts: 5"), "missing hearts in {html}");
    assert!(html.contains("Points: 0"), "missing points in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn learn_view_smoke_moves_on_after_a_completed_lesson() {
    let mut harness = setup_view_harness(ViewKind::Learn).await;
    select_spanish(&harness).await;
    complete(&harness, &[1, 2, 3, 4]).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("lesson-button completed"), "missing completed lesson in {html}");
    // One of three challenges in the second lesson.
    assert!(html.contains("33%"), "missing progress ring in {html}");
    assert!(html.contains("Points: 40"), "missing points in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_view_smoke_resumes_at_first_open_challenge() {
    let mut harness = setup_view_harness(ViewKind::ActiveLesson).await;
    select_spanish(&harness).await;
    complete(&harness, &[1]).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Select the correct meaning"), "missing assist title in {html}");
    assert!(html.contains("the man"), "missing bubble in {html}");
    assert!(html.contains("width: 33%"), "missing progress bar in {html}");
    assert!(html.contains("Check"), "missing check button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_view_smoke_correct_answer_persists_points() {
    let mut harness = setup_view_harness(ViewKind::Lesson(1)).await;
    select_spanish(&harness).await;
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Which one of these is"), "missing question in {html}");

    // Option 1 is "el hombre", the answer to the first challenge.
    dispatch(&harness, QuizIntent::Select(ChallengeOptionId::new(1)));
    harness.drive_async().await;
    dispatch(&harness, QuizIntent::Check);
    for _ in 0..5 {
        harness.drive_async().await;
    }

    let vm = harness.quiz_handles.clone().expect("quiz handles").vm();
    let phase = harness
        .dom
        .in_runtime(|| vm.read().as_ref().map(QuizVm::phase));
    assert_eq!(phase, Some(QuizPhase::Correct));

    let html = harness.render();
    assert!(html.contains("Nicely done!"), "missing feedback in {html}");

    let progress = harness
        .storage
        .user_progress
        .get_user_progress(&harness.user)
        .await
        .expect("read progress")
        .expect("progress exists");
    assert_eq!(progress.points(), 10);
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_view_smoke_wrong_answer_costs_a_heart() {
    let mut harness = setup_view_harness(ViewKind::Lesson(1)).await;
    select_spanish(&harness).await;
    harness.settle().await;

    dispatch(&harness, QuizIntent::Select(ChallengeOptionId::new(2)));
    harness.drive_async().await;
    dispatch(&harness, QuizIntent::Check);
    for _ in 0..5 {
        harness.drive_async().await;
    }

    let html = harness.render();
    assert!(html.contains("Try again."), "missing feedback in {html}");
    assert!(html.contains("♥ 4"), "missing hearts in {html}");
}

struct FailingCourses;

#[async_trait::async_trait]
impl CourseRepository for FailingCourses {
    async fn upsert_course(&self, _course: &Course) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_course(&self, _id: CourseId) -> Result<Option<Course>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn delete_all_courses(&self) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_smoke_renders_error_state() {
    let mut storage = Storage::in_memory();
    seed_sample_content(&storage).await.expect("seed");
    storage.courses = Arc::new(FailingCourses);

    let mut harness = setup_view_harness_with_storage(ViewKind::Courses, storage);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

