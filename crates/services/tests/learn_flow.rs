use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lingo_core::model::{ChallengeId, CourseId, LessonId, UnitId, UserId, UserProgress};
use lingo_core::time::fixed_clock;
use services::{AppServices, LearnScope, LearnService, lesson_states};
use storage::repository::{Storage, StorageError, UserProgressRepository};
use storage::seed::seed_sample_content;

fn user() -> UserId {
    UserId::new("user_1").unwrap()
}

async fn services() -> (AppServices, Storage) {
    let storage = Storage::in_memory();
    seed_sample_content(&storage).await.unwrap();
    (AppServices::from_storage(&storage, fixed_clock()), storage)
}

async fn complete(app: &AppServices, ids: &[u64]) {
    for &id in ids {
        app.progress()
            .complete_challenge(&user(), ChallengeId::new(id))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn queries_are_empty_before_a_course_is_selected() {
    let (app, _) = services().await;
    let learn = app.learn();
    assert!(learn.get_user_progress(&user()).await.unwrap().is_none());
    assert!(learn.get_units(&user()).await.unwrap().is_empty());
    assert!(learn.get_course_progress(&user()).await.unwrap().is_none());
    assert!(learn.get_lesson(&user(), None).await.unwrap().is_none());
    assert_eq!(learn.get_lesson_percentage(&user()).await.unwrap(), 0);
}

#[tokio::test]
async fn active_lesson_moves_as_challenges_complete() {
    let (app, _) = services().await;
    app.progress()
        .select_course(&user(), CourseId::new(1), None, None)
        .await
        .unwrap();
    let learn = app.learn();

    let progress = learn.get_course_progress(&user()).await.unwrap().unwrap();
    assert_eq!(progress.active_lesson_id(), Some(LessonId::new(1)));
    assert_eq!(
        progress.active_lesson.as_ref().map(|a| a.unit.id()),
        Some(UnitId::new(1))
    );

    complete(&app, &[1]).await;
    assert_eq!(learn.get_lesson_percentage(&user()).await.unwrap(), 33);

    complete(&app, &[2, 3]).await;
    let progress = learn.get_course_progress(&user()).await.unwrap().unwrap();
    assert_eq!(progress.active_lesson_id(), Some(LessonId::new(2)));
    assert_eq!(learn.get_lesson_percentage(&user()).await.unwrap(), 0);

    let units = learn.get_units(&user()).await.unwrap();
    let flags: Vec<bool> = units[0].lessons.iter().map(|l| l.completed).collect();
    assert_eq!(flags, vec![true, false, false, false, false]);
}

#[tokio::test]
async fn finished_lessons_and_empty_lessons_leave_no_active_lesson() {
    let (app, _) = services().await;
    app.progress()
        .select_course(&user(), CourseId::new(1), None, None)
        .await
        .unwrap();
    complete(&app, &[1, 2, 3, 4, 5, 6]).await;

    let learn = app.learn();
    let progress = learn.get_course_progress(&user()).await.unwrap().unwrap();
    assert!(progress.active_lesson.is_none());
    assert_eq!(learn.get_lesson_percentage(&user()).await.unwrap(), 0);

    let units = learn.get_units(&user()).await.unwrap();
    let states = lesson_states(&units, &progress, 0);
    let locked: Vec<bool> = states[0].iter().map(|s| s.locked).collect();
    // Lessons 3..5 have no challenges yet, so they stay locked.
    assert_eq!(locked, vec![false, false, true, true, true]);
    assert!(states[0].iter().all(|s| !s.current));
}

#[tokio::test]
async fn lesson_states_mark_current_with_percentage() {
    let (app, _) = services().await;
    app.progress()
        .select_course(&user(), CourseId::new(1), None, None)
        .await
        .unwrap();
    complete(&app, &[1]).await;

    let learn = app.learn();
    let units = learn.get_units(&user()).await.unwrap();
    let progress = learn.get_course_progress(&user()).await.unwrap().unwrap();
    let percentage = learn.get_lesson_percentage(&user()).await.unwrap();
    let states = lesson_states(&units, &progress, percentage);

    assert!(states[0][0].current && !states[0][0].locked);
    assert_eq!(states[0][0].percentage, Some(33));
    assert!(states[0][1].locked);
}

#[tokio::test]
async fn get_lesson_defaults_to_active_and_rejects_foreign_lessons() {
    let (app, _) = services().await;
    app.progress()
        .select_course(&user(), CourseId::new(1), None, None)
        .await
        .unwrap();
    complete(&app, &[1]).await;
    let learn = app.learn();

    let lesson = learn.get_lesson(&user(), None).await.unwrap().unwrap();
    assert_eq!(lesson.lesson.id(), LessonId::new(1));
    assert_eq!(lesson.challenges.len(), 3);
    assert!(lesson.challenges[0].completed);
    assert_eq!(lesson.challenges[0].options.len(), 3);

    let lesson = learn
        .get_lesson(&user(), Some(LessonId::new(2)))
        .await
        .unwrap()
        .unwrap();
    assert!(lesson.challenges.iter().all(|c| !c.completed));

    assert!(learn
        .get_lesson(&user(), Some(LessonId::new(77)))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn progress_is_per_user() {
    let (app, _) = services().await;
    let other = UserId::new("user_2").unwrap();
    for u in [user(), other.clone()] {
        app.progress()
            .select_course(&u, CourseId::new(1), None, None)
            .await
            .unwrap();
    }
    complete(&app, &[1, 2, 3]).await;

    let learn = app.learn();
    let mine = learn.get_course_progress(&user()).await.unwrap().unwrap();
    let theirs = learn.get_course_progress(&other).await.unwrap().unwrap();
    assert_eq!(mine.active_lesson_id(), Some(LessonId::new(2)));
    assert_eq!(theirs.active_lesson_id(), Some(LessonId::new(1)));
}

struct CountingProgress {
    inner: Arc<dyn UserProgressRepository>,
    reads: AtomicUsize,
}

#[async_trait]
impl UserProgressRepository for CountingProgress {
    async fn get_user_progress(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProgress>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_user_progress(user).await
    }

    async fn upsert_user_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        self.inner.upsert_user_progress(progress).await
    }

    async fn delete_all_user_progress(&self) -> Result<(), StorageError> {
        self.inner.delete_all_user_progress().await
    }
}

#[tokio::test]
async fn learn_scope_reads_storage_once_per_render() {
    let (app, storage) = services().await;
    app.progress()
        .select_course(&user(), CourseId::new(1), None, None)
        .await
        .unwrap();

    let counting = Arc::new(CountingProgress {
        inner: Arc::clone(&storage.user_progress),
        reads: AtomicUsize::new(0),
    });
    let learn = Arc::new(LearnService::new(
        Arc::clone(&storage.courses),
        Arc::clone(&storage.curriculum),
        counting.clone(),
        Arc::clone(&storage.challenge_progress),
    ));

    let scope = LearnScope::new(Arc::clone(&learn), user());
    let view = scope.user_progress().await.unwrap().unwrap();
    assert_eq!(view.active_course.as_ref().map(|c| c.title()), Some("Spanish"));
    assert_eq!(scope.units().await.unwrap().len(), 1);
    assert!(scope.course_progress().await.unwrap().is_some());
    assert_eq!(scope.lesson_percentage().await.unwrap(), 0);
    assert!(scope.lesson(None).await.unwrap().is_some());
    assert_eq!(counting.reads.load(Ordering::SeqCst), 1);

    // A new scope sees fresh data.
    let scope = LearnScope::new(learn, user());
    scope.units().await.unwrap();
    assert_eq!(counting.reads.load(Ordering::SeqCst), 2);
}
