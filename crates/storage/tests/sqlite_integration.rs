use lingo_core::model::{
    Challenge, ChallengeId, ChallengeKind, ChallengeOption, ChallengeOptionId, Course, CourseId,
    Lesson, LessonId, Unit, UnitId, UserId, UserProgress,
};
use lingo_core::time::fixed_now;
use storage::repository::{
    ChallengeProgressRepository, CourseRepository, CurriculumRepository, ProgressPersistence,
    StorageError, UserProgressRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn seed_course(repo: &SqliteRepository) {
    repo.upsert_course(&Course::new(CourseId::new(1), "Spanish", "/es.svg").unwrap())
        .await
        .unwrap();
    repo.upsert_unit(
        &Unit::new(UnitId::new(1), CourseId::new(1), "Unit 1", "Learn the basics", 1).unwrap(),
    )
    .await
    .unwrap();
    repo.upsert_lesson(&Lesson::new(LessonId::new(1), UnitId::new(1), "Nouns", 1).unwrap())
        .await
        .unwrap();
    repo.upsert_challenge(
        &Challenge::new(
            ChallengeId::new(1),
            LessonId::new(1),
            ChallengeKind::Assist,
            "\"the man\"",
            1,
        )
        .unwrap(),
    )
    .await
    .unwrap();
    repo.upsert_option(
        &ChallengeOption::new(
            ChallengeOptionId::new(1),
            ChallengeId::new(1),
            "el hombre",
            true,
            None,
            Some("/es_man.mp3".into()),
        )
        .unwrap(),
    )
    .await
    .unwrap();
}

fn user() -> UserId {
    UserId::new("user_1").unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_course_tree() {
    let repo = connect("memdb_course_tree").await;
    seed_course(&repo).await;

    let courses = repo.list_courses().await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].title(), "Spanish");

    let units = repo.units_for_course(CourseId::new(1)).await.unwrap();
    assert_eq!(units[0].description(), "Learn the basics");
    let lessons = repo.lessons_for_course(CourseId::new(1)).await.unwrap();
    assert_eq!(lessons[0].title(), "Nouns");
    let challenges = repo.challenges_for_course(CourseId::new(1)).await.unwrap();
    assert_eq!(challenges[0].kind(), ChallengeKind::Assist);

    let options = repo
        .options_for_challenges(&[ChallengeId::new(1), ChallengeId::new(99)])
        .await
        .unwrap();
    assert_eq!(options.len(), 1);
    assert!(options[0].is_correct());
    assert_eq!(options[0].image_src(), None);
    assert_eq!(options[0].audio_src(), Some("/es_man.mp3"));

    assert!(repo.get_course(CourseId::new(2)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_rejects_orphan_unit() {
    let repo = connect("memdb_orphan_unit").await;
    let unit = Unit::new(UnitId::new(5), CourseId::new(77), "Unit", "Desc", 1).unwrap();
    let err = repo.upsert_unit(&unit).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_user_progress_upsert_and_read() {
    let repo = connect("memdb_user_progress").await;
    seed_course(&repo).await;

    let mut progress = UserProgress::start(user(), Some("Ana"), None, CourseId::new(1));
    repo.upsert_user_progress(&progress).await.unwrap();
    progress.lose_heart().unwrap();
    repo.upsert_user_progress(&progress).await.unwrap();

    let stored = repo.get_user_progress(&user()).await.unwrap().unwrap();
    assert_eq!(stored, progress);
    assert_eq!(stored.hearts(), 4);
}

#[tokio::test]
async fn sqlite_user_progress_requires_existing_course() {
    let repo = connect("memdb_user_progress_fk").await;
    let progress = UserProgress::start(user(), None, None, CourseId::new(3));
    let err = repo.upsert_user_progress(&progress).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_record_completion_is_single_row_per_challenge() {
    let repo = connect("memdb_record_completion").await;
    seed_course(&repo).await;

    let mut progress = UserProgress::start(user(), None, None, CourseId::new(1));
    progress.reward_challenge(false);
    let first = repo
        .record_completion(&progress, ChallengeId::new(1), fixed_now())
        .await
        .unwrap();
    assert!(first.completed);

    progress.reward_challenge(true);
    let second = repo
        .record_completion(&progress, ChallengeId::new(1), fixed_now())
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let records = repo
        .progress_for_challenges(&user(), &[ChallengeId::new(1)])
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    let stored = repo.get_user_progress(&user()).await.unwrap().unwrap();
    assert_eq!(stored.points(), 20);
}

#[tokio::test]
async fn sqlite_record_completion_rolls_back_on_unknown_challenge() {
    let repo = connect("memdb_record_rollback").await;
    seed_course(&repo).await;

    let progress = UserProgress::start(user(), None, None, CourseId::new(1));
    let err = repo
        .record_completion(&progress, ChallengeId::new(404), fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
    assert!(repo.get_user_progress(&user()).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_deleting_courses_cascades_to_progress() {
    let repo = connect("memdb_cascade").await;
    seed_course(&repo).await;
    let progress = UserProgress::start(user(), None, None, CourseId::new(1));
    repo.record_completion(&progress, ChallengeId::new(1), fixed_now())
        .await
        .unwrap();

    repo.delete_all_courses().await.unwrap();

    assert!(repo
        .get_challenge_progress(&user(), ChallengeId::new(1))
        .await
        .unwrap()
        .is_none());
    let stored = repo.get_user_progress(&user()).await.unwrap().unwrap();
    assert_eq!(stored.active_course_id(), None);
}
