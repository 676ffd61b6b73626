use chrono::{DateTime, Utc};
use lingo_core::model::{
    Challenge, ChallengeId, ChallengeKind, ChallengeOption, ChallengeOptionId, ChallengeProgress,
    ChallengeProgressId, Course, CourseId, Lesson, LessonId, Unit, UnitId, UserId, UserProgress,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps sqlx failures, turning constraint violations into `Conflict`.
pub(crate) fn db(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(inner)
            if inner.is_foreign_key_violation()
                || inner.is_unique_violation()
                || inner.is_check_violation() =>
        {
            StorageError::Conflict
        }
        _ => StorageError::Connection(e.to_string()),
    }
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, StorageError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(ser)
}

pub(crate) fn map_course_row(row: &SqliteRow) -> Result<Course, StorageError> {
    Course::new(
        CourseId::new(i64_to_u64("course_id", get(row, "id")?)?),
        get::<String>(row, "title")?,
        get::<String>(row, "image_src")?,
    )
    .map_err(ser)
}

pub(crate) fn map_unit_row(row: &SqliteRow) -> Result<Unit, StorageError> {
    Unit::new(
        UnitId::new(i64_to_u64("unit_id", get(row, "id")?)?),
        CourseId::new(i64_to_u64("course_id", get(row, "course_id")?)?),
        get::<String>(row, "title")?,
        get::<String>(row, "description")?,
        i64_to_u32("sort_order", get(row, "sort_order")?)?,
    )
    .map_err(ser)
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    Lesson::new(
        LessonId::new(i64_to_u64("lesson_id", get(row, "id")?)?),
        UnitId::new(i64_to_u64("unit_id", get(row, "unit_id")?)?),
        get::<String>(row, "title")?,
        i64_to_u32("sort_order", get(row, "sort_order")?)?,
    )
    .map_err(ser)
}

pub(crate) fn map_challenge_row(row: &SqliteRow) -> Result<Challenge, StorageError> {
    let kind: String = get(row, "kind")?;
    Challenge::new(
        ChallengeId::new(i64_to_u64("challenge_id", get(row, "id")?)?),
        LessonId::new(i64_to_u64("lesson_id", get(row, "lesson_id")?)?),
        kind.parse::<ChallengeKind>().map_err(ser)?,
        get::<String>(row, "question")?,
        i64_to_u32("sort_order", get(row, "sort_order")?)?,
    )
    .map_err(ser)
}

pub(crate) fn map_option_row(row: &SqliteRow) -> Result<ChallengeOption, StorageError> {
    ChallengeOption::new(
        ChallengeOptionId::new(i64_to_u64("option_id", get(row, "id")?)?),
        ChallengeId::new(i64_to_u64("challenge_id", get(row, "challenge_id")?)?),
        get::<String>(row, "text")?,
        get::<i64>(row, "correct")? != 0,
        get(row, "image_src")?,
        get(row, "audio_src")?,
    )
    .map_err(ser)
}

pub(crate) fn map_user_progress_row(row: &SqliteRow) -> Result<UserProgress, StorageError> {
    let user_id = UserId::new(get::<String>(row, "user_id")?).map_err(ser)?;
    let active_course_id = get::<Option<i64>>(row, "active_course_id")?
        .map(|v| i64_to_u64("active_course_id", v).map(CourseId::new))
        .transpose()?;
    let user_name: String = get(row, "user_name")?;
    let user_image_src: String = get(row, "user_image_src")?;

    UserProgress::from_persisted(
        user_id,
        &user_name,
        &user_image_src,
        active_course_id,
        i64_to_u32("hearts", get(row, "hearts")?)?,
        i64_to_u32("points", get(row, "points")?)?,
    )
    .map_err(ser)
}

pub(crate) fn map_challenge_progress_row(
    row: &SqliteRow,
) -> Result<ChallengeProgress, StorageError> {
    let updated_at: DateTime<Utc> = get(row, "updated_at")?;
    Ok(ChallengeProgress {
        id: ChallengeProgressId::new(i64_to_u64("progress_id", get(row, "id")?)?),
        user_id: UserId::new(get::<String>(row, "user_id")?).map_err(ser)?,
        challenge_id: ChallengeId::new(i64_to_u64("challenge_id", get(row, "challenge_id")?)?),
        completed: get::<i64>(row, "completed")? != 0,
        updated_at,
    })
}

/// `?{start}, ?{start+1}, ...` placeholders for an `IN (...)` list.
pub(crate) fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
