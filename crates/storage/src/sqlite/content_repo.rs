use lingo_core::model::{
    Challenge, ChallengeId, ChallengeOption, Course, CourseId, Lesson, Unit,
};

use super::SqliteRepository;
use super::mapping::{
    db, id_i64, map_challenge_row, map_course_row, map_lesson_row, map_option_row,
    map_unit_row, placeholders,
};
use crate::repository::{CourseRepository, CurriculumRepository, StorageError};

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO courses (id, title, image_src)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                image_src = excluded.image_src
            ",
        )
        .bind(id_i64("course_id", course.id().value())?)
        .bind(course.title())
        .bind(course.image_src())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query("SELECT id, title, image_src FROM courses WHERE id = ?1")
            .bind(id_i64("course_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;

        row.as_ref().map(map_course_row).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query("SELECT id, title, image_src FROM courses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        rows.iter().map(map_course_row).collect()
    }

    async fn delete_all_courses(&self) -> Result<(), StorageError> {
        // Cascades to units, lessons, challenges, options and challenge progress.
        sqlx::query("DELETE FROM courses")
            .execute(&self.pool)
            .await
            .map_err(db)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CurriculumRepository for SqliteRepository {
    async fn upsert_unit(&self, unit: &Unit) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO units (id, course_id, title, description, sort_order)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                course_id = excluded.course_id,
                title = excluded.title,
                description = excluded.description,
                sort_order = excluded.sort_order
            ",
        )
        .bind(id_i64("unit_id", unit.id().value())?)
        .bind(id_i64("course_id", unit.course_id().value())?)
        .bind(unit.title())
        .bind(unit.description())
        .bind(i64::from(unit.order()))
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lessons (id, unit_id, title, sort_order)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                unit_id = excluded.unit_id,
                title = excluded.title,
                sort_order = excluded.sort_order
            ",
        )
        .bind(id_i64("lesson_id", lesson.id().value())?)
        .bind(id_i64("unit_id", lesson.unit_id().value())?)
        .bind(lesson.title())
        .bind(i64::from(lesson.order()))
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn upsert_challenge(&self, challenge: &Challenge) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO challenges (id, lesson_id, kind, question, sort_order)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                lesson_id = excluded.lesson_id,
                kind = excluded.kind,
                question = excluded.question,
                sort_order = excluded.sort_order
            ",
        )
        .bind(id_i64("challenge_id", challenge.id().value())?)
        .bind(id_i64("lesson_id", challenge.lesson_id().value())?)
        .bind(challenge.kind().as_str())
        .bind(challenge.question())
        .bind(i64::from(challenge.order()))
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn upsert_option(&self, option: &ChallengeOption) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO challenge_options (id, challenge_id, text, correct, image_src, audio_src)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                challenge_id = excluded.challenge_id,
                text = excluded.text,
                correct = excluded.correct,
                image_src = excluded.image_src,
                audio_src = excluded.audio_src
            ",
        )
        .bind(id_i64("option_id", option.id().value())?)
        .bind(id_i64("challenge_id", option.challenge_id().value())?)
        .bind(option.text())
        .bind(i64::from(option.is_correct()))
        .bind(option.image_src())
        .bind(option.audio_src())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn units_for_course(&self, course_id: CourseId) -> Result<Vec<Unit>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, title, description, sort_order
            FROM units
            WHERE course_id = ?1
            ",
        )
        .bind(id_i64("course_id", course_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(map_unit_row).collect()
    }

    async fn lessons_for_course(&self, course_id: CourseId) -> Result<Vec<Lesson>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT l.id, l.unit_id, l.title, l.sort_order
            FROM lessons l
            JOIN units u ON u.id = l.unit_id
            WHERE u.course_id = ?1
            ",
        )
        .bind(id_i64("course_id", course_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn challenges_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<Challenge>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.lesson_id, c.kind, c.question, c.sort_order
            FROM challenges c
            JOIN lessons l ON l.id = c.lesson_id
            JOIN units u ON u.id = l.unit_id
            WHERE u.course_id = ?1
            ",
        )
        .bind(id_i64("course_id", course_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.iter().map(map_challenge_row).collect()
    }

    async fn options_for_challenges(
        &self,
        ids: &[ChallengeId],
    ) -> Result<Vec<ChallengeOption>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r"
            SELECT id, challenge_id, text, correct, image_src, audio_src
            FROM challenge_options
            WHERE challenge_id IN ({})
            ",
            placeholders(1, ids.len())
        );

        let mut q = sqlx::query(&sql);
        for id in ids {
            q = q.bind(id_i64("challenge_id", id.value())?);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(db)?;
        rows.iter().map(map_option_row).collect()
    }

    async fn get_challenge(&self, id: ChallengeId) -> Result<Option<Challenge>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, lesson_id, kind, question, sort_order
            FROM challenges
            WHERE id = ?1
            ",
        )
        .bind(id_i64("challenge_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_challenge_row).transpose()
    }
}
