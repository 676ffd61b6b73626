use chrono::{DateTime, Utc};
use lingo_core::model::{ChallengeId, ChallengeProgress, UserId, UserProgress};
use sqlx::{Sqlite, SqliteExecutor};

use super::SqliteRepository;
use super::mapping::{
    db, id_i64, map_challenge_progress_row, map_user_progress_row, placeholders,
};
use crate::repository::{
    ChallengeProgressRepository, ProgressPersistence, StorageError, UserProgressRepository,
};

async fn write_user_progress<'e, E>(executor: E, progress: &UserProgress) -> Result<(), StorageError>
where
    E: SqliteExecutor<'e>,
{
    let active_course_id = progress
        .active_course_id()
        .map(|id| id_i64("course_id", id.value()))
        .transpose()?;

    sqlx::query::<Sqlite>(
        r"
        INSERT INTO user_progress (user_id, user_name, user_image_src, active_course_id, hearts, points)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(user_id) DO UPDATE SET
            user_name = excluded.user_name,
            user_image_src = excluded.user_image_src,
            active_course_id = excluded.active_course_id,
            hearts = excluded.hearts,
            points = excluded.points
        ",
    )
    .bind(progress.user_id().as_str())
    .bind(progress.user_name())
    .bind(progress.user_image_src())
    .bind(active_course_id)
    .bind(i64::from(progress.hearts()))
    .bind(i64::from(progress.points()))
    .execute(executor)
    .await
    .map_err(db)?;

    Ok(())
}

#[async_trait::async_trait]
impl UserProgressRepository for SqliteRepository {
    async fn get_user_progress(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProgress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, user_name, user_image_src, active_course_id, hearts, points
            FROM user_progress
            WHERE user_id = ?1
            ",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_user_progress_row).transpose()
    }

    async fn upsert_user_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        write_user_progress(&self.pool, progress).await
    }

    async fn delete_all_user_progress(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(db)?;
        sqlx::query("DELETE FROM challenge_progress")
            .execute(&mut *tx)
            .await
            .map_err(db)?;
        sqlx::query("DELETE FROM user_progress")
            .execute(&mut *tx)
            .await
            .map_err(db)?;
        tx.commit().await.map_err(db)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChallengeProgressRepository for SqliteRepository {
    async fn get_challenge_progress(
        &self,
        user: &UserId,
        challenge_id: ChallengeId,
    ) -> Result<Option<ChallengeProgress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, challenge_id, completed, updated_at
            FROM challenge_progress
            WHERE user_id = ?1 AND challenge_id = ?2
            ",
        )
        .bind(user.as_str())
        .bind(id_i64("challenge_id", challenge_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.as_ref().map(map_challenge_progress_row).transpose()
    }

    async fn progress_for_challenges(
        &self,
        user: &UserId,
        ids: &[ChallengeId],
    ) -> Result<Vec<ChallengeProgress>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r"
            SELECT id, user_id, challenge_id, completed, updated_at
            FROM challenge_progress
            WHERE user_id = ?1 AND challenge_id IN ({})
            ",
            placeholders(2, ids.len())
        );

        let mut q = sqlx::query(&sql).bind(user.as_str());
        for id in ids {
            q = q.bind(id_i64("challenge_id", id.value())?);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(db)?;
        rows.iter().map(map_challenge_progress_row).collect()
    }
}

#[async_trait::async_trait]
impl ProgressPersistence for SqliteRepository {
    async fn record_completion(
        &self,
        progress: &UserProgress,
        challenge_id: ChallengeId,
        completed_at: DateTime<Utc>,
    ) -> Result<ChallengeProgress, StorageError> {
        let challenge = id_i64("challenge_id", challenge_id.value())?;

        let mut tx = self.pool.begin().await.map_err(db)?;

        write_user_progress(&mut *tx, progress).await?;

        let row = sqlx::query(
            r"
            INSERT INTO challenge_progress (user_id, challenge_id, completed, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(user_id, challenge_id) DO UPDATE SET
                completed = 1,
                updated_at = excluded.updated_at
            RETURNING id, user_id, challenge_id, completed, updated_at
            ",
        )
        .bind(progress.user_id().as_str())
        .bind(challenge)
        .bind(completed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db)?;

        let record = map_challenge_progress_row(&row)?;
        tx.commit().await.map_err(db)?;
        Ok(record)
    }
}
