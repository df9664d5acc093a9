use quiz_core::model::Leaderboard;

use super::SqliteRepository;
use super::mapping::{conn, map_result_row};
use crate::repository::{LeaderboardRepository, StorageError};

#[async_trait::async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn load_leaderboard(&self) -> Result<Leaderboard, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT score, total, percentage, difficulty, recorded_at
            FROM leaderboard_entries
            ORDER BY rank
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let entries = rows
            .iter()
            .map(map_result_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Leaderboard::from_entries(entries))
    }

    async fn save_leaderboard(&self, board: &Leaderboard) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM leaderboard_entries")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (rank, entry) in (0_i64..).zip(board.entries()) {
            sqlx::query(
                r"
                INSERT INTO leaderboard_entries (
                    rank, score, total, percentage, difficulty, recorded_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(rank)
            .bind(i64::from(entry.score()))
            .bind(i64::from(entry.total()))
            .bind(i64::from(entry.percentage()))
            .bind(entry.difficulty().as_str())
            .bind(entry.timestamp())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
