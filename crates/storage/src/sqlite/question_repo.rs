use quiz_core::model::{DifficultyFilter, Question};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_question_row, ser};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let options = serde_json::to_string(question.options()).map_err(ser)?;
        let correct = i64::try_from(question.correct_answer_index()).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO questions (id, text, options, correct_index, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                text = excluded.text,
                options = excluded.options,
                correct_index = excluded.correct_index,
                difficulty = excluded.difficulty
            ",
        )
        .bind(id_i64("question_id", question.id().value())?)
        .bind(question.text())
        .bind(options)
        .bind(correct)
        .bind(question.difficulty().as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn load_questions(
        &self,
        filter: DifficultyFilter,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = match filter {
            DifficultyFilter::All => {
                sqlx::query(
                    r"
                    SELECT id, text, options, correct_index, difficulty
                    FROM questions
                    ORDER BY seq
                    ",
                )
                .fetch_all(&self.pool)
                .await
            }
            tier => {
                sqlx::query(
                    r"
                    SELECT id, text, options, correct_index, difficulty
                    FROM questions
                    WHERE difficulty = ?1
                    ORDER BY seq
                    ",
                )
                .bind(tier.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn count_questions(&self, filter: DifficultyFilter) -> Result<usize, StorageError> {
        let row = match filter {
            DifficultyFilter::All => {
                sqlx::query("SELECT COUNT(*) AS n FROM questions")
                    .fetch_one(&self.pool)
                    .await
            }
            tier => {
                sqlx::query("SELECT COUNT(*) AS n FROM questions WHERE difficulty = ?1")
                    .bind(tier.as_str())
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(conn)?;

        let n: i64 = row.try_get("n").map_err(ser)?;
        usize::try_from(n).map_err(ser)
    }
}
