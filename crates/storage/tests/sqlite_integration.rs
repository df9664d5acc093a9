use quiz_core::model::{
    Difficulty, DifficultyFilter, Leaderboard, Question, QuestionId, ResultRecord,
};
use quiz_core::time::fixed_now;
use storage::json::sample_questions;
use storage::repository::{LeaderboardRepository, QuestionRepository, Storage};
use storage::sqlite::SqliteRepository;

fn build_question(id: u64, difficulty: Difficulty) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}?"),
        vec!["a".into(), "b".into(), "c".into()],
        2,
        difficulty,
    )
    .unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_questions_keep_bank_order_and_filter() {
    let repo = connect("memdb_questions").await;

    repo.upsert_question(&build_question(5, Difficulty::Hard)).await.unwrap();
    repo.upsert_question(&build_question(2, Difficulty::Easy)).await.unwrap();
    repo.upsert_question(&build_question(9, Difficulty::Hard)).await.unwrap();

    let all = repo.load_questions(DifficultyFilter::All).await.unwrap();
    let ids: Vec<u64> = all.iter().map(|q| q.id().value()).collect();
    assert_eq!(ids, vec![5, 2, 9]);
    assert_eq!(all[0].options().len(), 3);
    assert_eq!(all[0].correct_answer_index(), 2);

    let hard = repo.load_questions(DifficultyFilter::Hard).await.unwrap();
    let ids: Vec<u64> = hard.iter().map(|q| q.id().value()).collect();
    assert_eq!(ids, vec![5, 9]);

    assert!(repo.load_questions(DifficultyFilter::Medium).await.unwrap().is_empty());
    assert_eq!(repo.count_questions(DifficultyFilter::Hard).await.unwrap(), 2);
}

#[tokio::test]
async fn sqlite_upsert_replaces_without_reordering() {
    let repo = connect("memdb_upsert").await;

    repo.upsert_question(&build_question(1, Difficulty::Easy)).await.unwrap();
    repo.upsert_question(&build_question(2, Difficulty::Easy)).await.unwrap();
    repo.upsert_question(&build_question(1, Difficulty::Medium)).await.unwrap();

    let all = repo.load_questions(DifficultyFilter::All).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id(), QuestionId::new(1));
    assert_eq!(all[0].difficulty(), Difficulty::Medium);
}

#[tokio::test]
async fn sqlite_leaderboard_persists_ranked_entries() {
    let repo = connect("memdb_leaderboard").await;
    assert!(repo.load_leaderboard().await.unwrap().is_empty());

    let board = [(3, 4, 75), (4, 4, 100), (1, 4, 25)]
        .into_iter()
        .fold(Leaderboard::new(), |board, (score, total, pct)| {
            board.record(
                ResultRecord::from_persisted(score, total, pct, DifficultyFilter::All, fixed_now())
                    .unwrap(),
            )
        });
    repo.save_leaderboard(&board).await.unwrap();

    let loaded = repo.load_leaderboard().await.unwrap();
    assert_eq!(loaded, board);
    let percentages: Vec<u8> = loaded.entries().iter().map(ResultRecord::percentage).collect();
    assert_eq!(percentages, vec![100, 75, 25]);

    // A shorter board replaces the longer one entirely.
    repo.save_leaderboard(&Leaderboard::new()).await.unwrap();
    assert!(repo.load_leaderboard().await.unwrap().is_empty());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    repo.upsert_question(&build_question(1, Difficulty::Easy)).await.unwrap();
    assert_eq!(repo.count_questions(DifficultyFilter::All).await.unwrap(), 1);
}

#[tokio::test]
async fn storage_sqlite_serves_sample_bank() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let sample = sample_questions().unwrap();
    for q in &sample {
        storage.questions.upsert_question(q).await.unwrap();
    }

    let loaded = storage.questions.load_questions(DifficultyFilter::All).await.unwrap();
    assert_eq!(loaded, sample);
}
