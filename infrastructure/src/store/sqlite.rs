//! SQLite-backed question store.
//!
//! A single connection behind an async mutex; rusqlite work runs on the
//! blocking pool. Embeddings are stored as JSON float arrays and the
//! nearest-neighbour lookup is an in-process cosine scan — at one
//! accepted question per day the table stays small enough that an index
//! structure would buy nothing.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use triviad_application::ports::store::{QuestionStore, StoreError};
use triviad_domain::{NewAnswer, NewQuestion, Question};

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and initialize the schema.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
            }
        }
        info!(path = %path.display(), "opening question database");

        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, rusqlite::Error> {
            let conn = Connection::open(&path)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            init_schema(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(join_error)?
        .map_err(backend_error)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, primarily for tests.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = tokio::task::spawn_blocking(|| -> Result<Connection, rusqlite::Error> {
            let conn = Connection::open_in_memory()?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            init_schema(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(join_error)?
        .map_err(backend_error)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn call<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            f(&mut conn)
        })
        .await
        .map_err(join_error)?
        .map_err(backend_error)
    }
}

fn backend_error(err: rusqlite::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn join_error(err: tokio::task::JoinError) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn json_column_error(err: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS questions (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            text        TEXT NOT NULL,
            topic       TEXT NOT NULL,
            fingerprint TEXT NOT NULL UNIQUE,
            signature   TEXT,
            embedding   TEXT NOT NULL,
            choices     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_questions_signature
            ON questions(signature) WHERE signature IS NOT NULL;
        CREATE TABLE IF NOT EXISTS question_choices (
            question_id TEXT NOT NULL REFERENCES questions(id),
            choice_norm TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_question_choices_norm
            ON question_choices(choice_norm);
        CREATE TABLE IF NOT EXISTS answers (
            id          TEXT PRIMARY KEY,
            question_id TEXT NOT NULL REFERENCES questions(id),
            text        TEXT NOT NULL,
            score       INTEGER NOT NULL,
            feedback    TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );",
    )
}

const QUESTION_COLUMNS: &str = "id, title, text, topic, created_at, choices, signature";

fn question_from_row(row: &rusqlite::Row<'_>) -> Result<Question, rusqlite::Error> {
    let choices_json: String = row.get(5)?;
    let choices = serde_json::from_str(&choices_json).map_err(json_column_error)?;
    Ok(Question {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        topic: row.get(3)?,
        created_at: row.get(4)?,
        choices,
        choice_signature: row.get(6)?,
    })
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl QuestionStore for SqliteStore {
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<bool, StoreError> {
        let fingerprint = fingerprint.to_string();
        self.call(move |conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM questions WHERE fingerprint = ?1",
                    params![fingerprint],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn find_by_signature(&self, signature: &str) -> Result<bool, StoreError> {
        let signature = signature.to_string();
        self.call(move |conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM questions WHERE signature = ?1",
                    params![signature],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn has_choice_overlap(&self, normalized: &[String]) -> Result<bool, StoreError> {
        if normalized.is_empty() {
            return Ok(false);
        }
        let normalized = normalized.to_vec();
        self.call(move |conn| {
            let placeholders = vec!["?"; normalized.len()].join(", ");
            let sql = format!(
                "SELECT 1 FROM question_choices WHERE choice_norm IN ({placeholders}) LIMIT 1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let found = stmt
                .query_row(params_from_iter(normalized.iter()), |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn nearest_similarity(&self, embedding: &[f32]) -> Result<f64, StoreError> {
        let target = embedding.to_vec();
        self.call(move |conn| {
            let mut stmt = conn.prepare("SELECT embedding FROM questions")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut max_similarity: Option<f64> = None;
            for raw in rows {
                let raw = raw?;
                let stored: Vec<f32> =
                    serde_json::from_str(&raw).map_err(json_column_error)?;
                let similarity = cosine_similarity(&target, &stored);
                max_similarity = Some(max_similarity.map_or(similarity, |m| m.max(similarity)));
            }
            Ok(max_similarity.unwrap_or(0.0))
        })
        .await
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<Question, StoreError> {
        self.call(move |conn| {
            let id = Uuid::new_v4().to_string();
            let created_at = Utc::now();
            let choices_json =
                serde_json::to_string(&question.choices).map_err(json_column_error)?;
            let embedding_json =
                serde_json::to_string(&question.embedding).map_err(json_column_error)?;

            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO questions
                     (id, title, text, topic, fingerprint, signature, embedding, choices, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    question.title,
                    question.text,
                    question.topic,
                    question.fingerprint,
                    question.signature,
                    embedding_json,
                    choices_json,
                    created_at,
                ],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO question_choices (question_id, choice_norm) VALUES (?1, ?2)",
                )?;
                for choice_norm in &question.normalized_choices {
                    stmt.execute(params![id, choice_norm])?;
                }
            }
            tx.commit()?;

            Ok(Question {
                id,
                title: question.title,
                text: question.text,
                topic: question.topic,
                created_at,
                choices: question.choices,
                choice_signature: question.signature,
            })
        })
        .await
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<(), StoreError> {
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO answers (id, question_id, text, score, feedback, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    Uuid::new_v4().to_string(),
                    answer.question_id,
                    answer.text,
                    answer.score,
                    answer.feedback,
                    Utc::now(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn latest_question(&self) -> Result<Question, StoreError> {
        let question = self
            .call(|conn| {
                conn.query_row(
                    &format!(
                        "SELECT {QUESTION_COLUMNS} FROM questions
                         ORDER BY created_at DESC, rowid DESC LIMIT 1"
                    ),
                    [],
                    question_from_row,
                )
                .optional()
            })
            .await?;
        question.ok_or(StoreError::NotFound)
    }

    async fn question_by_id(&self, id: &str) -> Result<Question, StoreError> {
        let id = id.to_string();
        let question = self
            .call(move |conn| {
                conn.query_row(
                    &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
                    params![id],
                    question_from_row,
                )
                .optional()
            })
            .await?;
        question.ok_or(StoreError::NotFound)
    }
}
