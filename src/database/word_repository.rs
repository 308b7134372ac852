use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{is_unique_violation, Error, Result};
use crate::models::word::{
    AnswerRef, NewWord, SampledWord, Word, WordAnswer, WordChanges, WordFilter, WordWithAnswers,
};

/// Storage seam for the word bank.
///
/// Implementations must keep a word and its answers consistent: every write
/// that touches answers is applied atomically with the owning word.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WordRepository: Send + Sync {
    async fn count_active_words(&self) -> Result<i64>;

    /// Up to `n` distinct active words, drawn uniformly. Callers treat a
    /// short result as an insufficient pool.
    async fn sample_random_words(&self, n: i64) -> Result<Vec<SampledWord>>;

    /// Answers grouped by word, primary first, in insertion order.
    async fn find_answers_for_word_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<AnswerRef>>>;

    async fn find_word_by_id(&self, id: Uuid) -> Result<Option<WordWithAnswers>>;

    async fn find_word_by_exact_meaning(
        &self,
        meaning: &str,
        active_only: bool,
    ) -> Result<Option<Word>>;

    /// Fails with `DuplicateWord` if an active word with the same meaning
    /// appears concurrently.
    async fn insert_word(&self, word: NewWord) -> Result<WordWithAnswers>;

    /// Fails with `WordNotFound` or `WordAlreadyDeleted` when the word is not
    /// an active row at write time.
    async fn update_word(&self, id: Uuid, changes: WordChanges) -> Result<WordWithAnswers>;

    async fn soft_delete_word(&self, id: Uuid) -> Result<Word>;

    async fn search_words(&self, filter: &WordFilter) -> Result<(Vec<WordWithAnswers>, i64)>;
}

#[derive(Clone)]
pub struct PgWordRepository {
    pool: PgPool,
}

impl PgWordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_answers(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<WordAnswer>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, WordAnswer>(
            r#"
            SELECT id, word_id, answer, is_primary, position, created_at
            FROM word_answers
            WHERE word_id = ANY($1)
            ORDER BY word_id, position
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<WordAnswer>> = HashMap::new();
        for row in rows {
            grouped.entry(row.word_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

async fn insert_answers(
    tx: &mut Transaction<'_, Postgres>,
    word_id: Uuid,
    answers: &[String],
) -> Result<Vec<WordAnswer>> {
    let mut rows = Vec::with_capacity(answers.len());
    for (position, answer) in answers.iter().enumerate() {
        let row = sqlx::query_as::<_, WordAnswer>(
            r#"
            INSERT INTO word_answers (word_id, answer, is_primary, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, word_id, answer, is_primary, position, created_at
            "#,
        )
        .bind(word_id)
        .bind(answer)
        .bind(position == 0)
        .bind(position as i32)
        .fetch_one(&mut **tx)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

#[async_trait]
impl WordRepository for PgWordRepository {
    async fn count_active_words(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM words WHERE is_active = TRUE"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn sample_random_words(&self, n: i64) -> Result<Vec<SampledWord>> {
        let words = sqlx::query_as::<_, SampledWord>(
            r#"
            SELECT id, japanese_meaning, synonyms
            FROM words
            WHERE is_active = TRUE
            ORDER BY random()
            LIMIT $1
            "#,
        )
        .bind(n)
        .fetch_all(&self.pool)
        .await?;
        Ok(words)
    }

    async fn find_answers_for_word_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<AnswerRef>>> {
        let grouped = self.load_answers(ids).await?;
        Ok(grouped
            .into_iter()
            .map(|(word_id, rows)| {
                let refs = rows
                    .into_iter()
                    .map(|a| AnswerRef {
                        answer: a.answer,
                        is_primary: a.is_primary,
                    })
                    .collect();
                (word_id, refs)
            })
            .collect())
    }

    async fn find_word_by_id(&self, id: Uuid) -> Result<Option<WordWithAnswers>> {
        let word = sqlx::query_as::<_, Word>(r#"SELECT * FROM words WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(word) = word else {
            return Ok(None);
        };
        let answers = self.load_answers(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(Some(WordWithAnswers { word, answers }))
    }

    async fn find_word_by_exact_meaning(
        &self,
        meaning: &str,
        active_only: bool,
    ) -> Result<Option<Word>> {
        let word = sqlx::query_as::<_, Word>(
            r#"
            SELECT * FROM words
            WHERE japanese_meaning = $1
              AND ($2 = FALSE OR is_active = TRUE)
            ORDER BY is_active DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(meaning)
        .bind(active_only)
        .fetch_optional(&self.pool)
        .await?;
        Ok(word)
    }

    async fn insert_word(&self, new_word: NewWord) -> Result<WordWithAnswers> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Word>(
            r#"
            INSERT INTO words (japanese_meaning, synonyms)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&new_word.japanese_meaning)
        .bind(&new_word.synonyms)
        .fetch_one(&mut *tx)
        .await;

        let word = match inserted {
            Ok(word) => word,
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::DuplicateWord(new_word.japanese_meaning));
            }
            Err(err) => return Err(err.into()),
        };

        let answers = insert_answers(&mut tx, word.id, &new_word.answers).await?;
        tx.commit().await?;

        Ok(WordWithAnswers { word, answers })
    }

    async fn update_word(&self, id: Uuid, changes: WordChanges) -> Result<WordWithAnswers> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Word>(r#"SELECT * FROM words WHERE id = $1 FOR UPDATE"#)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(Error::WordNotFound(id))?;
        if !current.is_active {
            return Err(Error::WordAlreadyDeleted(id));
        }

        let updated = sqlx::query_as::<_, Word>(
            r#"
            UPDATE words
            SET japanese_meaning = COALESCE($2, japanese_meaning),
                synonyms = COALESCE($3, synonyms),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.japanese_meaning.as_deref())
        .bind(changes.synonyms.clone())
        .fetch_one(&mut *tx)
        .await;

        let word = match updated {
            Ok(word) => word,
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::DuplicateWord(
                    changes.japanese_meaning.unwrap_or(current.japanese_meaning),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        let answers = match changes.answers {
            Some(replacement) => {
                sqlx::query(r#"DELETE FROM word_answers WHERE word_id = $1"#)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                insert_answers(&mut tx, id, &replacement).await?
            }
            None => {
                sqlx::query_as::<_, WordAnswer>(
                    r#"
                    SELECT id, word_id, answer, is_primary, position, created_at
                    FROM word_answers
                    WHERE word_id = $1
                    ORDER BY position
                    "#,
                )
                .bind(id)
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(WordWithAnswers { word, answers })
    }

    async fn soft_delete_word(&self, id: Uuid) -> Result<Word> {
        let deleted = sqlx::query_as::<_, Word>(
            r#"
            UPDATE words
            SET is_active = FALSE, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match deleted {
            Some(word) => Ok(word),
            None => {
                let exists: bool =
                    sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM words WHERE id = $1)"#)
                        .bind(id)
                        .fetch_one(&self.pool)
                        .await?;
                if exists {
                    Err(Error::WordAlreadyDeleted(id))
                } else {
                    Err(Error::WordNotFound(id))
                }
            }
        }
    }

    async fn search_words(&self, filter: &WordFilter) -> Result<(Vec<WordWithAnswers>, i64)> {
        let search_param = filter.search.as_ref().map(|s| format!("%{}%", s));
        let active_param = filter.status.as_column_value();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM words
            WHERE ($1::text IS NULL OR japanese_meaning LIKE $1)
              AND ($2::bool IS NULL OR is_active = $2)
            "#,
        )
        .bind(search_param.as_deref())
        .bind(active_param)
        .fetch_one(&self.pool)
        .await?;

        let words = sqlx::query_as::<_, Word>(
            r#"
            SELECT * FROM words
            WHERE ($1::text IS NULL OR japanese_meaning LIKE $1)
              AND ($2::bool IS NULL OR is_active = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(search_param.as_deref())
        .bind(active_param)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = words.iter().map(|w| w.id).collect();
        let mut answers = self.load_answers(&ids).await?;
        let items = words
            .into_iter()
            .map(|word| {
                let answers = answers.remove(&word.id).unwrap_or_default();
                WordWithAnswers { word, answers }
            })
            .collect();

        Ok((items, total))
    }
}
