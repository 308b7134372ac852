use std::sync::Arc;

use crate::database::WordRepository;
use crate::error::{Error, Result};
use crate::models::word::NewWord;

pub const DUPLICATE_MEANING_MESSAGE: &str = "this meaning is already registered";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItemError {
    pub index: usize,
    pub japanese_meaning: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub created: usize,
    pub failed: usize,
    pub errors: Vec<BatchItemError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    AllCreated,
    Partial,
    AllFailed,
}

impl BatchReport {
    pub fn outcome(&self) -> BatchOutcome {
        if self.failed == 0 {
            BatchOutcome::AllCreated
        } else if self.created == 0 {
            BatchOutcome::AllFailed
        } else {
            BatchOutcome::Partial
        }
    }

    fn record_duplicate(&mut self, index: usize, japanese_meaning: String) {
        self.failed += 1;
        self.errors.push(BatchItemError {
            index,
            japanese_meaning,
            error: DUPLICATE_MEANING_MESSAGE.to_string(),
        });
    }
}

/// Writes candidate words one by one. A duplicate meaning only fails its own
/// record; any other error aborts the batch and is returned to the caller.
#[derive(Clone)]
pub struct WordBatchWriter {
    words: Arc<dyn WordRepository>,
}

impl WordBatchWriter {
    pub fn new(words: Arc<dyn WordRepository>) -> Self {
        Self { words }
    }

    pub async fn write(&self, candidates: Vec<NewWord>) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for (index, candidate) in candidates.into_iter().enumerate() {
            let meaning = candidate.japanese_meaning.clone();

            let existing = self.words.find_word_by_exact_meaning(&meaning, true).await?;
            if existing.is_some() {
                report.record_duplicate(index, meaning);
                continue;
            }

            match self.words.insert_word(candidate).await {
                Ok(_) => report.created += 1,
                Err(Error::DuplicateWord(_)) => report.record_duplicate(index, meaning),
                Err(err) => {
                    tracing::error!(
                        index,
                        created = report.created,
                        error = %err,
                        "batch write aborted"
                    );
                    return Err(err);
                }
            }
        }

        tracing::info!(
            created = report.created,
            failed = report.failed,
            "batch write finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::word_repository::MockWordRepository;
    use crate::database::InMemoryWordRepository;

    fn candidate(meaning: &str, answer: &str) -> NewWord {
        NewWord {
            japanese_meaning: meaning.into(),
            answers: vec![answer.into()],
            synonyms: vec![],
        }
    }

    #[tokio::test]
    async fn duplicate_fails_only_its_own_record() {
        let repo = Arc::new(InMemoryWordRepository::new());
        repo.insert_word(candidate("走る", "run")).await.unwrap();
        let writer = WordBatchWriter::new(repo.clone());

        let report = writer
            .write(vec![candidate("猫", "cat"), candidate("走る", "jog")])
            .await
            .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.outcome(), BatchOutcome::Partial);
        assert_eq!(
            report.errors,
            vec![BatchItemError {
                index: 1,
                japanese_meaning: "走る".into(),
                error: DUPLICATE_MEANING_MESSAGE.into(),
            }]
        );
        assert_eq!(repo.count_active_words().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn all_duplicates_create_nothing() {
        let repo = Arc::new(InMemoryWordRepository::new());
        repo.insert_word(candidate("走る", "run")).await.unwrap();
        repo.insert_word(candidate("猫", "cat")).await.unwrap();
        let writer = WordBatchWriter::new(repo);

        let report = writer
            .write(vec![candidate("走る", "jog"), candidate("猫", "kitty")])
            .await
            .unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.failed, 2);
        assert_eq!(report.outcome(), BatchOutcome::AllFailed);
    }

    #[tokio::test]
    async fn repeated_meaning_within_one_batch_is_a_duplicate() {
        let writer = WordBatchWriter::new(Arc::new(InMemoryWordRepository::new()));
        let report = writer
            .write(vec![candidate("走る", "run"), candidate("走る", "jog")])
            .await
            .unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.errors[0].index, 1);
    }

    #[tokio::test]
    async fn insert_race_is_reported_as_duplicate() {
        let mut repo = MockWordRepository::new();
        repo.expect_find_word_by_exact_meaning()
            .returning(|_, _| Ok(None));
        repo.expect_insert_word()
            .returning(|w| Err(Error::DuplicateWord(w.japanese_meaning)));

        let report = WordBatchWriter::new(Arc::new(repo))
            .write(vec![candidate("走る", "run")])
            .await
            .unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].error, DUPLICATE_MEANING_MESSAGE);
    }

    #[tokio::test]
    async fn infrastructure_failure_is_not_a_report() {
        let mut repo = MockWordRepository::new();
        repo.expect_find_word_by_exact_meaning()
            .returning(|_, _| Ok(None));
        let mut inserted = 0;
        repo.expect_insert_word().returning(move |w| {
            inserted += 1;
            if inserted == 1 {
                Ok(crate::models::word::WordWithAnswers {
                    word: crate::models::word::Word {
                        id: uuid::Uuid::new_v4(),
                        japanese_meaning: w.japanese_meaning,
                        synonyms: w.synonyms,
                        is_active: true,
                        deleted_at: None,
                        created_at: chrono::Utc::now(),
                        updated_at: chrono::Utc::now(),
                    },
                    answers: vec![],
                })
            } else {
                Err(Error::from(sqlx::Error::PoolTimedOut))
            }
        });

        let err = WordBatchWriter::new(Arc::new(repo))
            .write(vec![candidate("走る", "run"), candidate("猫", "cat")])
            .await
            .unwrap_err();
        assert!(err.is_infrastructure());
    }

    #[test]
    fn empty_report_counts_as_all_created() {
        assert_eq!(BatchReport::default().outcome(), BatchOutcome::AllCreated);
    }
}
