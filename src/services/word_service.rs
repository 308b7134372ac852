use std::sync::Arc;

use uuid::Uuid;

use crate::database::WordRepository;
use crate::error::{Error, Result};
use crate::models::word::{ActiveFilter, NewWord, Word, WordChanges, WordFilter, WordWithAnswers};

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct WordPage {
    pub items: Vec<WordWithAnswers>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Administrative management of the word bank.
#[derive(Clone)]
pub struct WordService {
    words: Arc<dyn WordRepository>,
}

impl WordService {
    pub fn new(words: Arc<dyn WordRepository>) -> Self {
        Self { words }
    }

    pub async fn create(&self, new_word: NewWord) -> Result<WordWithAnswers> {
        if self
            .words
            .find_word_by_exact_meaning(&new_word.japanese_meaning, true)
            .await?
            .is_some()
        {
            return Err(Error::DuplicateWord(new_word.japanese_meaning));
        }
        let word = self.words.insert_word(new_word).await?;
        tracing::info!(word_id = %word.word.id, "word created");
        Ok(word)
    }

    pub async fn get(&self, id: Uuid) -> Result<WordWithAnswers> {
        self.words
            .find_word_by_id(id)
            .await?
            .ok_or(Error::WordNotFound(id))
    }

    pub async fn update(&self, id: Uuid, changes: WordChanges) -> Result<WordWithAnswers> {
        let current = self.get(id).await?;
        if !current.word.is_active {
            return Err(Error::WordAlreadyDeleted(id));
        }

        if let Some(meaning) = &changes.japanese_meaning {
            if let Some(other) = self.words.find_word_by_exact_meaning(meaning, true).await? {
                if other.id != id {
                    return Err(Error::DuplicateWord(meaning.clone()));
                }
            }
        }

        let word = self.words.update_word(id, changes).await?;
        tracing::info!(word_id = %id, "word updated");
        Ok(word)
    }

    pub async fn delete(&self, id: Uuid) -> Result<Word> {
        let word = self.words.soft_delete_word(id).await?;
        tracing::info!(word_id = %id, "word deactivated");
        Ok(word)
    }

    pub async fn search(
        &self,
        search: Option<String>,
        status: Option<ActiveFilter>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<WordPage> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let filter = WordFilter {
            search,
            status: status.unwrap_or_default(),
            limit,
            offset,
        };
        let (items, total) = self.words.search_words(&filter).await?;
        Ok(WordPage {
            items,
            total,
            limit,
            offset,
        })
    }
}
