use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::database::word_repository::WordRepository;
use crate::error::{Error, Result};
use crate::models::word::{
    AnswerRef, NewWord, SampledWord, Word, WordAnswer, WordChanges, WordFilter, WordWithAnswers,
};

/// (meaning, answers, synonyms)
const SAMPLE_VOCABULARY: &[(&str, &[&str], &[&str])] = &[
    ("走る", &["run", "jog"], &["駆ける", "疾走する"]),
    ("美しい", &["beautiful", "pretty", "gorgeous"], &["きれい", "素敵", "魅力的"]),
    ("大きい", &["big", "large", "huge"], &["巨大", "でかい"]),
    ("小さい", &["small", "little", "tiny"], &["ちっちゃい", "細かい"]),
    ("食べる", &["eat", "consume"], &["摂取する", "口にする"]),
    ("飲む", &["drink", "sip"], &["飲用する", "一口飲む"]),
    ("本", &["book"], &["書籍", "図書"]),
    ("猫", &["cat"], &["ねこ", "ネコ"]),
    ("犬", &["dog"], &["いぬ", "イヌ"]),
    ("車", &["car", "automobile"], &["自動車", "クルマ"]),
    ("家", &["house", "home"], &["住宅", "我が家"]),
    ("学校", &["school"], &["学園", "スクール"]),
    ("友達", &["friend", "buddy"], &["仲間", "親友"]),
    ("水", &["water"], &["お水", "H2O"]),
    ("火", &["fire", "flame"], &["炎", "燃える"]),
    ("空", &["sky", "heaven"], &["大空", "青空"]),
    ("海", &["sea", "ocean"], &["大海", "海洋"]),
    ("山", &["mountain", "hill"], &["やま", "山岳"]),
    ("川", &["river", "stream"], &["河川", "小川"]),
    ("花", &["flower", "blossom"], &["お花", "華"]),
];

/// Process-local word bank. Backs the offline session store and the unit
/// tests; its contents are lost on restart.
#[derive(Default)]
pub struct InMemoryWordRepository {
    // insertion order, oldest first
    words: RwLock<Vec<WordWithAnswers>>,
}

impl InMemoryWordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank pre-filled with the built-in practice vocabulary. Word ids are
    /// stable across restarts (`Uuid::from_u128(1..=20)`).
    pub fn with_sample_vocabulary() -> Self {
        let repo = Self::new();
        {
            let mut words = repo.words.write();
            for (index, (meaning, answers, synonyms)) in SAMPLE_VOCABULARY.iter().enumerate() {
                let id = Uuid::from_u128(index as u128 + 1);
                words.push(build_word(
                    id,
                    NewWord {
                        japanese_meaning: meaning.to_string(),
                        answers: answers.iter().map(|a| a.to_string()).collect(),
                        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
                    },
                ));
            }
        }
        repo
    }
}

fn build_answers(word_id: Uuid, answers: &[String]) -> Vec<WordAnswer> {
    let now = Utc::now();
    answers
        .iter()
        .enumerate()
        .map(|(position, answer)| WordAnswer {
            id: Uuid::new_v4(),
            word_id,
            answer: answer.clone(),
            is_primary: position == 0,
            position: position as i32,
            created_at: now,
        })
        .collect()
}

fn build_word(id: Uuid, new_word: NewWord) -> WordWithAnswers {
    let now = Utc::now();
    WordWithAnswers {
        answers: build_answers(id, &new_word.answers),
        word: Word {
            id,
            japanese_meaning: new_word.japanese_meaning,
            synonyms: new_word.synonyms,
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        },
    }
}

fn meaning_taken(words: &[WordWithAnswers], meaning: &str, except: Option<Uuid>) -> bool {
    words.iter().any(|w| {
        w.word.is_active && w.word.japanese_meaning == meaning && Some(w.word.id) != except
    })
}

#[async_trait]
impl WordRepository for InMemoryWordRepository {
    async fn count_active_words(&self) -> Result<i64> {
        Ok(self.words.read().iter().filter(|w| w.word.is_active).count() as i64)
    }

    async fn sample_random_words(&self, n: i64) -> Result<Vec<SampledWord>> {
        let words = self.words.read();
        let active: Vec<&WordWithAnswers> = words.iter().filter(|w| w.word.is_active).collect();
        let amount = usize::try_from(n.max(0)).unwrap_or(0);
        let mut rng = rand::thread_rng();
        Ok(active
            .choose_multiple(&mut rng, amount)
            .map(|w| SampledWord {
                id: w.word.id,
                japanese_meaning: w.word.japanese_meaning.clone(),
                synonyms: w.word.synonyms.clone(),
            })
            .collect())
    }

    async fn find_answers_for_word_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<AnswerRef>>> {
        let words = self.words.read();
        Ok(words
            .iter()
            .filter(|w| ids.contains(&w.word.id))
            .map(|w| {
                let refs = w
                    .answers
                    .iter()
                    .map(|a| AnswerRef {
                        answer: a.answer.clone(),
                        is_primary: a.is_primary,
                    })
                    .collect();
                (w.word.id, refs)
            })
            .collect())
    }

    async fn find_word_by_id(&self, id: Uuid) -> Result<Option<WordWithAnswers>> {
        Ok(self.words.read().iter().find(|w| w.word.id == id).cloned())
    }

    async fn find_word_by_exact_meaning(
        &self,
        meaning: &str,
        active_only: bool,
    ) -> Result<Option<Word>> {
        let words = self.words.read();
        let found = words
            .iter()
            .rev()
            .filter(|w| w.word.japanese_meaning == meaning)
            .filter(|w| !active_only || w.word.is_active)
            .max_by_key(|w| w.word.is_active)
            .map(|w| w.word.clone());
        Ok(found)
    }

    async fn insert_word(&self, new_word: NewWord) -> Result<WordWithAnswers> {
        let mut words = self.words.write();
        if meaning_taken(&words, &new_word.japanese_meaning, None) {
            return Err(Error::DuplicateWord(new_word.japanese_meaning));
        }
        let word = build_word(Uuid::new_v4(), new_word);
        words.push(word.clone());
        Ok(word)
    }

    async fn update_word(&self, id: Uuid, changes: WordChanges) -> Result<WordWithAnswers> {
        let mut words = self.words.write();
        let index = words
            .iter()
            .position(|w| w.word.id == id)
            .ok_or(Error::WordNotFound(id))?;
        if !words[index].word.is_active {
            return Err(Error::WordAlreadyDeleted(id));
        }
        if let Some(meaning) = &changes.japanese_meaning {
            if meaning_taken(&words, meaning, Some(id)) {
                return Err(Error::DuplicateWord(meaning.clone()));
            }
        }

        let entry = &mut words[index];
        if let Some(meaning) = changes.japanese_meaning {
            entry.word.japanese_meaning = meaning;
        }
        if let Some(synonyms) = changes.synonyms {
            entry.word.synonyms = synonyms;
        }
        if let Some(answers) = changes.answers {
            entry.answers = build_answers(id, &answers);
        }
        entry.word.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn soft_delete_word(&self, id: Uuid) -> Result<Word> {
        let mut words = self.words.write();
        let entry = words
            .iter_mut()
            .find(|w| w.word.id == id)
            .ok_or(Error::WordNotFound(id))?;
        if !entry.word.is_active {
            return Err(Error::WordAlreadyDeleted(id));
        }
        let now = Utc::now();
        entry.word.is_active = false;
        entry.word.deleted_at = Some(now);
        entry.word.updated_at = now;
        Ok(entry.word.clone())
    }

    async fn search_words(&self, filter: &WordFilter) -> Result<(Vec<WordWithAnswers>, i64)> {
        let words = self.words.read();
        let matching: Vec<&WordWithAnswers> = words
            .iter()
            .rev()
            .filter(|w| filter.status.matches(w.word.is_active))
            .filter(|w| match &filter.search {
                Some(term) => w.word.japanese_meaning.contains(term.as_str()),
                None => true,
            })
            .collect();

        let total = matching.len() as i64;
        let offset = usize::try_from(filter.offset.max(0)).unwrap_or(0);
        let limit = usize::try_from(filter.limit.max(0)).unwrap_or(0);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sample_vocabulary_is_seeded_with_stable_ids() {
        let repo = InMemoryWordRepository::with_sample_vocabulary();
        assert_eq!(repo.count_active_words().await.unwrap(), 20);

        let run = repo
            .find_word_by_id(Uuid::from_u128(1))
            .await
            .unwrap()
            .expect("seeded word");
        assert_eq!(run.word.japanese_meaning, "走る");
        assert_eq!(run.answer_texts(), vec!["run", "jog"]);
        assert!(run.answers[0].is_primary);
        assert!(!run.answers[1].is_primary);
    }

    #[tokio::test]
    async fn samples_are_distinct_and_skip_inactive_words() {
        let repo = InMemoryWordRepository::with_sample_vocabulary();
        repo.soft_delete_word(Uuid::from_u128(1)).await.unwrap();

        let sample = repo.sample_random_words(19).await.unwrap();
        assert_eq!(sample.len(), 19);
        let mut ids: Vec<Uuid> = sample.iter().map(|w| w.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 19);
        assert!(!ids.contains(&Uuid::from_u128(1)));

        // asking for more than exists yields a short sample, not an error
        assert_eq!(repo.sample_random_words(50).await.unwrap().len(), 19);
    }

    #[tokio::test]
    async fn deleted_meaning_can_be_registered_again() {
        let repo = InMemoryWordRepository::new();
        let first = repo
            .insert_word(NewWord {
                japanese_meaning: "走る".into(),
                answers: vec!["run".into()],
                synonyms: vec![],
            })
            .await
            .unwrap();
        repo.soft_delete_word(first.word.id).await.unwrap();

        let second = repo
            .insert_word(NewWord {
                japanese_meaning: "走る".into(),
                answers: vec!["jog".into()],
                synonyms: vec![],
            })
            .await
            .unwrap();

        let active = repo.find_word_by_exact_meaning("走る", true).await.unwrap().unwrap();
        assert_eq!(active.id, second.word.id);
        let any = repo.find_word_by_exact_meaning("走る", false).await.unwrap().unwrap();
        assert_eq!(any.id, second.word.id);
    }
}
