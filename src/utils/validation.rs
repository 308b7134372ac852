use std::borrow::Cow;

use validator::ValidationError;

pub const MAX_MEANING_LEN: usize = 500;
pub const MAX_ANSWERS: usize = 10;
pub const MAX_ANSWER_LEN: usize = 255;
pub const MAX_SYNONYMS: usize = 20;
pub const MAX_SYNONYM_LEN: usize = 100;
pub const MAX_BATCH_WORDS: usize = 100;

fn item_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

/// Answers must be non-blank and at most `MAX_ANSWER_LEN` characters each.
pub fn validate_answer_items(answers: &Vec<String>) -> Result<(), ValidationError> {
    for answer in answers {
        if answer.trim().is_empty() {
            return Err(item_error("answer_blank", "answers must not be blank".to_string()));
        }
        if answer.chars().count() > MAX_ANSWER_LEN {
            return Err(item_error(
                "answer_length",
                format!("each answer must be at most {} characters", MAX_ANSWER_LEN),
            ));
        }
    }
    Ok(())
}

pub fn validate_synonym_items(synonyms: &Vec<String>) -> Result<(), ValidationError> {
    for synonym in synonyms {
        if synonym.chars().count() > MAX_SYNONYM_LEN {
            return Err(item_error(
                "synonym_length",
                format!("each synonym must be at most {} characters", MAX_SYNONYM_LEN),
            ));
        }
    }
    Ok(())
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(item_error("blank", "must not be blank".to_string()));
    }
    Ok(())
}

/// Trims every entry and drops the ones left empty.
pub fn clean_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
