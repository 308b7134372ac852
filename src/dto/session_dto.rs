use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::fallback_session_store::{Backing, Served};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionPayload {
    pub user_id: Uuid,
    #[validate(range(min = 1, max = 50))]
    pub total_questions: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerPayload {
    pub word_id: Uuid,
    /// Whitespace-only answers are accepted and graded as incorrect.
    #[validate(length(min = 1, max = 255))]
    pub user_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckAnswerPayload {
    #[validate(length(min = 1, max = 255))]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RandomWordsQuery {
    pub count: Option<i32>,
}

/// Any payload plus the store that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServedResponse<T> {
    #[serde(flatten)]
    pub data: T,
    pub source: Backing,
}

impl<T> From<Served<T>> for ServedResponse<T> {
    fn from(served: Served<T>) -> Self {
        Self {
            data: served.value,
            source: served.backing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session_store::SessionStats;

    #[test]
    fn served_response_flattens_payload_and_names_source() {
        let id = Uuid::new_v4();
        let response = ServedResponse::from(Served {
            backing: Backing::Memory,
            value: SessionStats {
                session_id: id,
                total_questions: 3,
                completed_questions: 1,
                correct_answers: 1,
                incorrect_answers: 0,
                accuracy: 1.0,
                is_completed: false,
            },
        });
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["source"], "memory");
        assert_eq!(json["total_questions"], 3);
        assert_eq!(json["session_id"], id.to_string());
    }

    #[test]
    fn question_count_must_be_in_range_when_given() {
        let user_id = Uuid::new_v4();
        let payload = |n| CreateSessionPayload {
            user_id,
            total_questions: n,
        };
        assert!(payload(None).validate().is_ok());
        assert!(payload(Some(1)).validate().is_ok());
        assert!(payload(Some(50)).validate().is_ok());
        assert!(payload(Some(0)).validate().is_err());
        assert!(payload(Some(51)).validate().is_err());
    }

    #[test]
    fn whitespace_answer_reaches_the_grader() {
        let answer = |text: &str| SubmitAnswerPayload {
            word_id: Uuid::new_v4(),
            user_answer: text.into(),
        };
        assert!(answer("   ").validate().is_ok());
        assert!(answer("").validate().is_err());
        assert!(answer(&"a".repeat(256)).validate().is_err());
    }
}
