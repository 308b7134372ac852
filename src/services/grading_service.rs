/// Exact-match grading of free-text answers.
///
/// Only surrounding whitespace and ASCII case are ignored. Synonyms are hints
/// for the learner and never count as a correct answer.
pub struct GradingService;

impl GradingService {
    pub fn normalize(answer: &str) -> String {
        answer.trim().to_ascii_lowercase()
    }

    pub fn is_correct<S: AsRef<str>>(accepted_answers: &[S], user_answer: &str) -> bool {
        let submitted = Self::normalize(user_answer);
        if submitted.is_empty() {
            return false;
        }
        accepted_answers
            .iter()
            .any(|accepted| Self::normalize(accepted.as_ref()) == submitted)
    }
}
