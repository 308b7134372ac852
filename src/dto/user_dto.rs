use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_is_limited_to_fifty_characters() {
        let name = |s: String| LoginPayload { display_name: s };
        assert!(name("たろう".into()).validate().is_ok());
        assert!(name("あ".repeat(50)).validate().is_ok());
        assert!(name("あ".repeat(51)).validate().is_err());
        assert!(name(String::new()).validate().is_err());
        assert!(name(" ".into()).validate().is_err());
    }
}
