use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of a word taken when a session is created. Later edits to the
/// word do not reach sessions that are already in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub japanese_meaning: String,
    pub answers: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}
