use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::learning_history::LearningHistoryEntry;
use crate::models::user::User;
use crate::services::fallback_session_store::{Backing, Served};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 100;
const STREAK_WINDOW_DAYS: i64 = 30;
const MASTERY_MIN_ATTEMPTS: i64 = 3;
const MASTERY_MIN_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub display_name: String,
    pub member_since: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsOverview {
    pub total_answers: i64,
    pub correct_answers: i64,
    /// Percent, two decimals.
    pub accuracy_rate: f64,
    pub studied_word_count: usize,
    pub mastered_word_count: usize,
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub session_completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyActivity {
    pub last_study_at: Option<DateTime<Utc>>,
    pub today_answers: i64,
    pub study_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WordProgress {
    pub word_id: Uuid,
    pub japanese_meaning: String,
    pub correct_count: i64,
    pub incorrect_count: i64,
}

impl WordProgress {
    pub fn total_attempts(&self) -> i64 {
        self.correct_count + self.incorrect_count
    }

    pub fn is_mastered(&self) -> bool {
        let total = self.total_attempts();
        total >= MASTERY_MIN_ATTEMPTS
            && self.correct_count as f64 / total as f64 >= MASTERY_MIN_RATIO
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordProgressEntry {
    pub word_id: Uuid,
    pub japanese_meaning: String,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub total_attempts: i64,
    pub accuracy_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user: UserSummary,
    pub overview: StatsOverview,
    pub activity: StudyActivity,
    pub word_progress: Vec<WordProgressEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<LearningHistoryEntry>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

#[derive(Debug, FromRow)]
struct AnswerTotals {
    total_answers: i64,
    correct_answers: i64,
    today_answers: i64,
    last_study_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct SessionTotals {
    total_sessions: i64,
    completed_sessions: i64,
}

pub fn percent(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 10000.0).round() / 100.0
}

/// Consecutive study days ending today, or ending yesterday when nothing was
/// answered yet today. `days` may be unordered and contain duplicates.
pub fn study_streak(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = days.to_vec();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let yesterday = today - Duration::days(1);
    let mut expected = match days.first() {
        Some(&d) if d == today || d == yesterday => d,
        _ => return 0,
    };

    let mut streak = 0;
    for day in days {
        if day != expected {
            break;
        }
        streak += 1;
        expected = day - Duration::days(1);
    }
    streak
}

fn word_progress_entries(mut progress: Vec<WordProgress>) -> Vec<WordProgressEntry> {
    progress.sort_by(|a, b| b.total_attempts().cmp(&a.total_attempts()));
    progress
        .into_iter()
        .map(|p| WordProgressEntry {
            total_attempts: p.total_attempts(),
            accuracy_rate: percent(p.correct_count, p.total_attempts()),
            word_id: p.word_id,
            japanese_meaning: p.japanese_meaning,
            correct_count: p.correct_count,
            incorrect_count: p.incorrect_count,
        })
        .collect()
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a learner. When the database cannot be reached an offline
    /// identity is issued instead; it is not persisted anywhere.
    pub async fn login(&self, display_name: &str) -> Result<Served<User>> {
        let display_name = display_name.trim();
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (display_name)
            VALUES ($1)
            RETURNING id, display_name, created_at
            "#,
        )
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::from);

        match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "user logged in");
                Ok(Served {
                    backing: Backing::Database,
                    value: user,
                })
            }
            Err(err) if err.is_infrastructure() => {
                tracing::warn!(error = %err, "database unavailable, issuing offline identity");
                Ok(Served {
                    backing: Backing::Memory,
                    value: User {
                        id: Uuid::new_v4(),
                        display_name: display_name.to_string(),
                        created_at: Utc::now(),
                    },
                })
            }
            Err(err) => Err(err),
        }
    }

    pub async fn get_user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, display_name, created_at FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::UserNotFound(user_id))?;

        let now = Utc::now();
        let today = now.date_naive();
        let today_start = today
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);

        let answers = sqlx::query_as::<_, AnswerTotals>(
            r#"
            SELECT COUNT(*) AS total_answers,
                   COUNT(*) FILTER (WHERE is_correct) AS correct_answers,
                   COUNT(*) FILTER (WHERE answered_at >= $2) AS today_answers,
                   MAX(answered_at) AS last_study_at
            FROM learning_history
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(today_start)
        .fetch_one(&self.pool)
        .await?;

        let sessions = sqlx::query_as::<_, SessionTotals>(
            r#"
            SELECT COUNT(*) AS total_sessions,
                   COUNT(*) FILTER (WHERE is_completed) AS completed_sessions
            FROM sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let progress = sqlx::query_as::<_, WordProgress>(
            r#"
            SELECT h.word_id,
                   w.japanese_meaning,
                   COUNT(*) FILTER (WHERE h.is_correct) AS correct_count,
                   COUNT(*) FILTER (WHERE NOT h.is_correct) AS incorrect_count
            FROM learning_history h
            JOIN words w ON w.id = h.word_id
            WHERE h.user_id = $1
            GROUP BY h.word_id, w.japanese_meaning
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let study_days: Vec<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT (answered_at AT TIME ZONE 'UTC')::date
            FROM learning_history
            WHERE user_id = $1 AND answered_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(now - Duration::days(STREAK_WINDOW_DAYS))
        .fetch_all(&self.pool)
        .await?;

        let mastered = progress.iter().filter(|p| p.is_mastered()).count();
        Ok(UserStats {
            user: UserSummary {
                id: user.id,
                display_name: user.display_name,
                member_since: user.created_at,
            },
            overview: StatsOverview {
                total_answers: answers.total_answers,
                correct_answers: answers.correct_answers,
                accuracy_rate: percent(answers.correct_answers, answers.total_answers),
                studied_word_count: progress.len(),
                mastered_word_count: mastered,
                total_sessions: sessions.total_sessions,
                completed_sessions: sessions.completed_sessions,
                session_completion_rate: percent(
                    sessions.completed_sessions,
                    sessions.total_sessions,
                ),
            },
            activity: StudyActivity {
                last_study_at: answers.last_study_at,
                today_answers: answers.today_answers,
                study_streak: study_streak(&study_days, today),
            },
            word_progress: word_progress_entries(progress),
        })
    }

    pub async fn list_history(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<HistoryPage> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
            return Err(Error::BadRequest(format!(
                "limit must be between 1 and {}, got {}",
                MAX_HISTORY_LIMIT, limit
            )));
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(Error::BadRequest("offset must not be negative".to_string()));
        }

        let total: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM learning_history WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, LearningHistoryEntry>(
            r#"
            SELECT h.id, h.word_id, w.japanese_meaning, h.session_id,
                   h.is_correct, h.user_answer, h.answered_at
            FROM learning_history h
            JOIN words w ON w.id = h.word_id
            WHERE h.user_id = $1
            ORDER BY h.answered_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(HistoryPage {
            items,
            total,
            limit,
            offset,
            has_more: offset + limit < total,
        })
    }
}
