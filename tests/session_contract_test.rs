use std::sync::Arc;

use uuid::Uuid;
use vocab_practice_backend::{
    database::{InMemoryWordRepository, WordRepository},
    error::Error,
    models::word::WordChanges,
    services::{memory_session_store::InMemorySessionStore, session_store::SessionStore},
};

fn store() -> Arc<InMemorySessionStore> {
    Arc::new(InMemorySessionStore::new(Arc::new(
        InMemoryWordRepository::with_sample_vocabulary(),
    )))
}

#[tokio::test]
async fn concurrent_submissions_grade_a_question_once() {
    let store = store();
    let created = store.create(Uuid::new_v4(), 5).await.expect("create");
    let word_id = created.questions[0].id;
    let answer = created.questions[0].answers[0].clone();
    let session_id = created.session_id;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        let answer = answer.clone();
        handles.push(tokio::spawn(async move {
            store.submit_answer(session_id, word_id, &answer).await
        }));
    }

    let mut accepted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.expect("task") {
            Ok(_) => accepted += 1,
            Err(Error::DuplicateAnswer { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 15);

    let stats = store.get_stats(created.session_id).await.expect("stats");
    assert_eq!(stats.completed_questions, 1);
}

#[tokio::test]
async fn concurrent_last_answers_complete_the_session_once() {
    let store = store();
    let created = store.create(Uuid::new_v4(), 10).await.expect("create");
    let session_id = created.session_id;

    let mut handles = Vec::new();
    for question in created.questions.clone() {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .submit_answer(session_id, question.id, "definitely wrong")
                .await
        }));
    }

    let mut completions = 0;
    for handle in handles {
        let outcome = handle.await.expect("task").expect("submit");
        assert!(outcome.completed_questions <= outcome.total_questions);
        if outcome.is_completed {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);

    let detail = store.get_session(created.session_id).await.expect("detail");
    assert!(detail.is_completed);
    assert_eq!(detail.completed_questions, 10);
    assert!(detail.completed_at.is_some());

    let stats = store.get_stats(created.session_id).await.expect("stats");
    assert_eq!(stats.incorrect_answers, 10);
    assert_eq!(stats.accuracy, 0.0);
}

#[tokio::test]
async fn snapshot_is_independent_of_later_word_edits() {
    let words = Arc::new(InMemoryWordRepository::with_sample_vocabulary());
    let store = InMemorySessionStore::new(words.clone());
    let created = store.create(Uuid::new_v4(), 20).await.expect("create");
    let run = Uuid::from_u128(1);

    words
        .update_word(
            run,
            WordChanges {
                answers: Some(vec!["sprint".into()]),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    let outcome = store
        .submit_answer(created.session_id, run, "jog")
        .await
        .expect("submit");
    assert!(outcome.is_correct);
    assert_eq!(outcome.correct_answers, vec!["run", "jog"]);
}

#[tokio::test]
async fn sessions_are_isolated_from_each_other() {
    let store = store();
    let first = store.create(Uuid::new_v4(), 3).await.expect("first");
    let second = store.create(Uuid::new_v4(), 20).await.expect("second");
    assert_eq!(store.session_count(), 2);

    let shared = first.questions[0].id;
    store
        .submit_answer(first.session_id, shared, "x")
        .await
        .expect("first answer");
    // same word in another session is a fresh question
    store
        .submit_answer(second.session_id, shared, "x")
        .await
        .expect("second answer");
}
