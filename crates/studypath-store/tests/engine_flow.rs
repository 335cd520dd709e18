//! End-to-end engine flows against the in-memory and fault-injecting stores.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use studypath_core::engine::{StudyEngine, StudyEngineConfig};
use studypath_core::model::{
    Catalog, ContentKind, Domain, ListeningItem, Question, ReadingItem, ReviewStatus,
    VocabularyItem, WritingKind, WritingPrompt,
};
use studypath_core::quiz::{QuizAnswer, SheetAnswer};
use studypath_core::traits::{FixedClock, RecordStore};
use studypath_core::{Clock, StudyError};
use studypath_store::mock::FailingStore;
use studypath_store::{JsonFileStore, MemoryStore};

fn word(id: u64, word: &str, definition: &str) -> VocabularyItem {
    VocabularyItem {
        id,
        word: word.into(),
        phonetic: None,
        definition: definition.into(),
        example: None,
        category: None,
        difficulty: 1,
    }
}

fn question(id: u64, answer: &str) -> Question {
    Question {
        id,
        prompt: format!("Question {id}"),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        answer: answer.into(),
        explanation: None,
    }
}

fn catalog() -> Catalog {
    Catalog {
        id: "cet4".into(),
        name: "CET-4 core".into(),
        vocabulary: vec![
            word(1, "abandon", "to leave behind"),
            word(2, "benefit", "an advantage"),
            word(3, "candid", "truthful and straightforward"),
            word(4, "diligent", "showing care in work"),
            word(5, "eager", "wanting to do something very much"),
        ],
        listening: vec![ListeningItem {
            id: 10,
            title: "Campus news".into(),
            audio_url: "audio/campus.mp3".into(),
            difficulty: 1,
            kind: "news".into(),
            questions: vec![question(1, "A"), question(2, "C"), question(3, "B"), question(4, "D")],
        }],
        reading: vec![ReadingItem {
            id: 20,
            title: "Urban gardens".into(),
            difficulty: 2,
            kind: "careful".into(),
            questions: vec![question(1, "B"), question(2, "D")],
        }],
        writing: vec![WritingPrompt {
            id: 30,
            title: "Online learning".into(),
            topic: "online learning shapes modern education".into(),
            kind: WritingKind::Essay,
            difficulty: 2,
        }],
        ..Default::default()
    }
}

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn engine_with(store: Arc<dyn RecordStore>) -> (StudyEngine, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(start()));
    let config = StudyEngineConfig {
        quiz_size: 3,
        rng_seed: Some(7),
    };
    (StudyEngine::new(store, clock.clone(), config), clock)
}

fn engine() -> (StudyEngine, Arc<FixedClock>) {
    engine_with(Arc::new(MemoryStore::new(catalog())))
}

fn reference_essay() -> String {
    let opening = "Therefore online learning matters to every student, such as those who live \
                   far from campus, and for example working adults.";
    let filler = "students gain flexible education through digital courses every week";
    let mut words: Vec<&str> = opening.split_whitespace().collect();
    let needed = 150 - words.len();
    words.extend(filler.split_whitespace().cycle().take(needed));
    words.join(" ")
}

#[tokio::test]
async fn first_review_is_learning_for_one_day() {
    let (engine, _) = engine();

    let outcome = engine.submit_vocabulary_review("u1", 1, true).await.unwrap();
    assert_eq!(outcome.status, ReviewStatus::Learning);
    assert_eq!(outcome.review_count, 1);
    assert_eq!(outcome.next_review, start() + Duration::days(1));

    let snapshot = engine.progress("u1").await.unwrap();
    assert_eq!(snapshot.vocabulary.count, 1);
}

#[tokio::test]
async fn fifth_remembered_review_masters_and_forgetting_demotes() {
    let (engine, clock) = engine();

    let mut last = None;
    for _ in 0..5 {
        last = Some(engine.submit_vocabulary_review("u1", 1, true).await.unwrap());
        clock.advance(Duration::days(1));
    }
    let mastered = last.unwrap();
    assert_eq!(mastered.review_count, 5);
    assert_eq!(mastered.interval_days, 16);
    assert_eq!(mastered.status, ReviewStatus::Mastered);

    let forgotten = engine.submit_vocabulary_review("u1", 1, false).await.unwrap();
    assert_eq!(forgotten.review_count, 6);
    assert_eq!(forgotten.interval_days, 16);
    assert_eq!(forgotten.status, ReviewStatus::Learning);
    assert_eq!(forgotten.next_review, clock.now() + Duration::days(16));
}

#[tokio::test]
async fn reference_essay_is_stored_with_score() {
    let (engine, _) = engine();

    let outcome = engine
        .submit_writing_answer("u1", 30, &reference_essay())
        .await
        .unwrap();
    assert_eq!(outcome.score, 94);
    assert_eq!(outcome.subscores.total(), 94);
    assert!(outcome.feedback.lines().next().unwrap().starts_with("Excellent"));

    let submissions = engine.store().writing_submissions("u1").await.unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].id, outcome.submission_id);

    let snapshot = engine.progress("u1").await.unwrap();
    assert_eq!(snapshot.writing.count, 1);
    assert_eq!(snapshot.writing.score, 94);
}

#[tokio::test]
async fn learner_without_activity_gets_baseline_analysis() {
    let (engine, _) = engine();

    let analysis = engine.analysis("nobody").await.unwrap();
    for domain in Domain::ALL {
        assert_eq!(analysis.skills.current.get(domain), 0);
    }
    assert_eq!(analysis.skills.target.writing, 20);
    assert_eq!(analysis.skills.target.reading, 5);
    assert_eq!(analysis.prediction.predicted_score, 0);
    assert_eq!(analysis.prediction.confidence, 30);
    assert_eq!(analysis.weak_points.len(), 5);
    assert_eq!(analysis.weak_points[0].domain, Domain::Vocabulary);
}

#[tokio::test]
async fn reading_only_learner() {
    let (engine, _) = engine();

    let answers = vec![
        SheetAnswer {
            question_id: 1,
            selected_answer: "b".into(),
        },
        SheetAnswer {
            question_id: 2,
            selected_answer: "D".into(),
        },
        SheetAnswer {
            question_id: 99,
            selected_answer: "A".into(),
        },
    ];
    let outcome = engine.submit_reading_answers("u1", 20, &answers).await.unwrap();
    assert_eq!(outcome.score, 100);
    assert_eq!(outcome.results.len(), 2);

    let analysis = engine.analysis("u1").await.unwrap();
    assert_eq!(analysis.skills.current.reading, 100);
    assert_eq!(analysis.skills.current.translation, 50);
    assert_eq!(analysis.skills.target.reading, 90);
    assert_eq!(analysis.prediction.breakdown.reading, 249);
    assert_eq!(analysis.prediction.breakdown.translation, 53);
    assert_eq!(analysis.prediction.predicted_score, 302);
    assert_eq!(analysis.prediction.confidence, 55);

    let weak: Vec<Domain> = analysis.weak_points.iter().map(|w| w.domain).collect();
    assert_eq!(
        weak,
        vec![
            Domain::Vocabulary,
            Domain::Listening,
            Domain::Writing,
            Domain::Translation
        ]
    );
}

#[tokio::test]
async fn listening_retry_replaces_previous_attempt() {
    let (engine, _) = engine();

    let half = vec![
        SheetAnswer {
            question_id: 1,
            selected_answer: "A".into(),
        },
        SheetAnswer {
            question_id: 2,
            selected_answer: "C".into(),
        },
    ];
    let outcome = engine.submit_listening_answers("u1", 10, &half).await.unwrap();
    assert_eq!(outcome.total_questions, 4);
    assert_eq!(outcome.score, 50);

    let none = engine.submit_listening_answers("u1", 10, &[]).await.unwrap();
    assert_eq!(none.score, 0);

    let records = engine
        .store()
        .activity_records("u1", ContentKind::Listening)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].score, 0);
}

#[tokio::test]
async fn quiz_round_trip_reschedules_words() {
    let (engine, _) = engine();

    let quiz = engine.vocabulary_quiz("u1", None, None).await.unwrap();
    assert_eq!(quiz.len(), 3);
    for q in &quiz {
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.question, format!("What is the meaning of \"{}\"?", q.word));
    }

    let items = catalog().vocabulary;
    let definition = |id: u64| {
        items
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.definition.clone())
            .unwrap()
    };
    let answers = vec![
        QuizAnswer {
            word_id: quiz[0].word_id,
            selected_option: definition(quiz[0].word_id),
        },
        QuizAnswer {
            word_id: quiz[1].word_id,
            selected_option: "wrong".into(),
        },
        QuizAnswer {
            word_id: quiz[2].word_id,
            selected_option: String::new(),
        },
    ];

    let outcome = engine.submit_vocabulary_quiz("u1", &answers).await.unwrap();
    assert_eq!(outcome.total_questions, 3);
    assert_eq!(outcome.correct_answers, 1);
    assert_eq!(outcome.score, 33);
    assert_eq!(outcome.results.len(), 2);

    let correct = engine
        .store()
        .review_record("u1", quiz[0].word_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(correct.next_review, start() + Duration::days(2));
    let wrong = engine
        .store()
        .review_record("u1", quiz[1].word_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wrong.next_review, start() + Duration::days(1));
    assert!(engine
        .store()
        .review_record("u1", quiz[2].word_id)
        .await
        .unwrap()
        .is_none());

    let snapshot = engine.progress("u1").await.unwrap();
    assert_eq!(snapshot.vocabulary.count, 2);
    assert_eq!(snapshot.vocabulary.score, 33);
}

#[tokio::test]
async fn quiz_prefers_words_in_learning() {
    let (engine, _) = engine();
    engine.submit_vocabulary_review("u1", 4, true).await.unwrap();

    let quiz = engine.vocabulary_quiz("u1", Some(1), None).await.unwrap();
    assert_eq!(quiz[0].word_id, 4);
}

#[tokio::test]
async fn bad_requests_are_rejected_before_writing() {
    let (engine, _) = engine();

    let err = engine.submit_vocabulary_review("u1", 404, true).await.unwrap_err();
    assert!(matches!(
        err,
        StudyError::NotFound {
            kind: ContentKind::Vocabulary,
            id: 404
        }
    ));
    assert_eq!(err.to_string(), "vocabulary item 404 not found");

    let err = engine.submit_reading_answers("u1", 404, &[]).await.unwrap_err();
    assert!(err.is_client_error());

    let err = engine.submit_writing_answer("u1", 30, "   ").await.unwrap_err();
    assert!(matches!(err, StudyError::Validation(_)));

    let err = engine.submit_vocabulary_review("", 1, true).await.unwrap_err();
    assert!(matches!(err, StudyError::Validation(_)));

    let err = engine.vocabulary_quiz("u1", Some(0), None).await.unwrap_err();
    assert!(matches!(err, StudyError::Validation(_)));

    let err = engine.submit_vocabulary_quiz("u1", &[]).await.unwrap_err();
    assert!(matches!(err, StudyError::Validation(_)));

    assert!(engine.store().review_records("u1").await.unwrap().is_empty());
    assert!(engine.store().snapshot("u1").await.unwrap().is_none());
}

#[tokio::test]
async fn snapshot_failure_does_not_fail_the_write() {
    let store = Arc::new(FailingStore::new(Arc::new(MemoryStore::new(catalog()))));
    store.fail_snapshots(true);
    let (engine, _) = engine_with(store.clone());

    let outcome = engine.submit_vocabulary_review("u1", 2, true).await;
    assert!(outcome.is_ok());
    assert_eq!(store.snapshot_count(), 1);
    assert!(store.snapshot("u1").await.unwrap().is_none());

    store.fail_snapshots(false);
    let snapshot = engine.progress("u1").await.unwrap();
    assert_eq!(snapshot.vocabulary.count, 1);
}

#[tokio::test]
async fn stale_snapshot_is_healed_on_read() {
    let store = Arc::new(FailingStore::new(Arc::new(MemoryStore::new(catalog()))));
    let (engine, _) = engine_with(store.clone());

    engine.submit_vocabulary_review("u1", 1, true).await.unwrap();
    assert_eq!(store.snapshot("u1").await.unwrap().unwrap().vocabulary.count, 1);

    store.fail_snapshots(true);
    engine.submit_vocabulary_review("u1", 2, true).await.unwrap();
    assert_eq!(store.snapshot("u1").await.unwrap().unwrap().vocabulary.count, 1);

    // Still failing: the read recomputes but cannot rewrite the cache.
    let snapshot = engine.progress("u1").await.unwrap();
    assert_eq!(snapshot.vocabulary.count, 2);
    assert_eq!(store.snapshot("u1").await.unwrap().unwrap().vocabulary.count, 1);

    store.fail_snapshots(false);
    let snapshot = engine.progress("u1").await.unwrap();
    assert_eq!(snapshot.vocabulary.count, 2);
    assert_eq!(store.snapshot("u1").await.unwrap().unwrap().vocabulary.count, 2);

    // An up-to-date cache is not rewritten.
    let writes = store.snapshot_count();
    engine.progress("u1").await.unwrap();
    assert_eq!(store.snapshot_count(), writes);
}

#[tokio::test]
async fn record_write_failure_is_a_storage_error() {
    let store = Arc::new(FailingStore::new(Arc::new(MemoryStore::new(catalog()))));
    store.fail_records(true);
    let (engine, _) = engine_with(store.clone());

    let err = engine.submit_vocabulary_review("u1", 2, true).await.unwrap_err();
    assert!(matches!(err, StudyError::Storage(_)));
    assert!(!err.is_client_error());
    assert_eq!(store.snapshot_count(), 0);
}

#[tokio::test]
async fn failed_file_write_can_be_retried() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = JsonFileStore::open(catalog(), &path).await.unwrap();
    let (engine, _) = engine_with(Arc::new(store));

    let first = engine.submit_vocabulary_review("u1", 1, true).await.unwrap();
    assert_eq!(first.review_count, 1);

    let tmp = path.with_extension("json.tmp");
    std::fs::create_dir(&tmp).unwrap();
    let err = engine.submit_vocabulary_review("u1", 1, true).await.unwrap_err();
    assert!(matches!(err, StudyError::Storage(_)));
    let record = engine.store().review_record("u1", 1).await.unwrap().unwrap();
    assert_eq!(record.review_count, 1);

    std::fs::remove_dir(&tmp).unwrap();
    let retry = engine.submit_vocabulary_review("u1", 1, true).await.unwrap();
    assert_eq!(retry.review_count, 2);

    let reopened = JsonFileStore::open(catalog(), &path).await.unwrap();
    let record = reopened.review_record("u1", 1).await.unwrap().unwrap();
    assert_eq!(record.review_count, 2);
}

#[tokio::test]
async fn concurrent_writes_leave_a_consistent_snapshot() {
    let (engine, _) = engine();
    let engine = Arc::new(engine);

    let reviews = (1..=5).map(|id| {
        let engine = Arc::clone(&engine);
        async move { engine.submit_vocabulary_review("u1", id, true).await }
    });
    let results = futures::future::join_all(reviews).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let essay = reference_essay();
    let sheet = [SheetAnswer {
        question_id: 1,
        selected_answer: "B".into(),
    }];
    let writing = engine.submit_writing_answer("u1", 30, &essay);
    let reading = engine.submit_reading_answers("u1", 20, &sheet);
    let (writing, reading) = futures::join!(writing, reading);
    writing.unwrap();
    reading.unwrap();

    let cached = engine.store().snapshot("u1").await.unwrap().unwrap();
    let fresh = engine.refresh_progress("u1").await.unwrap();
    assert_eq!(cached.vocabulary, fresh.vocabulary);
    assert_eq!(cached.reading, fresh.reading);
    assert_eq!(cached.writing, fresh.writing);
    assert_eq!(fresh.vocabulary.count, 5);
    assert_eq!(fresh.reading.score, 50);
}

#[tokio::test]
async fn report_matches_analysis() {
    let (engine, _) = engine();
    engine
        .submit_writing_answer("u1", 30, &reference_essay())
        .await
        .unwrap();

    let analysis = engine.analysis("u1").await.unwrap();
    let report = engine.report("u1").await.unwrap();
    assert_eq!(report.user, "u1");
    assert_eq!(report.created_at, start());
    assert_eq!(report.skills, analysis.skills);
    assert_eq!(report.prediction, analysis.prediction);
    assert_eq!(report.snapshot.writing.score, 94);
}
