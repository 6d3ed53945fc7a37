// SPDX-FileCopyrightText: 2026 Migralog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end properties of the conversation orchestration core.

use std::time::Duration;

use chrono::Utc;
use migralog_core::types::{SurveyPatch, UserProfile};
use migralog_core::{ConversationState, HandleStatus, RecordStore};
use migralog_state::keys;
use migralog_storage::queries::surveys;
use migralog_storage::{Database, SurveyRecord};
use migralog_test_utils::{TestBackend, identity, mid, text};

/// Two concurrently submitted turns for the same thread are applied in
/// submission order, never interleaved: the event log must show the first
/// turn finish before the second one starts.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_turns_on_one_thread_are_serialized_in_submission_order() {
    let backend = std::sync::Arc::new(TestBackend::new().await);
    let u1 = identity("u1");

    // Establish the conversation (thread + state) first.
    backend
        .orchestrator
        .handle_inbound_message(&u1, Some(mid("m1")), text("Здравствуйте"), "ru")
        .await;

    backend
        .assistant
        .set_turn_delay(Duration::from_millis(100))
        .await;

    let first = {
        let backend = std::sync::Arc::clone(&backend);
        let u1 = u1.clone();
        tokio::spawn(async move {
            backend
                .orchestrator
                .handle_inbound_message(&u1, Some(mid("m2")), text("ответ-два"), "ru")
                .await
        })
    };
    // Let the first turn enter the thread queue before submitting the second.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = {
        let backend = std::sync::Arc::clone(&backend);
        let u1 = u1.clone();
        tokio::spawn(async move {
            backend
                .orchestrator
                .handle_inbound_message(&u1, Some(mid("m3")), text("ответ-три"), "ru")
                .await
        })
    };

    assert_eq!(first.await.unwrap().status, HandleStatus::Success);
    assert_eq!(second.await.unwrap().status, HandleStatus::Success);

    let events = backend.assistant.events().await;
    let pos = |needle: &str| {
        events
            .iter()
            .position(|e| e == needle)
            .unwrap_or_else(|| panic!("missing event {needle} in {events:?}"))
    };
    let first_start = pos("turn-start:ответ-два");
    let first_end = pos("turn-end:ответ-два");
    let second_start = pos("turn-start:ответ-три");
    assert!(
        first_start < first_end && first_end < second_start,
        "turns interleaved: {events:?}"
    );
}

/// State-store reads during a simulated remote outage return the most recent
/// value written before or during the outage, and the conversation continues
/// on the same thread.
#[tokio::test]
async fn conversation_survives_a_remote_outage() {
    let backend = TestBackend::new().await;
    let u1 = identity("u1");

    backend
        .orchestrator
        .handle_inbound_message(&u1, Some(mid("m1")), text("Здравствуйте"), "ru")
        .await;
    let thread_before = backend.sessions().load(&u1).await.thread.unwrap();

    backend.remote.set_down(true);

    // The stored state is served from the fallback tier.
    let snapshot = backend.sessions().load(&u1).await;
    assert_eq!(snapshot.state, Some(ConversationState::AwaitingResponse));
    assert_eq!(snapshot.thread, Some(thread_before.clone()));

    // A turn handled during the outage still works and stays on the thread.
    let outcome = backend
        .orchestrator
        .handle_inbound_message(&u1, Some(mid("m2")), text("Да"), "ru")
        .await;
    assert_eq!(outcome.status, HandleStatus::Success);
    assert_eq!(
        backend.sessions().load(&u1).await.thread,
        Some(thread_before)
    );

    // Writes made during the outage are visible to later reads in the
    // same outage, including the dedup set.
    let duplicate = backend
        .orchestrator
        .handle_inbound_message(&u1, Some(mid("m2")), text("Да"), "ru")
        .await;
    assert_eq!(duplicate.status, HandleStatus::Duplicate);
    assert!(
        backend
            .store
            .is_member(&keys::processed_key(&u1), "m2")
            .await
    );
}

async fn seed_profile(backend: &TestBackend, userid: &str) {
    backend
        .records
        .insert_user(&UserProfile {
            userid: userid.into(),
            language: "ru".into(),
            name: Some("Айгерим".into()),
            gender: None,
            birthdate: None,
            reminder_time: None,
            created_at: "2026-01-01T00:00:00Z".into(),
        })
        .await
        .unwrap();
}

async fn seed_survey(backend: &TestBackend, userid: &str, minutes_ago: i64) -> i64 {
    let db = Database::open(&backend.db_path, true).await.unwrap();
    let created_at = (Utc::now() - chrono::Duration::minutes(minutes_ago)).to_rfc3339();
    surveys::insert_survey(
        &db,
        userid,
        &SurveyPatch {
            headache_today: Some("Да".into()),
            ..Default::default()
        },
        &created_at,
    )
    .await
    .unwrap()
}

async fn run_survey_completion(backend: &TestBackend, userid: &str, intensity: i64) {
    let id = identity(userid);
    // First contact opens the survey conversation.
    backend
        .orchestrator
        .handle_inbound_message(&id, Some(mid("m1")), text("Привет"), "ru")
        .await;
    // The follow-up turn ends the flow with a completion payload.
    backend
        .assistant
        .add_reply(format!(
            "Спасибо, записал!\n```json\n{{\"pain_intensity\": {intensity}}}\n```"
        ))
        .await;
    let outcome = backend
        .orchestrator
        .handle_inbound_message(&id, Some(mid("m2")), text(&intensity.to_string()), "ru")
        .await;
    assert_eq!(outcome.status, HandleStatus::Success);
}

/// Scenario: profile exists, survey created 90 minutes ago. A new survey
/// row is created (freshness window exceeded), the old row untouched.
#[tokio::test]
async fn stale_survey_scenario_creates_a_new_record() {
    let backend = TestBackend::new().await;
    seed_profile(&backend, "u2").await;
    let old_id = seed_survey(&backend, "u2", 90).await;

    run_survey_completion(&backend, "u2", 7).await;

    let latest = backend
        .records
        .latest_survey(&identity("u2"))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(latest.survey_id, old_id);
    assert_eq!(latest.pain_intensity, Some(7));

    // The old record is untouched.
    let db = Database::open(&backend.db_path, true).await.unwrap();
    let old: SurveyRecord = db
        .connection()
        .call(move |conn| {
            let record = conn.query_row(
                "SELECT survey_id, userid, headache_today, medicament_today, pain_intensity,
                        pain_area, area_detail, pain_type, created_at
                 FROM surveys WHERE survey_id = ?1",
                [old_id],
                |row| {
                    Ok(SurveyRecord {
                        survey_id: row.get(0)?,
                        userid: row.get(1)?,
                        headache_today: row.get(2)?,
                        medicament_today: row.get(3)?,
                        pain_intensity: row.get(4)?,
                        pain_area: row.get(5)?,
                        area_detail: row.get(6)?,
                        pain_type: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                },
            )?;
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(record)
        })
        .await
        .unwrap();
    assert_eq!(old.headache_today.as_deref(), Some("Да"));
    assert!(old.pain_intensity.is_none());
}

/// Scenario: survey created 10 minutes ago. The existing row is updated in
/// place and `created_at` is unchanged.
#[tokio::test]
async fn fresh_survey_scenario_updates_in_place() {
    let backend = TestBackend::new().await;
    seed_profile(&backend, "u3").await;
    let survey_id = seed_survey(&backend, "u3", 10).await;
    let created_at_before = backend
        .records
        .latest_survey(&identity("u3"))
        .await
        .unwrap()
        .unwrap()
        .created_at;

    run_survey_completion(&backend, "u3", 3).await;

    let latest = backend
        .records
        .latest_survey(&identity("u3"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.survey_id, survey_id, "updated in place");
    assert_eq!(latest.pain_intensity, Some(3));
    assert_eq!(latest.headache_today.as_deref(), Some("Да"));
    assert_eq!(latest.created_at, created_at_before);
}

/// A terminal reply returns the conversation to no-session and empties the
/// processed-message set, so the identity can start over.
#[tokio::test]
async fn terminal_reply_empties_processed_set() {
    let backend = TestBackend::new().await;
    seed_profile(&backend, "u4").await;

    run_survey_completion(&backend, "u4", 5).await;

    let u4 = identity("u4");
    let snapshot = backend.sessions().load(&u4).await;
    assert!(snapshot.state.is_none());
    assert!(
        !backend
            .store
            .is_member(&keys::processed_key(&u4), "m2")
            .await
    );
}
