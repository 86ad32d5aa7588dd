//! Behavioral tests for the booking workflow against in-memory doubles.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use booking_core::booking::{BookingData, BookingId};
use booking_core::error::{FailureKind, VALIDATION_MESSAGE};
use booking_core::workflow::{BookingReply, CREATED_MESSAGE, ReminderNotification};
use booking_testing::fixtures::{booking_data, invalid_booking_data, valid_booking_data};
use booking_testing::{BookingHarness, init_tracing};
use http::StatusCode;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn valid_booking_is_created() {
    init_tracing();
    let harness = BookingHarness::new();

    let result = harness.workflow.create_booking(valid_booking_data()).await;
    let (status, reply) = BookingReply::from_result(CREATED_MESSAGE, result);

    assert_eq!(status, StatusCode::OK);
    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["message"], "Successfully completed booking");
    assert_eq!(value["err"], json!({}));
    assert!(value["data"]["id"].as_i64().is_some_and(|id| id > 0));
    assert_eq!(value["data"]["customerName"], "Alice");
}

#[tokio::test]
async fn empty_booking_is_a_validation_failure() {
    let harness = BookingHarness::new();

    let result = harness.workflow.create_booking(invalid_booking_data()).await;
    let (status, reply) = BookingReply::from_result(CREATED_MESSAGE, result);

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!reply.success);
    assert_eq!(reply.message, VALIDATION_MESSAGE);
    let value = serde_json::to_value(&reply).unwrap();
    assert!(value["err"].as_str().is_some_and(|err| !err.is_empty()));
    assert_eq!(value["data"], json!({}));
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn schema_violations_are_explained() {
    let harness = BookingHarness::new();

    let failure = harness
        .workflow
        .create_booking(booking_data(json!({
            "customerName": "Alice",
            "roomId": "twelve",
            "date": "2024-05-01",
        })))
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Validation);
    assert_eq!(failure.explanation(), "roomId must be an integer");
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn datastore_outage_is_a_repository_failure() {
    let harness = BookingHarness::new();
    harness.store.set_unavailable(true);

    let result = harness.workflow.create_booking(valid_booking_data()).await;
    let (status, reply) = BookingReply::from_result(CREATED_MESSAGE, result);

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!reply.success);
    assert_eq!(reply.message, "Cannot create booking");
    assert!(reply.booking().is_none());
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn identical_data_yields_distinct_bookings() {
    let harness = BookingHarness::new();

    let first = harness.workflow.create_booking(valid_booking_data()).await.unwrap();
    let second = harness.workflow.create_booking(valid_booking_data()).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(harness.store.len(), 2);
}

#[tokio::test]
async fn creating_a_booking_publishes_nothing() {
    let harness = BookingHarness::new();
    harness.workflow.create_booking(valid_booking_data()).await.unwrap();

    assert!(harness.gateway.messages().is_empty());
    assert_eq!(harness.gateway.channel_setups(), 0);
}

#[tokio::test]
async fn broadcast_publishes_fixed_payload() {
    let harness = BookingHarness::new();

    harness.workflow.trigger_reminder_broadcast().await.unwrap();

    let messages = harness.gateway.messages_for("REMINDER_SERVICE");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].payload_json().unwrap(), json!({ "message": "Success" }));
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn broadcast_uses_configured_routing_key() {
    let harness = BookingHarness::with_routing_key("reminders.v2");

    harness.workflow.trigger_reminder_broadcast().await.unwrap();

    assert!(harness.gateway.messages_for("REMINDER_SERVICE").is_empty());
    assert_eq!(harness.gateway.messages_for("reminders.v2").len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_broadcasts_share_one_channel() {
    const BROADCASTS: usize = 25;
    let harness = Arc::new(BookingHarness::new());

    let handles: Vec<_> = (0..BROADCASTS)
        .map(|_| {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move { harness.workflow.trigger_reminder_broadcast().await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("broadcast failed");
    }

    let messages = harness.gateway.messages_for("REMINDER_SERVICE");
    assert_eq!(messages.len(), BROADCASTS);
    for message in &messages {
        let payload: ReminderNotification = serde_json::from_slice(message.payload()).unwrap();
        assert_eq!(payload, ReminderNotification::default());
    }
    assert_eq!(harness.gateway.channel_setups(), 1);
}

#[tokio::test]
async fn unreachable_broker_is_a_broker_failure() {
    let harness = BookingHarness::new();
    harness.gateway.set_unreachable(true);

    let failure = harness.workflow.trigger_reminder_broadcast().await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Broker);
    assert_eq!(failure.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!failure.explanation().is_empty());
    assert!(harness.gateway.messages().is_empty());
}

#[tokio::test]
async fn rejected_publish_is_a_broker_failure() {
    let harness = BookingHarness::new();
    harness.gateway.set_rejecting(true);

    let failure = harness.workflow.trigger_reminder_broadcast().await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Broker);
    assert!(failure.explanation().contains("REMINDER_SERVICE"));
}

#[tokio::test]
async fn created_booking_round_trips() {
    let harness = BookingHarness::new();

    let created = harness.workflow.create_booking(valid_booking_data()).await.unwrap();
    let fetched = harness.workflow.get_booking(created.id).await.unwrap();

    assert_eq!(fetched.fields, valid_booking_data());
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn missing_booking_is_not_found() {
    let harness = BookingHarness::new();

    let failure = harness.workflow.get_booking(BookingId::new(404)).await.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::NotFound);
    assert_eq!(failure.status_code(), StatusCode::NOT_FOUND);

    let failure = harness
        .workflow
        .update_booking(BookingId::new(404), booking_data(json!({ "roomId": 3 })))
        .await
        .unwrap_err();
    assert_eq!(failure.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_merges_over_stored_fields() {
    let harness = BookingHarness::new();
    let created = harness.workflow.create_booking(valid_booking_data()).await.unwrap();

    let updated = harness
        .workflow
        .update_booking(created.id, booking_data(json!({ "roomId": 7, "notes": "crib" })))
        .await
        .unwrap();

    assert_eq!(updated.field("roomId"), Some(&json!(7)));
    assert_eq!(updated.field("customerName"), Some(&json!("Alice")));
    assert_eq!(updated.field("notes"), Some(&json!("crib")));
}

#[tokio::test]
async fn invalid_update_leaves_booking_unchanged() {
    let harness = BookingHarness::new();
    let created = harness.workflow.create_booking(valid_booking_data()).await.unwrap();

    let failure = harness
        .workflow
        .update_booking(created.id, booking_data(json!({ "date": "tomorrow" })))
        .await
        .unwrap_err();

    assert_eq!(failure.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.store.get(created.id), Some(created));
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

proptest! {
    #[test]
    fn created_fields_match_recognized_input(
        name in "[A-Za-z]{1,20}",
        room in 1_i64..10_000,
        notes in proptest::option::of("[a-z][a-z ]{0,39}"),
        junk in "[a-z]{1,10}",
    ) {
        let mut data: BookingData = booking_data(json!({
            "customerName": name,
            "roomId": room,
            "date": "2024-05-01",
        }));
        if let Some(notes) = &notes {
            data.insert("notes".into(), json!(notes));
        }
        let recognized = data.clone();
        data.insert(format!("extra_{junk}"), json!(true));

        let harness = BookingHarness::new();
        let booking = runtime().block_on(harness.workflow.create_booking(data)).unwrap();

        prop_assert!(booking.id.get() > 0);
        prop_assert_eq!(booking.fields, recognized);
    }
}
