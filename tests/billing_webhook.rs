//! Billing webhook delivery end to end: HTTP acknowledgement, detached
//! processing, deduplication and degraded paths.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};

use common::{json_body, signed_webhook, Harness, HOME_ZIP};
use gym_pass::adapters::memory::StaticGeocoder;
use gym_pass::application::handlers::BillingEventResult;
use gym_pass::domain::billing::StripeEvent;
use gym_pass::domain::foundation::UserId;
use gym_pass::domain::subscription::{SubscriptionStatus, SubscriptionTier};
use gym_pass::ports::{WebhookEventRepository, WebhookOutcome};

fn checkout_event(event_id: &str, user_id: &UserId, subscription_id: &str) -> StripeEvent {
    StripeEvent::new(
        event_id,
        "checkout.session.completed",
        1_704_067_200,
        json!({
            "id": "cs_test_1",
            "customer": "cus_42",
            "subscription": subscription_id,
            "customer_details": {
                "email": "ana@example.com",
                "name": "Ana Silva",
                "address": {"postal_code": HOME_ZIP}
            },
            "metadata": {"tier": "elite", "user_id": user_id.to_string()}
        }),
    )
}

fn subscription_event(event_id: &str, event_type: &str, subscription_id: &str) -> StripeEvent {
    StripeEvent::new(
        event_id,
        event_type,
        1_704_067_200,
        json!({
            "id": subscription_id,
            "customer": "cus_42",
            "status": "past_due",
            "current_period_start": 1_704_067_200,
            "current_period_end": 1_706_745_600
        }),
    )
}

fn as_json(event: &StripeEvent) -> Value {
    serde_json::to_value(event).unwrap()
}

/// Waits for the detached task to record a final outcome.
async fn outcome_of(h: &Harness, event_id: &str) -> WebhookOutcome {
    for _ in 0..200 {
        if let Some(record) = h.events.find_by_event_id(event_id).await.unwrap() {
            if record.result != WebhookOutcome::Processing {
                return record.result;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("event {} was never processed", event_id);
}

// ════════════════════════════════════════════════════════════════════════════
// Signature gate
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn missing_signature_is_400_and_changes_nothing() {
    let h = Harness::new();
    let user = h.member("tok", "auth0|ana").await;
    let body = as_json(&checkout_event("evt_nosig", &user.id, "sub_1")).to_string();

    let response = h
        .send(
            Request::builder()
                .method("POST")
                .uri("/billing/webhook")
                .body(Body::from(body))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "SIGNATURE_INVALID");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.events.is_empty());
    assert!(h.ledger.is_empty());
}

#[tokio::test]
async fn forged_signature_is_400() {
    let h = Harness::new();
    let body = json!({"id": "evt_forged", "type": "customer.subscription.deleted",
        "created": 1_704_067_200, "data": {"object": {}}})
    .to_string();

    let response = h
        .send(
            Request::builder()
                .method("POST")
                .uri("/billing/webhook")
                .header("Stripe-Signature", "t=1704067200,v1=deadbeef")
                .body(Body::from(body))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.events.is_empty());
}

#[tokio::test]
async fn minimum_header_timestamp_is_400() {
    let h = Harness::new();

    let response = h
        .send(
            Request::builder()
                .method("POST")
                .uri("/billing/webhook")
                .header("Stripe-Signature", format!("t={},v1=00", i64::MIN))
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "SIGNATURE_INVALID");
    assert!(h.events.is_empty());
}

// ════════════════════════════════════════════════════════════════════════════
// Activation
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn checkout_is_acknowledged_then_activates_in_background() {
    let h = Harness::new();
    let user = h.member("tok", "auth0|ana").await;

    let response = h
        .send(signed_webhook(&as_json(&checkout_event("evt_1", &user.id, "sub_1"))))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["eventId"], "evt_1");
    assert_eq!(outcome_of(&h, "evt_1").await, WebhookOutcome::Success);

    let rows = h.ledger.rows_for_user(&user.id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tier, SubscriptionTier::Elite);
    assert_eq!(rows[0].monthly_limit, 40);
    assert_eq!(rows[0].guest_limit, 5);
    assert!(rows[0].is_active());

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    // Nearest to (40.0, -74.0): gyms 2, 4, 3
    assert_eq!(sent[0].1.gym1.name, "Gym 2");
    assert_eq!(sent[0].1.gym2.name, "Gym 4");
    assert_eq!(sent[0].1.gym3.name, "Gym 3");
}

#[tokio::test]
async fn duplicate_delivery_applies_once() {
    let h = Harness::new();
    let user = h.member("tok", "auth0|ana").await;
    let payload = as_json(&checkout_event("evt_dup", &user.id, "sub_dup"));

    let first = h.send(signed_webhook(&payload)).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(outcome_of(&h, "evt_dup").await, WebhookOutcome::Success);

    let second = h.send(signed_webhook(&payload)).await;
    assert_eq!(second.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.ledger.rows_for_user(&user.id).len(), 1);
    assert_eq!(h.notifier.sent().len(), 1);
    assert_eq!(h.events.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_duplicates_are_claimed_once() {
    let h = Harness::new();
    let user = h.member("tok", "auth0|ana").await;
    let event = checkout_event("evt_race", &user.id, "sub_race");

    let (a, b) = tokio::join!(
        h.processor.process(event.clone()),
        h.processor.process(event)
    );
    let results = [a.unwrap(), b.unwrap()];

    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, BillingEventResult::AlreadyProcessed))
            .count(),
        1
    );
    assert_eq!(h.ledger.rows_for_user(&user.id).len(), 1);
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn geocode_miss_still_activates_with_fallback_gyms() {
    let h = Harness::builder().geocoder(StaticGeocoder::new()).build();
    let user = h.member("tok", "auth0|ana").await;

    h.send(signed_webhook(&as_json(&checkout_event("evt_geo", &user.id, "sub_geo"))))
        .await;

    assert_eq!(outcome_of(&h, "evt_geo").await, WebhookOutcome::Success);
    assert!(h.ledger.rows_for_user(&user.id)[0].is_active());

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.gym1.name, "Gym 1");
    assert_eq!(sent[0].1.gym2.name, "Gym 2");
    assert_eq!(sent[0].1.gym3.name, "Gym 3");
    assert_eq!(sent[0].1.gym1.distance, "");
}

#[tokio::test]
async fn checkout_postal_code_is_saved_on_user() {
    let h = Harness::new();
    let user = h.member("tok", "auth0|ana").await;
    assert!(user.postal_code.is_none());

    h.send(signed_webhook(&as_json(&checkout_event("evt_zip", &user.id, "sub_zip"))))
        .await;
    outcome_of(&h, "evt_zip").await;

    let stored = h.user(&user.id).await;
    assert_eq!(stored.postal_code.as_deref(), Some(HOME_ZIP));
    assert_eq!(stored.billing_customer_id.as_deref(), Some("cus_42"));
}

// ════════════════════════════════════════════════════════════════════════════
// Updates and cancellations
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn update_mirrors_processor_status() {
    let h = Harness::new();
    let user = h.member("tok", "auth0|ana").await;
    h.send(signed_webhook(&as_json(&checkout_event("evt_a", &user.id, "sub_9"))))
        .await;
    outcome_of(&h, "evt_a").await;

    let response = h
        .send(signed_webhook(&as_json(&subscription_event(
            "evt_b",
            "customer.subscription.updated",
            "sub_9",
        ))))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(outcome_of(&h, "evt_b").await, WebhookOutcome::Success);
    assert_eq!(
        h.ledger.rows_for_user(&user.id)[0].status,
        SubscriptionStatus::PastDue
    );
}

#[tokio::test]
async fn update_and_delete_without_match_are_ignored() {
    let h = Harness::new();

    for (id, kind) in [
        ("evt_u", "customer.subscription.updated"),
        ("evt_d", "customer.subscription.deleted"),
    ] {
        let response = h
            .send(signed_webhook(&as_json(&subscription_event(id, kind, "sub_unknown"))))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(outcome_of(&h, id).await, WebhookOutcome::Ignored);
    }
    assert!(h.ledger.is_empty());
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged_and_ignored() {
    let h = Harness::new();
    let event = StripeEvent::new("evt_invoice", "invoice.paid", 1_704_067_200, json!({"id": "in_1"}));

    let response = h.send(signed_webhook(&as_json(&event))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(outcome_of(&h, "evt_invoice").await, WebhookOutcome::Ignored);
}
