use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{NaiveDate, NaiveTime, Weekday};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use availability_cell::models::CreateRecurringSlotsRequest;
use availability_cell::{availability_routes, AvailabilityService};

async fn app_with_slot() -> (axum::Router, Uuid, Uuid) {
    let service = Arc::new(AvailabilityService::new());
    let provider_id = Uuid::new_v4();

    let slots = service
        .create_recurring_slots(CreateRecurringSlotsRequest {
            provider_id,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            daily_start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            daily_end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            slot_duration_minutes: 60,
            days_of_week: vec![Weekday::Mon],
            time_zone: "UTC".to_string(),
        })
        .await
        .unwrap();

    (availability_routes(service), provider_id, slots[0].slot_id)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn reserve_endpoint_returns_slot_view() {
    let (app, _, slot_id) = app_with_slot().await;

    let response = app
        .oneshot(put_json(
            &format!("/{}/reserve", slot_id),
            json!({"reservationToken": "token-a"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["slotId"], json!(slot_id.to_string()));
    assert_eq!(body["reserved"], json!(true));
    assert_eq!(body["reservationToken"], json!("token-a"));
}

#[tokio::test]
async fn reserve_conflicting_token_returns_409() {
    let (app, _, slot_id) = app_with_slot().await;

    let first = app
        .clone()
        .oneshot(put_json(
            &format!("/{}/reserve", slot_id),
            json!({"reservationToken": "token-a"}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(put_json(
            &format!("/{}/reserve", slot_id),
            json!({"reservationToken": "token-b"}),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn reserve_unknown_slot_returns_404() {
    let (app, _, _) = app_with_slot().await;

    let response = app
        .oneshot(put_json(
            &format!("/{}/reserve", Uuid::new_v4()),
            json!({"reservationToken": "token-a"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn release_endpoint_is_idempotent() {
    let (app, _, slot_id) = app_with_slot().await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/{}/release", slot_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn recurring_endpoint_creates_slots() {
    let service = Arc::new(AvailabilityService::new());
    let app = availability_routes(service);

    let request = Request::builder()
        .method("POST")
        .uri("/recurring")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "providerId": Uuid::new_v4(),
                "startDate": "2026-09-07",
                "endDate": "2026-09-07",
                "dailyStartTime": "09:00:00",
                "dailyEndTime": "11:00:00",
                "slotDurationMinutes": 60,
                "daysOfWeek": ["Mon"],
                "timeZone": "UTC"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_endpoint_scopes_to_provider() {
    let (app, provider_id, _) = app_with_slot().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/provider/{}?from=2026-09-01T00:00:00Z&to=2026-10-01T00:00:00Z",
                    provider_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let other = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/provider/{}?from=2026-09-01T00:00:00Z&to=2026-10-01T00:00:00Z",
                    Uuid::new_v4()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(other).await;
    assert!(body.as_array().unwrap().is_empty());
}
