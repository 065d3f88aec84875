use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, Weekday};
use uuid::Uuid;

use availability_cell::models::{AvailabilityError, CreateRecurringSlotsRequest};
use availability_cell::AvailabilityService;

fn recurring_request(provider_id: Uuid) -> CreateRecurringSlotsRequest {
    CreateRecurringSlotsRequest {
        provider_id,
        start_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(), // a Monday
        end_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
        daily_start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        daily_end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        slot_duration_minutes: 30,
        days_of_week: vec![Weekday::Mon],
        time_zone: "Europe/Madrid".to_string(),
    }
}

async fn service_with_slots(provider_id: Uuid) -> (AvailabilityService, Vec<Uuid>) {
    let service = AvailabilityService::new();
    let slots = service
        .create_recurring_slots(recurring_request(provider_id))
        .await
        .expect("Failed to create slots");
    let slot_ids = slots.iter().map(|s| s.slot_id).collect();
    (service, slot_ids)
}

#[tokio::test]
async fn reserve_free_slot_succeeds() {
    let (service, slot_ids) = service_with_slots(Uuid::new_v4()).await;

    let view = service.reserve_slot(slot_ids[0], "token-a").await.unwrap();

    assert!(view.reserved);
    assert_eq!(view.reservation_token.as_deref(), Some("token-a"));
    assert!(view.reserved_at.is_some());
    assert_eq!(view.version, 1);
}

#[tokio::test]
async fn reserve_replay_with_same_token_is_idempotent() {
    let (service, slot_ids) = service_with_slots(Uuid::new_v4()).await;

    let first = service.reserve_slot(slot_ids[0], "token-a").await.unwrap();
    let replay = service.reserve_slot(slot_ids[0], "token-a").await.unwrap();

    // Replay must not shift the recorded reservation time or bump the version.
    assert_eq!(replay.reserved_at, first.reserved_at);
    assert_eq!(replay.version, first.version);
    assert_eq!(replay.reservation_token.as_deref(), Some("token-a"));
}

#[tokio::test]
async fn reserve_with_different_token_conflicts() {
    let (service, slot_ids) = service_with_slots(Uuid::new_v4()).await;

    service.reserve_slot(slot_ids[0], "token-a").await.unwrap();
    let result = service.reserve_slot(slot_ids[0], "token-b").await;

    assert_matches!(result, Err(AvailabilityError::ReservationConflict(id)) if id == slot_ids[0]);

    // The slot is still held by the first token: its replay still succeeds.
    let still_held = service.reserve_slot(slot_ids[0], "token-a").await.unwrap();
    assert_eq!(still_held.reservation_token.as_deref(), Some("token-a"));
}

#[tokio::test]
async fn reserve_unknown_slot_fails_not_found() {
    let service = AvailabilityService::new();
    let slot_id = Uuid::new_v4();

    let result = service.reserve_slot(slot_id, "token-a").await;
    assert_matches!(result, Err(AvailabilityError::SlotNotFound(id)) if id == slot_id);
}

#[tokio::test]
async fn release_is_idempotent() {
    let (service, slot_ids) = service_with_slots(Uuid::new_v4()).await;

    service.reserve_slot(slot_ids[0], "token-a").await.unwrap();

    let released = service.release_slot(slot_ids[0]).await.unwrap();
    assert!(!released.reserved);
    assert!(released.reservation_token.is_none());
    assert!(released.reserved_at.is_none());

    // Releasing a free slot is a no-op success, not an error.
    let again = service.release_slot(slot_ids[0]).await.unwrap();
    assert!(!again.reserved);
    assert_eq!(again.version, released.version);
}

#[tokio::test]
async fn release_unknown_slot_fails_not_found() {
    let service = AvailabilityService::new();
    let result = service.release_slot(Uuid::new_v4()).await;
    assert_matches!(result, Err(AvailabilityError::SlotNotFound(_)));
}

#[tokio::test]
async fn released_slot_can_be_reserved_by_a_new_token() {
    let (service, slot_ids) = service_with_slots(Uuid::new_v4()).await;

    service.reserve_slot(slot_ids[0], "token-a").await.unwrap();
    service.release_slot(slot_ids[0]).await.unwrap();

    let view = service.reserve_slot(slot_ids[0], "token-b").await.unwrap();
    assert_eq!(view.reservation_token.as_deref(), Some("token-b"));
}

#[tokio::test]
async fn concurrent_reservations_admit_exactly_one_winner() {
    let provider_id = Uuid::new_v4();
    let (service, slot_ids) = service_with_slots(provider_id).await;
    let service = Arc::new(service);
    let slot_id = slot_ids[0];

    let mut handles = Vec::new();
    for i in 0..16 {
        let service = Arc::clone(&service);
        let token = format!("token-{}", i);
        handles.push(tokio::spawn(async move {
            service.reserve_slot(slot_id, &token).await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AvailabilityError::ReservationConflict(_)) => conflicts += 1,
            Err(other) => panic!("Unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 15);
}
