//! End-to-end booking saga against a real availability service served over
//! HTTP on a local socket. Each `BookingService` here stands for one booking
//! service replica with its own appointment store; the availability service
//! is the single shared authority for slot state.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Weekday};
use uuid::Uuid;

use availability_cell::{availability_routes, AvailabilityService, CreateRecurringSlotsRequest};
use booking_cell::{
    AppointmentEventPublisher, AppointmentStatus, BookingError, BookingRequest, BookingService,
    InMemoryAppointmentRepository, RemoteAvailabilityClient,
};
use shared_config::AppConfig;
use shared_messaging::InMemoryEventBus;

fn config(base_url: &str) -> AppConfig {
    AppConfig {
        bind_port: 0,
        availability_service_url: base_url.to_string(),
        redis_url: None,
        http_timeout_secs: 2,
        retry_max_attempts: 2,
        retry_backoff_ms: 10,
        breaker_failure_threshold: 5,
        breaker_recovery_secs: 60,
        breaker_success_threshold: 2,
        appointment_created_queue: "appointment-created".to_string(),
        appointment_cancelled_queue: "appointment-cancelled".to_string(),
    }
}

async fn serve_availability(service: Arc<AvailabilityService>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, availability_routes(service))
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

async fn seed_monday_slots(
    availability: &AvailabilityService,
    slot_duration_minutes: u32,
) -> Vec<availability_cell::SlotView> {
    availability
        .create_recurring_slots(CreateRecurringSlotsRequest {
            provider_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            daily_start_time: "09:00:00".parse().unwrap(),
            daily_end_time: "10:00:00".parse().unwrap(),
            slot_duration_minutes,
            days_of_week: vec![Weekday::Mon],
            time_zone: "Europe/Madrid".to_string(),
        })
        .await
        .unwrap()
}

fn booking_replica(base_url: &str, bus: Arc<InMemoryEventBus>) -> BookingService {
    let cfg = config(base_url);
    BookingService::new(
        Arc::new(InMemoryAppointmentRepository::new()),
        Arc::new(RemoteAvailabilityClient::new(&cfg)),
        Arc::new(AppointmentEventPublisher::new(bus, &cfg)),
    )
}

fn request_for(slot: &availability_cell::SlotView) -> BookingRequest {
    BookingRequest {
        patient_id: Uuid::new_v4(),
        doctor_id: slot.provider_id,
        slot_id: slot.slot_id,
        appointment_date: slot.start_time.date_naive(),
        start_time: slot.start_time,
    }
}

#[tokio::test]
async fn book_cancel_rebook_frees_and_reclaims_the_slot() {
    let availability = Arc::new(AvailabilityService::new());
    let slots = seed_monday_slots(&availability, 60).await;
    assert_eq!(slots.len(), 1);
    let slot = &slots[0];

    let base_url = serve_availability(Arc::clone(&availability)).await;
    let bus = Arc::new(InMemoryEventBus::new());
    let service = booking_replica(&base_url, Arc::clone(&bus));

    // First booking wins the slot.
    let first = service.book_appointment(request_for(slot)).await.unwrap();
    assert_eq!(first.status, AppointmentStatus::Confirmed);

    // A second patient cannot take the same slot.
    let second = service.book_appointment(request_for(slot)).await;
    assert_matches!(second, Err(BookingError::SlotNotAvailable(id)) if id == slot.slot_id);

    // Cancelling releases the slot at the availability authority.
    let cancelled = service
        .cancel_appointment(first.appointment_id, Some("changed plans".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let listed = availability
        .list_availability(slot.provider_id, Some(slot.start_time), Some(slot.end_time))
        .await;
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].reserved);

    // The freed slot is bookable again.
    let third = service.book_appointment(request_for(slot)).await.unwrap();
    assert_eq!(third.status, AppointmentStatus::Confirmed);

    assert_eq!(bus.len("appointment-created").await, 2);
    assert_eq!(bus.len("appointment-cancelled").await, 1);
}

#[tokio::test]
async fn replicas_without_shared_state_still_get_one_winner() {
    let availability = Arc::new(AvailabilityService::new());
    let slots = seed_monday_slots(&availability, 60).await;
    let slot = slots[0].clone();

    let base_url = serve_availability(availability).await;
    let bus = Arc::new(InMemoryEventBus::new());

    // Separate replicas share no appointment store, so only the remote
    // conditional update can arbitrate.
    let mut handles = Vec::new();
    for _ in 0..8 {
        let replica = booking_replica(&base_url, Arc::clone(&bus));
        let request = request_for(&slot);
        handles.push(tokio::spawn(async move {
            replica.book_appointment(request).await
        }));
    }

    let mut confirmed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => confirmed += 1,
            Err(BookingError::SlotNotAvailable(_)) => rejected += 1,
            Err(other) => panic!("unexpected booking outcome: {}", other),
        }
    }

    assert_eq!(confirmed, 1);
    assert_eq!(rejected, 7);
    assert_eq!(bus.len("appointment-created").await, 1);
}

#[tokio::test]
async fn bookings_on_distinct_slots_do_not_interfere() {
    let availability = Arc::new(AvailabilityService::new());
    let slots = seed_monday_slots(&availability, 30).await;
    assert_eq!(slots.len(), 2);

    let base_url = serve_availability(availability).await;
    let bus = Arc::new(InMemoryEventBus::new());
    let service = booking_replica(&base_url, Arc::clone(&bus));

    for slot in &slots {
        let confirmation = service.book_appointment(request_for(slot)).await.unwrap();
        assert_eq!(confirmation.slot_id, slot.slot_id);
    }

    assert_eq!(bus.len("appointment-created").await, 2);
}
