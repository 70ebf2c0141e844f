use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scheduling_cell::models::{
    AppointmentStatus, BookAppointmentRequest, CancelAppointmentRequest, CancelledBy,
    RescheduleAppointmentRequest, SchedulingError,
};
use scheduling_cell::services::availability::AvailabilityService;
use scheduling_cell::services::booking::BookingService;
use scheduling_cell::services::conflict::ConflictGuard;
use scheduling_cell::services::lifecycle::AppointmentLifecycleService;
use scheduling_cell::services::reschedule::RescheduleCoordinator;
use shared_config::{AppConfig, SchedulingWindow};

const AUTH_TOKEN: &str = "test-token";

fn test_config(store_url: &str) -> AppConfig {
    AppConfig {
        store_url: store_url.to_string(),
        store_api_key: "test-api-key".to_string(),
        window: SchedulingWindow::default(),
        default_slot_minutes: 30,
    }
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
}

fn appointment_row(
    id: Uuid,
    provider_id: Uuid,
    date: NaiveDate,
    start_time: &str,
    status: &str,
) -> Value {
    json!({
        "id": id,
        "provider_id": provider_id,
        "patient_id": Uuid::new_v4(),
        "specialty_id": Uuid::new_v4(),
        "date": date,
        "start_time": start_time,
        "duration_minutes": 30,
        "status": status,
        "payment_method": "health_plan",
        "value": 120.0,
        "observations": null,
        "cancel_reason": if status == "cancelled" { json!("Patient request") } else { Value::Null },
        "cancelled_by": if status == "cancelled" { json!("patient") } else { Value::Null },
        "created_at": "2026-09-01T10:00:00Z",
        "updated_at": "2026-09-01T10:00:00Z"
    })
}

async fn mock_provider_duration(server: &MockServer, provider_id: Uuid, minutes: Option<i32>) {
    let body = match minutes {
        Some(m) => json!([{ "consultation_minutes": m }]),
        None => json!([{ "consultation_minutes": null }]),
    };
    Mock::given(method("GET"))
        .and(path("/rest/v1/providers"))
        .and(query_param("id", format!("eq.{}", provider_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_occupied(server: &MockServer, provider_id: Uuid, starts: &[&str]) {
    let rows: Vec<Value> = starts.iter().map(|s| json!({ "start_time": s })).collect();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("provider_id", format!("eq.{}", provider_id)))
        .and(query_param("select", "start_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(rows)))
        .mount(server)
        .await;
}

async fn mock_verify(server: &MockServer, provider_id: Uuid, taken: bool) {
    let body = if taken {
        json!([{ "id": Uuid::new_v4() }])
    } else {
        json!([])
    };
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("provider_id", format!("eq.{}", provider_id)))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[tokio::test]
async fn available_day_excludes_occupied_start_times() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    mock_provider_duration(&server, provider_id, Some(30)).await;
    mock_occupied(&server, provider_id, &["08:30:00"]).await;

    let availability = AvailabilityService::new(&test_config(&server.uri()));
    let day = availability
        .available_day(provider_id, d(10), None, AUTH_TOKEN)
        .await
        .unwrap();

    assert_eq!(day.grid.slots.len(), 20);
    assert_eq!(day.available.len(), 19);
    assert!(!day.is_available(t(8, 30)));
    assert!(day.is_available(t(8, 0)));
}

#[tokio::test]
async fn unconfigured_provider_gets_default_grid_with_warning_flag() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    mock_provider_duration(&server, provider_id, None).await;
    mock_occupied(&server, provider_id, &[]).await;

    let availability = AvailabilityService::new(&test_config(&server.uri()));
    let day = availability
        .available_day(provider_id, d(10), None, AUTH_TOKEN)
        .await
        .unwrap();

    assert!(day.grid.default_step_used);
    assert_eq!(day.grid.step_minutes, 30);
    assert_eq!(day.available.len(), 20);
}

#[tokio::test]
async fn rescheduled_appointments_own_slot_stays_selectable() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    mock_provider_duration(&server, provider_id, Some(30)).await;
    mock_occupied(&server, provider_id, &["09:00:00"]).await;

    let current: scheduling_cell::models::Appointment = serde_json::from_value(appointment_row(
        Uuid::new_v4(),
        provider_id,
        d(10),
        "09:00:00",
        "scheduled",
    ))
    .unwrap();

    let availability = AvailabilityService::new(&test_config(&server.uri()));
    let day = availability
        .available_day(provider_id, d(10), Some(&current), AUTH_TOKEN)
        .await
        .unwrap();

    assert!(day.is_available(t(9, 0)));
    assert_eq!(day.available.len(), 20);
}

#[tokio::test]
async fn store_failure_surfaces_as_unavailable() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    mock_provider_duration(&server, provider_id, Some(30)).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let availability = AvailabilityService::new(&test_config(&server.uri()));
    let result = availability
        .available_day(provider_id, d(10), None, AUTH_TOKEN)
        .await;

    assert_matches!(result, Err(SchedulingError::StoreUnavailable(_)));
}

// ==============================================================================
// BOOKING AND CONFLICT GUARD
// ==============================================================================

#[tokio::test]
async fn booking_a_free_slot_creates_a_scheduled_appointment() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    mock_provider_duration(&server, provider_id, Some(40)).await;
    mock_verify(&server, provider_id, false).await;

    let mut created = appointment_row(appointment_id, provider_id, d(10), "09:20:00", "scheduled");
    created["duration_minutes"] = json!(40);
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([created])))
        .expect(1)
        .mount(&server)
        .await;

    let booking = BookingService::new(&test_config(&server.uri()));
    let request = BookAppointmentRequest {
        provider_id,
        patient_id: Uuid::new_v4(),
        specialty_id: Uuid::new_v4(),
        date: d(10),
        start_time: t(9, 20),
        payment_method_code: 4,
        value: 120.0,
        observations: None,
    };

    let appointment = booking.book(request, AUTH_TOKEN).await.unwrap();

    assert_eq!(appointment.id, appointment_id);
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.start_time, t(9, 20));
    assert_eq!(appointment.duration_minutes, 40);
}

#[tokio::test]
async fn conflict_guard_rejects_taken_slot_before_any_insert() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    mock_provider_duration(&server, provider_id, Some(40)).await;
    mock_verify(&server, provider_id, true).await;

    // A failed guard must never reach the create call.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let booking = BookingService::new(&test_config(&server.uri()));
    let request = BookAppointmentRequest {
        provider_id,
        patient_id: Uuid::new_v4(),
        specialty_id: Uuid::new_v4(),
        date: d(10),
        start_time: t(9, 20),
        payment_method_code: 1,
        value: 80.0,
        observations: None,
    };

    let result = booking.book(request, AUTH_TOKEN).await;

    assert_matches!(result, Err(SchedulingError::Conflict));
}

#[tokio::test]
async fn store_level_conflict_on_insert_is_surfaced_as_conflict() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    mock_provider_duration(&server, provider_id, Some(40)).await;
    // The pre-check raced: it saw the slot free, but the store's own
    // invariant check rejects the insert.
    mock_verify(&server, provider_id, false).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate active booking"))
        .mount(&server)
        .await;

    let booking = BookingService::new(&test_config(&server.uri()));
    let request = BookAppointmentRequest {
        provider_id,
        patient_id: Uuid::new_v4(),
        specialty_id: Uuid::new_v4(),
        date: d(10),
        start_time: t(9, 20),
        payment_method_code: 2,
        value: 150.0,
        observations: Some("second client racing for the slot".to_string()),
    };

    let result = booking.book(request, AUTH_TOKEN).await;

    assert_matches!(result, Err(SchedulingError::Conflict));
}

#[tokio::test]
async fn unknown_payment_code_is_rejected_before_store_calls() {
    let server = MockServer::start().await;

    let booking = BookingService::new(&test_config(&server.uri()));
    let request = BookAppointmentRequest {
        provider_id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        specialty_id: Uuid::new_v4(),
        date: d(10),
        start_time: t(9, 0),
        payment_method_code: 42,
        value: 100.0,
        observations: None,
    };

    let result = booking.book(request, AUTH_TOKEN).await;

    assert_matches!(result, Err(SchedulingError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn negative_value_is_rejected() {
    let server = MockServer::start().await;

    let booking = BookingService::new(&test_config(&server.uri()));
    let request = BookAppointmentRequest {
        provider_id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        specialty_id: Uuid::new_v4(),
        date: d(10),
        start_time: t(9, 0),
        payment_method_code: 1,
        value: -1.0,
        observations: None,
    };

    assert_matches!(
        booking.book(request, AUTH_TOKEN).await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn verify_availability_reports_free_and_taken_slots() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    mock_verify(&server, provider_id, false).await;

    let guard = ConflictGuard::new(&test_config(&server.uri()));
    let available = guard
        .verify_availability(provider_id, d(10), t(9, 20), None, AUTH_TOKEN)
        .await
        .unwrap();

    assert!(available);
}

#[tokio::test]
async fn unconfigured_provider_books_with_the_configured_default_duration() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    mock_provider_duration(&server, provider_id, None).await;
    mock_verify(&server, provider_id, false).await;

    // The persisted duration must equal the step of the grid the patient
    // picked from, 20 minutes here, not the built-in 30.
    let mut created = appointment_row(appointment_id, provider_id, d(10), "08:20:00", "scheduled");
    created["duration_minutes"] = json!(20);
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "duration_minutes": 20 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([created])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.default_slot_minutes = 20;

    let booking = BookingService::new(&config);
    let request = BookAppointmentRequest {
        provider_id,
        patient_id: Uuid::new_v4(),
        specialty_id: Uuid::new_v4(),
        date: d(10),
        start_time: t(8, 20),
        payment_method_code: 1,
        value: 90.0,
        observations: None,
    };

    let appointment = booking.book(request, AUTH_TOKEN).await.unwrap();

    assert_eq!(appointment.duration_minutes, 20);
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[tokio::test]
async fn cancelling_with_a_reason_updates_the_appointment() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "scheduled")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "cancelled")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let lifecycle = AppointmentLifecycleService::new(&test_config(&server.uri()));
    let cancelled = lifecycle
        .cancel(
            appointment_id,
            CancelAppointmentRequest {
                reason: "Patient request".to_string(),
                cancelled_by: CancelledBy::Patient,
            },
            AUTH_TOKEN,
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("Patient request"));
}

#[tokio::test]
async fn cancelling_without_a_reason_never_reaches_the_store() {
    let server = MockServer::start().await;

    let lifecycle = AppointmentLifecycleService::new(&test_config(&server.uri()));
    let result = lifecycle
        .cancel(
            Uuid::new_v4(),
            CancelAppointmentRequest {
                reason: "".to_string(),
                cancelled_by: CancelledBy::Staff,
            },
            AUTH_TOKEN,
        )
        .await;

    assert_matches!(result, Err(SchedulingError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn transitions_from_terminal_states_are_rejected() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let completed_id = Uuid::new_v4();
    let cancelled_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", completed_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(completed_id, provider_id, d(10), "09:00:00", "completed")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", cancelled_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(cancelled_id, provider_id, d(10), "10:00:00", "cancelled")
        ])))
        .mount(&server)
        .await;

    let lifecycle = AppointmentLifecycleService::new(&test_config(&server.uri()));

    assert_matches!(
        lifecycle.confirm(completed_id, AUTH_TOKEN).await,
        Err(SchedulingError::InvalidTransition(AppointmentStatus::Completed))
    );
    assert_matches!(
        lifecycle
            .cancel(
                cancelled_id,
                CancelAppointmentRequest {
                    reason: "too late".to_string(),
                    cancelled_by: CancelledBy::Provider,
                },
                AUTH_TOKEN,
            )
            .await,
        Err(SchedulingError::InvalidTransition(AppointmentStatus::Cancelled))
    );
}

#[tokio::test]
async fn confirming_a_scheduled_appointment_succeeds() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "scheduled")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "confirmed")
        ])))
        .mount(&server)
        .await;

    let lifecycle = AppointmentLifecycleService::new(&test_config(&server.uri()));
    let confirmed = lifecycle.confirm(appointment_id, AUTH_TOKEN).await.unwrap();

    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
}

// ==============================================================================
// RESCHEDULING
// ==============================================================================

#[tokio::test]
async fn rescheduling_to_a_free_grid_slot_updates_the_appointment() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "scheduled")
        ])))
        .mount(&server)
        .await;
    mock_provider_duration(&server, provider_id, Some(30)).await;
    // The appointment's own 09:00 slot is the only occupied one.
    mock_occupied(&server, provider_id, &["09:00:00"]).await;
    mock_verify(&server, provider_id, false).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "10:30:00", "scheduled")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = RescheduleCoordinator::new(&test_config(&server.uri()));
    let updated = coordinator
        .reschedule(
            appointment_id,
            RescheduleAppointmentRequest {
                new_date: d(10),
                new_start_time: t(10, 30),
                new_duration_minutes: None,
            },
            AUTH_TOKEN,
        )
        .await
        .unwrap();

    assert_eq!(updated.start_time, t(10, 30));
    assert_eq!(updated.status, AppointmentStatus::Scheduled);
}

#[tokio::test]
async fn rescheduling_onto_the_own_slot_succeeds() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "scheduled")
        ])))
        .mount(&server)
        .await;
    mock_provider_duration(&server, provider_id, Some(30)).await;
    // The only occupied slot is the appointment's own.
    mock_occupied(&server, provider_id, &["09:00:00"]).await;

    // The guard must exclude the edited appointment's row; with the
    // exclusion in place the store sees no other booking at 09:00.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "id"))
        .and(query_param("id", format!("neq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut updated_row = appointment_row(appointment_id, provider_id, d(10), "09:00:00", "scheduled");
    updated_row["duration_minutes"] = json!(45);
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated_row])))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = RescheduleCoordinator::new(&test_config(&server.uri()));
    // Duration-only edit: same date and slot, new length.
    let updated = coordinator
        .reschedule(
            appointment_id,
            RescheduleAppointmentRequest {
                new_date: d(10),
                new_start_time: t(9, 0),
                new_duration_minutes: Some(45),
            },
            AUTH_TOKEN,
        )
        .await
        .unwrap();

    assert_eq!(updated.start_time, t(9, 0));
    assert_eq!(updated.duration_minutes, 45);
}

#[tokio::test]
async fn rescheduling_onto_an_occupied_slot_is_a_conflict() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "confirmed")
        ])))
        .mount(&server)
        .await;
    mock_provider_duration(&server, provider_id, Some(30)).await;
    mock_occupied(&server, provider_id, &["09:00:00", "10:30:00"]).await;

    let coordinator = RescheduleCoordinator::new(&test_config(&server.uri()));
    let result = coordinator
        .reschedule(
            appointment_id,
            RescheduleAppointmentRequest {
                new_date: d(10),
                new_start_time: t(10, 30),
                new_duration_minutes: None,
            },
            AUTH_TOKEN,
        )
        .await;

    assert_matches!(result, Err(SchedulingError::Conflict));
}

#[tokio::test]
async fn rescheduling_off_the_grid_is_a_validation_error() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "scheduled")
        ])))
        .mount(&server)
        .await;
    mock_provider_duration(&server, provider_id, Some(30)).await;
    mock_occupied(&server, provider_id, &[]).await;

    let coordinator = RescheduleCoordinator::new(&test_config(&server.uri()));
    // 10:15 is not on a 30-minute grid starting at 08:00.
    let result = coordinator
        .reschedule(
            appointment_id,
            RescheduleAppointmentRequest {
                new_date: d(10),
                new_start_time: t(10, 15),
                new_duration_minutes: None,
            },
            AUTH_TOKEN,
        )
        .await;

    assert_matches!(result, Err(SchedulingError::Validation(_)));
}

#[tokio::test]
async fn rescheduling_a_terminal_appointment_is_rejected() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, provider_id, d(10), "09:00:00", "completed")
        ])))
        .mount(&server)
        .await;

    let coordinator = RescheduleCoordinator::new(&test_config(&server.uri()));
    let result = coordinator
        .reschedule(
            appointment_id,
            RescheduleAppointmentRequest {
                new_date: d(11),
                new_start_time: t(9, 0),
                new_duration_minutes: None,
            },
            AUTH_TOKEN,
        )
        .await;

    assert_matches!(result, Err(SchedulingError::InvalidTransition(_)));
}
