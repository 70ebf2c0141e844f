// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::{
    BookAppointmentRequest, CancelAppointmentRequest, RescheduleAppointmentRequest,
    SchedulingError,
};
use crate::services::availability::AvailabilityService;
use crate::services::booking::BookingService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::reschedule::RescheduleCoordinator;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct SlotsQueryParams {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    /// Set when editing an existing appointment so its own slot stays
    /// selectable.
    pub exclude_appointment_id: Option<Uuid>,
}

fn map_error(err: SchedulingError) -> AppError {
    match err {
        SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        SchedulingError::NoAvailability => {
            AppError::Conflict("No available slots for this date, choose another day".to_string())
        }
        SchedulingError::Conflict => {
            AppError::Conflict("Slot is no longer available, please pick another slot".to_string())
        }
        SchedulingError::InvalidTransition(status) => AppError::BadRequest(format!(
            "Appointment cannot be modified in current status: {}",
            status
        )),
        SchedulingError::Validation(msg) => AppError::BadRequest(msg),
        SchedulingError::Store(msg) => AppError::Internal(msg),
        SchedulingError::StoreUnavailable(_) => AppError::ExternalService(
            "Appointment store unavailable, please try again".to_string(),
        ),
    }
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(params): Query<SlotsQueryParams>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let availability = AvailabilityService::new(&state);
    let lifecycle = AppointmentLifecycleService::new(&state);

    let excluded = match params.exclude_appointment_id {
        Some(id) => Some(lifecycle.get_appointment(id, token).await.map_err(map_error)?),
        None => None,
    };

    let day = availability
        .available_day(params.provider_id, params.date, excluded.as_ref(), token)
        .await
        .map_err(map_error)?;

    let mut body = json!({
        "success": true,
        "provider_id": day.provider_id,
        "date": day.date,
        "step_minutes": day.grid.step_minutes,
        "slots": day.available,
    });

    // Non-fatal conditions the operator/user must see.
    if day.grid.default_step_used {
        body["warning"] = json!("Provider has no configured consultation duration; default grid used");
    }
    if day.available.is_empty() {
        body["message"] = json!("No availability for this date, please choose another day");
    }

    Ok(Json(body))
}

// ==============================================================================
// BOOKING AND LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);

    let appointment = booking_service
        .book(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);

    let appointment = lifecycle
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);

    let appointment = lifecycle
        .confirm(appointment_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment confirmed"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);

    let appointment = lifecycle
        .cancel(appointment_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled"
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);

    let appointment = lifecycle
        .complete(appointment_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment completed"
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let coordinator = RescheduleCoordinator::new(&state);

    let appointment = coordinator
        .reschedule(appointment_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled"
    })))
}
