// libs/scheduling-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::ScheduleStoreClient;

use crate::models::{
    Appointment, AppointmentStatus, CancelAppointmentRequest, SchedulingError,
};

/// Minimum length for a cancellation reason, after trimming.
pub const MIN_CANCEL_REASON_CHARS: usize = 3;

/// Allowed next statuses for a given current status.
///
/// Transitions are one-directional; `Completed` and `Cancelled` are terminal.
/// Re-confirming a confirmed appointment is allowed and idempotent.
pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
    match current {
        AppointmentStatus::Scheduled => &[
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ],
        AppointmentStatus::Confirmed => &[
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ],
        AppointmentStatus::Completed => &[],
        AppointmentStatus::Cancelled => &[],
    }
}

pub fn validate_transition(
    current: AppointmentStatus,
    next: AppointmentStatus,
) -> Result<(), SchedulingError> {
    debug!("Validating status transition {} -> {}", current, next);

    if !valid_transitions(current).contains(&next) {
        warn!("Invalid status transition attempted: {} -> {}", current, next);
        return Err(SchedulingError::InvalidTransition(current));
    }

    Ok(())
}

pub fn validate_cancel_reason(reason: &str) -> Result<(), SchedulingError> {
    if reason.trim().chars().count() < MIN_CANCEL_REASON_CHARS {
        return Err(SchedulingError::Validation(format!(
            "Cancellation reason must be at least {} characters",
            MIN_CANCEL_REASON_CHARS
        )));
    }
    Ok(())
}

/// Governs status transitions. Each transition is validated against the
/// state machine locally and then applied through a single store mutation;
/// only the store's acknowledged row is authoritative.
pub struct AppointmentLifecycleService {
    store: Arc<ScheduleStoreClient>,
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(ScheduleStoreClient::new(config)),
        }
    }

    pub fn with_store(store: Arc<ScheduleStoreClient>) -> Self {
        Self { store }
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result.into_iter().next().ok_or(SchedulingError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| SchedulingError::Store(format!("Failed to parse appointment: {}", e)))
    }

    pub async fn confirm(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;
        // No slot re-check: a confirmed appointment already holds its slot.
        validate_transition(current.status, AppointmentStatus::Confirmed)?;

        let updated = self
            .apply_status(
                appointment_id,
                AppointmentStatus::Confirmed,
                serde_json::Map::new(),
                auth_token,
            )
            .await?;

        info!("Appointment {} confirmed", appointment_id);
        Ok(updated)
    }

    /// Cancel with a mandatory reason. Cancelling frees the slot: the store
    /// excludes cancelled appointments from occupied-slot queries.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        validate_cancel_reason(&request.reason)?;

        let current = self.get_appointment(appointment_id, auth_token).await?;
        validate_transition(current.status, AppointmentStatus::Cancelled)?;

        let mut metadata = serde_json::Map::new();
        metadata.insert("cancel_reason".to_string(), json!(request.reason.trim()));
        metadata.insert(
            "cancelled_by".to_string(),
            json!(request.cancelled_by.to_string()),
        );

        let updated = self
            .apply_status(appointment_id, AppointmentStatus::Cancelled, metadata, auth_token)
            .await?;

        info!(
            "Appointment {} cancelled by {}",
            appointment_id, request.cancelled_by
        );
        Ok(updated)
    }

    pub async fn complete(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;
        validate_transition(current.status, AppointmentStatus::Completed)?;

        let updated = self
            .apply_status(
                appointment_id,
                AppointmentStatus::Completed,
                serde_json::Map::new(),
                auth_token,
            )
            .await?;

        info!("Appointment {} completed", appointment_id);
        Ok(updated)
    }

    async fn apply_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        mut update_data: serde_json::Map<String, Value>,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        update_data.insert("status".to_string(), json!(new_status.to_string()));
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await?;

        let row = result.into_iter().next().ok_or(SchedulingError::NotFound)?;
        serde_json::from_value(row).map_err(|e| {
            SchedulingError::Store(format!("Failed to parse updated appointment: {}", e))
        })
    }
}
