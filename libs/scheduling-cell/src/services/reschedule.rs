// libs/scheduling-cell/src/services/reschedule.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::ScheduleStoreClient;

use crate::models::{Appointment, RescheduleAppointmentRequest, SchedulingError};
use crate::services::availability::AvailabilityService;
use crate::services::conflict::ConflictGuard;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::slots::SlotGenerator;

/// Orchestrates editing an existing appointment's date/time: re-derives the
/// slot grid with the provider's current duration, keeps the appointment's
/// own slot selectable, requires the new start to be on the filtered grid,
/// and re-runs the conflict guard before the single schedule update.
pub struct RescheduleCoordinator {
    store: Arc<ScheduleStoreClient>,
    availability: AvailabilityService,
    guard: ConflictGuard,
    lifecycle: AppointmentLifecycleService,
}

impl RescheduleCoordinator {
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(ScheduleStoreClient::new(config));
        let availability = AvailabilityService::with_store(
            Arc::clone(&store),
            SlotGenerator::from_config(config),
        );
        let guard = ConflictGuard::with_store(Arc::clone(&store));
        let lifecycle = AppointmentLifecycleService::with_store(Arc::clone(&store));

        Self {
            store,
            availability,
            guard,
            lifecycle,
        }
    }

    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Rescheduling appointment: {}", appointment_id);

        let current = self
            .lifecycle
            .get_appointment(appointment_id, auth_token)
            .await?;

        if current.status.is_terminal() {
            return Err(SchedulingError::InvalidTransition(current.status));
        }

        // The grid is re-derived with the provider's *current* configured
        // duration; the appointment's own duration only changes when the
        // edit explicitly passes one.
        let day = self
            .availability
            .available_day(
                current.provider_id,
                request.new_date,
                Some(&current),
                auth_token,
            )
            .await?;

        if day.available.is_empty() {
            return Err(SchedulingError::NoAvailability);
        }

        if !day.grid.contains(request.new_start_time) {
            return Err(SchedulingError::Validation(format!(
                "{} is not on the provider's slot grid",
                request.new_start_time.format("%H:%M")
            )));
        }

        if !day.is_available(request.new_start_time) {
            return Err(SchedulingError::Conflict);
        }

        // The guard must ignore the appointment's own row, otherwise a
        // same-slot resubmit or duration-only edit could never pass.
        self.guard
            .ensure_available(
                current.provider_id,
                request.new_date,
                request.new_start_time,
                Some(current.id),
                auth_token,
            )
            .await?;

        let updated = self.submit_update(&current, &request, auth_token).await?;

        info!(
            "Appointment {} rescheduled to {} {}",
            appointment_id, request.new_date, request.new_start_time
        );
        Ok(updated)
    }

    async fn submit_update(
        &self,
        current: &Appointment,
        request: &RescheduleAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let mut update_data = serde_json::Map::new();
        update_data.insert("date".to_string(), json!(request.new_date));
        update_data.insert(
            "start_time".to_string(),
            json!(request.new_start_time.format("%H:%M:%S").to_string()),
        );
        if let Some(new_duration) = request.new_duration_minutes {
            if new_duration <= 0 {
                return Err(SchedulingError::Validation(
                    "Duration must be positive".to_string(),
                ));
            }
            update_data.insert("duration_minutes".to_string(), json!(new_duration));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", current.id);
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
