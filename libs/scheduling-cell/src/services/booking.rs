// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::ScheduleStoreClient;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, PaymentMethod, SchedulingError,
};
use crate::services::availability::AvailabilityService;
use crate::services::conflict::ConflictGuard;
use crate::services::slots::SlotGenerator;

/// A booking that has passed local validation but has not been acknowledged
/// by the store. Nothing built from it is authoritative until the store
/// returns the created row; a guard or store rejection simply drops it.
#[derive(Debug, Clone)]
pub struct PendingBooking {
    pub provider_id: Uuid,
    pub patient_id: Uuid,
    pub specialty_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub payment_method: PaymentMethod,
    pub value: f64,
    pub observations: Option<String>,
}

impl PendingBooking {
    fn into_record(self, now: DateTime<Utc>) -> Value {
        json!({
            "provider_id": self.provider_id,
            "patient_id": self.patient_id,
            "specialty_id": self.specialty_id,
            "date": self.date,
            "start_time": self.start_time.format("%H:%M:%S").to_string(),
            "duration_minutes": self.duration_minutes,
            "status": AppointmentStatus::Scheduled.to_string(),
            "payment_method": self.payment_method.to_string(),
            "value": self.value,
            "observations": self.observations,
            "cancel_reason": Value::Null,
            "cancelled_by": Value::Null,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        })
    }
}

/// Creates appointments: validate, run the conflict guard, then a single
/// store insert. The store re-validates the no-double-booking invariant on
/// insert, so a race that slips past the guard still fails with `Conflict`.
pub struct BookingService {
    store: Arc<ScheduleStoreClient>,
    availability: AvailabilityService,
    guard: ConflictGuard,
    default_slot_minutes: i32,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(ScheduleStoreClient::new(config));
        let availability = AvailabilityService::with_store(
            Arc::clone(&store),
            SlotGenerator::from_config(config),
        );
        let guard = ConflictGuard::with_store(Arc::clone(&store));

        Self {
            store,
            availability,
            guard,
            default_slot_minutes: config.default_slot_minutes,
        }
    }

    pub async fn book(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking appointment for patient {} with provider {} on {} at {}",
            request.patient_id, request.provider_id, request.date, request.start_time
        );

        let pending = self.validate(request, auth_token).await?;

        // Last pre-commit check; on rejection the caller re-fetches the grid
        // and the pending booking is discarded.
        self.guard
            .ensure_available(
                pending.provider_id,
                pending.date,
                pending.start_time,
                None,
                auth_token,
            )
            .await?;

        let appointment = self.submit(pending, auth_token).await?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    async fn validate(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<PendingBooking, SchedulingError> {
        let payment_method = PaymentMethod::from_code(request.payment_method_code)?;

        if request.value < 0.0 {
            return Err(SchedulingError::Validation(
                "Appointment value cannot be negative".to_string(),
            ));
        }

        // Duration is copied from the provider's configured consultation
        // duration at creation time and not recomputed later.
        let configured = self
            .availability
            .get_provider_consultation_duration(request.provider_id, auth_token)
            .await?;

        // The fallback must match the grid step the patient picked from, so
        // it uses the same configured default as the slot generator.
        let duration_minutes = match configured {
            Some(minutes) => minutes,
            None => {
                warn!(
                    "Provider {} has no configured consultation duration, booking with default {} minutes",
                    request.provider_id, self.default_slot_minutes
                );
                self.default_slot_minutes
            }
        };

        Ok(PendingBooking {
            provider_id: request.provider_id,
            patient_id: request.patient_id,
            specialty_id: request.specialty_id,
            date: request.date,
            start_time: request.start_time,
            duration_minutes,
            payment_method,
            value: request.value,
            observations: request.observations,
        })
    }

    async fn submit(
        &self,
        pending: PendingBooking,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        debug!(
            "Submitting booking for provider {} on {} at {}",
            pending.provider_id, pending.date, pending.start_time
        );

        let record = pending.into_record(Utc::now());

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(record),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| SchedulingError::Store("Store returned no created row".to_string()))?;

        serde_json::from_value(row).map_err(|e| {
            SchedulingError::Store(format!("Failed to parse created appointment: {}", e))
        })
    }
}
