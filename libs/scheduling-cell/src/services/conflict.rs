// libs/scheduling-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::ScheduleStoreClient;

use crate::models::SchedulingError;

/// Final server-side availability re-check, run immediately before a booking
/// or reschedule is committed. It closes the window between the grid the user
/// saw and the moment they submitted; the store's own conflict rejection on
/// insert remains the source of truth if this pre-check races.
pub struct ConflictGuard {
    store: Arc<ScheduleStoreClient>,
}

impl ConflictGuard {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(ScheduleStoreClient::new(config)),
        }
    }

    pub fn with_store(store: Arc<ScheduleStoreClient>) -> Self {
        Self { store }
    }

    /// True when no active appointment of this provider occupies that exact
    /// start time on that date.
    ///
    /// `exclude_appointment_id` is the appointment being edited: its own row
    /// must not count as a conflict, so a reschedule onto the slot it already
    /// holds (or a duration-only edit) passes the guard.
    pub async fn verify_availability(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<bool, SchedulingError> {
        debug!(
            "Verifying availability for provider {} on {} at {}",
            provider_id, date, start_time
        );

        let mut path = format!(
            "/rest/v1/appointments?provider_id=eq.{}&date=eq.{}&start_time=eq.{}&status=in.(scheduled,confirmed)&select=id",
            provider_id,
            date,
            urlencoding::encode(&start_time.format("%H:%M:%S").to_string())
        );
        if let Some(exclude_id) = exclude_appointment_id {
            path.push_str(&format!("&id=neq.{}", exclude_id));
        }
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(result.is_empty())
    }

    /// Reject with `Conflict` when the slot is no longer free. Callers must
    /// then re-fetch the grid and re-prompt; the engine never retries the
    /// stale slot and never substitutes another one.
    pub async fn ensure_available(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<(), SchedulingError> {
        if self
            .verify_availability(provider_id, date, start_time, exclude_appointment_id, auth_token)
            .await?
        {
            Ok(())
        } else {
            warn!(
                "Slot {} on {} for provider {} was taken between display and submit",
                start_time, date, provider_id
            );
            Err(SchedulingError::Conflict)
        }
    }
}
