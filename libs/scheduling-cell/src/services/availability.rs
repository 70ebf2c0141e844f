// libs/scheduling-cell/src/services/availability.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Timelike};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::ScheduleStoreClient;

use crate::models::{Appointment, AvailableDay, SchedulingError, Slot, SlotGrid};
use crate::services::slots::SlotGenerator;

/// Remove every grid slot whose start time exactly matches an occupied start
/// time.
///
/// Exclusion is exact-match on minute-truncated times, not interval overlap:
/// this mirrors the store comparing truncated HH:MM values. Because the grid
/// is regenerated from the provider's current duration on every query, starts
/// stay grid-aligned and exact-match coincides with overlap; revisit this if
/// bookings with mixed durations on one calendar ever become possible.
pub fn filter_available(grid: &SlotGrid, occupied: &HashSet<NaiveTime>) -> Vec<Slot> {
    grid.slots
        .iter()
        .filter(|slot| !occupied.contains(&slot.start_time))
        .copied()
        .collect()
}

/// Answers "which slots are open for this provider on this date", combining
/// the generated grid with the occupied start times held by the store.
/// Occupied results are never cached across requests.
pub struct AvailabilityService {
    store: Arc<ScheduleStoreClient>,
    generator: SlotGenerator,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(ScheduleStoreClient::new(config)),
            generator: SlotGenerator::from_config(config),
        }
    }

    pub fn with_store(store: Arc<ScheduleStoreClient>, generator: SlotGenerator) -> Self {
        Self { store, generator }
    }

    /// Provider configuration collaborator: the configured consultation
    /// duration, or `None` when unset/zero (callers fall back to the default
    /// grid).
    pub async fn get_provider_consultation_duration(
        &self,
        provider_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<i32>, SchedulingError> {
        let path = format!(
            "/rest/v1/providers?id=eq.{}&select=consultation_minutes",
            provider_id
        );
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let minutes = result
            .first()
            .and_then(|row| row["consultation_minutes"].as_i64())
            .map(|m| m as i32);

        Ok(minutes.filter(|m| *m > 0))
    }

    /// Start times already booked for active appointments of this provider
    /// on this date, truncated to minute precision.
    pub async fn get_occupied_start_times(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<HashSet<NaiveTime>, SchedulingError> {
        debug!(
            "Fetching occupied slots for provider {} on {}",
            provider_id, date
        );

        let path = format!(
            "/rest/v1/appointments?provider_id=eq.{}&date=eq.{}&status=in.(scheduled,confirmed)&select=start_time",
            provider_id, date
        );
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let mut occupied = HashSet::with_capacity(result.len());
        for row in result {
            let raw = row["start_time"].as_str().ok_or_else(|| {
                SchedulingError::Store("Occupied slot row missing start_time".to_string())
            })?;
            occupied.insert(parse_minute_time(raw)?);
        }

        Ok(occupied)
    }

    /// Build the availability picture for one provider/date.
    ///
    /// When `exclude_appointment` is the appointment being rescheduled, its
    /// own current slot is removed from the occupied set first, so the slot
    /// it already holds remains selectable.
    pub async fn available_day(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        exclude_appointment: Option<&Appointment>,
        auth_token: &str,
    ) -> Result<AvailableDay, SchedulingError> {
        let duration = self
            .get_provider_consultation_duration(provider_id, auth_token)
            .await?;

        let grid = self.generator.generate(duration);
        if grid.default_step_used {
            warn!(
                "Provider {} has no configured consultation duration, using default {} minute grid",
                provider_id, grid.step_minutes
            );
        }

        let mut occupied = self
            .get_occupied_start_times(provider_id, date, auth_token)
            .await?;

        if let Some(appointment) = exclude_appointment {
            if appointment.provider_id == provider_id && appointment.date == date {
                occupied.remove(&appointment.start_time);
            }
        }

        let available = filter_available(&grid, &occupied);
        debug!(
            "Provider {} on {}: {} of {} slots available",
            provider_id,
            date,
            available.len(),
            grid.slots.len()
        );

        Ok(AvailableDay {
            provider_id,
            date,
            grid,
            available,
        })
    }
}

fn parse_minute_time(raw: &str) -> Result<NaiveTime, SchedulingError> {
    let parsed = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| SchedulingError::Store(format!("Invalid start_time '{}': {}", raw, e)))?;

    // Minute precision only; seconds in store rows are noise.
    NaiveTime::from_hms_opt(parsed.hour(), parsed.minute(), 0)
        .ok_or_else(|| SchedulingError::Store(format!("Invalid start_time '{}'", raw)))
}
