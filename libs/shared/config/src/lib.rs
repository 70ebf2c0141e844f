use std::env;

use chrono::NaiveTime;
use tracing::warn;

/// Consultation grid step used when a provider has no configured duration.
pub const DEFAULT_SLOT_MINUTES: i32 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub window: SchedulingWindow,
    pub default_slot_minutes: i32,
}

/// Working-hours window slots are generated inside. Clinic-wide for now,
/// but kept as configuration since per-provider hours are a likely
/// variation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for SchedulingWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).expect("valid literal time"),
            end: NaiveTime::from_hms_opt(18, 0, 0).expect("valid literal time"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("APPOINTMENT_STORE_URL").unwrap_or_else(|_| {
                warn!("APPOINTMENT_STORE_URL not set, using empty value");
                String::new()
            }),
            store_api_key: env::var("APPOINTMENT_STORE_API_KEY").unwrap_or_else(|_| {
                warn!("APPOINTMENT_STORE_API_KEY not set, using empty value");
                String::new()
            }),
            window: SchedulingWindow {
                start: parse_time_var("CLINIC_DAY_WINDOW_START", SchedulingWindow::default().start),
                end: parse_time_var("CLINIC_DAY_WINDOW_END", SchedulingWindow::default().end),
            },
            default_slot_minutes: env::var("CLINIC_DEFAULT_SLOT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SLOT_MINUTES),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty() && !self.store_api_key.is_empty()
    }
}

fn parse_time_var(name: &str, fallback: NaiveTime) -> NaiveTime {
    match env::var(name) {
        Ok(raw) => NaiveTime::parse_from_str(&raw, "%H:%M").unwrap_or_else(|_| {
            warn!("{} is not a valid HH:MM time, using default", name);
            fallback
        }),
        Err(_) => fallback,
    }
}
