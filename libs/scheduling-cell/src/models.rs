// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_store::StoreError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub patient_id: Uuid,
    pub specialty_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub payment_method: PaymentMethod,
    pub value: f64,
    pub observations: Option<String>,
    pub cancel_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// End of the booked interval, derived from start and duration.
    pub fn end_time(&self) -> NaiveTime {
        self.start_time + chrono::Duration::minutes(self.duration_minutes as i64)
    }

    /// Active appointments count against the provider's availability.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Patient,
    Provider,
    Staff,
}

impl fmt::Display for CancelledBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelledBy::Patient => write!(f, "patient"),
            CancelledBy::Provider => write!(f, "provider"),
            CancelledBy::Staff => write!(f, "staff"),
        }
    }
}

/// Billing method for an appointment. The mapping from legacy numeric codes
/// is total: an unknown code is a validation error, never a silent default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    HealthPlan,
    BankTransfer,
}

impl PaymentMethod {
    pub fn from_code(code: i32) -> Result<Self, SchedulingError> {
        match code {
            1 => Ok(PaymentMethod::Cash),
            2 => Ok(PaymentMethod::CreditCard),
            3 => Ok(PaymentMethod::DebitCard),
            4 => Ok(PaymentMethod::HealthPlan),
            5 => Ok(PaymentMethod::BankTransfer),
            other => Err(SchedulingError::Validation(format!(
                "Unknown payment method code: {}",
                other
            ))),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            PaymentMethod::Cash => 1,
            PaymentMethod::CreditCard => 2,
            PaymentMethod::DebitCard => 3,
            PaymentMethod::HealthPlan => 4,
            PaymentMethod::BankTransfer => 5,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::CreditCard => write!(f, "credit_card"),
            PaymentMethod::DebitCard => write!(f, "debit_card"),
            PaymentMethod::HealthPlan => write!(f, "health_plan"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
        }
    }
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

/// A candidate appointment start time. Ephemeral: produced per query,
/// never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    pub start_time: NaiveTime,
}

/// The full ordered grid of candidate slots for one provider and date,
/// before any occupied-slot filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    pub slots: Vec<Slot>,
    pub step_minutes: i32,
    /// True when the provider had no configured consultation duration and
    /// the clinic default grid was used. Non-fatal; callers surface a
    /// warning to the operator.
    pub default_step_used: bool,
}

impl SlotGrid {
    pub fn contains(&self, start_time: NaiveTime) -> bool {
        self.slots.iter().any(|s| s.start_time == start_time)
    }
}

/// Availability for one provider/date: the underlying grid plus the slots
/// still open after removing occupied start times.
#[derive(Debug, Clone)]
pub struct AvailableDay {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub grid: SlotGrid,
    pub available: Vec<Slot>,
}

impl AvailableDay {
    pub fn is_available(&self, start_time: NaiveTime) -> bool {
        self.available.iter().any(|s| s.start_time == start_time)
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub provider_id: Uuid,
    pub patient_id: Uuid,
    pub specialty_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub payment_method_code: i32,
    pub value: f64,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: String,
    pub cancelled_by: CancelledBy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_date: NaiveDate,
    pub new_start_time: NaiveTime,
    pub new_duration_minutes: Option<i32>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("No available slots for this date")]
    NoAvailability,

    #[error("Slot conflicts with an existing booking")]
    Conflict,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidTransition(AppointmentStatus),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Appointment store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for SchedulingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => SchedulingError::Conflict,
            StoreError::NotFound(_) => SchedulingError::NotFound,
            StoreError::Api(msg) => SchedulingError::Store(msg),
            StoreError::Unavailable(msg) => SchedulingError::StoreUnavailable(msg),
        }
    }
}
