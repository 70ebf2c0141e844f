pub mod availability;
pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod reschedule;
pub mod slots;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use conflict::ConflictGuard;
pub use lifecycle::AppointmentLifecycleService;
pub use reschedule::RescheduleCoordinator;
pub use slots::SlotGenerator;
