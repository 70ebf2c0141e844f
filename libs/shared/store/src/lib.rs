pub mod client;

pub use client::{ScheduleStoreClient, StoreError};
