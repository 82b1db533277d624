//! 入场区间

pub mod entry_zone_service;

pub use entry_zone_service::{EntryZoneService, ZoneProfile};
