//! `chapel-content`: tenant-scoped church content.
//!
//! Sections, notifications, schedules, prayer requests and live stream
//! settings. Visibility comes from [`chapel_auth::filter_for`]; mutation from
//! the guards in [`chapel_auth::authorize`].

pub mod model;
pub mod service;
pub mod store;

pub use model::{
    listing_order, ContentKind, ContentPatch, ContentRecord, LiveStreamConfig, LiveStreamUpdate, NewContent,
    NewPrayerRequest, PrayerRequest,
};
pub use service::ContentService;
pub use store::{ContentRepository, LiveStreamRepository, PrayerRequestRepository};
