//! Tenant-scoped content records.
//!
//! A `None` tenant marks a record as public, shared across every tenant.

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chapel_core::{ContentId, DomainError, Entity, TenantId, UserId};

/// Content kinds that share the [`ContentRecord`] shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Section,
    Notification,
    Schedule,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Section, ContentKind::Notification, ContentKind::Schedule];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Section => "section",
            ContentKind::Notification => "notification",
            ContentKind::Schedule => "schedule",
        }
    }

    /// Collection segment used in URLs (`/api/<segment>`).
    pub fn path_segment(self) -> &'static str {
        match self {
            ContentKind::Section => "sections",
            ContentKind::Notification => "notifications",
            ContentKind::Schedule => "schedules",
        }
    }

    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.path_segment() == segment)
    }
}

impl core::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "section" => Ok(ContentKind::Section),
            "notification" => Ok(ContentKind::Notification),
            "schedule" => Ok(ContentKind::Schedule),
            other => Err(DomainError::validation(format!("unknown content kind '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: ContentId,
    pub kind: ContentKind,
    pub tenant_id: Option<TenantId>,
    pub title: String,
    pub body: String,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for ContentRecord {
    type Id = ContentId;

    fn id(&self) -> ContentId {
        self.id
    }
}

/// Listing order: `scheduled_for` descending with unscheduled records last,
/// then `created_at` descending.
pub fn listing_order(a: &ContentRecord, b: &ContentRecord) -> Ordering {
    let by_schedule = match (a.scheduled_for, b.scheduled_for) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_schedule.then_with(|| b.created_at.cmp(&a.created_at))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Only honoured for superadmins; `None` publishes to every tenant.
    pub tenant_id: Option<TenantId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub scheduled_for: Option<Option<DateTime<Utc>>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequest {
    pub id: ContentId,
    pub tenant_id: Option<TenantId>,
    pub author_id: UserId,
    /// Display name shown with the request; blank means anonymous.
    pub name: Option<String>,
    pub request: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for PrayerRequest {
    type Id = ContentId;

    fn id(&self) -> ContentId {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrayerRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub request: String,
}

/// Live stream settings; at most one per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamConfig {
    pub tenant_id: TenantId,
    pub stream_url: String,
    pub is_live: bool,
    pub title: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<UserId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamUpdate {
    /// Required for superadmins, optional (and must match) for church admins.
    pub tenant_id: Option<TenantId>,
    #[serde(default)]
    pub stream_url: String,
    #[serde(default)]
    pub is_live: bool,
    pub title: Option<String>,
}
