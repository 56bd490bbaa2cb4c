use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo_types::UserId;

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its date in its own offset).
pub fn parse_calendar_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok().map(|dt| dt.date()))
}

/// Serde adapter writing dates as `YYYY-MM-DD`.
pub mod calendar_date {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(S::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_calendar_date(&raw).ok_or_else(|| D::Error::custom("invalid calendar date"))
    }
}

/// Task (visit) record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: UserId,
    #[serde(with = "calendar_date")]
    pub date: Date,
    pub company_name: String,
    pub description: String,
    pub is_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated fields of a task about to be inserted.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub date: Date,
    pub company_name: String,
    pub description: String,
    pub is_completed: bool,
}

/// Validated partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub date: Option<Date>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub first: Date,
    pub last: Date,
}

impl DateRange {
    pub fn contains(&self, date: Date) -> bool {
        self.first <= date && date <= self.last
    }
}

/// Visits to one company, grouped by exact company name.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStat {
    pub company_name: String,
    pub visit_count: i64,
    #[serde(with = "calendar_date")]
    pub last_visit: Date,
}
