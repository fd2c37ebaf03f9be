use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single calorie event as stored on the server.
///
/// The id is assigned by the server and never changes; the local cache keys
/// everything on it. `kind` is an open string on the wire but is semantically
/// either "intake" or "burn".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: i64,
    /// Calendar day in "YYYY-MM-DD" form.
    pub date: String,
    /// Calories, non-negative.
    pub amount: f64,
    pub kind: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} {}: {} cal",
            self.id, self.date, self.kind, self.category, self.amount
        )?;
        if !self.description.is_empty() {
            write!(f, " ({})", self.description)?;
        }
        Ok(())
    }
}

/// Payload for creating a log; the server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLogRequest {
    pub date: String,
    pub amount: f64,
    pub kind: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// Rejection reasons for a [`NewLogRequest`], checked before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidLog {
    #[error("date is required")]
    MissingDate,
    #[error("date must be a valid YYYY-MM-DD calendar date")]
    BadDate,
    #[error("amount must be a positive number")]
    BadAmount,
    #[error("kind is required (intake or burn)")]
    MissingKind,
}

impl NewLogRequest {
    pub fn validate(&self) -> Result<(), InvalidLog> {
        if self.date.trim().is_empty() {
            return Err(InvalidLog::MissingDate);
        }
        if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            return Err(InvalidLog::BadDate);
        }
        if !(self.amount > 0.0) {
            return Err(InvalidLog::BadAmount);
        }
        if self.kind.trim().is_empty() {
            return Err(InvalidLog::MissingKind);
        }
        Ok(())
    }
}
