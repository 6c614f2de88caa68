//! Recurrence cadence for task records.

use super::ParseCadenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recurrence spacing for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Task does not recur and never participates in generation.
    None,
    /// Occurrences one calendar day apart.
    Daily,
    /// Occurrences seven calendar days apart.
    Weekly,
    /// Occurrences one calendar month apart, day-of-month preserved and
    /// clamped to shorter months.
    Monthly,
}

impl Cadence {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Returns `true` when the cadence defines a recurrence interval.
    #[must_use]
    pub const fn is_recurring(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl TryFrom<&str> for Cadence {
    type Error = ParseCadenceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParseCadenceError(value.to_owned())),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
