//! # Inventory Alert Rule
//!
//! Decides when a stock level deserves an alert and what each alert status
//! means for the "one open alert per inventory row" invariant.
//!
//! ## Alert Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Alert Status Flow                                  │
//! │                                                                         │
//! │   inventory write with stock < threshold                               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌─────────┐    ┌────────┐    ┌────────────┐                          │
//! │   │ unsent  │───►│  sent  │───►│ processing │     OPEN (at most one)   │
//! │   └─────────┘    └────────┘    └────────────┘                          │
//! │        │              │               │                                 │
//! │        └──────────────┴───────┬───────┘          manual update only     │
//! │                               ▼                                         │
//! │                         ┌──────────┐                                    │
//! │                         │ pending  │              counted as ACTIVE     │
//! │                         └──────────┘              but no longer OPEN    │
//! │                               │                                         │
//! │                               ▼                                         │
//! │                 ┌───────────┐  ┌──────────┐                             │
//! │                 │ processed │  │ resolved │       stamp resolved_at     │
//! │                 └───────────┘  └──────────┘                             │
//! │                                                                         │
//! │   Stock going back above threshold does NOT close anything.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database mirrors [`AlertStatus::OPEN`] in a partial unique index, so
//! the "no open alert yet" check and the insert are a single statement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Alert Status
// =============================================================================

/// Handling status of an inventory alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Raised, nobody notified yet.
    #[default]
    Unsent,
    /// Notification went out.
    Sent,
    /// Someone is working on it.
    Processing,
    /// Parked (e.g. waiting on a supplier).
    Pending,
    /// Handled, stock replenished.
    Processed,
    /// Closed.
    Resolved,
}

impl AlertStatus {
    /// Statuses that block a new alert for the same inventory row.
    pub const OPEN: [AlertStatus; 3] = [
        AlertStatus::Unsent,
        AlertStatus::Sent,
        AlertStatus::Processing,
    ];

    /// Every status, in lifecycle order.
    pub const ALL: [AlertStatus; 6] = [
        AlertStatus::Unsent,
        AlertStatus::Sent,
        AlertStatus::Processing,
        AlertStatus::Pending,
        AlertStatus::Processed,
        AlertStatus::Resolved,
    ];

    /// Lowercase name, identical to the stored value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Unsent => "unsent",
            AlertStatus::Sent => "sent",
            AlertStatus::Processing => "processing",
            AlertStatus::Pending => "pending",
            AlertStatus::Processed => "processed",
            AlertStatus::Resolved => "resolved",
        }
    }

    /// Open alerts are unique per inventory row.
    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }

    /// Active alerts are what the dashboard counts: open ones plus pending.
    pub fn is_active(&self) -> bool {
        self.is_open() || *self == AlertStatus::Pending
    }

    /// Moving to this status stamps `resolved_at`.
    pub fn closes(&self) -> bool {
        matches!(self, AlertStatus::Processed | AlertStatus::Resolved)
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownStatus {
                kind: "alert",
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Rule
// =============================================================================

/// True when stock on hand is strictly below the alert threshold.
///
/// ## Example
/// ```rust
/// use meridian_core::alert::needs_alert;
///
/// assert!(needs_alert(15, 20));
/// assert!(!needs_alert(20, 20));
/// assert!(!needs_alert(25, 20));
/// ```
#[inline]
pub fn needs_alert(stock_quantity: i64, alert_threshold: i64) -> bool {
    stock_quantity < alert_threshold
}

/// `resolved_at` value after moving an alert to `status` at `now`.
///
/// Returns `None` when the status does not close the alert, in which case the
/// stored timestamp is left as it was.
pub fn resolution_time(status: AlertStatus, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    status.closes().then_some(now)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_alert_is_strict() {
        assert!(needs_alert(0, 1));
        assert!(needs_alert(15, 20));
        assert!(!needs_alert(20, 20));
        assert!(!needs_alert(0, 0));
    }

    #[test]
    fn test_open_and_active_sets() {
        let open: Vec<_> = AlertStatus::ALL.iter().filter(|s| s.is_open()).collect();
        assert_eq!(open.len(), 3);

        assert!(AlertStatus::Pending.is_active());
        assert!(!AlertStatus::Pending.is_open());
        assert!(!AlertStatus::Resolved.is_active());
        assert!(!AlertStatus::Processed.is_active());
    }

    #[test]
    fn test_closing_statuses() {
        let now = Utc::now();
        assert_eq!(resolution_time(AlertStatus::Resolved, now), Some(now));
        assert_eq!(resolution_time(AlertStatus::Processed, now), Some(now));
        assert_eq!(resolution_time(AlertStatus::Sent, now), None);
        assert_eq!(resolution_time(AlertStatus::Pending, now), None);
    }

    #[test]
    fn test_parse_round_trips_stored_names() {
        for status in AlertStatus::ALL {
            assert_eq!(status.as_str().parse::<AlertStatus>().unwrap(), status);
        }
        assert!("done".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn test_serde_matches_stored_names() {
        let json = serde_json::to_string(&AlertStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        assert_eq!(AlertStatus::default(), AlertStatus::Unsent);
    }
}
