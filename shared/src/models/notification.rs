//! Notification preference and delivery models
//!
//! Delivery transports are external collaborators; these types describe what
//! the stock engine hands them and how recipients opt in or out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Push,
    InApp,
}

/// Kinds of notifications the platform sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    LowStock,
    DailyReport,
    IssueAssigned,
    BudgetAlert,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::LowStock => "low_stock",
            NotificationType::DailyReport => "daily_report",
            NotificationType::IssueAssigned => "issue_assigned",
            NotificationType::BudgetAlert => "budget_alert",
            NotificationType::System => "system",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low_stock" => Ok(NotificationType::LowStock),
            "daily_report" => Ok(NotificationType::DailyReport),
            "issue_assigned" => Ok(NotificationType::IssueAssigned),
            "budget_alert" => Ok(NotificationType::BudgetAlert),
            "system" => Ok(NotificationType::System),
            other => Err(format!("unknown notification type: {other}")),
        }
    }
}

impl TryFrom<String> for NotificationType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-user channel toggles, one row per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub user_id: Uuid,
    pub email_low_stock: bool,
    pub email_daily_reports: bool,
    pub push_low_stock: bool,
    pub push_daily_reports: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            user_id: Uuid::nil(),
            email_low_stock: true,
            email_daily_reports: true,
            push_low_stock: false,
            push_daily_reports: false,
        }
    }
}

impl NotificationPreferences {
    /// Defaults for a user with no stored preference row
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Whether this user accepts low-stock notifications on a channel
    pub fn allows_low_stock(&self, channel: NotificationChannel) -> bool {
        match channel {
            NotificationChannel::Email => self.email_low_stock,
            NotificationChannel::Push => self.push_low_stock,
            NotificationChannel::InApp => true,
        }
    }
}

/// An in-app notification row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}
