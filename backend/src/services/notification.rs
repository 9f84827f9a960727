//! Notification service for in-app, email, and push delivery
//!
//! Delivery transports are external relays reached over HTTP; dispatch is
//! fire-and-forget. A failed relay call is logged and never fails the
//! request that produced the notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::NotificationConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    EntityType, NotificationChannel, NotificationPreferences, NotificationType, Role,
};

/// Notification service for managing notifications and preferences
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
    push: Option<PushClient>,
    email: Option<EmailClient>,
}

/// Push relay client
#[derive(Clone)]
pub struct PushClient {
    endpoint: String,
    api_key: String,
    http_client: reqwest::Client,
}

/// Email relay client
#[derive(Clone)]
pub struct EmailClient {
    endpoint: String,
    from: String,
    http_client: reqwest::Client,
}

/// An in-app notification as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Input for updating notification preferences
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesInput {
    pub email_low_stock: Option<bool>,
    pub email_daily_reports: Option<bool>,
    pub push_low_stock: Option<bool>,
    pub push_daily_reports: Option<bool>,
}

/// What the alert service hands over for low-stock fan-out
#[derive(Debug, Clone)]
pub struct LowStockNotice {
    pub material_id: Uuid,
    pub title: String,
    pub message: String,
}

/// Stored preference row
#[derive(Debug, FromRow)]
struct PreferencesRow {
    user_id: Uuid,
    email_low_stock: bool,
    email_daily_reports: bool,
    push_low_stock: bool,
    push_daily_reports: bool,
}

impl From<PreferencesRow> for NotificationPreferences {
    fn from(row: PreferencesRow) -> Self {
        NotificationPreferences {
            user_id: row.user_id,
            email_low_stock: row.email_low_stock,
            email_daily_reports: row.email_daily_reports,
            push_low_stock: row.push_low_stock,
            push_daily_reports: row.push_daily_reports,
        }
    }
}

/// Recipient row for role-based fan-out
#[derive(Debug, FromRow)]
struct RecipientRow {
    id: Uuid,
    email: String,
}

/// Push relay request body
#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    tokens: &'a [String],
    title: &'a str,
    body: &'a str,
    data: serde_json::Value,
}

/// Email relay request body
#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl PushClient {
    fn from_config(config: &NotificationConfig) -> Option<Self> {
        if config.push_endpoint.is_empty() {
            return None;
        }
        Some(Self {
            endpoint: config.push_endpoint.clone(),
            api_key: config.push_api_key.clone(),
            http_client: reqwest::Client::new(),
        })
    }

    /// Send a push message to a set of device tokens
    async fn send(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<(), reqwest::Error> {
        self.http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&PushRequest {
                tokens,
                title,
                body,
                data,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl EmailClient {
    fn from_config(config: &NotificationConfig) -> Option<Self> {
        if config.email_endpoint.is_empty() {
            return None;
        }
        Some(Self {
            endpoint: config.email_endpoint.clone(),
            from: config.email_from.clone(),
            http_client: reqwest::Client::new(),
        })
    }

    /// Send one email through the relay
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), reqwest::Error> {
        self.http_client
            .post(&self.endpoint)
            .json(&EmailRequest {
                from: &self.from,
                to,
                subject,
                body,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool, config: &NotificationConfig) -> Self {
        Self {
            db,
            push: PushClient::from_config(config),
            email: EmailClient::from_config(config),
        }
    }

    /// Notify every active admin and manager about a low-stock condition,
    /// honoring each recipient's channel preferences. Returns the number of
    /// recipients reached with an in-app notification.
    pub async fn notify_low_stock(&self, notice: &LowStockNotice) -> AppResult<u64> {
        let elevated: Vec<String> = Role::elevated()
            .iter()
            .map(|role| role.as_str().to_string())
            .collect();
        let recipients = sqlx::query_as::<_, RecipientRow>(
            "SELECT id, email FROM users WHERE role = ANY($1) AND is_active = TRUE",
        )
        .bind(&elevated)
        .fetch_all(&self.db)
        .await?;

        let mut reached = 0u64;
        for recipient in &recipients {
            let prefs = self.preferences(recipient.id).await?;

            sqlx::query(
                r#"
                INSERT INTO notifications (user_id, notification_type, title, message,
                                           entity_type, entity_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(recipient.id)
            .bind(NotificationType::LowStock.as_str())
            .bind(&notice.title)
            .bind(&notice.message)
            .bind(EntityType::Material.as_str())
            .bind(notice.material_id)
            .execute(&self.db)
            .await?;
            reached += 1;

            if prefs.allows_low_stock(NotificationChannel::Email) {
                if let Some(email) = &self.email {
                    if let Err(e) = email
                        .send(&recipient.email, &notice.title, &notice.message)
                        .await
                    {
                        tracing::warn!("Email dispatch to {} failed: {}", recipient.email, e);
                    }
                }
            }

            if prefs.allows_low_stock(NotificationChannel::Push) {
                if let Some(push) = &self.push {
                    let tokens: Vec<String> = sqlx::query_scalar(
                        "SELECT token FROM device_tokens WHERE user_id = $1 AND is_active = TRUE",
                    )
                    .bind(recipient.id)
                    .fetch_all(&self.db)
                    .await?;
                    if !tokens.is_empty() {
                        let data = serde_json::json!({
                            "type": NotificationType::LowStock.as_str(),
                            "material_id": notice.material_id,
                        });
                        if let Err(e) =
                            push.send(&tokens, &notice.title, &notice.message, data).await
                        {
                            tracing::warn!("Push dispatch to {} failed: {}", recipient.id, e);
                        }
                    }
                }
            }
        }

        tracing::debug!(recipients = reached, "low-stock notifications recorded");
        Ok(reached)
    }

    /// Preferences for a user; defaults when no row is stored
    pub async fn preferences(&self, user_id: Uuid) -> AppResult<NotificationPreferences> {
        let row = sqlx::query_as::<_, PreferencesRow>(
            r#"
            SELECT user_id, email_low_stock, email_daily_reports,
                   push_low_stock, push_daily_reports
            FROM notification_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row
            .map(NotificationPreferences::from)
            .unwrap_or_else(|| NotificationPreferences::defaults_for(user_id)))
    }

    /// Update a user's preferences, creating the row on first write
    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        input: UpdatePreferencesInput,
    ) -> AppResult<NotificationPreferences> {
        let current = self.preferences(user_id).await?;

        let email_low_stock = input.email_low_stock.unwrap_or(current.email_low_stock);
        let email_daily_reports = input
            .email_daily_reports
            .unwrap_or(current.email_daily_reports);
        let push_low_stock = input.push_low_stock.unwrap_or(current.push_low_stock);
        let push_daily_reports = input
            .push_daily_reports
            .unwrap_or(current.push_daily_reports);

        let row = sqlx::query_as::<_, PreferencesRow>(
            r#"
            INSERT INTO notification_preferences
                (user_id, email_low_stock, email_daily_reports,
                 push_low_stock, push_daily_reports)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET email_low_stock = $2, email_daily_reports = $3,
                push_low_stock = $4, push_daily_reports = $5
            RETURNING user_id, email_low_stock, email_daily_reports,
                      push_low_stock, push_daily_reports
            "#,
        )
        .bind(user_id)
        .bind(email_low_stock)
        .bind(email_daily_reports)
        .bind(push_low_stock)
        .bind(push_daily_reports)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List a user's in-app notifications, newest first
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> AppResult<Vec<NotificationRow>> {
        let notifications = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, notification_type, title, message,
                   entity_type, entity_id, is_read, created_at, read_at
            FROM notifications
            WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    /// Mark one of the user's notifications as read
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> AppResult<NotificationRow> {
        let notification = sqlx::query_as::<_, NotificationRow>(
            r#"
            UPDATE notifications
            SET is_read = TRUE, read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, notification_type, title, message,
                      entity_type, entity_id, is_read, created_at, read_at
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification".to_string()))?;

        Ok(notification)
    }
}
