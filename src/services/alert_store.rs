use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::job_alert::JobAlert;

/// Fields persisted on first sight of a listing. On conflict only the match
/// score and update timestamp change; user flags and created_at are kept.
#[derive(Debug, Clone)]
pub struct NewJobOffer {
    pub external_id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub contract: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub match_score: i32,
    pub alert_id: Uuid,
    pub user_id: Uuid,
}

/// Persistence consumed by the alert pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn find_alert_by_id(&self, id: Uuid) -> Result<Option<JobAlert>>;

    async fn find_active_alerts(&self) -> Result<Vec<JobAlert>>;

    /// Upsert keyed by `(external_id, source)`. Returns true when a new row
    /// was created, false when an existing one was updated.
    async fn upsert_job_offer(&self, offer: &NewJobOffer) -> Result<bool>;

    /// Delete offers created before `cutoff`; saved offers are exempt when
    /// `keep_saved` is set. Returns the number of rows removed.
    async fn delete_offers_older_than(
        &self,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
        keep_saved: bool,
    ) -> Result<u64>;

    async fn update_alert_last_check(
        &self,
        alert_id: Uuid,
        checked_at: DateTime<Utc>,
    ) -> Result<()>;
}

#[derive(Clone)]
pub struct PgAlertStore {
    pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn find_alert_by_id(&self, id: Uuid) -> Result<Option<JobAlert>> {
        let alert = sqlx::query_as::<_, JobAlert>(
            r#"
            SELECT id, user_id, title, keywords, location, company, salary, contract,
                   frequency, active, last_check, created_at, updated_at
            FROM job_alerts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(alert)
    }

    async fn find_active_alerts(&self) -> Result<Vec<JobAlert>> {
        let alerts = sqlx::query_as::<_, JobAlert>(
            r#"
            SELECT id, user_id, title, keywords, location, company, salary, contract,
                   frequency, active, last_check, created_at, updated_at
            FROM job_alerts
            WHERE active = TRUE
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    async fn upsert_job_offer(&self, offer: &NewJobOffer) -> Result<bool> {
        // xmax = 0 distinguishes a fresh insert from a conflict update.
        let row = sqlx::query(
            r#"
            INSERT INTO job_offers (
                external_id, source, title, company, location, salary, contract,
                description, url, published_at, match_score, alert_id, user_id
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            ON CONFLICT (external_id, source) DO UPDATE
            SET match_score = EXCLUDED.match_score,
                updated_at = NOW()
            RETURNING (xmax = 0) AS was_created
            "#,
        )
        .bind(&offer.external_id)
        .bind(&offer.source)
        .bind(&offer.title)
        .bind(&offer.company)
        .bind(&offer.location)
        .bind(&offer.salary)
        .bind(&offer.contract)
        .bind(&offer.description)
        .bind(&offer.url)
        .bind(offer.published_at)
        .bind(offer.match_score)
        .bind(offer.alert_id)
        .bind(offer.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("was_created")?)
    }

    async fn delete_offers_older_than(
        &self,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
        keep_saved: bool,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM job_offers
            WHERE user_id = $1
              AND created_at < $2
              AND (NOT $3 OR is_saved = FALSE)
            "#,
        )
        .bind(user_id)
        .bind(cutoff)
        .bind(keep_saved)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_alert_last_check(
        &self,
        alert_id: Uuid,
        checked_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE job_alerts SET last_check = $2, updated_at = NOW() WHERE id = $1")
            .bind(alert_id)
            .bind(checked_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
