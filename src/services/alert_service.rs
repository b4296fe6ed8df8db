use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::alert_dto::{
    CreateJobAlertPayload, JobAlertListQuery, JobAlertStats, UpdateJobAlertPayload,
    ALERT_FREQUENCIES,
};
use crate::error::{Error, Result};
use crate::models::job_alert::JobAlert;

const ALERT_COLUMNS: &str = "id, user_id, title, keywords, location, company, salary, contract, \
     frequency, active, last_check, created_at, updated_at";

/// Trims keywords, drops empties and removes duplicates while keeping order.
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .collect()
}

fn validate_frequency(frequency: &str) -> Result<()> {
    if ALERT_FREQUENCIES.contains(&frequency) {
        Ok(())
    } else {
        Err(Error::BadRequest(format!(
            "invalid frequency '{}', expected one of {:?}",
            frequency, ALERT_FREQUENCIES
        )))
    }
}

#[derive(Clone)]
pub struct AlertService {
    pool: PgPool,
}

impl AlertService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_alerts(
        &self,
        user_id: Uuid,
        query: &JobAlertListQuery,
    ) -> Result<Vec<JobAlert>> {
        let sql = format!(
            "SELECT {ALERT_COLUMNS} FROM job_alerts \
             WHERE user_id = $1 AND ($2::boolean IS NULL OR active = $2) \
             ORDER BY created_at DESC"
        );
        let alerts = sqlx::query_as::<_, JobAlert>(&sql)
            .bind(user_id)
            .bind(query.active)
            .fetch_all(&self.pool)
            .await?;
        Ok(alerts)
    }

    pub async fn get_alert(&self, user_id: Uuid, alert_id: Uuid) -> Result<JobAlert> {
        let sql =
            format!("SELECT {ALERT_COLUMNS} FROM job_alerts WHERE id = $1 AND user_id = $2");
        let alert = sqlx::query_as::<_, JobAlert>(&sql)
            .bind(alert_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(alert)
    }

    pub async fn create_alert(
        &self,
        user_id: Uuid,
        payload: &CreateJobAlertPayload,
    ) -> Result<JobAlert> {
        let keywords = normalize_keywords(&payload.keywords);
        if keywords.is_empty() {
            return Err(Error::BadRequest(
                "at least one non-empty keyword is required".into(),
            ));
        }

        let frequency = payload.frequency.as_deref().unwrap_or("daily");
        validate_frequency(frequency)?;

        let sql = format!(
            "INSERT INTO job_alerts (user_id, title, keywords, location, company, salary, contract, frequency) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ALERT_COLUMNS}"
        );
        let alert = sqlx::query_as::<_, JobAlert>(&sql)
            .bind(user_id)
            .bind(payload.title.trim())
            .bind(&keywords)
            .bind(&payload.location)
            .bind(&payload.company)
            .bind(&payload.salary)
            .bind(&payload.contract)
            .bind(frequency)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(alert_id = %alert.id, title = %alert.title, "job alert created");
        Ok(alert)
    }

    pub async fn update_alert(
        &self,
        user_id: Uuid,
        alert_id: Uuid,
        payload: &UpdateJobAlertPayload,
    ) -> Result<JobAlert> {
        let keywords = match &payload.keywords {
            Some(raw) => {
                let normalized = normalize_keywords(raw);
                if normalized.is_empty() {
                    return Err(Error::BadRequest(
                        "at least one non-empty keyword is required".into(),
                    ));
                }
                Some(normalized)
            }
            None => None,
        };
        if let Some(frequency) = &payload.frequency {
            validate_frequency(frequency)?;
        }

        // Ownership check, 404 before any write.
        self.get_alert(user_id, alert_id).await?;

        let sql = format!(
            "UPDATE job_alerts SET \
                 title = COALESCE($3, title), \
                 keywords = COALESCE($4, keywords), \
                 location = COALESCE($5, location), \
                 company = COALESCE($6, company), \
                 salary = COALESCE($7, salary), \
                 contract = COALESCE($8, contract), \
                 frequency = COALESCE($9, frequency), \
                 active = COALESCE($10, active), \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {ALERT_COLUMNS}"
        );
        let alert = sqlx::query_as::<_, JobAlert>(&sql)
            .bind(alert_id)
            .bind(user_id)
            .bind(&payload.title)
            .bind(&keywords)
            .bind(&payload.location)
            .bind(&payload.company)
            .bind(&payload.salary)
            .bind(&payload.contract)
            .bind(&payload.frequency)
            .bind(payload.active)
            .fetch_one(&self.pool)
            .await?;
        Ok(alert)
    }

    pub async fn delete_alert(&self, user_id: Uuid, alert_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM job_alerts WHERE id = $1 AND user_id = $2")
            .bind(alert_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("job alert not found".into()));
        }
        tracing::info!(%alert_id, "job alert deleted");
        Ok(())
    }

    pub async fn alert_stats(&self, user_id: Uuid) -> Result<JobAlertStats> {
        let row: (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*) FILTER (WHERE active), \
                 COUNT(*) FILTER (WHERE NOT active), \
                 COUNT(*) \
             FROM job_alerts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(JobAlertStats {
            active: row.0,
            inactive: row.1,
            total: row.2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_trims_and_drops_empties() {
        let out = normalize_keywords(&keywords(&["  rust  ", "", "   ", "backend"]));
        assert_eq!(out, vec!["rust".to_string(), "backend".to_string()]);
    }

    #[test]
    fn normalize_dedupes_case_insensitively_keeping_first() {
        let out = normalize_keywords(&keywords(&["Rust", "rust", "RUST", "tokio"]));
        assert_eq!(out, vec!["Rust".to_string(), "tokio".to_string()]);
    }

    #[test]
    fn normalize_of_all_blank_input_is_empty() {
        assert!(normalize_keywords(&keywords(&["", "  "])).is_empty());
    }

    #[test]
    fn frequency_validation() {
        assert!(validate_frequency("daily").is_ok());
        assert!(validate_frequency("weekly").is_ok());
        assert!(validate_frequency("hourly").is_err());
    }
}
