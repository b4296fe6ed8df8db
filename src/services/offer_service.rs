use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::dto::offer_dto::{
    JobOfferListQuery, JobOfferStats, SourceStat, UpdateJobOfferStatusPayload,
};
use crate::error::{Error, Result};
use crate::models::job_offer::{JobOffer, JobOfferListItem};
use crate::services::job_search_service::JobSearchService;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 50;

const OFFER_COLUMNS: &str = "o.id, o.user_id, o.alert_id, o.external_id, o.source, o.title, \
     o.company, o.location, o.salary, o.contract, o.description, o.url, o.match_score, \
     o.published_at, o.is_read, o.is_saved, o.is_applied, o.created_at, o.updated_at";

#[derive(Clone)]
pub struct OfferService {
    pool: PgPool,
}

impl OfferService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists a user's offers, best matches first. `limit` is capped at 50.
    pub async fn list_offers(
        &self,
        user_id: Uuid,
        query: &JobOfferListQuery,
    ) -> Result<Vec<JobOfferListItem>> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);

        let sql = format!(
            "SELECT {OFFER_COLUMNS}, a.title AS alert_title \
             FROM job_offers o \
             LEFT JOIN job_alerts a ON a.id = o.alert_id \
             WHERE o.user_id = $1 \
               AND ($2::uuid IS NULL OR o.alert_id = $2) \
               AND ($3::text IS NULL OR o.source = $3) \
               AND ($4::boolean IS NULL OR o.is_read = $4) \
               AND ($5::boolean IS NULL OR o.is_saved = $5) \
               AND ($6::integer IS NULL OR o.match_score >= $6) \
             ORDER BY o.match_score DESC, o.published_at DESC NULLS LAST \
             LIMIT $7"
        );
        let offers = sqlx::query_as::<_, JobOfferListItem>(&sql)
            .bind(user_id)
            .bind(query.alert_id)
            .bind(&query.source)
            .bind(query.is_read)
            .bind(query.is_saved)
            .bind(query.min_score)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(offers)
    }

    pub async fn get_offer(&self, user_id: Uuid, offer_id: Uuid) -> Result<JobOffer> {
        let sql = format!(
            "SELECT {OFFER_COLUMNS} FROM job_offers o WHERE o.id = $1 AND o.user_id = $2"
        );
        let offer = sqlx::query_as::<_, JobOffer>(&sql)
            .bind(offer_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(offer)
    }

    pub async fn update_status(
        &self,
        user_id: Uuid,
        offer_id: Uuid,
        payload: &UpdateJobOfferStatusPayload,
    ) -> Result<JobOffer> {
        if payload.is_read.is_none() && payload.is_saved.is_none() && payload.is_applied.is_none()
        {
            return Err(Error::BadRequest(
                "nothing to update: expected is_read, is_saved or is_applied".into(),
            ));
        }

        let sql = format!(
            "UPDATE job_offers o SET \
                 is_read = COALESCE($3, is_read), \
                 is_saved = COALESCE($4, is_saved), \
                 is_applied = COALESCE($5, is_applied), \
                 updated_at = NOW() \
             WHERE o.id = $1 AND o.user_id = $2 \
             RETURNING {OFFER_COLUMNS}"
        );
        let offer = sqlx::query_as::<_, JobOffer>(&sql)
            .bind(offer_id)
            .bind(user_id)
            .bind(payload.is_read)
            .bind(payload.is_saved)
            .bind(payload.is_applied)
            .fetch_one(&self.pool)
            .await?;
        Ok(offer)
    }

    pub async fn delete_offer(&self, user_id: Uuid, offer_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM job_offers WHERE id = $1 AND user_id = $2")
            .bind(offer_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("job offer not found".into()));
        }
        Ok(())
    }

    pub async fn offer_stats(
        &self,
        user_id: Uuid,
        search: &JobSearchService,
    ) -> Result<JobOfferStats> {
        let counts: (i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*), \
                 COUNT(*) FILTER (WHERE is_read), \
                 COUNT(*) FILTER (WHERE is_saved), \
                 COUNT(*) FILTER (WHERE is_applied), \
                 COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days') \
             FROM job_offers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let source_rows = sqlx::query(
            "SELECT source, COUNT(*) AS count, \
                 COALESCE(AVG(match_score), 0)::float8 AS avg_score \
             FROM job_offers WHERE user_id = $1 \
             GROUP BY source ORDER BY count DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_source = Vec::with_capacity(source_rows.len());
        for row in source_rows {
            by_source.push(SourceStat {
                source: row.try_get("source")?,
                count: row.try_get("count")?,
                avg_score: row.try_get::<f64, _>("avg_score")?.round() as i64,
            });
        }

        Ok(JobOfferStats {
            total: counts.0,
            read: counts.1,
            saved: counts.2,
            applied: counts.3,
            recent_offers: counts.4,
            by_source,
            api_status: search.api_status(),
        })
    }
}
