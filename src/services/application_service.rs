use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::{
    ApplicationListQuery, ApplicationStats, CreateApplicationPayload, UpdateApplicationPayload,
};
use crate::error::{Error, Result};
use crate::models::application::{Application, APPLICATION_STATUSES, APPLICATION_TYPES};

const APPLICATION_COLUMNS: &str = "id, user_id, title, company, type, status, application_date, \
     interview_date, follow_up_date, notes, contact_email, contact_phone, job_url, salary, \
     location, created_at, updated_at";

fn validate_kind(kind: &str) -> Result<()> {
    if APPLICATION_TYPES.contains(&kind) {
        Ok(())
    } else {
        Err(Error::BadRequest(format!(
            "invalid type '{}', expected one of {:?}",
            kind, APPLICATION_TYPES
        )))
    }
}

fn validate_status(status: &str) -> Result<()> {
    if APPLICATION_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(Error::BadRequest(format!(
            "invalid status '{}', expected one of {:?}",
            status, APPLICATION_STATUSES
        )))
    }
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_applications(
        &self,
        user_id: Uuid,
        query: &ApplicationListQuery,
    ) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE user_id = $1 \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::text IS NULL OR type = $3) \
               AND ($4::text IS NULL OR title ILIKE '%' || $4 || '%' \
                    OR company ILIKE '%' || $4 || '%') \
             ORDER BY application_date DESC NULLS LAST, created_at DESC"
        );
        let applications = sqlx::query_as::<_, Application>(&sql)
            .bind(user_id)
            .bind(&query.status)
            .bind(&query.kind)
            .bind(&query.search)
            .fetch_all(&self.pool)
            .await?;
        Ok(applications)
    }

    pub async fn get_application(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> Result<Application> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 AND user_id = $2"
        );
        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(application_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(application)
    }

    pub async fn create_application(
        &self,
        user_id: Uuid,
        payload: &CreateApplicationPayload,
    ) -> Result<Application> {
        validate_kind(&payload.kind)?;
        let status = payload.status.as_deref().unwrap_or("applied");
        validate_status(status)?;

        let sql = format!(
            "INSERT INTO applications \
                 (user_id, title, company, type, status, application_date, interview_date, \
                  follow_up_date, notes, contact_email, contact_phone, job_url, salary, location) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {APPLICATION_COLUMNS}"
        );
        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(user_id)
            .bind(payload.title.trim())
            .bind(payload.company.trim())
            .bind(&payload.kind)
            .bind(status)
            .bind(payload.application_date)
            .bind(payload.interview_date)
            .bind(payload.follow_up_date)
            .bind(&payload.notes)
            .bind(&payload.contact_email)
            .bind(&payload.contact_phone)
            .bind(&payload.job_url)
            .bind(&payload.salary)
            .bind(&payload.location)
            .fetch_one(&self.pool)
            .await?;
        Ok(application)
    }

    pub async fn update_application(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        payload: &UpdateApplicationPayload,
    ) -> Result<Application> {
        if let Some(kind) = &payload.kind {
            validate_kind(kind)?;
        }
        if let Some(status) = &payload.status {
            validate_status(status)?;
        }

        let sql = format!(
            "UPDATE applications SET \
                 title = COALESCE($3, title), \
                 company = COALESCE($4, company), \
                 type = COALESCE($5, type), \
                 status = COALESCE($6, status), \
                 application_date = COALESCE($7, application_date), \
                 interview_date = COALESCE($8, interview_date), \
                 follow_up_date = COALESCE($9, follow_up_date), \
                 notes = COALESCE($10, notes), \
                 contact_email = COALESCE($11, contact_email), \
                 contact_phone = COALESCE($12, contact_phone), \
                 job_url = COALESCE($13, job_url), \
                 salary = COALESCE($14, salary), \
                 location = COALESCE($15, location), \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {APPLICATION_COLUMNS}"
        );
        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(application_id)
            .bind(user_id)
            .bind(&payload.title)
            .bind(&payload.company)
            .bind(&payload.kind)
            .bind(&payload.status)
            .bind(payload.application_date)
            .bind(payload.interview_date)
            .bind(payload.follow_up_date)
            .bind(&payload.notes)
            .bind(&payload.contact_email)
            .bind(&payload.contact_phone)
            .bind(&payload.job_url)
            .bind(&payload.salary)
            .bind(&payload.location)
            .fetch_one(&self.pool)
            .await?;
        Ok(application)
    }

    pub async fn delete_application(&self, user_id: Uuid, application_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
            .bind(application_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("application not found".into()));
        }
        Ok(())
    }

    pub async fn application_stats(&self, user_id: Uuid) -> Result<ApplicationStats> {
        let row: (i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*) FILTER (WHERE status = 'applied'), \
                 COUNT(*) FILTER (WHERE status = 'interview'), \
                 COUNT(*) FILTER (WHERE status = 'rejected'), \
                 COUNT(*) FILTER (WHERE status = 'accepted'), \
                 COUNT(*) FILTER (WHERE type = 'internship'), \
                 COUNT(*) FILTER (WHERE type = 'job'), \
                 COUNT(*) \
             FROM applications WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ApplicationStats {
            applied: row.0,
            interview: row.1,
            rejected: row.2,
            accepted: row.3,
            internship: row.4,
            job: row.5,
            total: row.6,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_validation() {
        assert!(validate_kind("internship").is_ok());
        assert!(validate_kind("job").is_ok());
        assert!(validate_kind("freelance").is_err());
    }

    #[test]
    fn status_validation() {
        assert!(validate_status("applied").is_ok());
        assert!(validate_status("offer").is_err());
    }
}
