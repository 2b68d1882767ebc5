//! Postgres-backed store.

use anyhow::Result;
use async_trait::async_trait;
use leadflow_common::{CompanyFragment, Config, IngestScope, PersonFragment};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CompanyLookup, CompanyRow, LeadPatch, LeadRow, LeadStore, UsageRecord};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool from config and wrap it.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the canonical tables if they don't exist yet.
    ///
    /// No uniqueness constraint on company domain/website: duplicate
    /// prevention is resolve-before-create, sequential within a batch.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id            UUID         PRIMARY KEY,
                name          TEXT         NOT NULL,
                website       TEXT,
                domain        TEXT,
                linkedin_url  TEXT,
                founded_year  INT,
                industry      TEXT,
                size          TEXT,
                description   TEXT,
                specialities  TEXT[]       NOT NULL DEFAULT '{}',
                technologies  TEXT,
                city          TEXT,
                state         TEXT,
                country       TEXT,
                created_at    TIMESTAMPTZ  NOT NULL DEFAULT now(),
                updated_at    TIMESTAMPTZ  NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS leads (
                id                         UUID         PRIMARY KEY,
                owner_user_id              BIGINT       NOT NULL,
                company_id                 UUID         REFERENCES companies(id),
                email                      TEXT,
                email_certainty            TEXT,
                email_verification_status  TEXT,
                email_verified_at          TIMESTAMPTZ,
                linkedin_url               TEXT,
                personal_email             TEXT,
                external_person_id         TEXT,
                public_identifier          TEXT,
                full_name                  TEXT,
                first_name                 TEXT,
                last_name                  TEXT,
                position                   TEXT,
                headline                   TEXT,
                about                      TEXT,
                seniority                  TEXT,
                functional_area            TEXT,
                phone_numbers              TEXT[]       NOT NULL DEFAULT '{}',
                city                       TEXT,
                state                      TEXT,
                country                    TEXT,
                created_at                 TIMESTAMPTZ  NOT NULL DEFAULT now(),
                updated_at                 TIMESTAMPTZ  NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collection_leads (
                lead_id        UUID         NOT NULL REFERENCES leads(id),
                collection_id  BIGINT       NOT NULL,
                added_at       TIMESTAMPTZ  NOT NULL DEFAULT now(),
                PRIMARY KEY (lead_id, collection_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entity_scraper_usage (
                id                 BIGSERIAL    PRIMARY KEY,
                entity_type        TEXT         NOT NULL,
                entity_id          UUID         NOT NULL,
                source_tag         TEXT         NOT NULL,
                source_job_id      TEXT,
                source_scraper_id  BIGINT,
                succeeded          BOOLEAN      NOT NULL,
                item_count         INT          NOT NULL,
                config_snapshot    JSONB,
                owner_user_id      BIGINT       NOT NULL,
                recorded_at        TIMESTAMPTZ  NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LeadStore for PgStore {
    async fn find_company(&self, lookup: &CompanyLookup) -> Result<Option<CompanyRow>> {
        if lookup.is_empty() {
            return Ok(None);
        }
        sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT * FROM companies
            WHERE ($1::text IS NOT NULL AND name = $1)
               OR ($2::text IS NOT NULL AND domain = $2)
               OR ($3::text IS NOT NULL AND website = $3)
            LIMIT 1
            "#,
        )
        .bind(&lookup.name)
        .bind(&lookup.domain)
        .bind(&lookup.website)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn insert_company(&self, fragment: &CompanyFragment) -> Result<CompanyRow> {
        sqlx::query_as::<_, CompanyRow>(
            r#"
            INSERT INTO companies (
                id, name, website, domain, linkedin_url, founded_year,
                industry, size, description, specialities, technologies,
                city, state, country
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fragment.name)
        .bind(&fragment.website)
        .bind(&fragment.domain)
        .bind(&fragment.linkedin_url)
        .bind(fragment.founded_year)
        .bind(&fragment.industry)
        .bind(&fragment.size)
        .bind(&fragment.description)
        .bind(&fragment.specialities)
        .bind(&fragment.technologies)
        .bind(&fragment.city)
        .bind(&fragment.state)
        .bind(&fragment.country)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn find_lead_by_identity(
        &self,
        scope: &IngestScope,
        email: Option<&str>,
        linkedin_url: Option<&str>,
    ) -> Result<Option<LeadRow>> {
        if email.is_none() && linkedin_url.is_none() {
            return Ok(None);
        }
        sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT l.* FROM leads l
            JOIN collection_leads cl ON cl.lead_id = l.id
            WHERE l.owner_user_id = $1
              AND cl.collection_id = $2
              AND (($3::text IS NOT NULL AND l.email = $3)
                OR ($4::text IS NOT NULL AND l.linkedin_url = $4))
            LIMIT 1
            "#,
        )
        .bind(scope.owner_user_id)
        .bind(scope.collection_id)
        .bind(email)
        .bind(linkedin_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn find_lead_by_name(
        &self,
        scope: &IngestScope,
        first_name: &str,
        last_name: &str,
        company_id: Option<Uuid>,
    ) -> Result<Option<LeadRow>> {
        sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT l.* FROM leads l
            JOIN collection_leads cl ON cl.lead_id = l.id
            WHERE l.owner_user_id = $1
              AND cl.collection_id = $2
              AND l.first_name = $3
              AND l.last_name = $4
              AND ($5::uuid IS NULL OR l.company_id = $5)
            LIMIT 1
            "#,
        )
        .bind(scope.owner_user_id)
        .bind(scope.collection_id)
        .bind(first_name)
        .bind(last_name)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn insert_lead(
        &self,
        scope: &IngestScope,
        fragment: &PersonFragment,
        company_id: Option<Uuid>,
    ) -> Result<LeadRow> {
        sqlx::query_as::<_, LeadRow>(
            r#"
            INSERT INTO leads (
                id, owner_user_id, company_id,
                email, email_certainty, email_verification_status, email_verified_at,
                linkedin_url, personal_email, external_person_id, public_identifier,
                full_name, first_name, last_name, position, headline, about,
                seniority, functional_area, phone_numbers, city, state, country
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(scope.owner_user_id)
        .bind(company_id)
        .bind(&fragment.email)
        .bind(&fragment.email_certainty)
        .bind(&fragment.email_verification_status)
        .bind(fragment.email_verified_at)
        .bind(&fragment.linkedin_url)
        .bind(&fragment.personal_email)
        .bind(&fragment.external_person_id)
        .bind(&fragment.public_identifier)
        .bind(&fragment.full_name)
        .bind(&fragment.first_name)
        .bind(&fragment.last_name)
        .bind(&fragment.position)
        .bind(&fragment.headline)
        .bind(&fragment.about)
        .bind(&fragment.seniority)
        .bind(&fragment.functional_area)
        .bind(&fragment.phone_numbers)
        .bind(&fragment.city)
        .bind(&fragment.state)
        .bind(&fragment.country)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn update_lead(&self, id: Uuid, patch: &LeadPatch) -> Result<()> {
        // COALESCE keeps the stored value wherever the patch is NULL.
        sqlx::query(
            r#"
            UPDATE leads SET
                email                     = COALESCE($2, email),
                email_certainty           = COALESCE($3, email_certainty),
                email_verification_status = COALESCE($4, email_verification_status),
                email_verified_at         = COALESCE($5, email_verified_at),
                linkedin_url              = COALESCE($6, linkedin_url),
                personal_email            = COALESCE($7, personal_email),
                external_person_id        = COALESCE($8, external_person_id),
                public_identifier         = COALESCE($9, public_identifier),
                full_name                 = COALESCE($10, full_name),
                first_name                = COALESCE($11, first_name),
                last_name                 = COALESCE($12, last_name),
                position                  = COALESCE($13, position),
                headline                  = COALESCE($14, headline),
                about                     = COALESCE($15, about),
                seniority                 = COALESCE($16, seniority),
                functional_area           = COALESCE($17, functional_area),
                phone_numbers             = COALESCE($18, phone_numbers),
                city                      = COALESCE($19, city),
                state                     = COALESCE($20, state),
                country                   = COALESCE($21, country),
                company_id                = COALESCE($22, company_id),
                updated_at                = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.email)
        .bind(&patch.email_certainty)
        .bind(&patch.email_verification_status)
        .bind(patch.email_verified_at)
        .bind(&patch.linkedin_url)
        .bind(&patch.personal_email)
        .bind(&patch.external_person_id)
        .bind(&patch.public_identifier)
        .bind(&patch.full_name)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.position)
        .bind(&patch.headline)
        .bind(&patch.about)
        .bind(&patch.seniority)
        .bind(&patch.functional_area)
        .bind(&patch.phone_numbers)
        .bind(&patch.city)
        .bind(&patch.state)
        .bind(&patch.country)
        .bind(patch.company_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn link_membership(&self, lead_id: Uuid, collection_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO collection_leads (lead_id, collection_id)
            VALUES ($1, $2)
            ON CONFLICT (lead_id, collection_id) DO NOTHING
            "#,
        )
        .bind(lead_id)
        .bind(collection_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_usage(&self, usage: &UsageRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO entity_scraper_usage (
                entity_type, entity_id, source_tag, source_job_id,
                source_scraper_id, succeeded, item_count, config_snapshot,
                owner_user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(usage.entity_type.as_str())
        .bind(usage.entity_id)
        .bind(&usage.source_tag)
        .bind(&usage.source_job_id)
        .bind(usage.source_scraper_id)
        .bind(usage.succeeded)
        .bind(usage.item_count)
        .bind(&usage.config_snapshot)
        .bind(usage.owner_user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
