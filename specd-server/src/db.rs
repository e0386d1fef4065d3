use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // seq breaks created_at ties in insertion order
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_specs (
            id UUID PRIMARY KEY,
            seq BIGSERIAL NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            initiators JSONB NOT NULL DEFAULT '[]',
            tasks JSONB NOT NULL DEFAULT '[]',
            start_at TIMESTAMPTZ,
            end_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_runs (
            id UUID PRIMARY KEY,
            seq BIGSERIAL NOT NULL,
            job_id UUID NOT NULL REFERENCES job_specs(id) ON DELETE CASCADE,
            status VARCHAR(50) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            completed_at TIMESTAMPTZ,
            result JSONB
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_job_specs_created_at ON job_specs(created_at, seq)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_job_runs_job_id ON job_runs(job_id, created_at, seq)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
