use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad caller input (fixture id, date, season).
    #[error("validation error: {0}")]
    Validation(String),

    /// The base fixture row is absent — sync has not run for this fixture.
    #[error("not found: {0}")]
    NotFound(String),

    /// Remote API failure: non-2xx, network error, or malformed JSON.
    /// Enrichment degrades these to an empty response per field.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// The remote API reported a plan/tier restriction for the request.
    #[error("plan restriction: {0}")]
    PlanRestricted(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Store failure — fatal, aborts the run.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
