use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use anyhow::Context;
use std::{future::Future, str::FromStr};

/// Open the server's store, creating the file and its directory on first run.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // Ensure the data directory exists
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Open a store that must already exist. A missing file is an error.
pub async fn open_existing(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(false);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Open an existing store, run `job` against it, then close the pool on
/// every path.
///
/// Used by one-shot maintenance commands, which never create or migrate the
/// store. The web server keeps its pool for the life of the process instead.
pub async fn with_store<T, F, Fut>(database_url: &str, job: F) -> anyhow::Result<T>
where
    F: FnOnce(SqlitePool) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let pool = open_existing(database_url)
        .await
        .with_context(|| format!("failed to open store at {database_url}"))?;

    let outcome = job(pool.clone()).await;

    pool.close().await;
    tracing::debug!("store connection released");

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_store_closes_pool_after_success() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let url = format!("sqlite://{}", file.path().display());

        let pool = with_store(&url, |pool| async move { Ok(pool) })
            .await
            .unwrap();

        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn with_store_closes_pool_after_failure() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let url = format!("sqlite://{}", file.path().display());
        let mut seen = None;

        let result: anyhow::Result<()> = with_store(&url, |pool| {
            seen = Some(pool.clone());
            async move { anyhow::bail!("query failed") }
        })
        .await;

        assert!(result.is_err());
        assert!(seen.expect("job ran").is_closed());
    }

    #[tokio::test]
    async fn with_store_refuses_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo").join("famliy.db");
        let url = format!("sqlite://{}", path.display());
        let mut ran = false;

        let result: anyhow::Result<()> = with_store(&url, |_pool| {
            ran = true;
            async { Ok(()) }
        })
        .await;

        assert!(result.is_err());
        assert!(!ran);
        assert!(!path.exists());
        assert!(!dir.path().join("typo").exists());
    }

    #[tokio::test]
    async fn connect_creates_server_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("famdir.db");
        let url = format!("sqlite://{}", path.display());

        let pool = connect(&url).await.unwrap();
        migrate(&pool).await.unwrap();
        pool.close().await;

        assert!(path.exists());
    }
}
