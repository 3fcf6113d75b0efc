// [libs/infra/store/src/client.rs]
/*!
 * Connection handling for the panel's libSQL-backed store.
 *
 * Supports a local file, a `libsql://` remote (Turso-compatible) endpoint,
 * and an in-memory database for tests. In-memory databases need a pinned
 * "anchor" connection kept alive for the lifetime of the client, or SQLite
 * drops the schema the instant the last connection referencing it closes.
 */

use std::sync::Arc;

use libsql::{Builder, Connection, Database};
use tracing::{error, info, instrument};

use crate::errors::StoreError;
use crate::schema;

/// How long a connection waits on `BEGIN IMMEDIATE`/a write statement before
/// giving up with `SQLITE_BUSY`, instead of failing instantly. This is what
/// actually makes a second submitter's immediate transaction "block until
/// the first commits" up to this bound, rather than racing the lock bare.
const BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone)]
pub struct StoreClient {
    driver: Arc<Database>,
    /// Keeps an in-memory database's schema alive for the client's lifetime.
    _memory_anchor: Option<Arc<Connection>>,
}

impl StoreClient {
    #[instrument(skip(access_token))]
    pub async fn connect(url: &str, access_token: Option<String>) -> Result<Self, StoreError> {
        if url.is_empty() {
            return Err(StoreError::Configuration("DATABASE_URL is empty".into()));
        }

        let is_remote = url.starts_with("libsql://") || url.starts_with("https://");
        let is_memory = url.contains(":memory:") || url.contains("mode=memory");

        let driver = if is_remote {
            let token = access_token.ok_or_else(|| {
                StoreError::Configuration("remote store URL requires an access token".into())
            })?;
            Builder::new_remote(url.to_string(), token).build().await
        } else {
            Builder::new_local(url).build().await
        }
        .map_err(|e| StoreError::Connection(e.to_string()))?;

        let driver = Arc::new(driver);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = driver
                .connect()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            set_busy_timeout(&anchor_conn).await?;
            schema::apply(&anchor_conn).await.map_err(|e| StoreError::Connection(e.to_string()))?;
            anchor = Some(Arc::new(anchor_conn));
            info!("in-memory store schema anchored");
        } else {
            let bootstrap = driver.connect().map_err(|e| StoreError::Connection(e.to_string()))?;
            set_busy_timeout(&bootstrap).await?;
            schema::apply(&bootstrap).await.map_err(|e| StoreError::Connection(e.to_string()))?;
        }

        info!(url, "mission panel store connected");
        Ok(Self { driver, _memory_anchor: anchor })
    }

    pub async fn connection(&self) -> Result<Connection, StoreError> {
        let connection = self.driver.connect().map_err(|e| {
            error!(error = %e, "failed to allocate a connection");
            StoreError::Connection(e.to_string())
        })?;
        set_busy_timeout(&connection).await?;
        Ok(connection)
    }
}

async fn set_busy_timeout(connection: &Connection) -> Result<(), StoreError> {
    connection
        .query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ())
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;
    Ok(())
}
