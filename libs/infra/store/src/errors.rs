// [libs/infra/store/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Physical/network failure talking to the libSQL driver.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// Empty or malformed environment configuration (e.g. no DATABASE_URL).
    #[error("store misconfigured: {0}")]
    Configuration(String),

    /// Syntax or execution error returned by the libSQL engine.
    #[error("query rejected: {0}")]
    Query(#[from] libsql::Error),

    /// Failure translating a row into a domain type (bad JSON, bad timestamp).
    #[error("row mapping failed: {0}")]
    Mapping(String),

    /// `add_tags` invoked with patterns that match no mission.
    #[error("no mission matches the given patterns")]
    MissionNotFound,

    /// An Attempt write targeted a mission/attempt pair that no longer
    /// satisfies the expected state (e.g. heartbeat on an attempt that was
    /// never created, or whose mission vanished).
    #[error("attempt is not in a state that allows this operation")]
    InvalidAttemptState,
}
