// [libs/core/panel/src/error.rs]
use missionpanel_store::StoreError;
use thiserror::Error;

/// Errors surfaced above the store boundary. A `Handler` callback that
/// panics or returns `Err` is funneled into `Handler(anyhow::Error)` rather
/// than propagating, so one broken mission can't take down the runtime loop.
#[derive(Error, Debug)]
pub enum PanelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no mission matches the given patterns")]
    MissionNotFound,

    #[error("handler failed: {0}")]
    Handler(#[from] anyhow::Error),
}
