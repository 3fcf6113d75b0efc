//! The mission panel's protocol core: submission surface, claim/watchdog
//! runtime, and the N-way parallel variant. Depends only on the
//! `MissionStore` trait — no SQL or connection types cross into this crate.

pub mod error;
pub mod handler;
pub mod locks;
pub mod parallel;
pub mod submitter;
mod watchdog;

pub use error::PanelError;
pub use handler::{Handler, HandlerRuntime};
pub use locks::{NamedLockRegistry, DEFAULT_REGISTRY};
pub use parallel::ParallelHandlerRuntime;
pub use submitter::Submitter;
