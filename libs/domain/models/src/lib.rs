//! Domain entities shared between the store, the protocol core, and the CLI.
//!
//! These are plain data carriers — no persistence logic lives here. The
//! store crate maps rows onto these types; the protocol core never sees
//! raw SQL, only these types.

pub mod mission;
pub mod attempt;
pub mod tag;

pub use attempt::Attempt;
pub use mission::{Matcher, Mission, MissionId};
pub use tag::{MissionTag, Tag};
