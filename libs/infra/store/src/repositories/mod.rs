// [libs/infra/store/src/repositories/mod.rs]
pub mod attempt;
pub mod claim;
pub mod submitter;
mod tx;

pub use attempt::AttemptRepository;
pub use claim::ClaimQuery;
pub use submitter::SubmitterRepository;
