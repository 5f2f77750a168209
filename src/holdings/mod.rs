pub mod holdings_model;
pub mod holdings_repository;
pub mod holdings_traits;
pub mod projector;

#[cfg(test)]
mod projector_tests;

pub use holdings_model::{Holding, HoldingKey, HoldingRecord};
pub use holdings_repository::HoldingsRepository;
pub use holdings_traits::HoldingsRepositoryTrait;
pub use projector::{AppliedPosition, HoldingsProjector};
