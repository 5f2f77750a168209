pub mod trades_errors;
pub mod trades_model;
pub mod trades_repository;
pub mod trades_service;
pub mod trades_traits;

pub use trades_errors::TradeError;
pub use trades_model::{AssetKind, NewTrade, Trade, TradeAction};
pub use trades_repository::TradeRepository;
pub use trades_service::TradeService;
pub use trades_traits::{TradeRepositoryTrait, TradeServiceTrait};
