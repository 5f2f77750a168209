pub mod portfolios_model;
pub mod portfolios_repository;
pub mod portfolios_traits;

pub use portfolios_model::{NewPortfolio, Portfolio};
pub use portfolios_repository::PortfolioRepository;
pub use portfolios_traits::PortfolioRepositoryTrait;
