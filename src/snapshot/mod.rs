pub mod replay_engine;


pub use replay_engine::{day_range, end_of_month, month_ends, ReplayEngine};
