pub mod calculations;
pub mod db;
pub mod history;
pub mod models;

pub use db::repository::{CalculatorRepository, RepositoryError};
pub use history::RunHistory;
pub use models::*;
