//! Coin collection tracker.
//!
//! Coins are identified by (country, denomination, year) and carry a quantity
//! counter. Adding a coin that is already stored adds one copy; removing one
//! takes a copy away and drops the record together with its last copy.
//!
//! The HTTP surface lives in [`app`] and [`handlers`], persistence behind the
//! [`repository::CoinRepository`] trait, schema setup in [`migrations`] and
//! the operator table browser in [`console`].

pub mod app;
pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod handlers;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod state;

pub use app::build_router;
pub use error::{AppError, AppResult};
pub use models::{AddOutcome, Coin, NewCoin, RemoveOutcome};
pub use repository::{CoinRepository, SqliteCoinRepository};
