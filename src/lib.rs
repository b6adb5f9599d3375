//! Serialized access to a single non-thread-safe PostgreSQL connection.
//!
//! A [`Gateway`] owns one driver session and one single-concurrency worker
//! lane, and exposes statement preparation and transaction scopes in three
//! calling conventions (blocking, callback, and async) without letting any
//! of them overlap calls into the session.

mod config;
mod driver;
mod error;
mod gateway;
mod pg;
pub mod prelude;
mod rows;
mod statement;
mod tx_outcome;
mod types;
mod worker;

pub use config::{Config, Credential, Password};
pub use driver::DriverConnection;
pub use error::SqlGatewayError;
pub use gateway::Gateway;
pub use pg::PgConnection;
pub use pg::query::extract_value as pg_extract_value;
pub use rows::{Row, Rows};
pub use statement::PreparedStatement;
pub use tx_outcome::{TxOutcome, TxVerdict};
pub use types::SqlValue;

/// Gateway over the bundled PostgreSQL driver.
pub type PgGateway = Gateway<PgConnection>;
