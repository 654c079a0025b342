//! `Directory` implementations.
//!
//! - `InMemoryDirectory`: process-local, for dev and tests.
//! - `PostgresDirectory`: sqlx-backed, uniqueness enforced by constraints.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryDirectory;
pub use postgres::PostgresDirectory;
