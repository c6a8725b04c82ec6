//! Account store adapters.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
